// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

mod presigned;
mod standard;

use anyhow::Result;
use http::{Request, StatusCode};
use log::debug;
use reqwest::Client;
use s3sign_aws_v4::{Config, Credential};
use s3sign_core::{Context, OsEnv, Signer};
use std::env;

/// Initialize test environment
///
/// Reads the backend, endpoint, region and keys through [`Config::from_env`],
/// so `S3SIGN_BACKEND=gcs` runs the suite against Google Cloud Storage.
pub fn init_signing_test() -> Option<(Signer<Credential>, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("S3SIGN_TEST").is_err() || env::var("S3SIGN_TEST").unwrap() != "on" {
        return None;
    }

    let url = env::var("S3SIGN_TEST_URL").expect("S3SIGN_TEST_URL must be set");

    let ctx = Context::new().with_env(OsEnv);
    let signer = Config::default()
        .from_env(&ctx)
        .expect("config must be valid")
        .into_signer(ctx)
        .expect("signer must be valid");

    Some((signer, url))
}

/// Send signed request and return response
pub async fn send_signed_request(
    signer: &Signer<Credential>,
    req: Request<String>,
) -> Result<(StatusCode, String)> {
    let (mut parts, body) = req.into_parts();
    signer
        .sign(&mut parts, None)
        .await
        .expect("sign request must succeed");
    let req = Request::from_parts(parts, body);

    debug!("signed request: {req:?}");

    let client = Client::new();
    let resp = client.execute(req.try_into()?).await?;

    let status = resp.status();
    let body = resp.text().await?;

    debug!("response status: {status}, body: {body}");
    Ok((status, body))
}
