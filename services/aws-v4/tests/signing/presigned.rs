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

use super::init_signing_test;
use anyhow::Result;
use http::{header, Method, Request, StatusCode};
use log::{debug, warn};
use reqwest::Client;
use std::str::FromStr;
use std::time::Duration;

#[tokio::test]
async fn test_get_object_with_presigned_url() -> Result<()> {
    let Some((signer, url)) = init_signing_test() else {
        warn!("S3SIGN_TEST is not set, skipped");
        return Ok(());
    };

    let mut req = Request::new(String::new());
    *req.method_mut() = Method::GET;
    *req.uri_mut() = http::Uri::from_str(&format!("{}/{}", url, "not_exist_file"))?;
    req.headers_mut()
        .insert(header::ACCEPT_ENCODING, "gzip".parse()?);

    // Sign with expiration time
    let (mut parts, body) = req.into_parts();
    signer
        .sign(&mut parts, Some(Duration::from_secs(3600)))
        .await
        .expect("sign request must succeed");
    let mut req = Request::from_parts(parts, body);

    // Clients replaying a presigned url pick their own encoding.
    req.headers_mut()
        .insert(header::ACCEPT_ENCODING, "identity".parse()?);

    debug!("presigned request: {req:?}");

    let client = Client::new();
    let resp = client.execute(req.try_into()?).await?;

    debug!("got response: {resp:?}");
    assert_eq!(StatusCode::NOT_FOUND, resp.status());
    Ok(())
}

#[tokio::test]
async fn test_put_object_with_presigned_url() -> Result<()> {
    let Some((signer, url)) = init_signing_test() else {
        warn!("S3SIGN_TEST is not set, skipped");
        return Ok(());
    };

    let mut req = Request::new(String::new());
    *req.method_mut() = Method::PUT;
    *req.uri_mut() = http::Uri::from_str(&format!("{}/{}", url, "presigned_put_test"))?;

    // Sign with expiration time
    let (mut parts, body) = req.into_parts();
    signer
        .sign(&mut parts, Some(Duration::from_secs(300)))
        .await
        .expect("sign request must succeed");
    let req = Request::from_parts(parts, body);

    debug!("presigned PUT request: {req:?}");

    let query = req.uri().query().expect("presigned url must have query");
    assert!(query.contains("X-Amz-Signature"));
    assert!(query.contains("X-Amz-Expires"));
    Ok(())
}
