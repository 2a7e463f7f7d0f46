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

//! AWS SigV4 signer for S3-compatible backends.
//!
//! Some backends rewrite request headers between the client and the
//! signature check. Google Cloud Storage, for example, changes
//! `Accept-Encoding`, so a signature covering it never verifies. Every
//! [`RequestSigner`] carries its own [`ExclusionPolicy`] listing the headers
//! left out of the signature, and [`Backend`] knows what each backend needs.
//!
//! ## Example
//!
//! ```no_run
//! use s3sign_aws_v4::{Backend, Config};
//! use s3sign_core::{Context, OsEnv, Result};
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let signer = Config {
//!     backend: Some(Backend::Gcs),
//!     ..Default::default()
//! }
//! .from_env(&ctx)?
//! .into_signer(ctx)?;
//!
//! let (mut parts, _) = http::Request::get("https://storage.googleapis.com/bucket/key")
//!     .header("accept-encoding", "gzip")
//!     .body(())
//!     .map_err(s3sign_core::Error::from)?
//!     .into_parts();
//! signer.sign(&mut parts, None).await?;
//! # Ok(())
//! # }
//! ```

mod constants;

mod backend;
pub use backend::Backend;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod exclude;
pub use exclude::{
    ExclusionPolicy, ExclusionRule, MatchKind, SIGV4_DEFAULT_EXCLUDED_HEADERS,
    SIGV4_REQUIRED_SIGNED_HEADERS,
};

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::{
    ConfigCredentialProvider, DefaultCredentialProvider, EnvCredentialProvider,
    StaticCredentialProvider,
};
