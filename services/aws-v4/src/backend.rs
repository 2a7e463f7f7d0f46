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

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use http::Uri;
use s3sign_core::{Error, Result};

use crate::constants::ACCEPT_ENCODING;
use crate::constants::GCS_INTEROP_HOST;
use crate::constants::GCS_INTEROP_REGION;
use crate::ExclusionPolicy;

/// Storage backends that speak the S3 API, with their signing quirks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Amazon S3 and strictly compatible services.
    #[default]
    Aws,
    /// Google Cloud Storage XML API in S3 interoperability mode.
    ///
    /// The frontend rewrites `Accept-Encoding` in transit.
    Gcs,
}

impl Backend {
    /// Headers this backend cannot verify and which must not be signed.
    pub fn required_excluded_headers(&self) -> &'static [&'static str] {
        match self {
            Backend::Aws => &[],
            Backend::Gcs => &[ACCEPT_ENCODING],
        }
    }

    /// Exclusion policy to use for this backend: the SigV4 defaults plus the
    /// backend's own requirements.
    pub fn exclusion_policy(&self) -> ExclusionPolicy {
        let mut policy = ExclusionPolicy::sigv4_default();
        policy.extend(self.required_excluded_headers());
        policy
    }

    /// Fail if `policy` signs a header this backend will rewrite.
    pub fn validate(&self, policy: &ExclusionPolicy) -> Result<()> {
        policy
            .ensure_excluded(self.required_excluded_headers().iter().copied())
            .map_err(|err| {
                Error::config_invalid(format!("backend {self} is misconfigured")).with_source(err)
            })
    }

    /// Region to sign with when none is configured.
    ///
    /// GCS ignores the region but expects `auto` in the credential scope.
    pub fn default_region(&self) -> Option<&'static str> {
        match self {
            Backend::Aws => None,
            Backend::Gcs => Some(GCS_INTEROP_REGION),
        }
    }

    /// Public endpoint of this backend.
    pub fn default_endpoint(&self, region: &str) -> String {
        match self {
            Backend::Aws => format!("https://s3.{region}.amazonaws.com"),
            Backend::Gcs => format!("https://{GCS_INTEROP_HOST}"),
        }
    }

    /// Guess the backend from an endpoint url.
    ///
    /// Only the GCS interoperability host is recognized, everything else is
    /// treated as [`Backend::Aws`].
    pub fn from_endpoint(endpoint: &str) -> Backend {
        let host = endpoint
            .parse::<Uri>()
            .ok()
            .and_then(|uri| uri.host().map(|h| h.to_ascii_lowercase()));

        match host {
            Some(host) if host == GCS_INTEROP_HOST || host.ends_with(".storage.googleapis.com") => {
                Backend::Gcs
            }
            _ => Backend::Aws,
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Aws => f.write_str("aws"),
            Backend::Gcs => f.write_str("gcs"),
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" | "s3" => Ok(Backend::Aws),
            "gcs" | "google" => Ok(Backend::Gcs),
            v => Err(Error::config_invalid(format!(
                "unknown backend {v:?}, expected one of aws, gcs"
            ))),
        }
    }
}
