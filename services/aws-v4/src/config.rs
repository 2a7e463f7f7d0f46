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

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use log::debug;
use s3sign_core::utils::Redact;
use s3sign_core::{Context, Error, Result, Signer};

use crate::constants::*;
use crate::{Backend, Credential, DefaultCredentialProvider, ExclusionPolicy, RequestSigner};

/// Config for signing requests against an S3-compatible backend.
///
/// Build it once at startup, then turn it into a signer with
/// [`Config::into_signer`]. All validation happens there, so a
/// misconfigured backend fails before the first request is sent.
#[derive(Clone, Default)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_REGION`
    /// - the backend default (`auto` for GCS)
    pub region: Option<String>,
    /// `service` used in the credential scope, default to `s3`.
    pub service: Option<String>,
    /// `backend` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: `S3SIGN_BACKEND`
    /// - detected from `endpoint`
    pub backend: Option<Backend>,
    /// `endpoint` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: `S3SIGN_ENDPOINT`
    /// - the backend default
    pub endpoint: Option<String>,
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_ACCESS_KEY_ID`
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SECRET_ACCESS_KEY`
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SESSION_TOKEN`
    pub session_token: Option<String>,
    /// Extra headers to leave unsigned, on top of the SigV4 defaults and the
    /// backend's requirements. A trailing `*` makes a prefix rule.
    ///
    /// Entries from env value `S3SIGN_EXCLUDED_HEADERS` (comma separated)
    /// are appended.
    pub excluded_headers: Vec<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("service", &self.service)
            .field("backend", &self.backend)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("excluded_headers", &self.excluded_headers)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Fields already set take precedence. An unknown `S3SIGN_BACKEND` is
    /// reported as a configuration error.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        let envs = ctx.env_vars();

        if self.region.is_none() {
            self.region = envs.get(AWS_REGION).cloned();
        }
        if self.endpoint.is_none() {
            self.endpoint = envs.get(S3SIGN_ENDPOINT).cloned();
        }
        if self.backend.is_none() {
            if let Some(v) = envs.get(S3SIGN_BACKEND) {
                self.backend = Some(v.parse()?);
            }
        }
        if self.access_key_id.is_none() {
            self.access_key_id = envs.get(AWS_ACCESS_KEY_ID).cloned();
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = envs.get(AWS_SECRET_ACCESS_KEY).cloned();
        }
        if self.session_token.is_none() {
            self.session_token = envs.get(AWS_SESSION_TOKEN).cloned();
        }
        if let Some(v) = envs.get(S3SIGN_EXCLUDED_HEADERS) {
            self.excluded_headers.extend(
                v.split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(String::from),
            );
        }

        Ok(self)
    }

    /// The backend profile, detected from `endpoint` if not set.
    pub fn backend(&self) -> Backend {
        match (self.backend, &self.endpoint) {
            (Some(backend), _) => backend,
            (None, Some(endpoint)) => Backend::from_endpoint(endpoint),
            (None, None) => Backend::default(),
        }
    }

    /// The signing region.
    pub fn region(&self) -> Result<String> {
        if let Some(region) = &self.region {
            return Ok(region.clone());
        }

        let backend = self.backend();
        backend
            .default_region()
            .map(String::from)
            .ok_or_else(|| {
                Error::config_invalid(format!(
                    "region is required for backend {backend}, set it in config or {AWS_REGION}"
                ))
            })
    }

    /// The endpoint requests should be sent to.
    pub fn endpoint(&self) -> Result<String> {
        match &self.endpoint {
            Some(endpoint) => Ok(endpoint.trim_end_matches('/').to_string()),
            None => Ok(self.backend().default_endpoint(&self.region()?)),
        }
    }

    /// Build the exclusion policy: SigV4 defaults, backend requirements and
    /// [`Config::excluded_headers`].
    pub fn exclusion_policy(&self) -> Result<ExclusionPolicy> {
        let mut policy = self.backend().exclusion_policy();
        policy.merge(&self.excluded_headers.join(",").parse::<ExclusionPolicy>()?);
        Ok(policy)
    }

    /// Build a validated request signer.
    pub fn request_signer(&self) -> Result<RequestSigner> {
        let backend = self.backend();
        let signer = RequestSigner::new(
            self.service.as_deref().unwrap_or("s3"),
            &self.region()?,
        )
        .with_exclusion_policy(self.exclusion_policy()?);
        signer.validate(backend)?;

        // An explicit backend may disagree with the endpoint it talks to.
        if let Some(endpoint) = &self.endpoint {
            let detected = Backend::from_endpoint(endpoint);
            if detected != backend {
                signer.validate(detected).map_err(|err| {
                    Error::config_invalid(format!(
                        "backend {backend} is configured but endpoint {endpoint} is served by {detected}"
                    ))
                    .with_source(err)
                })?;
            }
        }

        debug!(
            "request signer for backend {backend} excludes headers: [{}]",
            signer.exclusion_policy()
        );
        Ok(signer)
    }

    /// Credential provider reading this config first, then the environment.
    pub fn credential_provider(&self) -> DefaultCredentialProvider {
        DefaultCredentialProvider::new(Arc::new(self.clone()))
    }

    /// Validate this config and build a ready to share [`Signer`].
    pub fn into_signer(self, ctx: Context) -> Result<Signer<Credential>> {
        let builder = self.request_signer()?;
        Ok(Signer::new(ctx, self.credential_provider(), builder))
    }
}
