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

use crate::provide_credential::{ConfigCredentialProvider, EnvCredentialProvider};
use crate::{Config, Credential};
use async_trait::async_trait;
use log::debug;
use s3sign_core::{Context, ProvideCredential, Result};
use std::sync::Arc;

/// DefaultCredentialProvider tries the configured keys, then the environment.
///
/// Resolution order:
///
/// 1. Keys set on [`Config`]
/// 2. Environment variables
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    config: ConfigCredentialProvider,
    env: EnvCredentialProvider,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new(Arc::new(Config::default()))
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new(cfg: Arc<Config>) -> Self {
        Self {
            config: ConfigCredentialProvider::new(cfg),
            env: EnvCredentialProvider::new(),
        }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if let Some(cred) = self.config.provide_credential(ctx).await? {
            debug!("load credential from config");
            return Ok(Some(cred));
        }

        let cred = self.env.provide_credential(ctx).await?;
        if cred.is_some() {
            debug!("load credential from env");
        }
        Ok(cred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY};
    use s3sign_core::StaticEnv;
    use std::collections::HashMap;

    fn env_context() -> Context {
        Context::new().with_env(StaticEnv {
            envs: HashMap::from([
                (AWS_ACCESS_KEY_ID.to_string(), "env_access_key".to_string()),
                (
                    AWS_SECRET_ACCESS_KEY.to_string(),
                    "env_secret_key".to_string(),
                ),
            ]),
        })
    }

    #[tokio::test]
    async fn test_config_wins_over_env() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let cfg = Config {
            access_key_id: Some("config_access_key".to_string()),
            secret_access_key: Some("config_secret_key".to_string()),
            ..Default::default()
        };
        let cred = DefaultCredentialProvider::new(Arc::new(cfg))
            .provide_credential(&env_context())
            .await?
            .expect("credential must be loaded");

        assert_eq!(cred.access_key_id, "config_access_key");
        Ok(())
    }

    #[tokio::test]
    async fn test_fallback_to_env() -> anyhow::Result<()> {
        let cred = DefaultCredentialProvider::default()
            .provide_credential(&env_context())
            .await?
            .expect("credential must be loaded");

        assert_eq!(cred.access_key_id, "env_access_key");
        Ok(())
    }

    #[tokio::test]
    async fn test_nothing_found() -> anyhow::Result<()> {
        let cred = DefaultCredentialProvider::default()
            .provide_credential(&Context::new())
            .await?;

        assert!(cred.is_none());
        Ok(())
    }
}
