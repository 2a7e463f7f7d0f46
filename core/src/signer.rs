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

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Signer drives one [`SignRequest`] with credentials from one
/// [`ProvideCredential`].
///
/// The last valid credential is cached and shared by every clone, so a
/// `Signer` built at startup can be handed to any number of tasks. The
/// request signer, and the exclusion policy it owns, is never rebuilt.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    request_signer: Arc<dyn SignRequest<Credential = K>>,
    cache: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        request_signer: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,
            provider: Arc::new(provider),
            request_signer: Arc::new(request_signer),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Sign `req` in place.
    ///
    /// `expires_in` switches to a presigned url valid for that long. A request
    /// is left untouched if no credential can be found.
    pub async fn sign(
        &self,
        req: &mut http::request::Parts,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let credential = self.credential().await?;

        self.request_signer
            .sign_request(&self.ctx, req, credential.as_ref(), expires_in)
            .await
    }

    /// The cached credential, reloaded from the provider once it is no longer valid.
    async fn credential(&self) -> Result<Option<K>> {
        let cached = self.cache()?.clone();
        if cached.is_valid() {
            return Ok(cached);
        }

        debug!("cached credential is missing or invalid, loading a new one");
        let loaded = self.provider.provide_credential(&self.ctx).await?;
        self.cache()?.clone_from(&loaded);
        Ok(loaded)
    }

    fn cache(&self) -> Result<MutexGuard<'_, Option<K>>> {
        self.cache
            .lock()
            .map_err(|_| Error::unexpected("credential cache is poisoned by a panicked signer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct Token(String);

    impl SigningCredential for Token {
        fn is_valid(&self) -> bool {
            !self.0.is_empty()
        }
    }

    #[derive(Debug, Default)]
    struct CountingLoader {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProvideCredential for CountingLoader {
        type Credential = Token;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Token>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Token("token".to_string())))
        }
    }

    #[derive(Debug)]
    struct HeaderBuilder;

    #[async_trait]
    impl SignRequest for HeaderBuilder {
        type Credential = Token;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            credential: Option<&Token>,
            _: Option<Duration>,
        ) -> Result<()> {
            if let Some(token) = credential {
                req.headers
                    .insert(http::header::AUTHORIZATION, token.0.parse()?);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_signer_caches_credential() -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            CountingLoader {
                calls: calls.clone(),
            },
            HeaderBuilder,
        );

        for _ in 0..3 {
            let mut parts = http::Request::new(()).into_parts().0;
            signer.sign(&mut parts, None).await?;
            assert_eq!(parts.headers[http::header::AUTHORIZATION], "token");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[derive(Debug, Default)]
    struct EmptyLoader {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProvideCredential for EmptyLoader {
        type Credential = Token;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Token>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_signer_retries_missing_credential() -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            EmptyLoader {
                calls: calls.clone(),
            },
            HeaderBuilder,
        );

        for _ in 0..2 {
            let mut parts = http::Request::new(()).into_parts().0;
            signer.sign(&mut parts, None).await?;
            assert!(parts.headers.get(http::header::AUTHORIZATION).is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        Ok(())
    }
}
