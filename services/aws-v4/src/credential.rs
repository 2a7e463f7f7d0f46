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

use s3sign_core::time::{now, DateTime};
use s3sign_core::utils::Redact;
use s3sign_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credential that holds the access_key and secret_key.
///
/// GCS interoperability uses HMAC keys of the same shape.
#[derive(Default, Clone)]
pub struct Credential {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token, only issued by AWS STS.
    pub session_token: Option<String>,
    /// Expiration time for this credential.
    pub expires_in: Option<DateTime>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return false;
        }
        // Take 120s as buffer to avoid edge cases.
        if let Some(valid) = self
            .expires_in
            .map(|v| v > now() + chrono::TimeDelta::try_minutes(2).expect("in bounds"))
        {
            return valid;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn credential() -> Credential {
        Credential {
            access_key_id: "GOOG1EXAMPLEACCESSKEY".to_string(),
            secret_access_key: "example-secret-access-key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(credential().is_valid());
        assert!(!Credential::default().is_valid());
        assert!(!Credential {
            secret_access_key: String::new(),
            ..credential()
        }
        .is_valid());
    }

    #[test]
    fn test_is_valid_with_expiry() {
        let expired = Credential {
            expires_in: Some(now() + TimeDelta::try_seconds(30).expect("in bounds")),
            ..credential()
        };
        assert!(!expired.is_valid());

        let fresh = Credential {
            expires_in: Some(now() + TimeDelta::try_hours(1).expect("in bounds")),
            ..credential()
        };
        assert!(fresh.is_valid());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let output = format!("{:?}", credential());
        assert!(output.contains("GOO***KEY"));
        assert!(!output.contains("example-secret-access-key"));
    }
}
