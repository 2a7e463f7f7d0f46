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

//! Headers left out of the SigV4 signed-header set.
//!
//! SigV4 binds a signature to the headers listed in `SignedHeaders`. Some
//! headers are rewritten by HTTP stacks and gateways in transit, so signing
//! them makes every request fail verification on the server. For example,
//! Google Cloud Storage's S3 interoperability endpoint rewrites
//! `Accept-Encoding`.
//!
//! An [`ExclusionPolicy`] is built while the signer is configured and is
//! frozen once the signer owns it: [`crate::RequestSigner`] keeps it behind an
//! `Arc` and only ever reads it.

use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use s3sign_core::{Error, Result};

/// Headers that SigV4 signers skip by default.
///
/// They are either set by the signer itself or routinely changed by proxies.
pub const SIGV4_DEFAULT_EXCLUDED_HEADERS: &[&str] = &[
    "authorization",
    "expect",
    "transfer-encoding",
    "user-agent",
    "x-amzn-trace-id",
];

/// Headers SigV4 always binds to the signature.
///
/// A policy excluding any of them yields signatures no server accepts, so
/// the signer keeps them signed and [`ExclusionPolicy::ensure_signed`]
/// rejects such a policy at startup.
pub const SIGV4_REQUIRED_SIGNED_HEADERS: &[&str] = &[
    "host",
    "x-amz-content-sha256",
    "x-amz-date",
    "x-amz-security-token",
];

/// How an [`ExclusionRule`] compares its pattern with a header name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    /// The header name equals the pattern.
    Exact,
    /// The header name starts with the pattern.
    Prefix,
}

/// A predicate over header names.
///
/// Patterns are stored lower-cased and compared ignoring ASCII case, the
/// same normalization `http::HeaderName` applies.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExclusionRule {
    kind: MatchKind,
    pattern: String,
}

impl ExclusionRule {
    /// Rule matching exactly `name`.
    pub fn exact(name: impl AsRef<str>) -> Self {
        Self {
            kind: MatchKind::Exact,
            pattern: normalize(name.as_ref()),
        }
    }

    /// Rule matching every header starting with `prefix`.
    pub fn prefix(prefix: impl AsRef<str>) -> Self {
        Self {
            kind: MatchKind::Prefix,
            pattern: normalize(prefix.as_ref()),
        }
    }

    /// The match kind.
    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    /// The lower-cased pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check whether `header` is governed by this rule.
    pub fn matches(&self, header: &str) -> bool {
        match self.kind {
            MatchKind::Exact => header.eq_ignore_ascii_case(&self.pattern),
            MatchKind::Prefix => header
                .as_bytes()
                .get(..self.pattern.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(self.pattern.as_bytes())),
        }
    }
}

impl Display for ExclusionRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            MatchKind::Exact => f.write_str(&self.pattern),
            MatchKind::Prefix => write!(f, "{}*", self.pattern),
        }
    }
}

/// The set of rules deciding which headers are not signed.
///
/// A header is excluded iff at least one rule matches it. Rules have set
/// semantics: registering twice, or in a different order, yields an equal
/// policy.
///
/// ```
/// use s3sign_aws_v4::ExclusionPolicy;
///
/// let mut policy = ExclusionPolicy::new();
/// assert!(!policy.is_excluded("Accept-Encoding"));
///
/// policy.register("Accept-Encoding");
/// assert!(policy.is_excluded("accept-encoding"));
/// assert!(!policy.is_excluded("Content-Type"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionPolicy {
    rules: BTreeSet<ExclusionRule>,
}

impl ExclusionPolicy {
    /// Create an empty policy that excludes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy holding [`SIGV4_DEFAULT_EXCLUDED_HEADERS`].
    pub fn sigv4_default() -> Self {
        SIGV4_DEFAULT_EXCLUDED_HEADERS.iter().collect()
    }

    /// Exclude `header_name` from signing.
    ///
    /// Any string is accepted; surrounding whitespace is dropped and the
    /// comparison ignores case. A rule for a header that never shows up on a
    /// request is inert.
    ///
    /// Returns `false` if the header was already registered.
    pub fn register(&mut self, header_name: impl AsRef<str>) -> bool {
        self.insert(ExclusionRule::exact(header_name))
    }

    /// Exclude every header starting with `prefix` from signing.
    ///
    /// An empty prefix would exclude `host` as well and is ignored.
    pub fn register_prefix(&mut self, prefix: impl AsRef<str>) -> bool {
        self.insert(ExclusionRule::prefix(prefix))
    }

    /// Builder form of [`ExclusionPolicy::register`].
    pub fn with_header(mut self, header_name: impl AsRef<str>) -> Self {
        self.register(header_name);
        self
    }

    /// Builder form of [`ExclusionPolicy::register_prefix`].
    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.register_prefix(prefix);
        self
    }

    /// Add every rule of `other` to this policy.
    pub fn merge(&mut self, other: &ExclusionPolicy) {
        self.rules.extend(other.rules.iter().cloned());
    }

    /// Check whether `header_name` must be left out of the signed headers.
    #[inline]
    pub fn is_excluded(&self, header_name: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(header_name))
    }

    /// Iterate the rules in a stable order.
    pub fn rules(&self) -> impl Iterator<Item = &ExclusionRule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check whether the policy has no rule.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Fail unless every header in `required` is excluded.
    ///
    /// Used at startup so a missing exclusion is reported locally instead of
    /// as a signature mismatch from the server.
    pub fn ensure_excluded<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> Result<()> {
        match required.into_iter().find(|h| !self.is_excluded(h)) {
            None => Ok(()),
            Some(missing) => Err(Error::config_invalid(format!(
                "header {missing} must be excluded from signing, current exclusions: [{self}]"
            ))),
        }
    }

    /// Fail if any header in `required` is excluded.
    ///
    /// Prefix rules count too: `x-amz-*` excludes `x-amz-date`.
    pub fn ensure_signed<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> Result<()> {
        match required.into_iter().find(|h| self.is_excluded(h)) {
            None => Ok(()),
            Some(excluded) => Err(Error::config_invalid(format!(
                "header {excluded} must be signed, current exclusions: [{self}]"
            ))),
        }
    }

    fn insert(&mut self, rule: ExclusionRule) -> bool {
        if rule.pattern.is_empty() {
            return false;
        }
        self.rules.insert(rule)
    }
}

impl<S: AsRef<str>> Extend<S> for ExclusionPolicy {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for name in iter {
            self.register(name);
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExclusionPolicy {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut policy = Self::new();
        policy.extend(iter);
        policy
    }
}

/// Comma separated rules, a trailing `*` marks a prefix rule.
impl Display for ExclusionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (idx, rule) in self.rules.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            Display::fmt(rule, f)?;
        }
        Ok(())
    }
}

/// Parse comma separated rules like `accept-encoding,x-goog-*`.
///
/// Blank entries are skipped.
impl FromStr for ExclusionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut policy = Self::new();
        for entry in s.split(',').map(str::trim).filter(|v| !v.is_empty()) {
            match entry.strip_suffix('*') {
                Some(prefix) => policy.register_prefix(prefix),
                None => policy.register(entry),
            };
        }
        Ok(policy)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
