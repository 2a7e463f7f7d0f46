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

use std::mem;
use std::str::FromStr;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// HTTP query parameters.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let query_size = self.query_size();

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if query_size == 0 {
                    self.path
                } else {
                    let mut s = self.path;
                    s.reserve(query_size + 1);

                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.push_str(k);
                        if !v.is_empty() {
                            s.push('=');
                            s.push_str(v);
                        }
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Normalize header value.
    pub fn header_value_normalize(v: &mut HeaderValue) {
        let bs = v.as_bytes();

        let starting_index = bs.iter().position(|b| *b != b' ').unwrap_or(0);
        let ending_offset = bs.iter().rev().position(|b| *b != b' ').unwrap_or(0);
        let ending_index = bs.len() - ending_offset;

        // This can't fail because we started with a valid HeaderValue and then only trimmed spaces
        *v = HeaderValue::from_bytes(&bs[starting_index..ending_index])
            .expect("invalid header value")
    }

    /// Get header names as sorted vector.
    pub fn header_name_to_vec_sorted(&self) -> Vec<&str> {
        self.header_name_to_vec_sorted_with_filter(|_| true)
    }

    /// Get header names accepted by `filter` as sorted vector.
    ///
    /// Names are the lower-cased form kept by `http::HeaderName`.
    pub fn header_name_to_vec_sorted_with_filter(
        &self,
        filter: impl Fn(&str) -> bool,
    ) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .filter(|&k| filter(k))
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(uri: &str) -> http::request::Parts {
        let mut req = http::Request::new(());
        *req.uri_mut() = uri.parse().expect("uri must be valid");
        req.headers_mut()
            .insert("Content-Type", HeaderValue::from_static("text/plain"));
        req.headers_mut()
            .insert("Accept-Encoding", HeaderValue::from_static("gzip"));
        req.into_parts().0
    }

    #[test]
    fn test_build_and_apply() -> Result<()> {
        let mut p = parts("https://storage.googleapis.com/bucket/key?list-type=2&prefix=a");
        let req = SigningRequest::build(&mut p)?;

        assert_eq!(req.authority.as_str(), "storage.googleapis.com");
        assert_eq!(req.path, "/bucket/key");
        assert_eq!(
            req.query,
            vec![
                ("list-type".to_string(), "2".to_string()),
                ("prefix".to_string(), "a".to_string())
            ]
        );
        assert!(p.headers.is_empty());

        req.apply(&mut p)?;
        assert_eq!(
            p.uri.to_string(),
            "https://storage.googleapis.com/bucket/key?list-type=2&prefix=a"
        );
        assert_eq!(p.headers.len(), 2);
        Ok(())
    }

    #[test]
    fn test_build_without_authority() {
        let mut p = parts("/bucket/key");
        let err = SigningRequest::build(&mut p).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_header_name_to_vec_sorted_with_filter() -> Result<()> {
        let mut p = parts("https://storage.googleapis.com/bucket");
        let req = SigningRequest::build(&mut p)?;

        assert_eq!(
            req.header_name_to_vec_sorted(),
            vec!["accept-encoding", "content-type"]
        );
        assert_eq!(
            req.header_name_to_vec_sorted_with_filter(|h| h != "accept-encoding"),
            vec!["content-type"]
        );
        Ok(())
    }

    #[test]
    fn test_header_value_normalize() {
        let mut v = HeaderValue::from_static("  gzip  ");
        SigningRequest::header_value_normalize(&mut v);
        assert_eq!(v, "gzip");
    }
}
