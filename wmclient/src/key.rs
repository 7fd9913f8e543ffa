// Copyright 2026 wmclient Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cache keys of header based lookups.

use hashbrown::HashMap;
use wmclient_common::error::{Error, ErrorKind, Result};

/// Leads every key derived from a header set.
const HEADERS_TAG: char = 'h';
/// Leads every key derived from a bare user agent.
const USER_AGENT_TAG: char = 'u';

/// Header name/value pairs with case-insensitive names.
///
/// Inserting a name twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, String>,
}

impl Headers {
    /// Create an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any value stored under the same name in any case.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Value of the header `name`, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(value) => Some(value.as_str()),
            None => self.entries.get(&name.to_ascii_lowercase()).map(String::as_str),
        }
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there is no header.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Derives cache keys for header based lookups.
///
/// The key is built from the values of the significant headers, taken in the order declared by the server. A missing
/// header contributes an empty segment, so the position of every value is preserved. Header name case, header order
/// and insignificant headers do not affect the key.
#[derive(Debug, Clone)]
pub struct HeaderKeyBuilder {
    significant: Vec<String>,
}

impl HeaderKeyBuilder {
    /// Create a key builder for the significant header names, in server order.
    pub fn new(significant: Vec<String>) -> Self {
        Self { significant }
    }

    /// Significant header names, in server order.
    pub fn significant(&self) -> &[String] {
        &self.significant
    }

    /// Build the cache key of `headers`.
    ///
    /// Fails with [`ErrorKind::MissingHeaders`] if no header source is supplied at all.
    pub fn build(&self, headers: Option<&Headers>) -> Result<String> {
        let headers = headers.ok_or_else(|| Error::new(ErrorKind::MissingHeaders, "No User-Agent provided"))?;

        let mut key = String::from(HEADERS_TAG);
        for name in self.significant.iter() {
            let value = headers.get(name).unwrap_or_default();
            // Length prefixes keep segment boundaries unambiguous whatever the values contain.
            key.push_str(&value.len().to_string());
            key.push(':');
            key.push_str(value);
        }
        Ok(key)
    }

    /// Build the cache key of a user agent lookup.
    ///
    /// The key never equals a key built by [`HeaderKeyBuilder::build`], so both kinds of lookup can share a cache.
    pub fn user_agent_key(&self, user_agent: &str) -> String {
        let mut key = String::with_capacity(user_agent.len() + 1);
        key.push(USER_AGENT_TAG);
        key.push_str(user_agent);
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> HeaderKeyBuilder {
        HeaderKeyBuilder::new(
            ["User-Agent", "X-UCBrowser-Device-UA", "Device-Stock-UA", "X-OperaMini-Phone-UA"]
                .map(String::from)
                .to_vec(),
        )
    }

    const UA: &str = "Mozilla/5.0 (Nintendo Switch; WebApplet) AppleWebKit/601.6 (KHTML, like Gecko) NF/4.0.0.5.9 NintendoBrowser/5.1.0.13341";

    #[test]
    fn test_headers_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("User-Agent", "a");
        assert_eq!(headers.get("user-agent"), Some("a"));
        assert_eq!(headers.get("USER-AGENT"), Some("a"));

        headers.insert("USER-AGENT", "b");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("User-Agent"), Some("b"));
        assert!(headers.get("Accept").is_none());
    }

    #[test]
    fn test_key_independent_of_case_order_and_extras() {
        let a: Headers = [
            ("User-Agent", UA),
            ("Device-Stock-UA", "stock"),
            ("Accept-Encoding", "gzip, deflate"),
        ]
        .into_iter()
        .collect();
        let b: Headers = [
            ("Accept", "text/html"),
            ("device-stock-ua", "stock"),
            ("user-agent", UA),
            ("Content-Type", "gzip, deflate"),
        ]
        .into_iter()
        .collect();

        let builder = builder();
        assert_eq!(builder.build(Some(&a)).unwrap(), builder.build(Some(&b)).unwrap());
    }

    #[test]
    fn test_key_keeps_segment_positions() {
        let builder = builder();

        let ua_only: Headers = [("User-Agent", "x")].into_iter().collect();
        let stock_only: Headers = [("Device-Stock-UA", "x")].into_iter().collect();
        assert_ne!(
            builder.build(Some(&ua_only)).unwrap(),
            builder.build(Some(&stock_only)).unwrap()
        );

        assert_eq!(builder.build(Some(&ua_only)).unwrap(), "h1:x0:0:0:");
        assert_eq!(builder.build(Some(&Headers::new())).unwrap(), "h0:0:0:0:");
    }

    #[test]
    fn test_key_with_separator_like_values() {
        let builder = builder();

        // Values that embed line feeds or length-like text must not shift into the next segment.
        let joined: Headers = [("User-Agent", format!("a\n{UA}"))].into_iter().collect();
        let split: Headers = [("User-Agent", "a".to_string()), ("X-UCBrowser-Device-UA", format!("{UA}\n"))]
            .into_iter()
            .collect();
        assert_ne!(builder.build(Some(&joined)).unwrap(), builder.build(Some(&split)).unwrap());

        let shifted: Headers = [("User-Agent", "1:x"), ("X-UCBrowser-Device-UA", "")].into_iter().collect();
        let plain: Headers = [("User-Agent", ""), ("X-UCBrowser-Device-UA", "x0:")].into_iter().collect();
        assert_ne!(builder.build(Some(&shifted)).unwrap(), builder.build(Some(&plain)).unwrap());
    }

    #[test]
    fn test_user_agent_key_never_matches_headers_key() {
        let builder = builder();
        let headers: Headers = [("User-Agent", UA)].into_iter().collect();
        let headers_key = builder.build(Some(&headers)).unwrap();

        assert_ne!(builder.user_agent_key(UA), headers_key);
        // A user agent crafted to look like a headers key still gets its own key.
        assert_ne!(builder.user_agent_key(&headers_key), headers_key);
        assert_ne!(builder.user_agent_key(&headers_key[1..]), headers_key);
        assert_eq!(builder.user_agent_key(UA), builder.user_agent_key(UA));
    }

    #[test]
    fn test_key_without_header_source() {
        let err = builder().build(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingHeaders);
    }
}
