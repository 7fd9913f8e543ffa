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

use wmclient_common::error::Result;

use crate::{client::WmClient, endpoint::Endpoint, fetcher::Fetcher};

/// WM client builder.
#[derive(Debug, Clone)]
pub struct WmClientBuilder {
    endpoint: Endpoint,
    cache_capacity: Option<usize>,
}

impl From<Endpoint> for WmClientBuilder {
    fn from(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            cache_capacity: None,
        }
    }
}

impl WmClientBuilder {
    /// Create a new WM client builder for the server at `host:port`.
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Endpoint::new(host, port).into()
    }

    /// Set the URL scheme.
    ///
    /// Default: `http`.
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.endpoint.scheme = scheme.to_string();
        self
    }

    /// Set the path prefix the server routes are mounted under.
    ///
    /// Default: no prefix.
    pub fn with_base_uri(mut self, base_uri: &str) -> Self {
        self.endpoint.base_uri = base_uri.trim_matches('/').to_string();
        self
    }

    /// Enable caching with a header cache of `capacity` entries.
    ///
    /// `0` selects [`wmclient_memory::DEFAULT_CAPACITY`].
    ///
    /// Default: caching disabled.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Connect to the server through `fetcher` and build the client.
    ///
    /// Fails with a [`Config`](wmclient_common::error::ErrorKind::Config) error if the endpoint is incomplete or the
    /// server information cannot be fetched or is invalid.
    pub fn build<F>(self, fetcher: F) -> Result<WmClient<F>>
    where
        F: Fetcher,
    {
        WmClient::open(self.endpoint, fetcher, self.cache_capacity)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wmclient_common::error::ErrorKind;

    use super::*;
    use crate::{fetcher::Route, model::ServerInfo, test_utils::MockFetcher};

    #[test_log::test]
    fn test_build() {
        let fetcher = Arc::new(MockFetcher::new());
        let client = WmClientBuilder::new("localhost", "8080")
            .with_scheme("https")
            .with_base_uri("/wm/")
            .build(fetcher.clone())
            .unwrap();

        assert_eq!(client.endpoint().url(Route::Info), "https://localhost:8080/wm/v2/getinfo/json");
        assert_eq!(fetcher.calls(Route::Info), 1);
        assert_eq!(client.server_info().wm_version, "2.1.0");
        assert_eq!(client.cache_sizes(), (0, 0));
    }

    #[test]
    fn test_build_with_incomplete_endpoint() {
        let fetcher = Arc::new(MockFetcher::new());
        let err = WmClientBuilder::new("", "8080").build(fetcher.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(fetcher.calls(Route::Info), 0);
    }

    #[test]
    fn test_build_with_unreachable_server() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.set_failing(true);
        let err = WmClientBuilder::new("localhost", "8080").build(fetcher).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.message(), "Error creating WM client");
        let source = err.downcast_ref::<wmclient_common::error::Error>().unwrap();
        assert_eq!(source.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_build_with_invalid_info() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.set_info(ServerInfo {
            wm_version: "2.1.0".to_string(),
            ..Default::default()
        });
        let err = WmClientBuilder::new("localhost", "8080").build(fetcher).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteData);
        assert_eq!(err.message(), "Server returned empty data or a wrong json format");
        assert!(err.source().is_none());
    }
}
