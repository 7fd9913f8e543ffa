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

//! Location of a WM server.

use serde::{Deserialize, Serialize};
use wmclient_common::error::{Error, ErrorKind, Result};

use crate::fetcher::Route;

/// Location of a WM server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// URL scheme, `http` when left empty.
    #[serde(default)]
    pub scheme: String,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: String,
    /// Optional path prefix every route is mounted under.
    #[serde(default)]
    pub base_uri: String,
}

impl Endpoint {
    /// Create an `http` endpoint for `host:port`.
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            scheme: "http".to_string(),
            host: host.into(),
            port: port.into(),
            base_uri: String::new(),
        }
    }

    /// Check that the endpoint can be connected to.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::new(ErrorKind::Config, "host must not be empty"));
        }
        if self.port.is_empty() {
            return Err(Error::new(ErrorKind::Config, "port must not be empty").with_context("host", &self.host));
        }
        Ok(())
    }

    /// Full URL of `route`.
    pub fn url(&self, route: Route) -> String {
        let scheme = if self.scheme.is_empty() { "http" } else { &self.scheme };
        if self.base_uri.is_empty() {
            format!("{scheme}://{}:{}{}", self.host, self.port, route.path())
        } else {
            format!("{scheme}://{}:{}/{}{}", self.host, self.port, self.base_uri, route.path())
        }
    }
}
