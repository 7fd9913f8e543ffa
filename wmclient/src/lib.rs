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

//! A caching client for the WURFL Microservice (WM) device detection server.
//!
//! The client keeps recent lookup results in LRU caches and drops every cached result, together with the bulk
//! make/model and OS/version tables, as soon as a response shows that the server data changed.
//!
//! Network access is delegated to a [`Fetcher`](crate::fetcher::Fetcher) implementation.
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use wmclient::{prelude::*, test_utils::MockFetcher};
//!
//! let client = WmClientBuilder::new("localhost", "8080")
//!     .with_cache_capacity(1000)
//!     .build(Arc::new(MockFetcher::new()))
//!     .unwrap();
//!
//! let device = client.lookup_device_id("nintendo_switch_ver1").unwrap();
//! assert_eq!(device.capability("brand_name").unwrap(), "Nintendo");
//! ```

mod builder;
mod client;

pub mod capability;
pub mod endpoint;
pub mod fetcher;
pub mod key;
pub mod model;
pub mod prelude;
pub mod tables;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use prelude::*;
