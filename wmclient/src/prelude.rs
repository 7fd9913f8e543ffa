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

//! Commonly used items.

pub use wmclient_common::error::{Error, ErrorKind, Result};
pub use wmclient_memory::{LruCache, DEFAULT_CAPACITY};

pub use crate::{
    builder::WmClientBuilder,
    capability::{CapabilityCatalog, CapabilityClassifier, CapabilityKind, RequestedCapabilities},
    client::{WmClient, DEVICE_ID_CACHE_CAPACITY},
    endpoint::Endpoint,
    fetcher::{Fetcher, Route},
    key::{HeaderKeyBuilder, Headers},
    model::{DeviceData, DeviceOsVersion, LookupRequest, MakeModel, ModelMarketingName, ServerInfo},
    tables::{MakeTable, OsTable},
};
