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

//! The remote side of the client.

use std::sync::Arc;

use wmclient_common::error::Result;

use crate::model::{DeviceData, DeviceOsVersion, LookupRequest, MakeModel, ServerInfo};

/// Server routes used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Server information.
    Info,
    /// Lookup by user agent.
    LookupUserAgent,
    /// Lookup by WURFL device id.
    LookupDeviceId,
    /// Lookup by request headers.
    LookupRequest,
    /// Make and model of all devices.
    AllDevices,
    /// OS name and version of all devices.
    AllOsVersions,
}

impl Route {
    /// Path of the route, relative to the endpoint base.
    pub fn path(self) -> &'static str {
        match self {
            Route::Info => "/v2/getinfo/json",
            Route::LookupUserAgent => "/v2/lookupuseragent/json",
            Route::LookupDeviceId => "/v2/lookupdeviceid/json",
            Route::LookupRequest => "/v2/lookuprequest/json",
            Route::AllDevices => "/v2/alldevices/json",
            Route::AllOsVersions => "/v2/alldeviceosversions/json",
        }
    }
}

/// The remote side of the client.
///
/// Implementations perform the actual network calls and decode the payloads. Every method is blocking and receives
/// the fully built URL of its route. Failures to complete a call are reported as
/// [`ErrorKind::Transport`](wmclient_common::error::ErrorKind::Transport) errors; a payload that carries an error
/// marker is *not* a failure at this level.
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch [`ServerInfo`] from [`Route::Info`].
    fn info(&self, url: &str) -> Result<ServerInfo>;

    /// Post a [`LookupRequest`] to one of the lookup routes.
    fn lookup(&self, url: &str, request: &LookupRequest) -> Result<DeviceData>;

    /// Fetch the make and model of all devices from [`Route::AllDevices`].
    fn all_devices(&self, url: &str) -> Result<Vec<MakeModel>>;

    /// Fetch the OS name and version of all devices from [`Route::AllOsVersions`].
    fn all_os_versions(&self, url: &str) -> Result<Vec<DeviceOsVersion>>;
}

impl<F> Fetcher for Arc<F>
where
    F: Fetcher + ?Sized,
{
    fn info(&self, url: &str) -> Result<ServerInfo> {
        self.as_ref().info(url)
    }

    fn lookup(&self, url: &str, request: &LookupRequest) -> Result<DeviceData> {
        self.as_ref().lookup(url, request)
    }

    fn all_devices(&self, url: &str) -> Result<Vec<MakeModel>> {
        self.as_ref().all_devices(url)
    }

    fn all_os_versions(&self, url: &str) -> Result<Vec<DeviceOsVersion>> {
        self.as_ref().all_os_versions(url)
    }
}
