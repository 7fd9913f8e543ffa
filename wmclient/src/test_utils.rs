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

//! Utilities for testing code that uses the client without a WM server.

use std::{
    io,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use hashbrown::HashMap;
use parking_lot::Mutex;
use wmclient_common::error::{Error, Result};

use crate::{
    fetcher::{Fetcher, Route},
    model::{DeviceData, DeviceOsVersion, LookupRequest, MakeModel, ServerInfo},
};

const ROUTES: [Route; 6] = [
    Route::Info,
    Route::LookupUserAgent,
    Route::LookupDeviceId,
    Route::LookupRequest,
    Route::AllDevices,
    Route::AllOsVersions,
];

/// User agent of the Nintendo Switch sample device.
pub const SWITCH_UA: &str = "Mozilla/5.0 (Nintendo Switch; WebApplet) AppleWebKit/601.6 (KHTML, like Gecko) NF/4.0.0.5.9 NintendoBrowser/5.1.0.13341";
/// User agent of the Samsung Galaxy S8 sample device.
pub const GALAXY_UA: &str = "Mozilla/5.0 (Linux; Android 7.0; SAMSUNG SM-G950F Build/NRD90M) AppleWebKit/537.36 (KHTML, like Gecko) SamsungBrowser/5.2 Chrome/51.0.2704.106 Mobile Safari/537.36";

const STATIC_CAPS: [&str; 5] = ["brand_name", "model_name", "marketing_name", "is_smarttv", "resolution_width"];
const VIRTUAL_CAPS: [&str; 4] = ["form_factor", "complete_device_name", "is_mobile", "is_app"];

struct SampleDevice {
    wurfl_id: &'static str,
    user_agent: Option<&'static str>,
    capabilities: [&'static str; 9],
}

const SAMPLE_DEVICES: [SampleDevice; 3] = [
    SampleDevice {
        wurfl_id: "generic",
        user_agent: None,
        capabilities: ["", "", "", "false", "90", "Feature Phone", "", "false", "false"],
    },
    SampleDevice {
        wurfl_id: "nintendo_switch_ver1",
        user_agent: Some(SWITCH_UA),
        capabilities: [
            "Nintendo",
            "Switch",
            "",
            "false",
            "1280",
            "Smart-TV",
            "Nintendo Switch",
            "true",
            "false",
        ],
    },
    SampleDevice {
        wurfl_id: "samsung_sm_g950f_ver1",
        user_agent: Some(GALAXY_UA),
        capabilities: [
            "Samsung",
            "SM-G950F",
            "Galaxy S8",
            "false",
            "1080",
            "Smartphone",
            "Samsung Galaxy S8",
            "true",
            "false",
        ],
    },
];

/// An in-process [`Fetcher`] serving a small sample of WURFL data.
///
/// It behaves like a WM server: unknown device ids yield a payload with an error marker, unknown user agents are
/// detected as `generic`, and payloads are restricted to the requested capabilities. The freshness token, transport
/// failures and latency can be changed at any time. Calls are counted per route.
pub struct MockFetcher {
    info: Mutex<ServerInfo>,
    devices: Mutex<HashMap<String, HashMap<String, String>>>,
    user_agents: Mutex<HashMap<String, String>>,
    makes: Mutex<Vec<MakeModel>>,
    oses: Mutex<Vec<DeviceOsVersion>>,
    ltime: Mutex<Option<String>>,
    failing: AtomicBool,
    embedded_error: Mutex<Option<String>>,
    delay: Mutex<Duration>,
    calls: Mutex<HashMap<Route, usize>>,
    last_request: Mutex<Option<LookupRequest>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a fetcher serving the sample data with freshness token `2026-10-01 08:00:00`.
    pub fn new() -> Self {
        let ltime = "2026-10-01 08:00:00".to_string();
        let info = ServerInfo {
            wurfl_api_version: "1.12.3.0".to_string(),
            wm_version: "2.1.0".to_string(),
            wurfl_info: "/usr/share/wurfl/wurfl.zip:for WURFL API 1.12.3".to_string(),
            important_headers: ["User-Agent", "X-UCBrowser-Device-UA", "Device-Stock-UA", "X-OperaMini-Phone-UA"]
                .map(String::from)
                .to_vec(),
            static_caps: Some(STATIC_CAPS.map(String::from).to_vec()),
            virtual_caps: Some(VIRTUAL_CAPS.map(String::from).to_vec()),
            ltime: Some(ltime.clone()),
        };

        let mut devices = HashMap::new();
        let mut user_agents = HashMap::new();
        for device in SAMPLE_DEVICES.iter() {
            let capabilities = STATIC_CAPS
                .iter()
                .chain(VIRTUAL_CAPS.iter())
                .zip(device.capabilities.iter())
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            devices.insert(device.wurfl_id.to_string(), capabilities);
            if let Some(ua) = device.user_agent {
                user_agents.insert(ua.to_string(), device.wurfl_id.to_string());
            }
        }

        let makes = [
            ("Nintendo", "Switch", ""),
            ("Samsung", "SM-G950F", "Galaxy S8"),
            ("Apple", "iPhone", "iPhone"),
            ("Samsung", "SM-S928B", "Galaxy S24 Ultra"),
        ]
        .map(|(brand, model, marketing)| MakeModel {
            brand_name: brand.to_string(),
            model_name: model.to_string(),
            marketing_name: marketing.to_string(),
        })
        .to_vec();

        let oses = [
            ("Android", "7.0"),
            ("Android", ""),
            ("iOS", "17.4"),
            ("Android", "14"),
            ("Nintendo Switch OS", ""),
        ]
        .map(|(os, version)| DeviceOsVersion {
            device_os: os.to_string(),
            device_os_version: version.to_string(),
        })
        .to_vec();

        Self {
            info: Mutex::new(info),
            devices: Mutex::new(devices),
            user_agents: Mutex::new(user_agents),
            makes: Mutex::new(makes),
            oses: Mutex::new(oses),
            ltime: Mutex::new(Some(ltime)),
            failing: AtomicBool::new(false),
            embedded_error: Mutex::new(None),
            delay: Mutex::new(Duration::ZERO),
            calls: Mutex::new(HashMap::new()),
            last_request: Mutex::new(None),
        }
    }

    /// Replace the server information answered on [`Route::Info`].
    pub fn set_info(&self, info: ServerInfo) {
        *self.info.lock() = info;
    }

    /// Change the freshness token carried by every following response.
    pub fn set_ltime(&self, ltime: Option<&str>) {
        *self.ltime.lock() = ltime.map(str::to_string);
    }

    /// Make every following call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Answer every following lookup with `marker` as embedded error, or detect devices again with `None`.
    pub fn set_embedded_error(&self, marker: Option<&str>) {
        *self.embedded_error.lock() = marker.map(str::to_string);
    }

    /// Delay every following call.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Number of calls served on `route`.
    pub fn calls(&self, route: Route) -> usize {
        self.calls.lock().get(&route).copied().unwrap_or_default()
    }

    /// The last lookup request received.
    pub fn last_request(&self) -> Option<LookupRequest> {
        self.last_request.lock().clone()
    }

    fn serve(&self, url: &str) -> Result<Route> {
        let route = ROUTES
            .into_iter()
            .find(|route| url.ends_with(route.path()))
            .ok_or_else(|| Error::transport(io::Error::other(format!("404 Not Found: {url}"))))?;

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        if self.failing.load(Ordering::Acquire) {
            return Err(Error::transport(io::Error::other("connection refused")));
        }

        *self.calls.lock().entry(route).or_default() += 1;
        Ok(route)
    }

    fn detect(&self, route: Route, request: &LookupRequest) -> Option<String> {
        match route {
            Route::LookupDeviceId => request.wurfl_id.clone().filter(|id| !id.is_empty()),
            _ => {
                let ua = request.lookup_headers.get("User-Agent").map(String::as_str).unwrap_or("");
                Some(
                    self.user_agents
                        .lock()
                        .get(ua)
                        .cloned()
                        .unwrap_or_else(|| "generic".to_string()),
                )
            }
        }
    }
}

impl Fetcher for MockFetcher {
    fn info(&self, url: &str) -> Result<ServerInfo> {
        self.serve(url)?;
        let mut info = self.info.lock().clone();
        info.ltime = self.ltime.lock().clone();
        Ok(info)
    }

    fn lookup(&self, url: &str, request: &LookupRequest) -> Result<DeviceData> {
        let route = self.serve(url)?;
        *self.last_request.lock() = Some(request.clone());

        let ltime = self.ltime.lock().clone();
        if let Some(marker) = self.embedded_error.lock().clone() {
            return Ok(DeviceData {
                error: marker,
                ltime,
                ..Default::default()
            });
        }
        let devices = self.devices.lock();
        let Some((wurfl_id, all)) = self
            .detect(route, request)
            .and_then(|id| devices.get(&id).map(|caps| (id, caps)))
        else {
            return Ok(DeviceData {
                error: "device is missing".to_string(),
                ltime,
                ..Default::default()
            });
        };

        let wanted = |name: &str| {
            let list = if STATIC_CAPS.contains(&name) {
                &request.requested_caps
            } else {
                &request.requested_vcaps
            };
            list.as_ref().is_none_or(|list| list.iter().any(|c| c == name))
        };
        let mut capabilities: HashMap<String, String> = all
            .iter()
            .filter(|(name, _)| wanted(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        capabilities.insert("wurfl_id".to_string(), wurfl_id);

        Ok(DeviceData {
            capabilities,
            error: String::new(),
            mtime: 1_759_305_600,
            ltime,
            api_version: "WURFL API: 1.12.3.0".to_string(),
        })
    }

    fn all_devices(&self, url: &str) -> Result<Vec<MakeModel>> {
        self.serve(url)?;
        Ok(self.makes.lock().clone())
    }

    fn all_os_versions(&self, url: &str) -> Result<Vec<DeviceOsVersion>> {
        self.serve(url)?;
        Ok(self.oses.lock().clone())
    }
}
