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

//! Payloads exchanged with the WM server.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use wmclient_common::error::{Error, ErrorKind, Result};

/// Information about the running WM server and the WURFL data it serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    /// Version of the WURFL API used by the server.
    pub wurfl_api_version: String,
    /// Version of the server.
    pub wm_version: String,
    /// Information about the loaded WURFL file.
    pub wurfl_info: String,
    /// Header names that are significant for request based lookups, in server order.
    pub important_headers: Vec<String>,
    /// Static capabilities the server can return.
    pub static_caps: Option<Vec<String>>,
    /// Virtual capabilities the server can return.
    pub virtual_caps: Option<Vec<String>>,
    /// Freshness token: load time of the WURFL data on the server.
    pub ltime: Option<String>,
}

impl ServerInfo {
    /// Check that the server answered with usable data.
    pub fn validate(&self) -> Result<()> {
        if self.wm_version.is_empty()
            || self.wurfl_api_version.is_empty()
            || self.wurfl_info.is_empty()
            || (self.static_caps.is_none() && self.virtual_caps.is_none())
        {
            return Err(Error::new(
                ErrorKind::RemoteData,
                "Server returned empty data or a wrong json format",
            ));
        }
        Ok(())
    }
}

/// Body of a lookup request sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// Headers used for detection.
    #[serde(default)]
    pub lookup_headers: BTreeMap<String, String>,
    /// Requested static capabilities. `None` requests all of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_caps: Option<Vec<String>>,
    /// Requested virtual capabilities. `None` requests all of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_vcaps: Option<Vec<String>>,
    /// WURFL id, for device id lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wurfl_id: Option<String>,
}

/// Device data detected by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceData {
    /// Capability values of the detected device, restricted to the requested capabilities.
    pub capabilities: HashMap<String, String>,
    /// Error marker, empty when detection succeeded.
    pub error: String,
    /// Server side timestamp of the detection.
    pub mtime: i64,
    /// Freshness token: load time of the WURFL data the result was computed from.
    pub ltime: Option<String>,
    /// Server API version.
    #[serde(rename = "apiVersion")]
    pub api_version: String,
}

impl DeviceData {
    /// Value of the capability `name`.
    ///
    /// Fails with [`ErrorKind::MissingCapability`] if the capability is not part of the payload, e.g. because it was
    /// filtered out by the requested capability lists.
    pub fn capability(&self, name: &str) -> Result<&str> {
        self.capabilities
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::missing_capability(name))
    }

    /// Returns `true` if the capability `name` is part of the payload.
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// The embedded error marker, if any.
    pub fn embedded_error(&self) -> Option<&str> {
        (!self.error.is_empty()).then_some(self.error.as_str())
    }

    /// The freshness token of the payload, if any.
    pub fn freshness_token(&self) -> Option<&str> {
        self.ltime.as_deref()
    }
}

/// Brand, model and marketing name of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MakeModel {
    /// Brand name.
    pub brand_name: String,
    /// Model name.
    pub model_name: String,
    /// Marketing name, may be empty.
    pub marketing_name: String,
}

/// Model and marketing name of a device of a given make.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMarketingName {
    /// Model name.
    pub model_name: String,
    /// Marketing name, may be empty.
    pub marketing_name: String,
}

/// A device OS name and one of its versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceOsVersion {
    /// OS name.
    pub device_os: String,
    /// OS version, may be empty.
    pub device_os_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info_validate() {
        let mut info = ServerInfo {
            wurfl_api_version: "1.12.3.0".to_string(),
            wm_version: "2.1.0".to_string(),
            wurfl_info: "/usr/share/wurfl/wurfl.zip:for WURFL API 1.12.3".to_string(),
            important_headers: vec!["User-Agent".to_string()],
            static_caps: Some(vec!["brand_name".to_string()]),
            virtual_caps: None,
            ltime: Some("2026-10-01 08:00:00".to_string()),
        };
        assert!(info.validate().is_ok());

        info.static_caps = None;
        assert_eq!(info.validate().unwrap_err().kind(), ErrorKind::RemoteData);

        info.virtual_caps = Some(vec![]);
        assert!(info.validate().is_ok());

        info.wm_version.clear();
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_device_data_capability() {
        let device = DeviceData {
            capabilities: [("brand_name", "Nintendo"), ("model_name", "Switch")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };

        assert_eq!(device.capability("brand_name").unwrap(), "Nintendo");
        assert!(device.has_capability("model_name"));
        assert_eq!(
            device.capability("is_smarttv").unwrap_err().kind(),
            ErrorKind::MissingCapability
        );
        assert!(device.embedded_error().is_none());
        assert!(device.freshness_token().is_none());
    }

    #[test]
    fn test_device_data_json() {
        let json = r#"{
            "capabilities": { "wurfl_id": "generic", "is_mobile": "false" },
            "error": "",
            "mtime": 1759305600,
            "ltime": "2026-10-01 08:00:00",
            "apiVersion": "WURFL API: 1.12.3.0, wurfl.xml: for WURFL API 1.12.3"
        }"#;
        let device: DeviceData = serde_json::from_str(json).unwrap();
        assert_eq!(device.capability("wurfl_id").unwrap(), "generic");
        assert_eq!(device.freshness_token(), Some("2026-10-01 08:00:00"));
        assert!(device.api_version.starts_with("WURFL API"));

        let device: DeviceData = serde_json::from_str(r#"{ "error": "device is missing" }"#).unwrap();
        assert_eq!(device.embedded_error(), Some("device is missing"));
    }

    #[test]
    fn test_lookup_request_json() {
        let request = LookupRequest {
            wurfl_id: Some("nokia_generic_series40".to_string()),
            requested_caps: Some(vec![]),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lookup_headers": {},
                "requested_caps": [],
                "wurfl_id": "nokia_generic_series40",
            })
        );
    }
}
