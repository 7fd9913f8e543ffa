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

//! Server capability catalog and the capabilities requested by lookups.

use itertools::Itertools;

use crate::model::{LookupRequest, ServerInfo};

/// Kind of a capability name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// A static capability.
    Static,
    /// A virtual capability.
    Virtual,
    /// A name the server does not know.
    Unknown,
}

/// Classifies capability names.
pub trait CapabilityClassifier {
    /// Classify the capability `name`.
    fn classify(&self, name: &str) -> CapabilityKind;
}

/// The static and virtual capabilities a server can return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityCatalog {
    static_caps: Vec<String>,
    virtual_caps: Vec<String>,
}

impl CapabilityCatalog {
    /// Create a catalog from capability name lists.
    pub fn new(static_caps: impl IntoIterator<Item = String>, virtual_caps: impl IntoIterator<Item = String>) -> Self {
        Self {
            static_caps: static_caps.into_iter().sorted().dedup().collect(),
            virtual_caps: virtual_caps.into_iter().sorted().dedup().collect(),
        }
    }

    /// Create a catalog from the capability lists advertised by the server.
    pub fn from_info(info: &ServerInfo) -> Self {
        Self::new(
            info.static_caps.iter().flatten().cloned(),
            info.virtual_caps.iter().flatten().cloned(),
        )
    }

    /// Sorted static capability names.
    pub fn static_caps(&self) -> &[String] {
        &self.static_caps
    }

    /// Sorted virtual capability names.
    pub fn virtual_caps(&self) -> &[String] {
        &self.virtual_caps
    }

    /// Returns `true` if `name` is a static capability.
    pub fn has_static(&self, name: &str) -> bool {
        self.static_caps.binary_search_by(|c| c.as_str().cmp(name)).is_ok()
    }

    /// Returns `true` if `name` is a virtual capability.
    pub fn has_virtual(&self, name: &str) -> bool {
        self.virtual_caps.binary_search_by(|c| c.as_str().cmp(name)).is_ok()
    }
}

impl CapabilityClassifier for CapabilityCatalog {
    fn classify(&self, name: &str) -> CapabilityKind {
        if self.has_static(name) {
            CapabilityKind::Static
        } else if self.has_virtual(name) {
            CapabilityKind::Virtual
        } else {
            CapabilityKind::Unknown
        }
    }
}

/// The capabilities requested on every lookup.
///
/// `None` requests every capability of that kind, `Some` with an empty list requests none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedCapabilities {
    static_caps: Option<Vec<String>>,
    virtual_caps: Option<Vec<String>>,
}

impl RequestedCapabilities {
    /// Request both kinds from a single list. Unknown names are dropped silently; `None` unsets both lists.
    pub fn set_all(&mut self, classifier: &impl CapabilityClassifier, names: Option<&[&str]>) {
        let Some(names) = names else {
            self.static_caps = None;
            self.virtual_caps = None;
            return;
        };

        let mut static_caps = vec![];
        let mut virtual_caps = vec![];
        for &name in names {
            match classifier.classify(name) {
                CapabilityKind::Static => static_caps.push(name.to_string()),
                CapabilityKind::Virtual => virtual_caps.push(name.to_string()),
                CapabilityKind::Unknown => {}
            }
        }
        self.static_caps = Some(static_caps);
        self.virtual_caps = Some(virtual_caps);
    }

    /// Request static capabilities only. Names that are not static capabilities are dropped silently.
    pub fn set_static(&mut self, classifier: &impl CapabilityClassifier, names: Option<&[&str]>) {
        self.static_caps = Self::filter(classifier, names, CapabilityKind::Static);
    }

    /// Request virtual capabilities only. Names that are not virtual capabilities are dropped silently.
    pub fn set_virtual(&mut self, classifier: &impl CapabilityClassifier, names: Option<&[&str]>) {
        self.virtual_caps = Self::filter(classifier, names, CapabilityKind::Virtual);
    }

    /// Requested static capabilities.
    pub fn static_caps(&self) -> Option<&[String]> {
        self.static_caps.as_deref()
    }

    /// Requested virtual capabilities.
    pub fn virtual_caps(&self) -> Option<&[String]> {
        self.virtual_caps.as_deref()
    }

    /// Write the requested lists into a lookup request.
    pub fn apply(&self, request: &mut LookupRequest) {
        request.requested_caps = self.static_caps.clone();
        request.requested_vcaps = self.virtual_caps.clone();
    }

    fn filter(
        classifier: &impl CapabilityClassifier,
        names: Option<&[&str]>,
        kind: CapabilityKind,
    ) -> Option<Vec<String>> {
        names.map(|names| {
            names
                .iter()
                .filter(|name| classifier.classify(name) == kind)
                .map(|name| name.to_string())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CapabilityCatalog {
        CapabilityCatalog::new(
            ["model_name", "brand_name", "is_smarttv", "brand_name"].map(String::from),
            ["is_mobile", "form_factor", "complete_device_name"].map(String::from),
        )
    }

    #[test]
    fn test_catalog_sorted_and_classify() {
        let catalog = catalog();
        assert_eq!(catalog.static_caps(), ["brand_name", "is_smarttv", "model_name"]);
        assert_eq!(catalog.classify("brand_name"), CapabilityKind::Static);
        assert_eq!(catalog.classify("form_factor"), CapabilityKind::Virtual);
        assert_eq!(catalog.classify("nonexcap"), CapabilityKind::Unknown);
        assert!(catalog.has_virtual("is_mobile"));
        assert!(!catalog.has_static("is_mobile"));
    }

    #[test]
    fn test_from_info() {
        let info = ServerInfo {
            static_caps: Some(vec!["brand_name".to_string()]),
            ..Default::default()
        };
        let catalog = CapabilityCatalog::from_info(&info);
        assert_eq!(catalog.static_caps(), ["brand_name"]);
        assert!(catalog.virtual_caps().is_empty());
    }

    #[test]
    fn test_set_all_drops_unknown_names() {
        let catalog = catalog();
        let mut requested = RequestedCapabilities::default();
        requested.set_all(&catalog, Some(["brand_name", "is_mobile", "nonexcap", "model_name"].as_slice()));
        assert_eq!(
            requested.static_caps(),
            Some(["brand_name".to_string(), "model_name".to_string()].as_slice())
        );
        assert_eq!(requested.virtual_caps(), Some(["is_mobile".to_string()].as_slice()));

        requested.set_all(&catalog, None);
        assert_eq!(requested, RequestedCapabilities::default());
    }

    #[test]
    fn test_empty_filter_is_not_unset() {
        let catalog = catalog();
        let mut requested = RequestedCapabilities::default();

        // Every name is unknown: the filter becomes an explicit empty list.
        requested.set_static(&catalog, Some(["nonexcap"].as_slice()));
        assert_eq!(requested.static_caps(), Some(&[] as &[String]));
        assert_eq!(requested.virtual_caps(), None);

        let mut request = LookupRequest::default();
        requested.apply(&mut request);
        assert_eq!(request.requested_caps, Some(vec![]));
        assert_eq!(request.requested_vcaps, None);
    }

    #[test]
    fn test_set_one_side() {
        let catalog = catalog();
        let mut requested = RequestedCapabilities::default();
        requested.set_virtual(&catalog, Some(["brand_name", "form_factor"].as_slice()));
        assert_eq!(requested.virtual_caps(), Some(["form_factor".to_string()].as_slice()));
        requested.set_static(&catalog, Some(["brand_name", "form_factor"].as_slice()));
        assert_eq!(requested.static_caps(), Some(["brand_name".to_string()].as_slice()));

        requested.set_virtual(&catalog, None);
        assert_eq!(requested.virtual_caps(), None);
        assert!(requested.static_caps().is_some());
    }
}
