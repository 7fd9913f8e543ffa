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

//! Tables derived from the bulk device listings of the server.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use hashbrown::HashMap;
use itertools::Itertools;
use parking_lot::{Mutex, MutexGuard};

use crate::model::{DeviceOsVersion, MakeModel, ModelMarketingName};

/// Device makes and the models of every make.
#[derive(Debug, Default)]
pub struct MakeTable {
    makes: Vec<String>,
    models: HashMap<String, Vec<ModelMarketingName>>,
}

impl MakeTable {
    /// Build the table from the bulk make/model list. Makes keep their first-seen order.
    pub fn build(records: Vec<MakeModel>) -> Self {
        let makes = records.iter().map(|r| r.brand_name.clone()).unique().collect_vec();
        let mut models: HashMap<String, Vec<ModelMarketingName>> = HashMap::with_capacity(makes.len());
        for record in records {
            models.entry(record.brand_name).or_default().push(ModelMarketingName {
                model_name: record.model_name,
                marketing_name: record.marketing_name,
            });
        }
        Self { makes, models }
    }

    /// All device makes.
    pub fn makes(&self) -> &[String] {
        &self.makes
    }

    /// Models of `make`, `None` if the make is unknown.
    pub fn models(&self, make: &str) -> Option<&[ModelMarketingName]> {
        self.models.get(make).map(Vec::as_slice)
    }
}

/// Device OS names and the versions of every OS.
#[derive(Debug, Default)]
pub struct OsTable {
    oses: Vec<String>,
    versions: HashMap<String, Vec<String>>,
}

impl OsTable {
    /// Build the table from the bulk OS/version list. OSes keep their first-seen order, empty versions are dropped.
    pub fn build(records: Vec<DeviceOsVersion>) -> Self {
        let oses = records.iter().map(|r| r.device_os.clone()).unique().collect_vec();
        let mut versions: HashMap<String, Vec<String>> = HashMap::with_capacity(oses.len());
        for record in records {
            let entry = versions.entry(record.device_os).or_default();
            if !record.device_os_version.is_empty() {
                entry.push(record.device_os_version);
            }
        }
        Self { oses, versions }
    }

    /// All device OS names.
    pub fn oses(&self) -> &[String] {
        &self.oses
    }

    /// Versions of `os`, `None` if the OS is unknown.
    pub fn versions(&self, os: &str) -> Option<&[String]> {
        self.versions.get(os).map(Vec::as_slice)
    }
}

/// A bulk-loaded table, rebuilt wholesale after being discarded.
///
/// Readers see either no table or a complete one. Loads are serialized through [`DerivedTable::loader`].
pub(crate) struct DerivedTable<T> {
    table: ArcSwapOption<T>,
    loader: Mutex<()>,
}

impl<T> Default for DerivedTable<T> {
    fn default() -> Self {
        Self {
            table: ArcSwapOption::empty(),
            loader: Mutex::new(()),
        }
    }
}

impl<T> DerivedTable<T> {
    pub(crate) fn current(&self) -> Option<Arc<T>> {
        self.table.load_full()
    }

    /// Acquire the exclusive right to load the table.
    pub(crate) fn loader(&self) -> MutexGuard<'_, ()> {
        self.loader.lock()
    }

    pub(crate) fn store(&self, table: Arc<T>) {
        self.table.store(Some(table));
    }

    pub(crate) fn discard(&self) {
        self.table.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_model(brand: &str, model: &str, marketing: &str) -> MakeModel {
        MakeModel {
            brand_name: brand.to_string(),
            model_name: model.to_string(),
            marketing_name: marketing.to_string(),
        }
    }

    fn os_version(os: &str, version: &str) -> DeviceOsVersion {
        DeviceOsVersion {
            device_os: os.to_string(),
            device_os_version: version.to_string(),
        }
    }

    #[test]
    fn test_make_table() {
        let table = MakeTable::build(vec![
            make_model("Nokia", "N95", ""),
            make_model("Apple", "iPhone", "iPhone 15"),
            make_model("Nokia", "3310", "Nokia 3310"),
        ]);

        assert_eq!(table.makes(), ["Nokia", "Apple"]);
        let nokia = table.models("Nokia").unwrap();
        assert_eq!(nokia.len(), 2);
        assert_eq!(nokia[1].model_name, "3310");
        assert_eq!(nokia[1].marketing_name, "Nokia 3310");
        assert!(table.models("Motorola").is_none());
    }

    #[test]
    fn test_os_table_drops_empty_versions() {
        let table = OsTable::build(vec![
            os_version("Android", "14"),
            os_version("Android", ""),
            os_version("iOS", "17.4"),
            os_version("Symbian", ""),
            os_version("Android", "15"),
        ]);

        assert_eq!(table.oses(), ["Android", "iOS", "Symbian"]);
        assert_eq!(table.versions("Android").unwrap(), ["14", "15"]);
        assert!(table.versions("Symbian").unwrap().is_empty());
        assert!(table.versions("Tizen").is_none());
    }

    #[test]
    fn test_derived_table_store_discard() {
        let slot: DerivedTable<MakeTable> = DerivedTable::default();
        assert!(slot.current().is_none());

        {
            let _loader = slot.loader();
            slot.store(Arc::new(MakeTable::build(vec![make_model("Nokia", "N95", "")])));
        }
        assert_eq!(slot.current().unwrap().makes(), ["Nokia"]);

        slot.discard();
        assert!(slot.current().is_none());
    }
}
