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

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wmclient::{
    test_utils::{MockFetcher, GALAXY_UA, SWITCH_UA},
    Headers, Route, WmClientBuilder,
};

/// Runs against the in-process [`MockFetcher`]. Set `RUST_LOG=wmclient=trace` to see cache hits and misses.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let fetcher = Arc::new(MockFetcher::new());
    let client = WmClientBuilder::new("localhost", "8080")
        .with_cache_capacity(1000)
        .build(fetcher.clone())?;

    let info = client.info()?;
    println!(
        "WM server {} / {} / {}",
        info.wm_version, info.wurfl_api_version, info.wurfl_info
    );
    println!("static capabilities: {:?}", client.static_capabilities());
    println!("virtual capabilities: {:?}", client.virtual_capabilities());

    client.set_requested_capabilities(Some(["brand_name", "model_name", "form_factor", "is_mobile"].as_slice()))?;

    for ua in [SWITCH_UA, GALAXY_UA, SWITCH_UA] {
        let device = client.lookup_user_agent(ua)?;
        println!(
            "{} {} ({}), mobile: {}",
            device.capability("brand_name")?,
            device.capability("model_name")?,
            device.capability("form_factor")?,
            device.capability("is_mobile")?,
        );
    }

    let headers: Headers = [
        ("user-agent", GALAXY_UA),
        ("accept-language", "en-US"),
        ("device-stock-ua", GALAXY_UA),
    ]
    .into_iter()
    .collect();
    let device = client.lookup_headers(Some(&headers))?;
    println!("headers lookup: {}", device.capability("wurfl_id")?);

    match client.lookup_device_id("unknown_device_ver1") {
        Ok(_) => println!("unexpected device"),
        Err(e) => println!("lookup failed: {e}"),
    }

    for make in client.all_device_makes()? {
        let models = client.all_devices_for_make(&make)?;
        println!("{make}: {} models", models.len());
    }
    for os in client.all_oses()? {
        println!("{os}: {:?}", client.all_versions_for_os(&os)?);
    }

    // A new WURFL snapshot on the server drops everything cached so far.
    fetcher.set_ltime(Some("2026-10-16 00:00:00"));
    client.lookup_device_id("generic")?;
    client.lookup_user_agent(SWITCH_UA)?;

    let (ids, headers) = client.cache_sizes();
    println!("cached devices: {ids} by id, {headers} by headers");
    println!(
        "remote lookups: {}",
        fetcher.calls(Route::LookupUserAgent) + fetcher.calls(Route::LookupRequest) + fetcher.calls(Route::LookupDeviceId)
    );

    client.shutdown();
    Ok(())
}
