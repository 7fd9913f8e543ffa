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

use wmclient::{test_utils::MockFetcher, Endpoint, Route, WmClientBuilder};

const CONFIG: &str = r#"{
    "scheme": "https",
    "host": "wm.example.com",
    "port": "443",
    "base_uri": "wurfl"
}"#;

fn main() -> anyhow::Result<()> {
    let endpoint: Endpoint = serde_json::from_str(CONFIG)?;
    println!("info route: {}", endpoint.url(Route::Info));

    let client = WmClientBuilder::from(endpoint)
        .with_cache_capacity(0)
        .build(Arc::new(MockFetcher::new()))?;
    tracing::info!("client {} connected to {:?}", client.api_version(), client.endpoint());

    println!("{}", serde_json::to_string_pretty(client.endpoint())?);
    Ok(())
}
