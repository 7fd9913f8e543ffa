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

use std::{fmt::Debug, sync::Arc};

use parking_lot::RwLock;
use wmclient_common::{
    error::{Error, ErrorKind, Result},
    strict_assert,
};
use wmclient_memory::LruCache;

use crate::{
    capability::{CapabilityCatalog, RequestedCapabilities},
    endpoint::Endpoint,
    fetcher::{Fetcher, Route},
    key::{HeaderKeyBuilder, Headers},
    model::{DeviceData, LookupRequest, ModelMarketingName, ServerInfo},
    tables::{DerivedTable, MakeTable, OsTable},
};

/// Capacity of the device id cache whenever caching is enabled.
pub const DEVICE_ID_CACHE_CAPACITY: usize = 20_000;

const USER_AGENT: &str = "User-Agent";

type DeviceCache = LruCache<String, Arc<DeviceData>>;

struct Caches {
    device_id: DeviceCache,
    headers: DeviceCache,
}

impl Caches {
    fn new(capacity: usize) -> Self {
        Self {
            device_id: LruCache::new(DEVICE_ID_CACHE_CAPACITY),
            headers: LruCache::new(capacity),
        }
    }

    fn clear(&self) {
        self.device_id.clear();
        self.headers.clear();
    }
}

#[derive(Debug, Clone, Copy)]
enum CacheTarget {
    DeviceId,
    Headers,
}

/// Mutable client state.
///
/// Every change that makes cached data unusable happens under the write lock and bumps `epoch`. A lookup records the
/// epoch before going remote and only publishes its result while the epoch is unchanged, so a result fetched before an
/// invalidation never lands in the caches after it.
struct State {
    token: Option<String>,
    epoch: u64,
    requested: RequestedCapabilities,
    caches: Option<Caches>,
    closed: bool,
}

impl State {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::closed());
        }
        Ok(())
    }

    fn cache(&self, target: CacheTarget) -> Option<&DeviceCache> {
        self.caches.as_ref().map(|caches| match target {
            CacheTarget::DeviceId => &caches.device_id,
            CacheTarget::Headers => &caches.headers,
        })
    }

    /// A token that is present and differs from the recorded one means the server data changed.
    fn is_stale(&self, token: Option<&str>) -> bool {
        token.is_some_and(|token| self.token.as_deref() != Some(token))
    }
}

struct WmClientInner<F> {
    endpoint: Endpoint,
    fetcher: F,
    info: ServerInfo,
    catalog: CapabilityCatalog,
    key_builder: HeaderKeyBuilder,
    state: RwLock<State>,
    makes: DerivedTable<MakeTable>,
    oses: DerivedTable<OsTable>,
}

impl<F> WmClientInner<F> {
    /// Adopt `token` if it signals new server data, then run `publish` unless the state was invalidated after `epoch`
    /// was observed.
    fn commit(&self, token: Option<&str>, epoch: u64, publish: impl FnOnce(&State)) -> Result<()> {
        {
            let state = self.state.read();
            state.ensure_open()?;
            if !state.is_stale(token) {
                if state.epoch == epoch {
                    publish(&*state);
                }
                return Ok(());
            }
        }

        let mut state = self.state.write();
        state.ensure_open()?;
        let admissible = state.epoch == epoch;
        if state.is_stale(token) {
            self.invalidate(&mut *state, token);
        }
        if admissible {
            publish(&*state);
        }
        Ok(())
    }

    fn invalidate(&self, state: &mut State, token: Option<&str>) {
        if let Some(caches) = &state.caches {
            caches.clear();
        }
        self.discard_tables();
        state.epoch += 1;
        let previous = std::mem::replace(&mut state.token, token.map(str::to_string));
        tracing::info!(
            "[wmclient]: WURFL data changed on server, caches cleared, ltime: {previous:?} -> {:?}",
            state.token
        );
    }

    fn discard_tables(&self) {
        self.makes.discard();
        self.oses.discard();
    }
}

/// Client of a WURFL Microservice server.
///
/// The client answers device detection lookups, keeping recent answers in two LRU caches (by device id and by
/// request headers), and serves the make/model and OS/version tables of the whole device catalog.
///
/// Every answer carries the freshness token of the server data. When a new token is observed the client drops all of
/// its cached state at once before publishing anything fetched under the new token.
///
/// The client is cheap to clone; clones share caches and state.
pub struct WmClient<F>
where
    F: Fetcher,
{
    inner: Arc<WmClientInner<F>>,
}

impl<F> Debug for WmClient<F>
where
    F: Fetcher,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (epoch, closed) = {
            let state = self.inner.state.read();
            (state.epoch, state.closed)
        };
        f.debug_struct("WmClient")
            .field("endpoint", &self.inner.endpoint)
            .field("epoch", &epoch)
            .field("closed", &closed)
            .finish()
    }
}

impl<F> Clone for WmClient<F>
where
    F: Fetcher,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F> WmClient<F>
where
    F: Fetcher,
{
    pub(crate) fn open(endpoint: Endpoint, fetcher: F, cache_capacity: Option<usize>) -> Result<Self> {
        endpoint.validate()?;

        let url = endpoint.url(Route::Info);
        let info = fetcher.info(&url).map_err(|e| {
            Error::new(ErrorKind::Config, "Error creating WM client")
                .with_context("url", &url)
                .with_source(e)
        })?;
        info.validate().map_err(|e| e.with_context("url", &url))?;

        let catalog = CapabilityCatalog::from_info(&info);
        let key_builder = HeaderKeyBuilder::new(info.important_headers.clone());
        let state = State {
            token: info.ltime.clone(),
            epoch: 0,
            requested: RequestedCapabilities::default(),
            caches: cache_capacity.map(Caches::new),
            closed: false,
        };

        tracing::info!(
            "[wmclient]: connected to WM server {} ({}), {} static and {} virtual capabilities",
            info.wm_version,
            url,
            catalog.static_caps().len(),
            catalog.virtual_caps().len(),
        );

        Ok(Self {
            inner: Arc::new(WmClientInner {
                endpoint,
                fetcher,
                info,
                catalog,
                key_builder,
                state: RwLock::new(state),
                makes: DerivedTable::default(),
                oses: DerivedTable::default(),
            }),
        })
    }

    /// Version of this client library.
    pub fn api_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Endpoint of the WM server.
    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    /// Fetch the server information again.
    ///
    /// A changed freshness token invalidates the cached state, exactly as for lookups.
    pub fn info(&self) -> Result<ServerInfo> {
        let inner = &self.inner;
        let epoch = {
            let state = inner.state.read();
            state.ensure_open()?;
            state.epoch
        };

        let url = inner.endpoint.url(Route::Info);
        let info = inner.fetcher.info(&url).map_err(|e| e.with_context("url", &url))?;
        info.validate()?;
        inner.commit(info.ltime.as_deref(), epoch, |_| {})?;
        Ok(info)
    }

    /// Server information received when the client was built.
    pub fn server_info(&self) -> &ServerInfo {
        &self.inner.info
    }

    /// Headers the server uses for detection, in server order.
    pub fn important_headers(&self) -> &[String] {
        self.inner.key_builder.significant()
    }

    /// All static capabilities exposed by the server, sorted.
    pub fn static_capabilities(&self) -> &[String] {
        self.inner.catalog.static_caps()
    }

    /// All virtual capabilities exposed by the server, sorted.
    pub fn virtual_capabilities(&self) -> &[String] {
        self.inner.catalog.virtual_caps()
    }

    /// Whether the server exposes the static capability `name`.
    pub fn has_static_capability(&self, name: &str) -> bool {
        self.inner.catalog.has_static(name)
    }

    /// Whether the server exposes the virtual capability `name`.
    pub fn has_virtual_capability(&self, name: &str) -> bool {
        self.inner.catalog.has_virtual(name)
    }

    /// Restrict lookups to the given capabilities, static or virtual.
    ///
    /// `None` requests everything again. Names unknown to the server are ignored. Cached devices are dropped.
    pub fn set_requested_capabilities(&self, names: Option<&[&str]>) -> Result<()> {
        self.update_requested(|requested, catalog| requested.set_all(catalog, names))
    }

    /// Restrict lookups to the given static capabilities. See [`WmClient::set_requested_capabilities`].
    pub fn set_requested_static_capabilities(&self, names: Option<&[&str]>) -> Result<()> {
        self.update_requested(|requested, catalog| requested.set_static(catalog, names))
    }

    /// Restrict lookups to the given virtual capabilities. See [`WmClient::set_requested_capabilities`].
    pub fn set_requested_virtual_capabilities(&self, names: Option<&[&str]>) -> Result<()> {
        self.update_requested(|requested, catalog| requested.set_virtual(catalog, names))
    }

    /// Capabilities currently requested.
    pub fn requested_capabilities(&self) -> RequestedCapabilities {
        self.inner.state.read().requested.clone()
    }

    fn update_requested(&self, update: impl FnOnce(&mut RequestedCapabilities, &CapabilityCatalog)) -> Result<()> {
        let mut state = self.inner.state.write();
        state.ensure_open()?;
        update(&mut state.requested, &self.inner.catalog);
        if let Some(caches) = &state.caches {
            caches.clear();
        }
        state.epoch += 1;
        tracing::debug!(
            "[wmclient]: requested capabilities changed, caches cleared, static: {:?}, virtual: {:?}",
            state.requested.static_caps(),
            state.requested.virtual_caps()
        );
        Ok(())
    }

    /// Enable caching with a header cache of `capacity` entries, or disable it with `None`.
    ///
    /// A capacity of `0` selects [`wmclient_memory::DEFAULT_CAPACITY`]. The device id cache always holds
    /// [`DEVICE_ID_CACHE_CAPACITY`] entries. Cached devices are dropped.
    pub fn configure_cache(&self, capacity: Option<usize>) -> Result<()> {
        let mut state = self.inner.state.write();
        state.ensure_open()?;
        state.caches = capacity.map(Caches::new);
        tracing::debug!("[wmclient]: cache configured, header cache capacity: {capacity:?}");
        Ok(())
    }

    /// Entry counts of the device id cache and the header cache.
    ///
    /// Both are `0` when caching is disabled or the client is shut down.
    pub fn cache_sizes(&self) -> (usize, usize) {
        let state = self.inner.state.read();
        state
            .caches
            .as_ref()
            .map(|caches| (caches.device_id.len(), caches.headers.len()))
            .unwrap_or_default()
    }

    /// Shut the client down, releasing all cached state.
    ///
    /// Every following operation fails with [`ErrorKind::Closed`]. Calling it again has no effect.
    pub fn shutdown(&self) {
        let mut state = self.inner.state.write();
        if state.closed {
            return;
        }
        state.closed = true;
        state.caches = None;
        state.epoch += 1;
        self.inner.discard_tables();
        tracing::info!("[wmclient]: client shut down");
    }

    /// Detect the device of a user agent.
    pub fn lookup_user_agent(&self, user_agent: &str) -> Result<Arc<DeviceData>> {
        let mut request = LookupRequest::default();
        request
            .lookup_headers
            .insert(USER_AGENT.to_string(), user_agent.to_string());
        let key = self.inner.key_builder.user_agent_key(user_agent);
        self.lookup(CacheTarget::Headers, key, Route::LookupUserAgent, request)
    }

    /// Fetch the device with WURFL id `wurfl_id`.
    pub fn lookup_device_id(&self, wurfl_id: &str) -> Result<Arc<DeviceData>> {
        let request = LookupRequest {
            wurfl_id: Some(wurfl_id.to_string()),
            ..Default::default()
        };
        self.lookup(CacheTarget::DeviceId, wurfl_id.to_string(), Route::LookupDeviceId, request)
    }

    /// Detect the device of an HTTP request from its headers.
    ///
    /// Only the important headers are sent to the server. Fails with [`ErrorKind::MissingHeaders`] on `None`.
    pub fn lookup_headers(&self, headers: Option<&Headers>) -> Result<Arc<DeviceData>> {
        self.inner.state.read().ensure_open()?;
        let key = self.inner.key_builder.build(headers)?;

        let mut request = LookupRequest::default();
        if let Some(headers) = headers {
            for name in self.inner.key_builder.significant() {
                if let Some(value) = headers.get(name).filter(|value| !value.is_empty()) {
                    request.lookup_headers.insert(name.clone(), value.to_string());
                }
            }
        }
        self.lookup(CacheTarget::Headers, key, Route::LookupRequest, request)
    }

    fn lookup(
        &self,
        target: CacheTarget,
        key: String,
        route: Route,
        mut request: LookupRequest,
    ) -> Result<Arc<DeviceData>> {
        let inner = &self.inner;

        let epoch = {
            let state = inner.state.read();
            state.ensure_open()?;
            if let Some(cache) = state.cache(target) {
                if let Some(device) = cache.get(&key) {
                    tracing::trace!("[wmclient]: {target:?} cache hit");
                    return Ok(device);
                }
                tracing::trace!("[wmclient]: {target:?} cache miss");
            }
            state.requested.apply(&mut request);
            state.epoch
        };

        let url = inner.endpoint.url(route);
        let device = inner
            .fetcher
            .lookup(&url, &request)
            .map_err(|e| e.with_context("url", &url))?;
        if let Some(marker) = device.embedded_error() {
            tracing::warn!("[wmclient]: WM server returned an error, url: {url}, error: {marker}");
            return Err(Error::remote(marker).with_context("url", url));
        }

        let device = Arc::new(device);
        inner.commit(device.freshness_token(), epoch, |state| {
            if let Some(cache) = state.cache(target) {
                cache.put(key, device.clone());
            }
        })?;
        Ok(device)
    }

    /// Brands of all devices, in server order.
    pub fn all_device_makes(&self) -> Result<Vec<String>> {
        Ok(self.make_table()?.makes().to_vec())
    }

    /// Models and marketing names of all devices of `make`.
    pub fn all_devices_for_make(&self, make: &str) -> Result<Vec<ModelMarketingName>> {
        self.make_table()?.models(make).map(<[_]>::to_vec).ok_or_else(|| {
            Error::new(ErrorKind::NotFound, format!("{make} does not exist")).with_context("make", make)
        })
    }

    /// Names of all device operating systems, in server order.
    pub fn all_oses(&self) -> Result<Vec<String>> {
        Ok(self.os_table()?.oses().to_vec())
    }

    /// Known versions of operating system `os`.
    pub fn all_versions_for_os(&self, os: &str) -> Result<Vec<String>> {
        self.os_table()?.versions(os).map(<[_]>::to_vec).ok_or_else(|| {
            Error::new(ErrorKind::NotFound, format!("{os} does not exist")).with_context("os", os)
        })
    }

    fn make_table(&self) -> Result<Arc<MakeTable>> {
        self.derived(&self.inner.makes, Route::AllDevices, |fetcher, url| {
            fetcher.all_devices(url).map(MakeTable::build)
        })
    }

    fn os_table(&self) -> Result<Arc<OsTable>> {
        self.derived(&self.inner.oses, Route::AllOsVersions, |fetcher, url| {
            fetcher.all_os_versions(url).map(OsTable::build)
        })
    }

    fn derived<T>(
        &self,
        table: &DerivedTable<T>,
        route: Route,
        load: impl FnOnce(&F, &str) -> Result<T>,
    ) -> Result<Arc<T>> {
        let inner = &self.inner;

        {
            let state = inner.state.read();
            state.ensure_open()?;
            if let Some(current) = table.current() {
                return Ok(current);
            }
        }

        let _loader = table.loader();
        let epoch = {
            let state = inner.state.read();
            state.ensure_open()?;
            // Loaded by the previous holder of the loader lock.
            if let Some(current) = table.current() {
                return Ok(current);
            }
            state.epoch
        };

        let url = inner.endpoint.url(route);
        let loaded = Arc::new(load(&inner.fetcher, &url).map_err(|e| e.with_context("url", &url))?);
        tracing::debug!("[wmclient]: table loaded, url: {url}");

        let state = inner.state.read();
        state.ensure_open()?;
        if state.epoch == epoch {
            strict_assert!(table.current().is_none());
            table.store(loaded.clone());
        }
        Ok(loaded)
    }
}
