//! Per-page data store
//!
//! Holds the most recently committed data for each page path together with
//! its `loaded` flag and the single per-path in-flight guard. Both ways of
//! reaching a page (coordinator preload before navigation, self-trigger on a
//! direct mount) go through [`PageDataStore::begin_load`] before invoking a
//! preload operation, so an operation never runs twice at once for one path.

use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use super::error::{PreloadError, Result};
use super::resource::Resource;

/// Page payload, opaque to the preload core
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageData(Value);

impl PageData {
    pub fn new(value: Value) -> Self {
        PageData(value)
    }

    /// Payload for pages that have nothing to carry
    pub fn empty() -> Self {
        PageData(Value::Null)
    }

    pub fn encode<T: Serialize>(value: &T) -> Result<Self> {
        Ok(PageData(serde_json::to_value(value)?))
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.0)?)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

}

impl From<Value> for PageData {
    fn from(value: Value) -> Self {
        PageData(value)
    }
}

/// Snapshot of one page's store entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEntry {
    pub data: Option<PageData>,
    pub loaded: bool,
}

#[derive(Debug, Clone)]
enum LoadState {
    Pending,
    Done(std::result::Result<PageData, String>),
    Abandoned,
}

struct InFlight {
    load_id: u64,
    rx: watch::Receiver<LoadState>,
}

#[derive(Default)]
struct PageSlot {
    data: Option<PageData>,
    loaded: bool,
    last_error: Option<String>,
    in_flight: Option<InFlight>,
}

#[derive(Default)]
struct StoreInner {
    pages: HashMap<String, PageSlot>,
    next_load_id: u64,
}

/// Shared handle to the page data of one session
#[derive(Clone, Default)]
pub struct PageDataStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl PageDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section leaves the map consistent, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `data` for `path` and mark it loaded
    pub fn commit(&self, path: &str, data: PageData) {
        let mut inner = self.lock();
        let slot = inner.pages.entry(path.to_string()).or_default();
        let first_load = !slot.loaded;
        slot.data = Some(data);
        slot.loaded = true;
        slot.last_error = None;

        if first_load {
            info!("✓ Store - committed data for {}", path);
        } else {
            debug!("Store - replaced data for {}", path);
        }
    }

    pub fn entry(&self, path: &str) -> PageEntry {
        self.lock()
            .pages
            .get(path)
            .map(|slot| PageEntry {
                data: slot.data.clone(),
                loaded: slot.loaded,
            })
            .unwrap_or_default()
    }

    pub fn is_loaded(&self, path: &str) -> bool {
        self.lock().pages.get(path).is_some_and(|slot| slot.loaded)
    }

    pub fn data(&self, path: &str) -> Option<PageData> {
        self.lock().pages.get(path).and_then(|slot| slot.data.clone())
    }

    /// Typed read of the committed data
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.data(path).map(|data| data.decode()).transpose()
    }

    pub fn is_in_flight(&self, path: &str) -> bool {
        self.lock()
            .pages
            .get(path)
            .is_some_and(|slot| slot.in_flight.is_some())
    }

    /// Message of the last failed load, cleared by the next commit
    pub fn last_error(&self, path: &str) -> Option<String> {
        self.lock()
            .pages
            .get(path)
            .and_then(|slot| slot.last_error.clone())
    }

    /// What the page for `path` should render right now
    pub fn resource<T: DeserializeOwned>(&self, path: &str) -> Resource<T> {
        let inner = self.lock();
        let Some(slot) = inner.pages.get(path) else {
            return Resource::NotAsked;
        };

        if slot.loaded {
            return match slot.data.as_ref().map(|data| data.decode::<T>()) {
                Some(decoded) => Resource::from_result(decoded.map_err(|e| e.to_string())),
                None => Resource::Failure(format!("no data committed for {}", path)),
            };
        }
        if slot.in_flight.is_some() {
            return Resource::Loading;
        }
        match &slot.last_error {
            Some(message) => Resource::Failure(message.clone()),
            None => Resource::NotAsked,
        }
    }

    /// Claim the in-flight guard for `path`, or join the load already running
    pub fn begin_load(&self, path: &str) -> LoadTicket {
        let mut inner = self.lock();
        inner.next_load_id += 1;
        let load_id = inner.next_load_id;
        let slot = inner.pages.entry(path.to_string()).or_default();

        if let Some(in_flight) = &slot.in_flight {
            debug!("Store - joining in-flight load {} for {}", in_flight.load_id, path);
            return LoadTicket::Follow(LoadWaiter {
                path: path.to_string(),
                rx: in_flight.rx.clone(),
            });
        }

        let (tx, rx) = watch::channel(LoadState::Pending);
        slot.in_flight = Some(InFlight { load_id, rx });
        debug!("Store - load {} for {} is now in flight", load_id, path);

        LoadTicket::Lead(InFlightGuard {
            store: self.clone(),
            path: path.to_string(),
            load_id,
            tx,
            finished: false,
        })
    }

    /// Forget what was committed for `path`
    ///
    /// Not used by the preload core; hosts call it to force a fresh load.
    pub fn reset(&self, path: &str) {
        if let Some(slot) = self.lock().pages.get_mut(path) {
            slot.data = None;
            slot.loaded = false;
            slot.last_error = None;
            info!("Store - reset {}", path);
        }
    }

    pub(crate) fn record_failure(&self, path: &str, message: &str) {
        let mut inner = self.lock();
        let slot = inner.pages.entry(path.to_string()).or_default();
        slot.last_error = Some(message.to_string());
    }

    fn release(&self, path: &str, load_id: u64) {
        let mut inner = self.lock();
        if let Some(slot) = inner.pages.get_mut(path) {
            if slot.in_flight.as_ref().is_some_and(|f| f.load_id == load_id) {
                slot.in_flight = None;
                debug!("Store - load {} for {} released", load_id, path);
            }
        }
    }
}

/// Result of asking the store to start a load
pub enum LoadTicket {
    /// Caller owns the load and must run the preload operation
    Lead(InFlightGuard),

    /// Another caller is already running it; wait for its result
    Follow(LoadWaiter),
}

/// Ownership of the single in-flight load for a path
///
/// Released when dropped. Waiters see `Abandoned` if it is dropped without
/// [`finish`](InFlightGuard::finish).
#[must_use = "dropping the guard releases the in-flight load immediately"]
pub struct InFlightGuard {
    store: PageDataStore,
    path: String,
    load_id: u64,
    tx: watch::Sender<LoadState>,
    finished: bool,
}

impl InFlightGuard {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Publish the operation's result to everyone waiting on this load
    ///
    /// Does not commit: committing stays with whoever still wants the data.
    pub fn finish(mut self, result: &anyhow::Result<PageData>) {
        let state = match result {
            Ok(data) => LoadState::Done(Ok(data.clone())),
            Err(err) => LoadState::Done(Err(format!("{:#}", err))),
        };
        self.tx.send_replace(state);
        self.finished = true;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Store - load {} for {} dropped before finishing", self.load_id, self.path);
            self.tx.send_replace(LoadState::Abandoned);
        }
        self.store.release(&self.path, self.load_id);
    }
}

/// Handle on a load some other caller is running
pub struct LoadWaiter {
    path: String,
    rx: watch::Receiver<LoadState>,
}

impl LoadWaiter {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn wait(mut self) -> anyhow::Result<PageData> {
        let state = match self
            .rx
            .wait_for(|state| !matches!(state, LoadState::Pending))
            .await
        {
            Ok(state) => (*state).clone(),
            Err(_) => LoadState::Abandoned,
        };

        match state {
            LoadState::Done(Ok(data)) => Ok(data),
            LoadState::Done(Err(message)) => Err(anyhow::anyhow!(message)),
            LoadState::Pending | LoadState::Abandoned => Err(anyhow::anyhow!(
                "in-flight load for {} was abandoned",
                self.path
            )),
        }
    }
}

/// Explicitly passed slot through which pages and the coordinator reach the store
///
/// Reading before a store was provided is a construction-order bug and fails
/// with [`PreloadError::StoreUninitialized`] rather than handing out an empty store.
#[derive(Clone, Default)]
pub struct StoreProvider {
    cell: Arc<OnceCell<PageDataStore>>,
}

impl StoreProvider {
    /// A provider with no store yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provided(store: PageDataStore) -> Self {
        let provider = Self::new();
        provider.provide(store);
        provider
    }

    /// Install the store. Returns false if one was already provided.
    pub fn provide(&self, store: PageDataStore) -> bool {
        let installed = self.cell.set(store).is_ok();
        if !installed {
            warn!("Page data store was already provided, keeping the existing one");
        }
        installed
    }

    pub fn get(&self) -> Result<&PageDataStore> {
        self.cell.get().ok_or(PreloadError::StoreUninitialized)
    }
}
