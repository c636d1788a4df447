use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::value::RawValue;
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::results::{QueryRecord, QueryResults};
use crate::selector::Selector;
use crate::traits::StateStore;

/// In-memory, `BTreeMap`-based state store.
///
/// Intended for tests, the CLI and the reference gateway. Values are held
/// behind a `RwLock` and cloned on read. Rich queries evaluate the
/// [`Selector`] against each stored JSON object and yield matches in key
/// order; values that are not JSON objects never match.
///
/// The store can be persisted as a JSON snapshot mapping each key to its raw
/// document.
pub struct InMemoryStateStore {
    state: RwLock<BTreeMap<String, Vec<u8>>>,
    open_queries: Arc<AtomicUsize>,
}

impl InMemoryStateStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BTreeMap::new()),
            open_queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.read().map(|state| state.len()).unwrap_or_default()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of all keys.
    pub fn keys(&self) -> Vec<String> {
        self.read()
            .map(|state| state.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove every key.
    pub fn clear(&self) -> StoreResult<()> {
        self.write()?.clear();
        Ok(())
    }

    /// Query result sets handed out and not yet released.
    pub fn open_queries(&self) -> usize {
        self.open_queries.load(Ordering::SeqCst)
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Encode the whole store as a JSON object of `key -> document`.
    ///
    /// Documents are embedded verbatim, so a snapshot round trip preserves
    /// stored bytes exactly. Fails if any value is not valid JSON.
    pub fn to_snapshot_json(&self) -> StoreResult<String> {
        self.to_snapshot_json_with(&BTreeMap::new())
    }

    /// Encode the store as it will look once `pending` is applied, without
    /// applying it.
    pub fn to_snapshot_json_with(&self, pending: &BTreeMap<String, Vec<u8>>) -> StoreResult<String> {
        let state = self.read()?;
        let mut documents: BTreeMap<&str, Box<RawValue>> = BTreeMap::new();
        for (key, value) in state.iter().chain(pending.iter()) {
            let text = std::str::from_utf8(value).map_err(|e| {
                StoreError::Serialization(format!("value under {key} is not UTF-8: {e}"))
            })?;
            documents.insert(key, RawValue::from_string(text.to_string())?);
        }
        Ok(serde_json::to_string_pretty(&documents)?)
    }

    /// Build a store from a snapshot produced by [`to_snapshot_json`].
    ///
    /// [`to_snapshot_json`]: InMemoryStateStore::to_snapshot_json
    pub fn from_snapshot_json(json: &str) -> StoreResult<Self> {
        let documents: BTreeMap<String, Box<RawValue>> = serde_json::from_str(json)?;
        let state = documents
            .into_iter()
            .map(|(key, raw)| (key, raw.get().as_bytes().to_vec()))
            .collect();
        Ok(Self {
            state: RwLock::new(state),
            open_queries: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Load a snapshot file. A missing file yields an empty store.
    pub fn load_snapshot(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path)?;
        let store = Self::from_snapshot_json(&json)?;
        debug!(path = %path.display(), keys = store.len(), "snapshot loaded");
        Ok(store)
    }

    /// Write a snapshot file atomically.
    pub fn save_snapshot(&self, path: &Path) -> StoreResult<()> {
        write_snapshot(path, &self.to_snapshot_json()?)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("state lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("state lock poisoned".into()))
    }
}

/// Write already-encoded snapshot JSON to `path` through a temp file in the
/// same directory, then rename. Readers never see a partial file.
pub fn write_snapshot(path: &Path, json: &str) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    debug!(path = %path.display(), bytes = json.len(), "snapshot saved");
    Ok(())
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for InMemoryStateStore {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.write()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn put_batch(&self, writes: &BTreeMap<String, Vec<u8>>) -> StoreResult<()> {
        if writes.keys().any(|key| key.is_empty()) {
            return Err(StoreError::EmptyKey);
        }
        let mut state = self.write()?;
        for (key, value) in writes {
            state.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn query(&self, selector: &Selector) -> StoreResult<QueryResults<'_>> {
        debug!(selector = %selector, "rich query");
        // Snapshot the rows so the lock is not held while the caller iterates.
        let rows: Vec<(String, Vec<u8>)> = self
            .read()?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let selector = selector.clone();
        let records = rows.into_iter().filter_map(move |(key, value)| {
            let document: Value = serde_json::from_slice(&value).ok()?;
            selector
                .matches(&document)
                .then(|| Ok(QueryRecord { key, value }))
        });

        let open = Arc::clone(&self.open_queries);
        open.fetch_add(1, Ordering::SeqCst);
        Ok(QueryResults::new(records).on_release(move || {
            open.fetch_sub(1, Ordering::SeqCst);
        }))
    }
}

impl std::fmt::Debug for InMemoryStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStateStore")
            .field("key_count", &self.len())
            .field("open_queries", &self.open_queries())
            .finish()
    }
}
