use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::results::QueryResults;
use crate::selector::Selector;
use crate::traits::StateStore;

/// Write buffer that turns one invocation into an all-or-nothing unit.
///
/// Atomicity of the final apply is the base store's: [`commit`] goes
/// through [`StateStore::put_batch`], which the in-memory store applies
/// under a single lock.
///
/// Reads by key see the invocation's own pending writes first, then the
/// base store. Rich queries run against committed state only, as they do on
/// the ledger. Pending writes reach the base store only through
/// [`commit`]; dropping the stage discards them.
///
/// [`commit`]: StagedStore::commit
pub struct StagedStore<'a> {
    base: &'a dyn StateStore,
    writes: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl<'a> StagedStore<'a> {
    /// Begin a new invocation over `base`.
    pub fn begin(base: &'a dyn StateStore) -> Self {
        Self {
            base,
            writes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Keys written so far, in key order.
    pub fn pending_keys(&self) -> Vec<String> {
        self.writes
            .lock()
            .map(|writes| writes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Apply every pending write to the base store through
    /// [`StateStore::put_batch`] and return how many keys were written.
    /// Atomic exactly when the base store's batch is.
    pub fn commit(self) -> StoreResult<usize> {
        let base = self.base;
        let writes = self.into_writes()?;
        base.put_batch(&writes)?;
        debug!(keys = writes.len(), "staged writes committed");
        Ok(writes.len())
    }

    /// End the stage and hand back its pending writes unapplied, for hosts
    /// that persist before publishing.
    pub fn into_writes(self) -> StoreResult<BTreeMap<String, Vec<u8>>> {
        self.writes
            .into_inner()
            .map_err(|_| StoreError::Backend("write buffer lock poisoned".into()))
    }

    /// Drop every pending write.
    pub fn rollback(self) {
        let discarded = self.pending_keys().len();
        debug!(keys = discarded, "staged writes discarded");
    }
}

impl StateStore for StagedStore<'_> {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let pending = self
            .writes
            .lock()
            .map_err(|_| StoreError::Backend("write buffer lock poisoned".into()))?
            .get(key)
            .cloned();
        match pending {
            Some(value) => Ok(Some(value)),
            None => self.base.get_state(key),
        }
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.writes
            .lock()
            .map_err(|_| StoreError::Backend("write buffer lock poisoned".into()))?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn query(&self, selector: &Selector) -> StoreResult<QueryResults<'_>> {
        self.base.query(selector)
    }
}
