use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use crate::results::QueryResults;
use crate::selector::Selector;

/// Key-value state backend with rich-query support.
///
/// All implementations must satisfy these invariants:
/// - A single keyspace shared by every entity kind.
/// - Writes made during an invocation become visible to other invocations
///   only once the host commits that invocation.
/// - Failures are returned immediately; implementations never retry.
///
/// The check-then-write pattern used by create operations is race-free only
/// because the host serializes conflicting invocations (the ledger rejects a
/// transaction whose read set was invalidated by a concurrent commit).
/// Nothing behind this trait takes locks on the caller's behalf.
pub trait StateStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Run a rich query and return the matching records.
    ///
    /// Record order is backend-defined. The returned iterator must be
    /// drained or dropped before the invocation ends.
    fn query(&self, selector: &Selector) -> StoreResult<QueryResults<'_>>;

    /// Apply a set of writes, as at the end of a committed invocation.
    ///
    /// Every key is checked before anything is written, so an empty key
    /// rejects the whole batch. The default implementation then calls
    /// `put_state()` per key and can leave a prefix applied if the backend
    /// fails midway; backends with a native batch should override it.
    fn put_batch(&self, writes: &BTreeMap<String, Vec<u8>>) -> StoreResult<()> {
        if writes.keys().any(|key| key.is_empty()) {
            return Err(StoreError::EmptyKey);
        }
        for (key, value) in writes {
            self.put_state(key, value)?;
        }
        Ok(())
    }

    /// Check whether a key exists.
    ///
    /// Default implementation calls `get_state()`.
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get_state(key)?.is_some())
    }
}
