use loan_store::StateStore;
use loan_types::{Entity, EntityKind};
use tracing::debug;

use crate::error::{ContractError, ContractResult};

/// Fail with [`ContractError::DuplicateKey`] if `key` is already stored.
///
/// The keyspace is shared by every entity kind, so a request ID that equals
/// an existing lender ID is a conflict too.
pub fn ensure_absent(
    store: &dyn StateStore,
    kind: EntityKind,
    param: &str,
    key: &str,
) -> ContractResult<()> {
    if store.get_state(key)?.is_some() {
        debug!(%kind, param, key, "key already present");
        return Err(ContractError::DuplicateKey {
            kind: kind.to_string(),
            param: param.to_string(),
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Check every key the entity guards before it is written.
///
/// Runs before any write, so a failure here leaves state untouched.
pub fn ensure_unique<E: Entity>(store: &dyn StateStore, entity: &E) -> ContractResult<()> {
    for (param, key) in entity.guarded_keys() {
        ensure_absent(store, E::KIND, param, key)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_store::{InMemoryStateStore, QueryResults, Selector, StoreError, StoreResult};
    use loan_types::{Lendee, Lender};

    struct UnavailableStore;

    impl StateStore for UnavailableStore {
        fn get_state(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
            Err(StoreError::Backend("state database unavailable".into()))
        }

        fn put_state(&self, _key: &str, _value: &[u8]) -> StoreResult<()> {
            Err(StoreError::Backend("state database unavailable".into()))
        }

        fn query(&self, _selector: &Selector) -> StoreResult<QueryResults<'_>> {
            Err(StoreError::Backend("state database unavailable".into()))
        }
    }

    #[test]
    fn absent_key_passes() {
        let store = InMemoryStateStore::new();
        ensure_absent(&store, EntityKind::Lender, "lenderID", "L1").unwrap();
    }

    #[test]
    fn present_key_fails_with_duplicate() {
        let store = InMemoryStateStore::new();
        store.put_state("L1", b"{}").unwrap();
        let err = ensure_absent(&store, EntityKind::Lender, "lenderID", "L1").unwrap_err();
        assert!(matches!(err, ContractError::DuplicateKey { ref key, .. } if key == "L1"));
        assert_eq!(err.to_string(), "lender lenderID already exists: L1");
    }

    #[test]
    fn backend_failure_is_ledger_error() {
        let err = ensure_absent(&UnavailableStore, EntityKind::Lendee, "lendeeID", "D1").unwrap_err();
        assert!(matches!(err, ContractError::Ledger(_)));
    }

    #[test]
    fn lender_username_is_checked_as_key() {
        let store = InMemoryStateStore::new();
        store.put_state("alice", b"{}").unwrap();
        let err = ensure_unique(&store, &Lender::new("L1", "alice", "pw")).unwrap_err();
        assert!(matches!(err, ContractError::DuplicateKey { ref param, .. } if param == "username"));
    }

    #[test]
    fn lender_username_shared_with_stored_lender_is_not_a_conflict() {
        let store = InMemoryStateStore::new();
        store
            .put_state("L1", &Lender::new("L1", "alice", "pw").to_document().unwrap())
            .unwrap();
        ensure_unique(&store, &Lender::new("L2", "alice", "other")).unwrap();
    }

    #[test]
    fn lendee_guard_ignores_username() {
        let store = InMemoryStateStore::new();
        store.put_state("bob", b"{}").unwrap();
        ensure_unique(&store, &Lendee::new("D1", "bob", "pw")).unwrap();
    }
}
