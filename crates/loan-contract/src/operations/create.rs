use std::marker::PhantomData;

use loan_store::StateStore;
use loan_types::Entity;
use tracing::{debug, info};

use crate::error::{ContractError, ContractResult};
use crate::guard;
use crate::operations::{require_exact, require_non_empty, Operation};

/// Creates one entity of kind `E` from positional arguments.
///
/// Steps, each short-circuiting on failure: exact arity, non-empty
/// arguments, uniqueness guard, encode, put. Nothing is written before the
/// guard passes, so a failed create leaves state untouched.
pub struct CreateEntity<E> {
    name: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> CreateEntity<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Operation for CreateEntity<E> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn params(&self) -> &'static [&'static str] {
        E::PARAMS
    }

    fn execute(&self, store: &dyn StateStore, args: &[String]) -> ContractResult<Option<Vec<u8>>> {
        require_exact(self.name, args, E::PARAMS.len())?;
        require_non_empty(E::PARAMS, args)?;

        let entity = E::from_args(args)
            .ok_or_else(|| ContractError::exact_arity(self.name, E::PARAMS.len(), args.len()))?;
        debug!(operation = self.name, kind = %E::KIND, key = entity.key(), "creating entity");

        guard::ensure_unique(store, &entity)?;

        let document = entity.to_document()?;
        store.put_state(entity.key(), &document)?;

        info!(operation = self.name, kind = %E::KIND, key = entity.key(), "entity saved");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_store::InMemoryStateStore;
    use loan_types::{EntityKind, Lendee, Lender, LoanRequest, LoanResponse};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn add_lender_stores_document() {
        let store = InMemoryStateStore::new();
        let op = CreateEntity::<Lender>::new("addLender");
        assert!(op.execute(&store, &args(&["L1", "alice", "pw"])).unwrap().is_none());

        let stored = Lender::from_document(&store.get_state("L1").unwrap().unwrap()).unwrap();
        assert_eq!(stored, Lender::new("L1", "alice", "pw"));
        assert_eq!(stored.kind, EntityKind::Lender);
    }

    #[test]
    fn add_lender_arity() {
        let store = InMemoryStateStore::new();
        let op = CreateEntity::<Lender>::new("addLender");
        for bad in [args(&["L1", "alice"]), args(&["L1", "alice", "pw", "x"])] {
            let err = op.execute(&store, &bad).unwrap_err();
            assert!(matches!(err, ContractError::ArgumentCount { .. }));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn add_lender_empty_argument() {
        let store = InMemoryStateStore::new();
        let op = CreateEntity::<Lender>::new("addLender");
        let err = op.execute(&store, &args(&["L1", "", "pw"])).unwrap_err();
        assert!(matches!(err, ContractError::EmptyArgument { position: 2, .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_key_leaves_document_unchanged() {
        let store = InMemoryStateStore::new();
        let op = CreateEntity::<Lendee>::new("addLendee");
        op.execute(&store, &args(&["D1", "bob", "pw"])).unwrap();
        let before = store.get_state("D1").unwrap();

        let err = op.execute(&store, &args(&["D1", "mallory", "other"])).unwrap_err();
        assert!(matches!(err, ContractError::DuplicateKey { .. }));
        assert_eq!(store.get_state("D1").unwrap(), before);
    }

    #[test]
    fn keyspace_is_shared_across_kinds() {
        let store = InMemoryStateStore::new();
        CreateEntity::<Lender>::new("addLender")
            .execute(&store, &args(&["X1", "alice", "pw"]))
            .unwrap();
        let err = CreateEntity::<LoanResponse>::new("addResponse")
            .execute(&store, &args(&["X1", "D1", "L1", "100", "30", "5", "offered"]))
            .unwrap_err();
        assert!(matches!(err, ContractError::DuplicateKey { ref kind, .. } if kind == "response"));
    }

    #[test]
    fn add_request_requires_all_eight() {
        let store = InMemoryStateStore::new();
        let op = CreateEntity::<LoanRequest>::new("addRequest");
        let err = op
            .execute(&store, &args(&["R1", "D1", "L1", "500", "car", "2025-01-01", "repaid", ""]))
            .unwrap_err();
        assert!(matches!(err, ContractError::EmptyArgument { position: 8, ref param } if param == "status"));
        op.execute(&store, &args(&["R1", "D1", "L1", "500", "car", "2025-01-01", "repaid", "pending"]))
            .unwrap();
        assert!(store.exists("R1").unwrap());
    }

    #[test]
    fn numeric_looking_fields_are_opaque() {
        let store = InMemoryStateStore::new();
        CreateEntity::<LoanResponse>::new("addResponse")
            .execute(&store, &args(&["P1", "D1", "L1", "lots", "soon", "some", "offered"]))
            .unwrap();
        let stored = LoanResponse::from_document(&store.get_state("P1").unwrap().unwrap()).unwrap();
        assert_eq!(stored.loan_amount, "lots");
    }

    #[test]
    fn params_come_from_entity() {
        let op = CreateEntity::<LoanResponse>::new("addResponse");
        assert_eq!(op.params(), LoanResponse::PARAMS);
        assert_eq!(op.name(), "addResponse");
    }
}
