use std::marker::PhantomData;

use loan_store::StateStore;
use loan_types::StatusTracked;
use tracing::{debug, info};

use crate::error::{ContractError, ContractResult};
use crate::operations::{require_at_least, Operation};

/// Overwrites the `status` of an existing document of kind `E`.
///
/// Arguments are `(key, newStatus)`; extras are ignored. The new status is
/// stored as given, including the empty string. Last write wins: there is no
/// version check and no transition rule.
pub struct UpdateStatus<E> {
    name: &'static str,
    params: &'static [&'static str],
    _entity: PhantomData<fn() -> E>,
}

impl<E: StatusTracked> UpdateStatus<E> {
    /// `params` names the key and the new status, in that order.
    pub fn new(name: &'static str, params: &'static [&'static str; 2]) -> Self {
        Self {
            name,
            params,
            _entity: PhantomData,
        }
    }
}

impl<E: StatusTracked> Operation for UpdateStatus<E> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn params(&self) -> &'static [&'static str] {
        self.params
    }

    fn execute(&self, store: &dyn StateStore, args: &[String]) -> ContractResult<Option<Vec<u8>>> {
        require_at_least(self.name, args, 2)?;
        let [key, new_status, ..] = args else {
            return Err(ContractError::min_arity(self.name, 2, args.len()));
        };
        debug!(operation = self.name, key = %key, status = %new_status, "updating status");

        let stored = store.get_state(key)?.ok_or_else(|| ContractError::NotFound {
            kind: E::KIND.to_string(),
            key: key.clone(),
        })?;

        let mut document = E::from_document(&stored)?;
        document.set_status(new_status.clone());
        let encoded = document.to_document()?;
        store.put_state(key, &encoded)?;

        info!(operation = self.name, key = %key, status = %new_status, "status updated");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_store::{InMemoryStateStore, QueryResults, Selector, StoreResult};
    use loan_types::{Entity, LoanRequest, LoanResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn seeded_request() -> (InMemoryStateStore, LoanRequest) {
        let store = InMemoryStateStore::new();
        let request = LoanRequest::from_args(&args(&[
            "R1", "D1", "L1", "500", "car", "2025-01-01", "repaid", "pending",
        ]))
        .unwrap();
        store.put_state("R1", &request.to_document().unwrap()).unwrap();
        (store, request)
    }

    fn update_request() -> UpdateStatus<LoanRequest> {
        UpdateStatus::new("updateRequest", &["requestID", "newStatus"])
    }

    /// Counts puts so tests can prove no write happened.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryStateStore,
        puts: AtomicUsize,
    }

    impl StateStore for CountingStore {
        fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
            self.inner.get_state(key)
        }

        fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put_state(key, value)
        }

        fn query(&self, selector: &Selector) -> StoreResult<QueryResults<'_>> {
            self.inner.query(selector)
        }
    }

    #[test]
    fn overwrites_only_status() {
        let (store, before) = seeded_request();
        update_request().execute(&store, &args(&["R1", "approved"])).unwrap();

        let after = LoanRequest::from_document(&store.get_state("R1").unwrap().unwrap()).unwrap();
        assert_eq!(after.status, "approved");
        assert_eq!(LoanRequest { status: before.status.clone(), ..after }, before);
    }

    #[test]
    fn applying_twice_is_stable() {
        let (store, _) = seeded_request();
        let op = update_request();
        op.execute(&store, &args(&["R1", "approved"])).unwrap();
        let first = store.get_state("R1").unwrap();
        op.execute(&store, &args(&["R1", "approved"])).unwrap();
        assert_eq!(store.get_state("R1").unwrap(), first);
    }

    #[test]
    fn empty_status_is_accepted() {
        let (store, _) = seeded_request();
        update_request().execute(&store, &args(&["R1", ""])).unwrap();
        let after = LoanRequest::from_document(&store.get_state("R1").unwrap().unwrap()).unwrap();
        assert_eq!(after.status, "");
    }

    #[test]
    fn missing_key_fails_without_write() {
        let store = CountingStore::default();
        let op: UpdateStatus<LoanResponse> = UpdateStatus::new("updateResponse", &["responseID", "newStatus"]);
        let err = op.execute(&store, &args(&["nonexistent-id", "x"])).unwrap_err();
        assert!(matches!(err, ContractError::NotFound { .. }));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn malformed_document_fails_without_write() {
        let store = CountingStore::default();
        store.inner.put_state("R1", b"{broken").unwrap();
        let err = update_request().execute(&store, &args(&["R1", "x"])).unwrap_err();
        assert!(matches!(err, ContractError::Serialization(_)));
        assert_eq!(err.to_string().matches("serialization error").count(), 1);
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unrecognized_type_survives_update() {
        let store = InMemoryStateStore::new();
        store
            .put_state("R1", br#"{"Type":"Request","requestID":"R1","status":"open"}"#)
            .unwrap();
        update_request().execute(&store, &args(&["R1", "closed"])).unwrap();

        let stored: serde_json::Value =
            serde_json::from_slice(&store.get_state("R1").unwrap().unwrap()).unwrap();
        assert_eq!(stored["Type"], "Request");
        assert_eq!(stored["status"], "closed");
    }

    #[test]
    fn too_few_arguments() {
        let (store, _) = seeded_request();
        let err = update_request().execute(&store, &args(&["R1"])).unwrap_err();
        assert!(matches!(err, ContractError::ArgumentCount { .. }));
    }

    #[test]
    fn extra_arguments_ignored() {
        let (store, _) = seeded_request();
        update_request()
            .execute(&store, &args(&["R1", "approved", "extra"]))
            .unwrap();
        let after = LoanRequest::from_document(&store.get_state("R1").unwrap().unwrap()).unwrap();
        assert_eq!(after.status, "approved");
    }
}
