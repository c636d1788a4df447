use std::path::PathBuf;
use std::sync::Arc;

use loan_contract::{Contract, Outcome};
use loan_store::{write_snapshot, InMemoryStateStore, StagedStore, StateStore};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::join::{run_view, JoinView};

/// Shared gateway state: the contract, the committed store, and the lock
/// that serializes invocations.
///
/// The in-memory store has no multi-version concurrency control, so the
/// gateway provides serializability itself by running one invocation at a
/// time.
pub struct AppState {
    contract: Contract,
    store: Arc<InMemoryStateStore>,
    snapshot_path: Option<PathBuf>,
    invocations: Mutex<()>,
}

impl AppState {
    pub fn new(contract: Contract, store: Arc<InMemoryStateStore>, snapshot_path: Option<PathBuf>) -> Self {
        Self {
            contract,
            store,
            snapshot_path,
            invocations: Mutex::new(()),
        }
    }

    /// Build state from config, loading the snapshot if one is configured.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let store = match &config.snapshot_path {
            Some(path) => InMemoryStateStore::load_snapshot(path)?,
            None => InMemoryStateStore::new(),
        };
        Ok(Self::new(
            Contract::new(),
            Arc::new(store),
            config.snapshot_path.clone(),
        ))
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn store(&self) -> &InMemoryStateStore {
        &self.store
    }

    /// Run one invocation atomically.
    ///
    /// Writes are staged and applied only on a success outcome. When a
    /// snapshot is configured, the post-commit state is written to disk
    /// first and the writes become visible only after that succeeds, so a
    /// failed save leaves both the file and the store unchanged.
    pub async fn invoke(&self, function: &str, args: &[String]) -> GatewayResult<Outcome> {
        let _serialized = self.invocations.lock().await;

        let stage = StagedStore::begin(self.store.as_ref());
        let outcome = self.contract.invoke(&stage, function, args);
        if !outcome.is_success() {
            stage.rollback();
            return Ok(outcome);
        }

        let writes = stage.into_writes()?;
        if writes.is_empty() {
            return Ok(outcome);
        }
        if let Some(path) = &self.snapshot_path {
            let json = self.store.to_snapshot_json_with(&writes)?;
            let path = path.clone();
            tokio::task::spawn_blocking(move || write_snapshot(&path, &json))
                .await
                .map_err(|e| GatewayError::Internal(format!("snapshot task failed: {e}")))??;
        }
        self.store.put_batch(&writes)?;
        info!(function, keys = writes.len(), "invocation committed");
        Ok(outcome)
    }

    /// Run a joined view. Its queries share the invocation lock, so every
    /// lookup sees the same state.
    pub async fn join(&self, view: &JoinView, args: &[String]) -> Outcome {
        let _serialized = self.invocations.lock().await;
        let result = run_view(&self.contract, self.store.as_ref(), view, args);
        if let Err(err) = &result {
            warn!(view = %view.route(), kind = %err.kind(), error = %err, "view failed");
        }
        result.map(Some).into()
    }
}
