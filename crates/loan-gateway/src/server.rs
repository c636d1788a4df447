use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::router::build_router;
use crate::state::AppState;

/// HTTP host for the loan contract.
pub struct LoanGateway {
    config: GatewayConfig,
    state: Arc<AppState>,
}

impl LoanGateway {
    /// Create a gateway, loading the configured snapshot if there is one.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let state = Arc::new(AppState::from_config(&config)?);
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.state), self.config.max_body_bytes)
    }

    /// Start serving requests.
    pub async fn serve(self) -> GatewayResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            keys = self.state.store().len(),
            "loan gateway listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }
}
