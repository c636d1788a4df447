//! HTTP gateway for the loan ledger.
//!
//! Hosts the marketplace contract over HTTP. Callers invoke operations
//! positionally through `POST /v1/invoke` or by parameter name through
//! `/api/{function}`. Each invocation runs atomically against a staged view
//! of the store and is committed only when it succeeds. Joined views under
//! `/api/{app}/{view}` merge query rows with the party records they name.

pub mod config;
pub mod error;
pub mod handler;
pub mod join;
pub mod router;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use handler::{status_for, ErrorBody, InvokeRequest};
pub use join::{find_view, JoinView, JOIN_VIEWS};
pub use server::LoanGateway;
pub use state::AppState;
