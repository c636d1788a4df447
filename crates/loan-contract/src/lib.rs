//! Business logic of the peer-to-peer loan marketplace.
//!
//! Parties register, lendees post loan requests, lenders post responses, and
//! both sides move a request or response along by rewriting its `status`.
//! Everything is stored as JSON documents in the ledger's single keyspace.
//!
//! The crate is host-agnostic: every invocation receives a
//! [`StateStore`](loan_store::StateStore) and returns an [`Outcome`]. The host
//! is responsible for running each invocation atomically and committing its
//! writes only on success.
//!
//! # Quick Start
//!
//! ```rust
//! use loan_contract::Contract;
//! use loan_store::InMemoryStateStore;
//!
//! let contract = Contract::new();
//! let store = InMemoryStateStore::new();
//! let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
//!
//! let outcome = contract.invoke(&store, "addLender", &args(&["L1", "alice", "secret"]));
//! assert!(outcome.is_success());
//!
//! let outcome = contract.invoke(&store, "queryLenderByName", &args(&["alice"]));
//! let payload = String::from_utf8(outcome.payload().unwrap().to_vec()).unwrap();
//! assert!(payload.starts_with(r#"[{"Key":"L1","Record":{"Type":"lender""#));
//! ```

pub mod aggregate;
pub mod contract;
pub mod error;
pub mod guard;
pub mod operations;
pub mod outcome;
pub mod query;

// Re-exports for convenience.
pub use contract::{standard_operations, Contract, OperationInfo};
pub use error::{ContractError, ContractResult, ErrorKind};
pub use operations::{CreateEntity, Operation, RichQuery, UpdateStatus};
pub use outcome::Outcome;
