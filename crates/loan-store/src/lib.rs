//! State access for the loan ledger.
//!
//! The ledger itself (durability, replication, MVCC) lives outside this
//! workspace. This crate defines the narrow contract the business logic needs
//! from it, plus reference backends that honour that contract in memory.
//!
//! # Contract
//!
//! All backends implement the [`StateStore`] trait:
//!
//! - `get_state(key)`: the stored bytes, or `None`
//! - `put_state(key, bytes)`: overwrite a key
//! - `put_batch(writes)`: apply one invocation's writes together
//! - `query(selector)`: a rich query returning [`QueryResults`]
//!
//! # Backends
//!
//! - [`InMemoryStateStore`]: `BTreeMap`-based store for tests, the CLI and the gateway
//! - [`StagedStore`]: buffers one invocation's writes and applies them on commit
//!
//! # Design Rules
//!
//! 1. One flat keyspace. Entity kinds live inside documents, never in keys.
//! 2. The store never interprets values except to evaluate a [`Selector`].
//! 3. Query iterators release their backend resources exactly once, on
//!    exhaustion, `close()` or drop.
//! 4. Backend failures are propagated, never retried.

pub mod error;
pub mod memory;
pub mod results;
pub mod selector;
pub mod staged;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::{write_snapshot, InMemoryStateStore};
pub use results::{QueryRecord, QueryResults};
pub use selector::Selector;
pub use staged::StagedStore;
pub use traits::StateStore;
