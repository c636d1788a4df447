//! Entity schemas for the loan ledger.
//!
//! Every record on the ledger is a flat JSON document tagged with a `Type`
//! discriminator. All four kinds share one keyspace in the backing store, so
//! the discriminator is the only thing that tells them apart in a rich query.
//!
//! # Key Types
//!
//! - [`EntityKind`]: the discriminator (`lender`, `lendee`, `request`, `response`)
//! - [`KindTag`]: the discriminator as read back, unrecognized values included
//! - [`Lender`] / [`Lendee`]: registered parties
//! - [`LoanRequest`]: a lendee asking a lender for a loan
//! - [`LoanResponse`]: a lender's offer back to a lendee
//! - [`Entity`]: the shared document contract used by create operations
//! - [`StatusTracked`]: entities whose `status` can be rewritten after creation

pub mod entity;
pub mod error;
pub mod kind;

pub use entity::{Entity, Lendee, Lender, LoanRequest, LoanResponse, StatusTracked};
pub use error::TypeError;
pub use kind::{EntityKind, KindTag, DISCRIMINATOR_FIELD};
