//! Entity operations.
//!
//! Every invocable function is an [`Operation`]: a named handler with an
//! ordered parameter list and a uniform `execute` entry point. Three generic
//! handlers cover the whole surface:
//!
//! - [`CreateEntity`]: exact arity, non-empty arguments, uniqueness guard, put
//! - [`RichQuery`]: minimum arity, selector, aggregated payload
//! - [`UpdateStatus`]: read-modify-write of a document's `status`

pub mod create;
pub mod lookup;
pub mod update;

pub use create::CreateEntity;
pub use lookup::RichQuery;
pub use update::UpdateStatus;

use loan_store::StateStore;

use crate::error::{ContractError, ContractResult};

/// A single invocable function.
///
/// The trait is object-safe and `Send + Sync` so operations can be stored in
/// a `Vec<Box<dyn Operation>>`.
pub trait Operation: Send + Sync {
    /// Function name used for dispatch (e.g. `"addLender"`).
    fn name(&self) -> &'static str;

    /// Parameter names, in argument order.
    fn params(&self) -> &'static [&'static str];

    /// Run the operation. Queries return a payload; writes return `None`.
    fn execute(&self, store: &dyn StateStore, args: &[String]) -> ContractResult<Option<Vec<u8>>>;
}

/// Require exactly `expected` arguments.
pub(crate) fn require_exact(operation: &str, args: &[String], expected: usize) -> ContractResult<()> {
    if args.len() != expected {
        return Err(ContractError::exact_arity(operation, expected, args.len()));
    }
    Ok(())
}

/// Require at least `minimum` arguments. Extra arguments are allowed.
pub(crate) fn require_at_least(operation: &str, args: &[String], minimum: usize) -> ContractResult<()> {
    if args.len() < minimum {
        return Err(ContractError::min_arity(operation, minimum, args.len()));
    }
    Ok(())
}

/// Fail on the first empty argument, reporting its 1-based position.
pub(crate) fn require_non_empty(params: &[&str], args: &[String]) -> ContractResult<()> {
    match args.iter().position(String::is_empty) {
        Some(index) => Err(ContractError::EmptyArgument {
            position: index + 1,
            param: params.get(index).copied().unwrap_or("argument").to_string(),
        }),
        None => Ok(()),
    }
}
