use std::collections::HashMap;
use std::fmt;

use loan_store::StateStore;
use loan_types::{EntityKind, Lendee, Lender, LoanRequest, LoanResponse};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ContractError, ContractResult};
use crate::operations::{CreateEntity, Operation, RichQuery, UpdateStatus};
use crate::outcome::Outcome;

/// Name and parameter list of a registered operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OperationInfo {
    pub name: &'static str,
    pub params: &'static [&'static str],
}

/// The loan marketplace contract: a fixed table of operations keyed by
/// function name.
///
/// Dispatch is stateless. The contract never caches state between
/// invocations; every call reads through the store it is handed.
pub struct Contract {
    operations: Vec<Box<dyn Operation>>,
    index: HashMap<&'static str, usize>,
}

impl Contract {
    /// The full marketplace operation table.
    pub fn new() -> Self {
        Self::with_operations(standard_operations())
    }

    /// A contract over a custom operation table. Later entries replace
    /// earlier ones with the same name.
    pub fn with_operations(operations: Vec<Box<dyn Operation>>) -> Self {
        let mut contract = Self {
            operations: Vec::with_capacity(operations.len()),
            index: HashMap::with_capacity(operations.len()),
        };
        for operation in operations {
            contract.register(operation);
        }
        contract
    }

    fn register(&mut self, operation: Box<dyn Operation>) {
        let name = operation.name();
        match self.index.get(name).copied() {
            Some(slot) => self.operations[slot] = operation,
            None => {
                self.index.insert(name, self.operations.len());
                self.operations.push(operation);
            }
        }
    }

    /// Look up an operation by function name.
    pub fn operation(&self, name: &str) -> Option<&dyn Operation> {
        self.index.get(name).map(|&slot| self.operations[slot].as_ref())
    }

    /// Registered operations, in registration order.
    pub fn operations(&self) -> impl Iterator<Item = OperationInfo> + '_ {
        self.operations.iter().map(|op| OperationInfo {
            name: op.name(),
            params: op.params(),
        })
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if no operations are registered.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Route `function` to its operation and run it.
    pub fn execute(
        &self,
        store: &dyn StateStore,
        function: &str,
        args: &[String],
    ) -> ContractResult<Option<Vec<u8>>> {
        let operation = self
            .operation(function)
            .ok_or_else(|| ContractError::UnknownOperation(function.to_string()))?;
        operation.execute(store, args)
    }

    /// Run one invocation and fold the result into an [`Outcome`].
    ///
    /// The host must commit the invocation's writes only when the outcome is
    /// a success.
    pub fn invoke(&self, store: &dyn StateStore, function: &str, args: &[String]) -> Outcome {
        debug!(function, args = args.len(), "invoke");
        match self.execute(store, function, args) {
            Ok(payload) => Outcome::success(payload),
            Err(err) => {
                warn!(function, kind = %err.kind(), error = %err, "invocation failed");
                err.into()
            }
        }
    }
}

impl Default for Contract {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("operations", &self.operations.len())
            .finish()
    }
}

/// The nineteen marketplace operations.
pub fn standard_operations() -> Vec<Box<dyn Operation>> {
    use EntityKind::{Lendee as LendeeKind, Lender as LenderKind, Request, Response};

    let mut operations: Vec<Box<dyn Operation>> = Vec::with_capacity(19);
    // Lenders
    operations.push(Box::new(CreateEntity::<Lender>::new("addLender")));
    operations.push(Box::new(RichQuery::new("queryLender", LenderKind, &["username", "password"])));
    operations.push(Box::new(RichQuery::new("queryLenderByName", LenderKind, &["username"])));
    operations.push(Box::new(RichQuery::new("queryLenderByID", LenderKind, &["lenderID"])));
    operations.push(Box::new(RichQuery::new("queryAllLenders", LenderKind, &[])));
    // Lendees
    operations.push(Box::new(CreateEntity::<Lendee>::new("addLendee")));
    operations.push(Box::new(RichQuery::new("queryLendee", LendeeKind, &["username", "password"])));
    operations.push(Box::new(RichQuery::new("queryLendeeByID", LendeeKind, &["lendeeID"])));
    // Requests
    operations.push(Box::new(CreateEntity::<LoanRequest>::new("addRequest")));
    operations.push(Box::new(RichQuery::new("queryRequestByID", Request, &["lendeeID"])));
    operations.push(Box::new(RichQuery::new("queryRequest", Request, &["status", "lenderID"])));
    operations.push(Box::new(RichQuery::new("queryRequests", Request, &["lendeeID", "lenderID"])));
    operations.push(Box::new(RichQuery::new("queryRequestID", Request, &["requestID"])));
    // Responses
    operations.push(Box::new(CreateEntity::<LoanResponse>::new("addResponse")));
    operations.push(Box::new(RichQuery::new("queryResponse", Response, &["status", "lendeeID"])));
    operations.push(Box::new(RichQuery::new("queryResponseByID", Response, &["lenderID"])));
    operations.push(Box::new(RichQuery::new("queryResponseID", Response, &["responseID"])));
    // Status updates
    operations.push(Box::new(UpdateStatus::<LoanRequest>::new("updateRequest", &["requestID", "newStatus"])));
    operations.push(Box::new(UpdateStatus::<LoanResponse>::new("updateResponse", &["responseID", "newStatus"])));
    operations
}
