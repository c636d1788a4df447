use loan_store::StateStore;
use loan_types::EntityKind;
use tracing::debug;

use crate::aggregate::aggregate;
use crate::error::ContractResult;
use crate::operations::{require_at_least, Operation};
use crate::query::selector_from_args;

/// A rich query over one entity kind.
///
/// The leading arguments are bound, in order, to `fields`; the selector also
/// pins the discriminator to `kind`. Arguments past `fields.len()` are
/// accepted and ignored.
pub struct RichQuery {
    name: &'static str,
    kind: EntityKind,
    fields: &'static [&'static str],
}

impl RichQuery {
    pub const fn new(name: &'static str, kind: EntityKind, fields: &'static [&'static str]) -> Self {
        Self { name, kind, fields }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

impl Operation for RichQuery {
    fn name(&self) -> &'static str {
        self.name
    }

    fn params(&self) -> &'static [&'static str] {
        self.fields
    }

    fn execute(&self, store: &dyn StateStore, args: &[String]) -> ContractResult<Option<Vec<u8>>> {
        require_at_least(self.name, args, self.fields.len())?;

        let selector = selector_from_args(self.kind, self.fields, args);
        debug!(operation = self.name, selector = %selector, "running rich query");

        let results = store.query(&selector)?;
        aggregate(results).map(Some)
    }
}
