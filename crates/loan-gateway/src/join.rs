use loan_contract::{Contract, ContractError, ContractResult};
use loan_store::StateStore;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// A composite read: one base query whose rows are each merged with the
/// party record they reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoinView {
    pub app: &'static str,
    pub view: &'static str,
    /// Query producing the rows.
    pub base: &'static str,
    /// Record field holding the party key.
    pub link_field: &'static str,
    /// Query resolving a party key to its record.
    pub lookup: &'static str,
}

impl JoinView {
    pub fn route(&self) -> String {
        format!("/api/{}/{}", self.app, self.view)
    }
}

/// The joined views served under `/api/{app}/{view}`.
pub const JOIN_VIEWS: &[JoinView] = &[
    JoinView {
        app: "lendee",
        view: "queryResponses",
        base: "queryResponse",
        link_field: "lenderID",
        lookup: "queryLenderByID",
    },
    JoinView {
        app: "lendee",
        view: "queryExistingRequests",
        base: "queryRequestByID",
        link_field: "lenderID",
        lookup: "queryLenderByID",
    },
    JoinView {
        app: "lender",
        view: "queryResponses",
        base: "queryResponseByID",
        link_field: "lendeeID",
        lookup: "queryLendeeByID",
    },
    JoinView {
        app: "lender",
        view: "querylendeeRequests",
        base: "queryRequest",
        link_field: "lendeeID",
        lookup: "queryLendeeByID",
    },
];

pub fn find_view(app: &str, view: &str) -> Option<&'static JoinView> {
    JOIN_VIEWS.iter().find(|v| v.app == app && v.view == view)
}

#[derive(Deserialize)]
struct Row {
    #[serde(rename = "Record")]
    record: Value,
}

/// Run `view` and return the merged records as a JSON array.
///
/// Party fields overwrite row fields of the same name. A row whose party
/// record is missing is returned as stored.
pub fn run_view(
    contract: &Contract,
    store: &dyn StateStore,
    view: &JoinView,
    args: &[String],
) -> ContractResult<Vec<u8>> {
    let rows = query_rows(contract, store, view.base, args)?;
    let mut merged = Vec::with_capacity(rows.len());
    for row in rows {
        let mut record = match row.record {
            Value::Object(record) => record,
            other => {
                merged.push(other);
                continue;
            }
        };
        let link = record
            .get(view.link_field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let party = query_rows(contract, store, view.lookup, &[link.clone()])?
            .into_iter()
            .next();
        match party.map(|p| p.record) {
            Some(Value::Object(fields)) => record.extend(fields),
            _ => debug!(view = view.view, link = %link, "no party record to merge"),
        }
        merged.push(Value::Object(record));
    }
    serde_json::to_vec(&merged).map_err(|e| ContractError::Serialization(e.to_string()))
}

fn query_rows(
    contract: &Contract,
    store: &dyn StateStore,
    function: &str,
    args: &[String],
) -> ContractResult<Vec<Row>> {
    let payload = contract.execute(store, function, args)?.unwrap_or_default();
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&payload).map_err(|e| ContractError::Serialization(e.to_string()))
}
