use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::kind::{EntityKind, KindTag};

/// A ledger document that can be created from positional invocation
/// arguments.
///
/// Implementations serialize with `Type` first, followed by their fields in
/// the order listed in [`Entity::PARAMS`].
pub trait Entity: Serialize + DeserializeOwned {
    /// Discriminator written into every document of this kind.
    const KIND: EntityKind;

    /// Creation parameter names, in argument order. The first one is the key.
    const PARAMS: &'static [&'static str];

    /// The primary key this document is stored under.
    fn key(&self) -> &str;

    /// Build the document from exactly `PARAMS.len()` arguments.
    ///
    /// Returns `None` when the argument count does not match. Emptiness is
    /// the caller's concern.
    fn from_args(args: &[String]) -> Option<Self>;

    /// Keys that must be absent from the shared keyspace before creation,
    /// each labelled with the parameter it came from.
    fn guarded_keys(&self) -> Vec<(&'static str, &str)> {
        vec![(Self::PARAMS[0], self.key())]
    }

    /// Encode to the JSON bytes stored on the ledger.
    fn to_document(&self) -> Result<Vec<u8>, TypeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode stored JSON bytes.
    ///
    /// Decoding is lenient: absent fields become empty strings and unknown
    /// fields are dropped.
    fn from_document(bytes: &[u8]) -> Result<Self, TypeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// An entity whose `status` may be overwritten after creation.
pub trait StatusTracked: Entity {
    fn status(&self) -> &str;

    fn set_status(&mut self, status: String);
}

// ---------------------------------------------------------------------------
// Lender
// ---------------------------------------------------------------------------

/// A registered lender. Credentials are stored as supplied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lender {
    #[serde(rename = "Type")]
    pub kind: KindTag,
    #[serde(rename = "lenderID")]
    pub lender_id: String,
    pub username: String,
    pub password: String,
}

impl Lender {
    pub fn new(
        lender_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            kind: EntityKind::Lender.into(),
            lender_id: lender_id.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for Lender {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

impl Entity for Lender {
    const KIND: EntityKind = EntityKind::Lender;
    const PARAMS: &'static [&'static str] = &["lenderID", "username", "password"];

    fn key(&self) -> &str {
        &self.lender_id
    }

    fn from_args(args: &[String]) -> Option<Self> {
        let [lender_id, username, password] = args else {
            return None;
        };
        Some(Self::new(lender_id, username, password))
    }

    /// The username is looked up as a key too. Usernames are never stored as
    /// keys, so this only trips when a username equals some entity's ID.
    fn guarded_keys(&self) -> Vec<(&'static str, &str)> {
        vec![("lenderID", &self.lender_id), ("username", &self.username)]
    }
}

// ---------------------------------------------------------------------------
// Lendee
// ---------------------------------------------------------------------------

/// A registered lendee (borrower).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lendee {
    #[serde(rename = "Type")]
    pub kind: KindTag,
    #[serde(rename = "lendeeID")]
    pub lendee_id: String,
    pub username: String,
    pub password: String,
}

impl Lendee {
    pub fn new(
        lendee_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            kind: EntityKind::Lendee.into(),
            lendee_id: lendee_id.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for Lendee {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

impl Entity for Lendee {
    const KIND: EntityKind = EntityKind::Lendee;
    const PARAMS: &'static [&'static str] = &["lendeeID", "username", "password"];

    fn key(&self) -> &str {
        &self.lendee_id
    }

    fn from_args(args: &[String]) -> Option<Self> {
        let [lendee_id, username, password] = args else {
            return None;
        };
        Some(Self::new(lendee_id, username, password))
    }
}

// ---------------------------------------------------------------------------
// LoanRequest
// ---------------------------------------------------------------------------

/// A lendee's request for a loan from a specific lender.
///
/// `loan_required` and `return_date` are opaque strings; nothing here parses
/// amounts or dates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanRequest {
    #[serde(rename = "Type")]
    pub kind: KindTag,
    #[serde(rename = "requestID")]
    pub request_id: String,
    #[serde(rename = "lendeeID")]
    pub lendee_id: String,
    #[serde(rename = "lenderID")]
    pub lender_id: String,
    pub loan_required: String,
    pub product: String,
    pub return_date: String,
    pub expected_outcome: String,
    pub status: String,
}

impl Default for LoanRequest {
    fn default() -> Self {
        Self {
            kind: EntityKind::Request.into(),
            request_id: String::new(),
            lendee_id: String::new(),
            lender_id: String::new(),
            loan_required: String::new(),
            product: String::new(),
            return_date: String::new(),
            expected_outcome: String::new(),
            status: String::new(),
        }
    }
}

impl Entity for LoanRequest {
    const KIND: EntityKind = EntityKind::Request;
    const PARAMS: &'static [&'static str] = &[
        "requestID",
        "lendeeID",
        "lenderID",
        "loanRequired",
        "product",
        "returnDate",
        "expectedOutcome",
        "status",
    ];

    fn key(&self) -> &str {
        &self.request_id
    }

    fn from_args(args: &[String]) -> Option<Self> {
        let [request_id, lendee_id, lender_id, loan_required, product, return_date, expected_outcome, status] =
            args
        else {
            return None;
        };
        Some(Self {
            kind: EntityKind::Request.into(),
            request_id: request_id.clone(),
            lendee_id: lendee_id.clone(),
            lender_id: lender_id.clone(),
            loan_required: loan_required.clone(),
            product: product.clone(),
            return_date: return_date.clone(),
            expected_outcome: expected_outcome.clone(),
            status: status.clone(),
        })
    }
}

impl StatusTracked for LoanRequest {
    fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: String) {
        self.status = status;
    }
}

// ---------------------------------------------------------------------------
// LoanResponse
// ---------------------------------------------------------------------------

/// A lender's offer in reply to a lendee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanResponse {
    #[serde(rename = "Type")]
    pub kind: KindTag,
    #[serde(rename = "responseID")]
    pub response_id: String,
    #[serde(rename = "lendeeID")]
    pub lendee_id: String,
    #[serde(rename = "lenderID")]
    pub lender_id: String,
    pub loan_amount: String,
    pub time_limit: String,
    pub interest: String,
    pub status: String,
}

impl Default for LoanResponse {
    fn default() -> Self {
        Self {
            kind: EntityKind::Response.into(),
            response_id: String::new(),
            lendee_id: String::new(),
            lender_id: String::new(),
            loan_amount: String::new(),
            time_limit: String::new(),
            interest: String::new(),
            status: String::new(),
        }
    }
}

impl Entity for LoanResponse {
    const KIND: EntityKind = EntityKind::Response;
    const PARAMS: &'static [&'static str] = &[
        "responseID",
        "lendeeID",
        "lenderID",
        "loanAmount",
        "timeLimit",
        "interest",
        "status",
    ];

    fn key(&self) -> &str {
        &self.response_id
    }

    fn from_args(args: &[String]) -> Option<Self> {
        let [response_id, lendee_id, lender_id, loan_amount, time_limit, interest, status] = args
        else {
            return None;
        };
        Some(Self {
            kind: EntityKind::Response.into(),
            response_id: response_id.clone(),
            lendee_id: lendee_id.clone(),
            lender_id: lender_id.clone(),
            loan_amount: loan_amount.clone(),
            time_limit: time_limit.clone(),
            interest: interest.clone(),
            status: status.clone(),
        })
    }
}

impl StatusTracked for LoanResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: String) {
        self.status = status;
    }
}
