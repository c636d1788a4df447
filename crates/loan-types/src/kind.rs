use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Name of the document field that carries the [`EntityKind`].
pub const DISCRIMINATOR_FIELD: &str = "Type";

/// Discriminator stored in every ledger document.
///
/// Serialized in lowercase, which is also the value rich-query selectors
/// filter on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Lender,
    Lendee,
    Request,
    Response,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 4] = [Self::Lender, Self::Lendee, Self::Request, Self::Response];

    /// The wire value of the discriminator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lender => "lender",
            Self::Lendee => "lendee",
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TypeError::UnknownKind(s.to_string()))
    }
}

/// The `Type` value carried by a decoded document.
///
/// Documents written here always hold a known kind. A stored value outside
/// the four kinds is kept verbatim so a status update writes it back
/// unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KindTag {
    Known(EntityKind),
    Other(String),
}

impl KindTag {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(kind) => kind.as_str(),
            Self::Other(raw) => raw,
        }
    }

    /// The known kind, if the stored value is one.
    pub fn known(&self) -> Option<EntityKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Other(_) => None,
        }
    }
}

impl From<EntityKind> for KindTag {
    fn from(kind: EntityKind) -> Self {
        Self::Known(kind)
    }
}

impl PartialEq<EntityKind> for KindTag {
    fn eq(&self, other: &EntityKind) -> bool {
        self.known() == Some(*other)
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
