//! Wire data model for the dedup identification service

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer};

/// A single discriminating identifying field about a content item.
///
/// Two difs are equal iff both the type and the value are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Dif {
    /// Kind of discriminator (e.g. "url", "phash")
    #[serde(rename = "type")]
    pub kind: String,

    /// Discriminator value
    pub value: String,
}

impl Dif {
    /// Create a new dif
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Canonical unordered form of a collection's difs.
///
/// This is the identity a collection has for storage and membership: the
/// order difs were submitted in never matters, and repeated difs collapse
/// into one. Stores build this from the submitted sequence; the engine
/// always passes the sequence through untouched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DifSet(BTreeSet<Dif>);

impl DifSet {
    /// Canonicalize a submitted dif sequence
    pub fn new(difs: &[Dif]) -> Self {
        Self(difs.iter().cloned().collect())
    }

    /// Number of distinct difs in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the difs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &Dif> {
        self.0.iter()
    }
}

impl From<&[Dif]> for DifSet {
    fn from(difs: &[Dif]) -> Self {
        Self::new(difs)
    }
}

/// A named collection of difs: one way of fingerprinting a content item.
///
/// The name is informational only; it never affects equality or lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct DifCollection {
    pub name: String,
    pub difs: Vec<Dif>,
}

/// A client-submitted unit of content, identified by an opaque id
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub difcollections: Vec<DifCollection>,
}

/// Request body for the identify endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyRequest {
    pub key: String,
    #[serde(rename = "contentItems")]
    pub content_items: Vec<ContentItem>,
}

/// Request body for the register-key endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRegistrationRequest {
    pub superkey: String,
    pub newkey: String,
}

/// Per-item dedup verdict.
///
/// Rendered on the wire as the fixed literals "unique"/"duplicate", never as
/// a raw boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    Unique,
    Duplicate,
}

impl Uniqueness {
    /// Classify from the engine's per-item flag
    pub fn from_unique(unique: bool) -> Self {
        if unique {
            Self::Unique
        } else {
            Self::Duplicate
        }
    }

    /// The fixed wire literal for this verdict
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::Duplicate => "duplicate",
        }
    }
}

impl Serialize for Uniqueness {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of registering a key.
///
/// Registering an already-known key is not an error; it simply reports
/// `AlreadyRegistered`. Rendered on the wire as the fixed literals
/// "registered"/"already registered".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered,
}

impl RegistrationOutcome {
    /// Classify from the store's was-it-new flag
    pub fn from_new(new: bool) -> Self {
        if new {
            Self::Registered
        } else {
            Self::AlreadyRegistered
        }
    }

    /// The fixed wire literal for this outcome
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::AlreadyRegistered => "already registered",
        }
    }
}

impl Serialize for RegistrationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One entry of an identify response
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyResult {
    pub id: String,
    pub result: Uniqueness,
}

/// Response body for the identify endpoint.
///
/// Carries one result per submitted content item, in the item's original
/// submission order.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyResponse {
    pub key: String,
    pub results: Vec<IdentifyResult>,
}

/// Response body for the register-key endpoint
#[derive(Debug, Clone, Serialize)]
pub struct KeyRegistrationResponse {
    pub key: String,
    pub registered: RegistrationOutcome,
}
