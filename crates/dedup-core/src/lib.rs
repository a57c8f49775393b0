//! Core domain model for the dedup identification service
//!
//! Clients submit content items, each fingerprinted by one or more named
//! collections of discriminating identifying fields ("difs"). The service
//! answers, per item, whether an equivalent collection of difs has been seen
//! before under the client's key.
//!
//! This crate holds the parts with no I/O:
//! - The wire data model ([`types`]): requests, responses, and the canonical
//!   unordered [`types::DifSet`] used for storage and membership.
//! - The generic closed-object validator ([`schema`]) that turns untrusted
//!   JSON into well-formed requests.

pub mod schema;
pub mod types;

pub use schema::{Schema, SchemaError};
pub use types::{
    ContentItem, Dif, DifCollection, DifSet, IdentifyRequest, IdentifyResponse, IdentifyResult,
    KeyRegistrationRequest, KeyRegistrationResponse, RegistrationOutcome, Uniqueness,
};
