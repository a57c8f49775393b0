//! Content-deduplication identification service
//!
//! Clients POST content items, each fingerprinted by one or more named
//! collections of identifying fields ("difs"); the service reports, per
//! item, whether an equivalent collection has been seen before under the
//! client's key, and records newly-seen collections for next time.
//!
//! ## API Endpoints
//!
//! - `POST /` - Identify content items as unique or duplicate
//! - `POST /register` - Register a new client key (super-key required)
//!
//! Any other path is 404 and any other method 405; bodies over 1024 bytes
//! are refused with 413. Application-level faults never surface as 500s.

pub mod api;
pub mod audit;
pub mod config;
pub mod core;
pub mod keys;
pub mod storage;

pub use api::{create_router, AppState};
pub use audit::{AuditSink, FileSink, NullSink, TracingSink};
pub use config::{AuditConfig, ServiceConfig, StoreConfig};
pub use self::core::{DedupEngine, ItemVerdict};
pub use keys::{KeyRegistry, RegistryError};
pub use storage::{smoke_test, FactStore, FileStore, MemoryStore, StoreError};
