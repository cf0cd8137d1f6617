//! Client Session
//!
//! Persisted key-value fields (token, supplier id/name, theme, role, quote
//! history) and the typed [`Session`] context views read them through.

mod context;
mod store;

pub use context::{Role, Session, SessionGrant, DEFAULT_THEME};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
