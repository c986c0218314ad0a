//! `suitegate-auth`: client-side suite grants and the unlock state machine.
//!
//! This crate knows nothing about routing or UI. It is not an
//! authentication system: secrets are shared static strings from the suite
//! catalog and grants live only in local storage.

pub mod access;
pub mod grant;
pub mod storage;
pub mod store;

pub use access::{AccessController, AccessDenied, Granted};
pub use grant::{AuthorizationGrant, GrantMap, Pruned};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};
pub use store::{AuthorizationStore, MalformedRecord, Normalized, normalize, parse_record};
