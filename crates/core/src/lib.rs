//! `suitegate-core`: suite catalog and shared building blocks.
//!
//! This crate contains **pure** primitives (no storage, no UI concerns).

pub mod clock;
pub mod config;
pub mod error;
pub mod suite;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GateConfig};
pub use error::{CatalogError, CatalogResult};
pub use suite::{SuiteCatalog, SuiteDefinition, SuiteId};
