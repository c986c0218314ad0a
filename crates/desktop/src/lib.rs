//! `suitegate-desktop`
//!
//! **Responsibility:** client-side suite gating for the dashboard shell.
//!
//! This crate provides:
//! - Path → suite resolution
//! - Active-suite / path reconciliation and the password challenge flow
//! - The background reaper for expired grants
//! - Native file storage and a headless shell; a Leptos frontend on WASM
//!
//! Suite content itself (forms, charts, API clients) lives elsewhere and only
//! sees [`SuiteGate`] and the `locked` flag on [`GateView`].

pub mod challenge;
pub mod gate;
pub mod history;
pub mod preference;
pub mod reaper;
pub mod resolver;
pub mod route_sync;
pub mod types;

#[cfg(not(target_arch = "wasm32"))]
pub mod file_storage;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

pub use challenge::PasswordChallenge;
pub use gate::Gate;
pub use history::{History, MemoryHistory};
pub use preference::ActiveSuitePreference;
pub use reaper::{ExpiryReaper, PruneListener};
pub use resolver::{is_landing_path, path_within, suite_from_path};
pub use route_sync::{ChallengeError, RouteSynchronizer, SuiteGate};
pub use types::{ChallengeView, GateView};

#[cfg(not(target_arch = "wasm32"))]
pub use file_storage::FileStorage;
#[cfg(not(target_arch = "wasm32"))]
pub use reaper::ReaperHandle;
