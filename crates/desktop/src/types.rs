//! Shared types for both native and frontend (WASM-compatible) builds.
//!
//! These are render-time snapshots handed to the view layer. They must not
//! depend on native-only dependencies like `tokio`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use suitegate_core::SuiteId;

/// What the gated view layer needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateView {
    pub active_suite: SuiteId,
    pub active_label: String,
    /// When true the suite content is replaced by a "request access" placeholder.
    pub locked: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub path: String,
    pub challenge: Option<ChallengeView>,
}

/// Open password challenge, as shown in the unlock modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeView {
    pub target_suite: SuiteId,
    pub target_label: String,
    pub input_value: String,
    pub error_message: Option<String>,
}
