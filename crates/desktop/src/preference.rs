//! Last-viewed suite, remembered across reloads.
//!
//! This is a preference, not an authorization: it is kept even while the
//! suite is locked, and is stored apart from grants.

use std::sync::Arc;

use suitegate_auth::KeyValueStorage;
use suitegate_core::SuiteId;

#[derive(Clone)]
pub struct ActiveSuitePreference {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl core::fmt::Debug for ActiveSuitePreference {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActiveSuitePreference")
            .field("key", &self.key)
            .finish()
    }
}

impl ActiveSuitePreference {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Stored identifier as written, not checked against the catalog.
    pub fn load(&self) -> Option<SuiteId> {
        match self.storage.get(&self.key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => Some(SuiteId::from(raw.trim().to_string())),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to read suite preference");
                None
            }
        }
    }

    pub fn save(&self, suite: &SuiteId) {
        if let Err(err) = self.storage.set(&self.key, suite.as_str()) {
            tracing::warn!(key = %self.key, error = %err, "failed to persist suite preference");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suitegate_auth::MemoryStorage;

    #[test]
    fn round_trips_raw_identifier() {
        let storage = MemoryStorage::new();
        let pref = ActiveSuitePreference::new(Arc::new(storage.clone()), "suite-preference");

        assert_eq!(pref.load(), None);
        pref.save(&SuiteId::from("people"));
        assert_eq!(storage.raw("suite-preference").as_deref(), Some("people"));
        assert_eq!(pref.load(), Some(SuiteId::from("people")));
    }

    #[test]
    fn blank_value_counts_as_absent() {
        let storage = MemoryStorage::new().with_entry("suite-preference", "  ");
        let pref = ActiveSuitePreference::new(Arc::new(storage), "suite-preference");
        assert_eq!(pref.load(), None);
    }
}
