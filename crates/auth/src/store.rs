//! Persisted suite grants.
//!
//! The store keeps the current [`GrantMap`] in memory and mirrors it to a
//! single storage record after every committed mutation. Every mutation is a
//! read-modify-write of the current snapshot under one lock, so a reaper pass
//! racing a fresh grant cannot resurrect the pre-grant map.
//!
//! Record shape (`suite-access` by default):
//!
//! ```text
//! {"ops": 1760000000000, "revenue": 1760000360000}   current: suite → epoch ms
//! ["ops", "revenue"]                                 legacy: needs re-authentication
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use suitegate_core::{SuiteCatalog, SuiteId};

use crate::grant::{AuthorizationGrant, GrantMap};
use crate::storage::KeyValueStorage;

/// Persisted record could not be interpreted as either known shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("record is not valid JSON: {0}")]
    Syntax(String),

    #[error("expected an object or an array, found {0}")]
    Shape(&'static str),
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub map: GrantMap,
    /// Whether the normalized map differs from what was persisted (legacy
    /// shape converted, unknown suites or bad expiries dropped).
    pub changed: bool,
}

/// Interpret a raw persisted record against the catalog.
///
/// - legacy array of suite names: every known entry becomes an already
///   expired grant, so the suite is remembered but must be re-unlocked
/// - object of suite → expiry: kept as-is when the suite is known and the
///   expiry is a finite number of epoch milliseconds
///
/// Anything else is dropped.
pub fn normalize(raw: &Value, catalog: &SuiteCatalog) -> Result<Normalized, MalformedRecord> {
    match raw {
        Value::Array(entries) => {
            let map: GrantMap = entries
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|name| catalog.resolve(name))
                .map(AuthorizationGrant::expired)
                .collect();
            Ok(Normalized { map, changed: true })
        }
        Value::Object(entries) => {
            let mut map = GrantMap::new();
            let mut changed = false;

            for (name, expiry) in entries {
                let grant = catalog
                    .resolve(name)
                    .zip(expiry_from_value(expiry))
                    .map(|(suite, expires_at)| AuthorizationGrant::new(suite, expires_at));

                match grant {
                    Some(grant) => {
                        map.insert(grant);
                    }
                    None => changed = true,
                }
            }

            Ok(Normalized { map, changed })
        }
        Value::Null => Err(MalformedRecord::Shape("null")),
        Value::Bool(_) => Err(MalformedRecord::Shape("a boolean")),
        Value::Number(_) => Err(MalformedRecord::Shape("a number")),
        Value::String(_) => Err(MalformedRecord::Shape("a string")),
    }
}

/// Parse and normalize persisted bytes.
pub fn parse_record(raw: &str, catalog: &SuiteCatalog) -> Result<Normalized, MalformedRecord> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| MalformedRecord::Syntax(e.to_string()))?;
    normalize(&value, catalog)
}

fn expiry_from_value(value: &Value) -> Option<DateTime<Utc>> {
    let millis = match value.as_i64() {
        Some(millis) => millis,
        None => {
            let float = value.as_f64()?;
            if !float.is_finite() {
                return None;
            }
            float.trunc() as i64
        }
    };
    DateTime::from_timestamp_millis(millis)
}

/// Owner of the persisted suite → grant mapping.
pub struct AuthorizationStore {
    storage: Arc<dyn KeyValueStorage>,
    catalog: Arc<SuiteCatalog>,
    key: String,
    grants: Mutex<GrantMap>,
}

impl core::fmt::Debug for AuthorizationStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthorizationStore")
            .field("key", &self.key)
            .field("grants", &*self.lock())
            .finish()
    }
}

impl AuthorizationStore {
    /// Load the record under `key` and keep it in memory.
    ///
    /// If normalization changed anything, the cleaned map is written back
    /// immediately so unknown suites do not linger in storage.
    pub fn open(
        storage: Arc<dyn KeyValueStorage>,
        catalog: Arc<SuiteCatalog>,
        key: impl Into<String>,
    ) -> Self {
        let store = Self {
            storage,
            catalog,
            key: key.into(),
            grants: Mutex::new(GrantMap::new()),
        };
        store.reload();
        store
    }

    /// Read the persisted record; never fails.
    ///
    /// Missing data yields an empty map. Unreadable or malformed data is
    /// logged and also yields an empty map.
    pub fn load(&self) -> Normalized {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                return Normalized {
                    map: GrantMap::new(),
                    changed: false,
                };
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to read suite grants; starting empty");
                return Normalized {
                    map: GrantMap::new(),
                    changed: false,
                };
            }
        };

        match parse_record(&raw, &self.catalog) {
            Ok(normalized) => normalized,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "ignoring malformed suite grants");
                Normalized {
                    map: GrantMap::new(),
                    changed: false,
                }
            }
        }
    }

    /// Replace the in-memory snapshot with what storage currently holds.
    ///
    /// This is how grants written by another instance on the same storage
    /// become visible here.
    pub fn reload(&self) {
        let normalized = self.load();
        let mut grants = self.lock();
        if normalized.changed {
            tracing::debug!(key = %self.key, "normalized persisted suite grants");
            self.persist(&normalized.map);
        }
        *grants = normalized.map;
    }

    /// Serialize the full mapping to storage.
    ///
    /// Write failures are logged; the in-memory snapshot stays authoritative
    /// for this instance.
    pub fn persist(&self, map: &GrantMap) {
        let payload = match serde_json::to_string(&map.to_record()) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to serialize suite grants");
                return;
            }
        };

        if let Err(err) = self.storage.set(&self.key, &payload) {
            tracing::warn!(key = %self.key, error = %err, "failed to persist suite grants");
        }
    }

    pub fn catalog(&self) -> &SuiteCatalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> GrantMap {
        self.lock().clone()
    }

    pub fn get(&self, suite: &SuiteId) -> Option<AuthorizationGrant> {
        self.lock().get(suite).cloned()
    }

    /// Pure validity check against the current snapshot.
    pub fn is_valid(&self, suite: &SuiteId, now: DateTime<Utc>) -> bool {
        self.lock().is_valid(suite, now)
    }

    /// Validity check that drops the suite's grant if it has expired.
    pub fn check_and_expire(&self, suite: &SuiteId, now: DateTime<Utc>) -> bool {
        let mut grants = self.lock();
        match grants.get(suite) {
            Some(grant) if grant.is_valid_at(now) => true,
            Some(_) => {
                grants.remove(suite);
                self.persist(&grants);
                tracing::debug!(suite = %suite, "grant expired on access");
                false
            }
            None => false,
        }
    }

    /// Store a grant, replacing any prior grant for the same suite.
    pub fn grant(&self, grant: AuthorizationGrant) -> Option<AuthorizationGrant> {
        let mut grants = self.lock();
        let previous = grants.insert(grant);
        self.persist(&grants);
        previous
    }

    /// Remove a suite's grant; returns whether one existed.
    pub fn revoke(&self, suite: &SuiteId) -> bool {
        let mut grants = self.lock();
        let removed = grants.remove(suite).is_some();
        if removed {
            self.persist(&grants);
        }
        removed
    }

    /// Prune expired grants and commit the result only if anything changed.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> Vec<SuiteId> {
        let mut grants = self.lock();
        let pruned = grants.prune(now);
        if pruned.changed() {
            *grants = pruned.map;
            self.persist(&grants);
        }
        pruned.removed
    }

    fn lock(&self) -> MutexGuard<'_, GrantMap> {
        self.grants.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
