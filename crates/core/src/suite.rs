//! Suite identifiers and the fixed catalog of gated workspaces.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Suite identifier.
///
/// Identifiers double as the first path segment of every route inside the
/// suite (`ops` owns `/ops/...`). Values read back from storage or from a URL
/// are arbitrary strings, so membership is always checked against a
/// [`SuiteCatalog`] rather than assumed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuiteId(Cow<'static, str>);

impl SuiteId {
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical route prefix for the suite (`/ops`).
    pub fn route_prefix(&self) -> String {
        format!("/{}", self.0)
    }
}

impl core::fmt::Display for SuiteId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for SuiteId {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for SuiteId {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// A catalog entry: identifier, display label and shared-secret password.
///
/// The secret is a plaintext string compiled into the client. It provides no
/// confidentiality; anyone holding the binary can read it.
#[derive(Clone, PartialEq, Eq)]
pub struct SuiteDefinition {
    pub id: SuiteId,
    pub label: String,
    secret: String,
}

impl SuiteDefinition {
    pub fn new(id: impl Into<SuiteId>, label: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl core::fmt::Debug for SuiteDefinition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SuiteDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// The closed set of suites known to the application.
///
/// Order matters: the first entry is the default suite used whenever the
/// active suite is missing or unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteCatalog {
    suites: Vec<SuiteDefinition>,
}

impl SuiteCatalog {
    /// Build a catalog, rejecting empty sets, duplicates and identifiers
    /// that cannot be a single path segment.
    pub fn new(suites: Vec<SuiteDefinition>) -> CatalogResult<Self> {
        if suites.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (idx, suite) in suites.iter().enumerate() {
            let id = suite.id.as_str();
            if id.is_empty() || id.contains(['/', '?', '#']) || id.trim() != id {
                return Err(CatalogError::invalid_id(id));
            }
            if suites[..idx].iter().any(|s| s.id == suite.id) {
                return Err(CatalogError::duplicate(id));
            }
        }

        Ok(Self { suites })
    }

    /// The reference catalog: operations, revenue and people.
    pub fn standard() -> Self {
        Self {
            suites: vec![
                SuiteDefinition::new("ops", "Operations", "ops-suite-2024"),
                SuiteDefinition::new("revenue", "Revenue", "revenue-suite-2024"),
                SuiteDefinition::new("people", "People", "people-suite-2024"),
            ],
        }
    }

    /// The first catalog suite.
    pub fn default_suite(&self) -> &SuiteId {
        &self.suites[0].id
    }

    pub fn contains(&self, id: &SuiteId) -> bool {
        self.get(id.as_str()).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&SuiteDefinition> {
        self.suites.iter().find(|s| s.id.as_str() == id)
    }

    /// Resolve a raw string to a catalog identifier.
    pub fn resolve(&self, raw: &str) -> Option<SuiteId> {
        self.get(raw).map(|s| s.id.clone())
    }

    pub fn secret_for(&self, id: &SuiteId) -> Option<&str> {
        self.get(id.as_str()).map(SuiteDefinition::secret)
    }

    pub fn label_for(&self, id: &SuiteId) -> Option<&str> {
        self.get(id.as_str()).map(|s| s.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SuiteDefinition> {
        self.suites.iter()
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

impl Default for SuiteCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
