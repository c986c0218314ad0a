//! Time-boxed suite grants and the pure operations over a grant map.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use suitegate_core::SuiteId;

/// Authorization to view one suite until `expires_at`.
///
/// Grants are never partially updated: renewing access replaces the whole
/// grant with a new expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationGrant {
    pub suite: SuiteId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl AuthorizationGrant {
    pub fn new(suite: SuiteId, expires_at: DateTime<Utc>) -> Self {
        Self { suite, expires_at }
    }

    /// A grant that exists but can never pass a validity check.
    ///
    /// Used for records that only say "this suite was unlocked once" and
    /// carry no expiry.
    pub fn expired(suite: SuiteId) -> Self {
        Self::new(suite, DateTime::UNIX_EPOCH)
    }

    /// Valid strictly before `expires_at`; a grant expiring exactly at `now`
    /// is already expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Suite → grant mapping with at most one grant per suite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantMap {
    grants: BTreeMap<SuiteId, AuthorizationGrant>,
}

/// Result of [`GrantMap::prune`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pruned {
    pub map: GrantMap,
    pub removed: Vec<SuiteId>,
}

impl Pruned {
    pub fn changed(&self) -> bool {
        !self.removed.is_empty()
    }
}

impl GrantMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a grant, replacing any prior grant for the same suite.
    pub fn insert(&mut self, grant: AuthorizationGrant) -> Option<AuthorizationGrant> {
        self.grants.insert(grant.suite.clone(), grant)
    }

    pub fn remove(&mut self, suite: &SuiteId) -> Option<AuthorizationGrant> {
        self.grants.remove(suite)
    }

    pub fn get(&self, suite: &SuiteId) -> Option<&AuthorizationGrant> {
        self.grants.get(suite)
    }

    pub fn contains(&self, suite: &SuiteId) -> bool {
        self.grants.contains_key(suite)
    }

    /// `suite in map && map[suite].expires_at > now`.
    pub fn is_valid(&self, suite: &SuiteId, now: DateTime<Utc>) -> bool {
        self.grants
            .get(suite)
            .is_some_and(|grant| grant.is_valid_at(now))
    }

    /// Drop every grant with `expires_at <= now`.
    pub fn prune(&self, now: DateTime<Utc>) -> Pruned {
        let mut map = GrantMap::new();
        let mut removed = Vec::new();

        for (suite, grant) in &self.grants {
            if grant.is_valid_at(now) {
                map.insert(grant.clone());
            } else {
                removed.push(suite.clone());
            }
        }

        Pruned { map, removed }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuthorizationGrant> {
        self.grants.values()
    }

    pub fn suites(&self) -> impl Iterator<Item = &SuiteId> {
        self.grants.keys()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Persisted shape: suite identifier → epoch-millisecond expiry.
    pub fn to_record(&self) -> BTreeMap<String, i64> {
        self.grants
            .iter()
            .map(|(suite, grant)| (suite.as_str().to_string(), grant.expires_at.timestamp_millis()))
            .collect()
    }
}

impl FromIterator<AuthorizationGrant> for GrantMap {
    fn from_iter<I: IntoIterator<Item = AuthorizationGrant>>(iter: I) -> Self {
        let mut map = GrantMap::new();
        for grant in iter {
            map.insert(grant);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn grant(suite: &'static str, millis: i64) -> AuthorizationGrant {
        AuthorizationGrant::new(SuiteId::from(suite), at(millis))
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = at(1_700_000_000_000);
        let map: GrantMap = [
            AuthorizationGrant::new(SuiteId::from("ops"), now),
            AuthorizationGrant::new(SuiteId::from("revenue"), now + Duration::milliseconds(1)),
        ]
        .into_iter()
        .collect();

        assert!(!map.is_valid(&SuiteId::from("ops"), now));
        assert!(map.is_valid(&SuiteId::from("revenue"), now));
        assert!(!map.is_valid(&SuiteId::from("people"), now));
    }

    #[test]
    fn insert_replaces_prior_grant() {
        let mut map = GrantMap::new();
        map.insert(grant("ops", 10));
        let previous = map.insert(grant("ops", 20));

        assert_eq!(previous, Some(grant("ops", 10)));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&SuiteId::from("ops")), Some(&grant("ops", 20)));
    }

    #[test]
    fn prune_removes_expired_and_reports_change() {
        let map: GrantMap = [grant("ops", 100), grant("revenue", 500)].into_iter().collect();

        let pruned = map.prune(at(100));
        assert!(pruned.changed());
        assert_eq!(pruned.removed, vec![SuiteId::from("ops")]);
        assert!(!pruned.map.contains(&SuiteId::from("ops")));
        assert!(pruned.map.contains(&SuiteId::from("revenue")));
    }

    #[test]
    fn prune_without_expired_grants_is_unchanged() {
        let map: GrantMap = [grant("ops", 1_000)].into_iter().collect();
        let pruned = map.prune(at(999));
        assert!(!pruned.changed());
        assert_eq!(pruned.map, map);
    }

    #[test]
    fn expired_grant_is_never_valid() {
        let g = AuthorizationGrant::expired(SuiteId::from("ops"));
        assert!(!g.is_valid_at(at(0)));
        assert_eq!(g.expires_at.timestamp_millis(), 0);
    }

    #[test]
    fn record_uses_epoch_millis() {
        let map: GrantMap = [grant("ops", 1_700_000_000_123)].into_iter().collect();
        let record = map.to_record();
        assert_eq!(record.get("ops"), Some(&1_700_000_000_123));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Pruning an already-pruned map is a no-op.
        #[test]
        fn prune_is_idempotent(
            expiries in prop::collection::vec(0i64..2_000, 0..3),
            now in 0i64..2_000,
        ) {
            let suites = ["ops", "revenue", "people"];
            let map: GrantMap = suites
                .iter()
                .zip(expiries)
                .map(|(suite, millis)| grant(*suite, millis))
                .collect();

            let once = map.prune(at(now));
            let twice = once.map.prune(at(now));

            prop_assert!(!twice.changed());
            prop_assert_eq!(twice.map, once.map.clone());
            prop_assert!(once.map.iter().all(|g| g.is_valid_at(at(now))));
        }
    }
}
