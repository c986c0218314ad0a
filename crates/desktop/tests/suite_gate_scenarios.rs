use std::sync::Arc;

use chrono::Duration;
use suitegate_auth::{AuthorizationGrant, MemoryStorage};
use suitegate_core::{Clock, GateConfig, ManualClock, SuiteCatalog, SuiteId};
use suitegate_desktop::{ChallengeError, Gate, History, MemoryHistory, SuiteGate};

const OPS_SECRET: &str = "ops-suite-2024";
const REVENUE_SECRET: &str = "revenue-suite-2024";

struct Harness {
    storage: MemoryStorage,
    clock: Arc<ManualClock>,
    gate: Gate<MemoryHistory>,
}

impl Harness {
    fn at(path: &str) -> Self {
        Self::with_storage(MemoryStorage::new(), path)
    }

    fn with_storage(storage: MemoryStorage, path: &str) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let gate = Gate::new(
            GateConfig::default(),
            SuiteCatalog::standard(),
            Arc::new(storage.clone()),
            clock.clone(),
            MemoryHistory::new(path),
        );
        Self { storage, clock, gate }
    }

    fn grant(&self, suite: &'static str, ttl: Duration) {
        self.gate
            .router
            .access()
            .store()
            .grant(AuthorizationGrant::new(SuiteId::from(suite), self.clock.now() + ttl));
    }
}

fn suite(id: &'static str) -> SuiteId {
    SuiteId::from(id)
}

#[test]
fn fresh_load_on_landing_defaults_without_challenge_or_redirect() {
    let mut h = Harness::at("/");
    h.gate.router.bootstrap();

    let view = h.gate.router.view();
    assert_eq!(view.active_suite, suite("ops"));
    assert!(view.challenge.is_none());
    assert_eq!(view.path, "/");
    assert_eq!(h.gate.router.history().entries(), ["/"]);
}

#[test]
fn deep_link_to_locked_suite_unlocks_in_place() {
    let mut h = Harness::at("/revenue/deals");
    h.gate.router.bootstrap();

    let challenge = h.gate.router.view().challenge.expect("challenge for revenue");
    assert_eq!(challenge.target_suite, suite("revenue"));

    let started = h.clock.now();
    let granted = h.gate.router.submit_challenge(REVENUE_SECRET).unwrap();
    assert_eq!(granted.expires_at, started + Duration::minutes(30));

    let view = h.gate.router.view();
    assert_eq!(view.active_suite, suite("revenue"));
    assert!(!view.locked);
    assert!(view.challenge.is_none());
    assert_eq!(view.path, "/revenue/deals");
    assert_eq!(h.gate.router.history().entries(), ["/revenue/deals"]);

    let record = h.storage.raw("suite-access").unwrap();
    let persisted: serde_json::Value = serde_json::from_str(&record).unwrap();
    assert_eq!(persisted["revenue"], granted.expires_at.timestamp_millis());
}

#[test]
fn expired_grant_is_dropped_by_validity_check() {
    let h = Harness::at("/");
    h.grant("ops", Duration::milliseconds(-1000));

    assert!(h.gate.router.is_locked(&suite("ops")));
    assert!(h.gate.router.access().store().get(&suite("ops")).is_none());
}

#[test]
fn switching_to_locked_suite_opens_challenge_and_stays_put() {
    let mut h = Harness::at("/ops/tasks");
    h.grant("ops", Duration::minutes(10));
    h.gate.router.bootstrap();
    assert!(h.gate.router.view().challenge.is_none());

    assert!(!h.gate.router.request_suite_change(suite("people")));

    let view = h.gate.router.view();
    assert_eq!(view.active_suite, suite("ops"));
    assert_eq!(view.challenge.map(|c| c.target_suite), Some(suite("people")));
    assert_eq!(view.path, "/ops/tasks");
}

#[test]
fn wrong_password_keeps_challenge_open_with_error() {
    let mut h = Harness::at("/ops/tasks");
    h.grant("ops", Duration::minutes(10));
    h.gate.router.bootstrap();
    h.gate.router.request_suite_change(suite("people"));
    let before = h.storage.raw("suite-access");

    let err = h.gate.router.submit_challenge("definitely-wrong").unwrap_err();
    assert!(matches!(err, ChallengeError::Rejected(_)));

    let view = h.gate.router.view();
    let challenge = view.challenge.expect("challenge stays open");
    assert_eq!(challenge.target_suite, suite("people"));
    assert_eq!(
        challenge.error_message.as_deref(),
        Some("Incorrect password. Please try again.")
    );
    assert_eq!(view.active_suite, suite("ops"));
    assert_eq!(h.storage.raw("suite-access"), before);
}

#[test]
fn reaper_relocks_active_suite_only_after_expiry() {
    let mut h = Harness::at("/ops");
    h.gate.router.bootstrap();
    h.gate.router.submit_challenge(OPS_SECRET).unwrap();

    h.clock.advance(Duration::minutes(27));
    assert!(h.gate.reaper.tick().is_empty());
    assert!(!h.gate.router.view().locked);

    h.clock.advance(Duration::minutes(3));
    let removed = h.gate.reaper.tick();
    assert_eq!(removed, vec![suite("ops")]);
    assert!(h.gate.router.handle_pruned(&removed));
    assert!(h.gate.router.view().locked);
    assert_eq!(h.storage.raw("suite-access").as_deref(), Some("{}"));
}

#[test]
fn legacy_record_forces_reauthentication() {
    let storage = MemoryStorage::new().with_entry("suite-access", r#"["ops"]"#);
    let mut h = Harness::with_storage(storage, "/ops");

    assert!(h.gate.router.access().store().get(&suite("ops")).is_some());
    h.gate.router.bootstrap();

    assert!(h.gate.router.view().locked);
    assert_eq!(
        h.gate.router.view().challenge.map(|c| c.target_suite),
        Some(suite("ops"))
    );
}

#[test]
fn last_viewed_suite_is_remembered_while_locked() {
    let storage = MemoryStorage::new();
    {
        let mut h = Harness::with_storage(storage.clone(), "/people/team");
        h.gate.router.bootstrap();
        h.gate.router.cancel_challenge();
    }

    let mut h = Harness::with_storage(storage, "/");
    h.gate.router.bootstrap();
    let view = h.gate.router.view();
    assert_eq!(view.active_suite, suite("people"));
    assert!(view.locked);
    assert!(view.challenge.is_none());
}

#[test]
fn grant_from_another_instance_is_seen_on_bootstrap() {
    let storage = MemoryStorage::new();
    let mut first = Harness::with_storage(storage.clone(), "/revenue");
    let mut second = Harness::with_storage(storage, "/revenue");

    first.gate.router.bootstrap();
    first.gate.router.submit_challenge(REVENUE_SECRET).unwrap();

    second.gate.router.bootstrap();
    assert!(second.gate.router.view().challenge.is_none());
    assert!(!second.gate.router.is_locked(&suite("revenue")));
}

#[test]
fn back_navigation_is_not_polluted_by_redirects() {
    let mut h = Harness::at("/");
    h.grant("ops", Duration::minutes(10));
    h.gate.router.bootstrap();

    h.gate.router.navigate("/reports");
    assert_eq!(h.gate.router.history().entries(), ["/", "/ops"]);
    assert_eq!(h.gate.router.history().current_path(), "/ops");
}

#[test]
fn switching_from_landing_then_unlocking_lands_in_the_suite() {
    let mut h = Harness::at("/");
    h.gate.router.bootstrap();

    assert!(!h.gate.router.request_suite_change(suite("revenue")));
    assert_eq!(h.gate.router.view().path, "/");

    h.gate.router.submit_challenge(REVENUE_SECRET).unwrap();

    let view = h.gate.router.view();
    assert_eq!(view.active_suite, suite("revenue"));
    assert!(!view.locked);
    assert_eq!(view.path, "/revenue");
}

#[test]
fn oversized_ttl_from_environment_is_rejected() {
    let err = GateConfig::from_lookup(|key| {
        (key == "SUITEGATE_GRANT_TTL_SECS").then(|| "10000000000000".to_string())
    })
    .unwrap_err();
    assert!(matches!(err, suitegate_core::ConfigError::InvalidDuration { .. }));
}

#[test]
fn back_navigation_reconciles_against_the_earlier_path() {
    let mut h = Harness::at("/");
    h.grant("ops", Duration::minutes(10));
    h.gate.router.bootstrap();

    h.gate.router.navigate("/ops/tasks");
    assert!(h.gate.router.history_mut().back());
    h.gate.router.path_changed();

    assert_eq!(h.gate.router.current_path(), "/");
    assert!(h.gate.router.view().challenge.is_none());
}
