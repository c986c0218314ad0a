//! Active suite ↔ browser path synchronization.
//!
//! Three triggers feed one consistent view:
//!
//! 1. [`RouteSynchronizer::bootstrap`]: once at startup: seed the active
//!    suite from the initial path and challenge it if locked.
//! 2. [`RouteSynchronizer::reconcile`]: after every active-suite or path
//!    change: repair unknown suites, challenge a locked active suite, and
//!    redirect paths that left the active suite's prefix.
//! 3. Explicit user actions: [`RouteSynchronizer::request_suite_change`],
//!    [`RouteSynchronizer::submit_challenge`],
//!    [`RouteSynchronizer::cancel_challenge`].
//!
//! The landing path is never redirected and never triggers a challenge.

use thiserror::Error;

use suitegate_auth::{AccessController, AccessDenied, Granted};
use suitegate_core::{GateConfig, SuiteCatalog, SuiteId};

use crate::challenge::PasswordChallenge;
use crate::history::History;
use crate::preference::ActiveSuitePreference;
use crate::resolver::{is_landing_path, path_within, suite_from_path};
use crate::types::{ChallengeView, GateView};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("no password challenge is open")]
    NoChallenge,

    #[error(transparent)]
    Rejected(#[from] AccessDenied),
}

/// What the rest of the application needs to know about suite access.
pub trait SuiteGate {
    fn active_suite(&self) -> &SuiteId;

    fn is_locked(&self, suite: &SuiteId) -> bool;

    /// Ask for the suite's password without switching to it.
    fn request_unlock(&mut self, suite: SuiteId);
}

pub struct RouteSynchronizer<H: History> {
    access: AccessController,
    preference: ActiveSuitePreference,
    history: H,
    landing_path: String,
    active: SuiteId,
    challenge: Option<PasswordChallenge>,
    bootstrapped: bool,
}

impl<H: History> RouteSynchronizer<H> {
    /// The active suite starts from the stored preference, falling back to
    /// the catalog default. An unknown stored suite is repaired on the first
    /// [`reconcile`](Self::reconcile).
    pub fn new(
        access: AccessController,
        preference: ActiveSuitePreference,
        history: H,
        config: &GateConfig,
    ) -> Self {
        let active = preference
            .load()
            .unwrap_or_else(|| access.catalog().default_suite().clone());

        Self {
            access,
            preference,
            history,
            landing_path: config.landing_path.clone(),
            active,
            challenge: None,
            bootstrapped: false,
        }
    }

    pub fn access(&self) -> &AccessController {
        &self.access
    }

    pub fn catalog(&self) -> &SuiteCatalog {
        self.access.catalog()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Direct history access for back/forward; follow up with
    /// [`path_changed`](Self::path_changed).
    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    pub fn challenge(&self) -> Option<&PasswordChallenge> {
        self.challenge.as_ref()
    }

    pub fn current_path(&self) -> String {
        self.history.current_path()
    }

    /// One-shot startup reconciliation; later calls are ignored.
    ///
    /// Returns whether this call did the bootstrap.
    pub fn bootstrap(&mut self) -> bool {
        if self.bootstrapped {
            return false;
        }
        self.bootstrapped = true;

        self.access.store().reload();

        let path = self.history.current_path();
        if let Some(suite) = suite_from_path(&path, self.access.catalog()) {
            self.set_active(suite.clone());
            if !self.access.is_authorized(&suite) {
                self.open_challenge(suite);
            }
        }

        self.reconcile();
        true
    }

    /// Align active suite, authorization and path after any change.
    pub fn reconcile(&mut self) {
        if !self.access.catalog().contains(&self.active) {
            let fallback = self.access.catalog().default_suite().clone();
            tracing::debug!(suite = %self.active, fallback = %fallback, "active suite unknown; using default");
            self.set_active(fallback);
        }

        let path = self.history.current_path();
        if is_landing_path(&path, &self.landing_path) {
            return;
        }

        if self.challenge.is_none() && !self.access.is_authorized(&self.active) {
            self.open_challenge(self.active.clone());
        }

        let prefix = self.active.route_prefix();
        if !path_within(&path, &prefix) {
            tracing::debug!(from = %path, to = %prefix, "redirecting to active suite");
            self.history.replace(&prefix);
        }
    }

    /// Entry point for suite switcher controls.
    ///
    /// Returns false when a password challenge was opened instead; the
    /// caller should not navigate in that case.
    pub fn request_suite_change(&mut self, suite: SuiteId) -> bool {
        if suite == self.active {
            return true;
        }

        if !self.access.catalog().contains(&suite) {
            let fallback = self.access.catalog().default_suite().clone();
            self.adopt(fallback);
            return true;
        }

        if self.access.is_authorized(&suite) {
            self.adopt(suite);
            return true;
        }

        self.open_challenge(suite);
        false
    }

    /// Submit a password for the open challenge's target suite.
    ///
    /// On success the suite becomes active, the challenge closes and the
    /// view moves into the suite unless the path is already inside it. On
    /// failure the challenge stays open with its error message set.
    pub fn submit_challenge(&mut self, candidate: &str) -> Result<Granted, ChallengeError> {
        let target = self
            .challenge
            .as_ref()
            .map(|c| c.target().clone())
            .ok_or(ChallengeError::NoChallenge)?;

        match self.access.submit_password(&target, candidate) {
            Ok(granted) => {
                self.challenge = None;
                let prefix = target.route_prefix();
                self.adopt(target);
                if !path_within(&self.history.current_path(), &prefix) {
                    self.navigate(&prefix);
                }
                Ok(granted)
            }
            Err(denied) => {
                if let Some(challenge) = self.challenge.as_mut() {
                    challenge.reject(denied.to_string());
                }
                Err(denied.into())
            }
        }
    }

    /// Close the challenge; active suite and path stay as they are.
    pub fn cancel_challenge(&mut self) {
        self.challenge = None;
    }

    pub fn set_challenge_input(&mut self, value: impl Into<String>) {
        if let Some(challenge) = self.challenge.as_mut() {
            challenge.set_input(value);
        }
    }

    /// Push a new path (in-app link) and reconcile.
    pub fn navigate(&mut self, path: &str) {
        self.history.push(path);
        self.reconcile();
    }

    /// The path changed underneath us (back/forward); reconcile only.
    pub fn path_changed(&mut self) {
        self.reconcile();
    }

    /// Observe a reaper pass. Returns true if the active suite was among the
    /// pruned suites, i.e. the view must now render it locked.
    pub fn handle_pruned(&self, removed: &[SuiteId]) -> bool {
        let relocked = removed.contains(&self.active);
        if relocked {
            tracing::debug!(suite = %self.active, "active suite grant expired");
        }
        relocked
    }

    /// Render-time snapshot.
    pub fn view(&self) -> GateView {
        let catalog = self.access.catalog();
        let locked = !self.access.is_authorized(&self.active);

        GateView {
            active_suite: self.active.clone(),
            active_label: label(catalog, &self.active),
            locked,
            expires_at: self.access.expires_at(&self.active),
            path: self.history.current_path(),
            challenge: self.challenge.as_ref().map(|c| ChallengeView {
                target_suite: c.target().clone(),
                target_label: label(catalog, c.target()),
                input_value: c.input_value().to_string(),
                error_message: c.error_message().map(str::to_string),
            }),
        }
    }

    fn adopt(&mut self, suite: SuiteId) {
        self.set_active(suite);
        self.reconcile();
    }

    fn set_active(&mut self, suite: SuiteId) {
        if suite != self.active {
            self.active = suite;
            self.preference.save(&self.active);
        }
    }

    fn open_challenge(&mut self, suite: SuiteId) {
        tracing::debug!(suite = %suite, "opening password challenge");
        self.challenge = Some(PasswordChallenge::new(suite));
    }
}

impl<H: History> SuiteGate for RouteSynchronizer<H> {
    fn active_suite(&self) -> &SuiteId {
        &self.active
    }

    fn is_locked(&self, suite: &SuiteId) -> bool {
        !self.access.is_authorized(suite)
    }

    fn request_unlock(&mut self, suite: SuiteId) {
        if !self.access.catalog().contains(&suite) {
            tracing::debug!(suite = %suite, "ignoring unlock request for unknown suite");
            return;
        }
        if self.access.is_authorized(&suite) {
            return;
        }
        self.open_challenge(suite);
    }
}

fn label(catalog: &SuiteCatalog, suite: &SuiteId) -> String {
    catalog
        .label_for(suite)
        .map(str::to_string)
        .unwrap_or_else(|| suite.to_string())
}
