//! Per-suite lock state machine.
//!
//! Each suite is either **Locked** or **Unlocked(expires_at)**:
//!
//! - Locked → Unlocked(now + ttl) on an exact password match
//! - Unlocked → Locked once `expires_at` passes, noticed either by the reaper
//!   or lazily by [`AccessController::is_authorized`]
//!
//! Passwords are shared static secrets compared locally. There is no attempt
//! counter and no lockout.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use suitegate_core::{Clock, SuiteCatalog, SuiteId};

use crate::grant::AuthorizationGrant;
use crate::store::AuthorizationStore;

/// Why a password submission did not unlock a suite.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("Incorrect password. Please try again.")]
    IncorrectPassword,

    #[error("unknown suite '{0}'")]
    UnknownSuite(SuiteId),
}

/// Successful unlock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Granted {
    pub suite: SuiteId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AccessController {
    store: Arc<AuthorizationStore>,
    catalog: Arc<SuiteCatalog>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl AccessController {
    pub fn new(
        store: Arc<AuthorizationStore>,
        catalog: Arc<SuiteCatalog>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            ttl,
        }
    }

    pub fn store(&self) -> &Arc<AuthorizationStore> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<SuiteCatalog> {
        &self.catalog
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether `suite` is currently unlocked.
    ///
    /// Finding an expired grant removes it from the store, so an expired
    /// suite is never reported as present afterwards.
    pub fn is_authorized(&self, suite: &SuiteId) -> bool {
        if !self.catalog.contains(suite) {
            return false;
        }
        self.store.check_and_expire(suite, self.clock.now())
    }

    /// Compare `candidate` (trimmed) with the suite's secret.
    ///
    /// On a match the suite's grant is replaced with one expiring `ttl` from
    /// now, capped at the latest representable instant. On a mismatch
    /// nothing is touched.
    pub fn submit_password(&self, suite: &SuiteId, candidate: &str) -> Result<Granted, AccessDenied> {
        let secret = self
            .catalog
            .secret_for(suite)
            .ok_or_else(|| AccessDenied::UnknownSuite(suite.clone()))?;

        if candidate.trim() != secret {
            return Err(AccessDenied::IncorrectPassword);
        }

        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.store
            .grant(AuthorizationGrant::new(suite.clone(), expires_at));
        tracing::info!(suite = %suite, %expires_at, "suite unlocked");

        Ok(Granted {
            suite: suite.clone(),
            expires_at,
        })
    }

    /// Drop the suite's grant if present.
    pub fn revoke(&self, suite: &SuiteId) -> bool {
        let removed = self.store.revoke(suite);
        if removed {
            tracing::debug!(suite = %suite, "suite grant revoked");
        }
        removed
    }

    /// Expiry of the suite's current grant, if it is still valid.
    pub fn expires_at(&self, suite: &SuiteId) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.store
            .get(suite)
            .filter(|grant| grant.is_valid_at(now))
            .map(|grant| grant.expires_at)
    }

    /// Time left on the suite's grant, if it is still valid.
    pub fn remaining(&self, suite: &SuiteId) -> Option<Duration> {
        self.expires_at(suite)
            .map(|expires_at| expires_at - self.clock.now())
    }
}
