//! Wiring of store, access controller, synchronizer and reaper.

use std::sync::Arc;

use suitegate_auth::{AccessController, AuthorizationStore, KeyValueStorage};
use suitegate_core::{Clock, GateConfig, SuiteCatalog};

use crate::history::History;
use crate::preference::ActiveSuitePreference;
use crate::reaper::ExpiryReaper;
use crate::route_sync::RouteSynchronizer;

/// A fully wired suite gate over one storage origin.
///
/// The synchronizer and the reaper share the same [`AuthorizationStore`], so
/// a reaper pass is visible to the next validity check the view makes.
pub struct Gate<H: History> {
    pub router: RouteSynchronizer<H>,
    pub reaper: ExpiryReaper,
    pub config: GateConfig,
}

impl<H: History> Gate<H> {
    pub fn new(
        config: GateConfig,
        catalog: SuiteCatalog,
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
        history: H,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let store = Arc::new(AuthorizationStore::open(
            storage.clone(),
            catalog.clone(),
            config.access_key.clone(),
        ));
        let access = AccessController::new(
            store.clone(),
            catalog,
            clock.clone(),
            config.grant_ttl_delta(),
        );
        let preference = ActiveSuitePreference::new(storage, config.preference_key.clone());
        let router = RouteSynchronizer::new(access, preference, history, &config);
        let reaper = ExpiryReaper::new(store, clock, config.reaper_interval);

        Self {
            router,
            reaper,
            config,
        }
    }
}
