//! Leptos application: suite switcher, gated suite view and unlock modal.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::*;

use suitegate_core::{GateConfig, SuiteCatalog, SuiteId, SystemClock};

use crate::frontend::browser::{BrowserHistory, LocalStorage};
use crate::gate::Gate;
use crate::resolver::path_within;
use crate::route_sync::{RouteSynchronizer, SuiteGate};
use crate::types::GateView;

type BrowserRouter = RouteSynchronizer<BrowserHistory>;

/// Shared handle to the synchronizer plus the last rendered snapshot.
#[derive(Clone)]
struct GateContext {
    router: Rc<RefCell<BrowserRouter>>,
    view: RwSignal<GateView>,
}

impl GateContext {
    /// Run an action against the synchronizer, then re-render.
    fn update<R>(&self, action: impl FnOnce(&mut BrowserRouter) -> R) -> R {
        let result = action(&mut self.router.borrow_mut());
        self.refresh();
        result
    }

    fn refresh(&self) {
        self.view.set(self.router.borrow().view());
    }
}

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
    let catalog = SuiteCatalog::standard();
    let suites: Vec<(SuiteId, String)> = catalog
        .iter()
        .map(|s| (s.id.clone(), s.label.clone()))
        .collect();

    let Gate {
        mut router,
        reaper,
        config,
    } = Gate::new(
        GateConfig::default(),
        catalog,
        Arc::new(LocalStorage),
        Arc::new(SystemClock),
        BrowserHistory,
    );
    router.bootstrap();

    let ctx = GateContext {
        view: create_rw_signal(router.view()),
        router: Rc::new(RefCell::new(router)),
    };
    provide_context(ctx.clone());

    // Reaper lives as long as the app is mounted.
    let reaper_ctx = ctx.clone();
    match set_interval_with_handle(
        move || {
            let removed = reaper.tick();
            if reaper_ctx.router.borrow().handle_pruned(&removed) {
                reaper_ctx.refresh();
            }
        },
        config.reaper_interval,
    ) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(e) => tracing::warn!(error = ?e, "failed to schedule expiry reaper"),
    }

    let pop_ctx = ctx.clone();
    let popstate = window_event_listener(ev::popstate, move |_| {
        pop_ctx.update(|router| router.path_changed());
    });
    on_cleanup(move || popstate.remove());

    view! {
        <div class="app">
            <header>
                <h1>"Dashboard"</h1>
                <SuiteNav suites=suites/>
            </header>

            <main>
                <SuiteContent/>
            </main>

            <ChallengeModal/>
        </div>
    }
}

/// Suite switcher.
#[component]
fn SuiteNav(suites: Vec<(SuiteId, String)>) -> impl IntoView {
    let ctx = expect_context::<GateContext>();

    view! {
        <nav class="suites">
            {suites
                .into_iter()
                .map(|(id, label)| {
                    let active_ctx = ctx.clone();
                    let click_ctx = ctx.clone();
                    let active_id = id.clone();
                    view! {
                        <button
                            class:active=move || active_ctx.view.with(|v| v.active_suite == active_id)
                            on:click=move |_| {
                                let suite = id.clone();
                                click_ctx.update(|router| {
                                    if router.request_suite_change(suite.clone()) {
                                        let prefix = suite.route_prefix();
                                        if !path_within(&router.current_path(), &prefix) {
                                            router.navigate(&prefix);
                                        }
                                    }
                                });
                            }
                        >
                            {label}
                        </button>
                    }
                })
                .collect_view()}
        </nav>
    }
}

/// Suite-scoped content, or a "request access" placeholder while locked.
#[component]
fn SuiteContent() -> impl IntoView {
    let ctx = expect_context::<GateContext>();

    move || {
        let gate = ctx.view.get();
        if gate.locked {
            let unlock_ctx = ctx.clone();
            let suite = gate.active_suite.clone();
            view! {
                <section class="suite locked">
                    <h2>{gate.active_label}</h2>
                    <p>"This suite is password protected."</p>
                    <button on:click=move |_| {
                        let suite = suite.clone();
                        unlock_ctx.update(|router| router.request_unlock(suite));
                    }>
                        "Request access"
                    </button>
                </section>
            }
            .into_view()
        } else {
            view! {
                <section class="suite">
                    <h2>{gate.active_label}</h2>
                    <p class="path">{gate.path}</p>
                    {gate
                        .expires_at
                        .map(|at| view! { <p class="expiry">{format!("Access until {}", at.format("%H:%M"))}</p> })}
                </section>
            }
            .into_view()
        }
    }
}

/// Password challenge modal.
#[component]
fn ChallengeModal() -> impl IntoView {
    let ctx = expect_context::<GateContext>();

    move || {
        ctx.view.get().challenge.map(|challenge| {
            let input_ctx = ctx.clone();
            let submit_ctx = ctx.clone();
            let cancel_ctx = ctx.clone();

            view! {
                <div class="modal">
                    <form on:submit=move |ev: ev::SubmitEvent| {
                        ev.prevent_default();
                        submit_ctx.update(|router| {
                            let candidate = router
                                .challenge()
                                .map(|c| c.input_value().to_string())
                                .unwrap_or_default();
                            // Rejections are shown through the challenge's error message.
                            let _ = router.submit_challenge(&candidate);
                        });
                    }>
                        <h3>{format!("Unlock {}", challenge.target_label)}</h3>
                        <input
                            type="password"
                            autofocus=true
                            prop:value=challenge.input_value
                            on:input=move |ev| {
                                // No re-render here: keeps focus in the field.
                                let value = event_target_value(&ev);
                                input_ctx.router.borrow_mut().set_challenge_input(value);
                            }
                        />
                        {challenge.error_message.map(|message| view! { <p class="error">{message}</p> })}
                        <div class="actions">
                            <button type="submit">"Unlock"</button>
                            <button type="button" on:click=move |_| cancel_ctx.update(|router| router.cancel_challenge())>
                                "Cancel"
                            </button>
                        </div>
                    </form>
                </div>
            }
        })
    }
}
