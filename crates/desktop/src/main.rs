//! Headless shell: drives the suite gate from stdin.
//!
//! ```text
//! suitegate-desktop [initial-path]
//!
//! status              show active suite, lock state and open challenge
//! switch <suite>      request a suite change
//! request <suite>     ask for a suite's password without switching
//! unlock <password>   answer the open challenge
//! cancel              close the open challenge
//! go <path>           navigate to a path
//! back                go back one history entry
//! quit
//! ```

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::sync::Arc;

    use anyhow::Context;
    use tokio::io::{AsyncBufReadExt, BufReader};

    use suitegate_core::{GateConfig, SuiteCatalog, SuiteId, SystemClock};
    use suitegate_desktop::{
        ChallengeError, FileStorage, Gate, GateView, MemoryHistory, RouteSynchronizer, SuiteGate,
    };

    pub async fn run() -> anyhow::Result<()> {
        suitegate_observability::init();

        let config = GateConfig::from_env().context("invalid SUITEGATE_* configuration")?;
        let storage = FileStorage::open_default().context("failed to open suite state storage")?;
        tracing::info!(dir = ?storage.dir(), "using suite state directory");

        let initial_path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| config.landing_path.clone());

        let Gate {
            mut router,
            reaper,
            config: _,
        } = Gate::new(
            config,
            SuiteCatalog::standard(),
            Arc::new(storage),
            Arc::new(SystemClock),
            MemoryHistory::new(initial_path),
        );

        let reaper = reaper.on_prune(|removed| {
            for suite in removed {
                tracing::info!(suite = %suite, "suite locked: grant expired");
            }
        });
        let reaper_handle = reaper.start();

        router.bootstrap();
        print_view(&router.view());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read stdin")? else { break };
                    if !handle_line(&mut router, line.trim()) {
                        break;
                    }
                }
            }
        }

        reaper_handle.stop().await;
        Ok(())
    }

    /// Returns false when the shell should exit.
    fn handle_line(router: &mut RouteSynchronizer<MemoryHistory>, line: &str) -> bool {
        let (command, arg) = match line.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command {
            "" => return true,
            "quit" | "exit" => return false,
            "status" => {}
            "switch" => {
                if !router.request_suite_change(SuiteId::from(arg.to_string())) {
                    println!("{arg} is locked; enter its password with `unlock <password>`");
                }
            }
            "request" => router.request_unlock(SuiteId::from(arg.to_string())),
            "unlock" => match router.submit_challenge(arg) {
                Ok(granted) => println!("{} unlocked until {}", granted.suite, granted.expires_at),
                Err(ChallengeError::NoChallenge) => println!("nothing to unlock"),
                Err(ChallengeError::Rejected(denied)) => println!("{denied}"),
            },
            "cancel" => router.cancel_challenge(),
            "go" => router.navigate(arg),
            "back" => {
                if router.history_mut().back() {
                    router.path_changed();
                } else {
                    println!("already at the first page");
                }
            }
            other => {
                println!("unknown command '{other}'");
                return true;
            }
        }

        print_view(&router.view());
        true
    }

    fn print_view(view: &GateView) {
        let state = if view.locked { "locked" } else { "unlocked" };
        println!("[{}] {} ({state}) at {}", view.active_suite, view.active_label, view.path);
        if let Some(expires_at) = view.expires_at {
            println!("  grant expires {expires_at}");
        }
        if let Some(challenge) = &view.challenge {
            println!("  password required for {}", challenge.target_label);
            if let Some(error) = &challenge.error_message {
                println!("  {error}");
            }
        }
    }
}
