//! Tracing/logging initialization.
//!
//! Native builds log JSON lines to stderr. Browser builds send the same JSON
//! lines to the devtools console, routed by level.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset (always the case in the browser).
pub const DEFAULT_FILTER: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    // stdout stays free for the shell's own output.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize tracing/logging for the page.
///
/// Safe to call multiple times (subsequent calls are no-ops).
#[cfg(target_arch = "wasm32")]
pub fn init() {
    // No wall clock through std on wasm32-unknown-unknown; the console
    // timestamps entries itself.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .json()
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .with_writer(console::MakeConsoleWriter)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;

    use ::tracing::{Level, Metadata};
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    /// Hands out one [`ConsoleWriter`] per event.
    pub struct MakeConsoleWriter;

    impl<'a> MakeWriter<'a> for MakeConsoleWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter::new(Level::INFO)
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            ConsoleWriter::new(*meta.level())
        }
    }

    /// Buffers one formatted event and emits it on drop.
    pub struct ConsoleWriter {
        level: Level,
        buf: Vec<u8>,
    }

    impl ConsoleWriter {
        fn new(level: Level) -> Self {
            Self { level, buf: Vec::new() }
        }
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            if self.buf.is_empty() {
                return;
            }
            let line = String::from_utf8_lossy(&self.buf);
            let message = JsValue::from_str(line.trim_end());
            match self.level {
                Level::ERROR => web_sys::console::error_1(&message),
                Level::WARN => web_sys::console::warn_1(&message),
                Level::INFO => web_sys::console::info_1(&message),
                _ => web_sys::console::debug_1(&message),
            }
        }
    }
}
