//! Leptos frontend for the browser build.

pub mod app;
pub mod browser;

use wasm_bindgen::prelude::*;

/// Runs when the WASM module loads.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    suitegate_observability::init();
    leptos::mount_to_body(app::App);
}
