//! Browser bridge for the ambient particle overlay.
//!
//! On load the module waits briefly for the host page to settle, then attaches
//! a full-viewport canvas, starts a `requestAnimationFrame` loop and injects
//! the settings panel into the host's extension settings area. Any startup
//! failure is logged and leaves the host page untouched.

use std::time::Duration;

use wasm_bindgen::prelude::*;

pub mod canvas;
pub mod panel;
pub mod runner;
pub mod storage;

pub use canvas::{CanvasProvider, CanvasSurface};
pub use runner::App;
pub use storage::LocalStorage;

/// Give the host application time to finish its own boot before touching the DOM.
const STARTUP_DELAY: Duration = Duration::from_millis(500);

#[wasm_bindgen(start)]
pub fn flurry_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let Some(window) = web_sys::window() else {
        log::warn!("ambient effects: no window, skipping");
        return;
    };
    let scheduled = runner::set_timeout(&window, STARTUP_DELAY, || {
        if let Err(err) = runner::boot() {
            log::warn!("ambient effects failed to start, skipped: {:?}", err);
        }
    });
    if let Err(err) = scheduled {
        log::warn!("ambient effects could not schedule startup: {:?}", err);
    }
}

/// Stop the animation loop and blank the overlay.
#[wasm_bindgen]
pub fn flurry_stop() {
    runner::stop();
}

#[wasm_bindgen]
pub fn flurry_is_running() -> bool {
    runner::is_running()
}

/// Drop every live particle; the pool regrows on the next frame.
#[wasm_bindgen]
pub fn flurry_reset_particles() {
    runner::with_app(|app| app.runner.reset_particles());
}
