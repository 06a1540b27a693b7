use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use flurry_engine::{AmbientRunner, Discovery, DiscoveryPoll, LoopState, Surface, SurfaceManager};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

use crate::canvas::CanvasProvider;
use crate::panel::DomLocator;
use crate::storage::LocalStorage;

/// Delay between attempts to attach the canvas while `<body>` is missing.
const SURFACE_RETRY: Duration = Duration::from_millis(500);

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Everything the page-lifetime effect owns.
///
/// Lives in a `thread_local!` because the browser calls back into free
/// functions (frames, timers, DOM events), not into a struct.
pub struct App {
    pub runner: AmbientRunner<LocalStorage>,
    pub surfaces: SurfaceManager<CanvasProvider>,
    frame_id: Option<i32>,
    frame_callback: Option<FrameCallback>,
}

impl App {
    fn new(window: Window, document: Document) -> Self {
        Self {
            runner: AmbientRunner::new(LocalStorage::new(), random_seed()),
            surfaces: SurfaceManager::new(CanvasProvider::new(window, document)),
            frame_id: None,
            frame_callback: None,
        }
    }

    /// One display frame. `None` once the run is cancelled.
    fn frame(&mut self) -> Option<LoopState> {
        let surface = self.surfaces.surface_mut()?;
        self.runner.tick(surface)
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

/// Run `f` against the app. `None` before startup.
pub fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn random_seed() -> u64 {
    let hi = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let lo = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (hi << 32) | lo
}

pub(crate) fn set_timeout(window: &Window, delay: Duration, f: impl FnOnce() + 'static) -> Result<i32, JsValue> {
    let callback = Closure::once_into_js(f);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay.as_millis() as i32,
    )
}

/// Create the app once and kick off surface attachment and panel discovery.
/// Calling again after a successful start is a no-op.
pub fn boot() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let fresh = APP.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(App::new(window.clone(), document.clone()));
        true
    });
    if !fresh {
        return Ok(());
    }

    attach_surface(window.clone())?;
    schedule_discovery(window, DomLocator::new(document), Discovery::default(), Duration::ZERO)?;
    Ok(())
}

/// Attach the canvas, retrying on a fixed delay until the document has a body.
fn attach_surface(window: Window) -> Result<(), JsValue> {
    let attached = with_app(|app| app.surfaces.ensure_surface()).unwrap_or(false);
    if !attached {
        let retry_window = window.clone();
        set_timeout(&window, SURFACE_RETRY, move || {
            if let Err(err) = attach_surface(retry_window) {
                log::warn!("ambient canvas attach failed: {:?}", err);
            }
        })?;
        return Ok(());
    }

    listen_resize(&window)?;
    start_frame_loop(window)
}

fn listen_resize(window: &Window) -> Result<(), JsValue> {
    let on_resize = Closure::<dyn FnMut()>::new(|| {
        with_app(|app| app.surfaces.on_resize());
    });
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    // Page lifetime.
    on_resize.forget();
    Ok(())
}

fn request_frame(window: &Window, callback: &FrameCallback) -> Result<(), JsValue> {
    let id = match callback.borrow().as_ref() {
        Some(closure) => window.request_animation_frame(closure.as_ref().unchecked_ref())?,
        None => return Ok(()),
    };
    with_app(|app| app.frame_id = Some(id));
    Ok(())
}

fn start_frame_loop(window: Window) -> Result<(), JsValue> {
    let Some(token) = with_app(|app| app.runner.start()) else {
        return Ok(());
    };

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let handle = callback.clone();
    let frame_window = window.clone();
    *callback.borrow_mut() = Some(Closure::new(move || {
        let state = with_app(|app| {
            app.frame_id = None;
            app.frame()
        })
        .flatten();
        if state.is_none() || token.is_cancelled() {
            // Drop our own closure so the Rc cycle is broken.
            handle.borrow_mut().take();
            return;
        }
        if let Err(err) = request_frame(&frame_window, &handle) {
            log::warn!("ambient frame scheduling failed: {:?}", err);
        }
    }));

    with_app(|app| app.frame_callback = Some(callback.clone()));
    request_frame(&window, &callback)
}

/// Cancel the loop and its pending frame. The overlay is left blank.
pub fn stop() {
    let pending = with_app(|app| {
        app.runner.stop();
        if let Some(surface) = app.surfaces.surface_mut() {
            surface.clear();
        }
        (app.frame_id.take(), app.frame_callback.take())
    });
    let Some((frame_id, callback)) = pending else {
        return;
    };
    if let (Some(id), Some(window)) = (frame_id, web_sys::window()) {
        if let Err(err) = window.cancel_animation_frame(id) {
            log::debug!("cancelAnimationFrame failed: {:?}", err);
        }
    }
    if let Some(callback) = callback {
        callback.borrow_mut().take();
    }
}

/// Poll for the host container forever, injecting the panel whenever it is missing.
fn schedule_discovery(
    window: Window,
    mut locator: DomLocator,
    mut discovery: Discovery,
    delay: Duration,
) -> Result<(), JsValue> {
    let next_window = window.clone();
    set_timeout(&window, delay, move || {
        let poll = discovery.poll(&mut locator);
        if let DiscoveryPoll::Missing(next) = poll {
            log::debug!("#extensions_settings not mounted, retrying in {:?}", next);
        }
        if let Err(err) = schedule_discovery(next_window, locator, discovery, poll.next_delay()) {
            log::warn!("ambient panel polling stopped: {:?}", err);
        }
    })?;
    Ok(())
}

/// Whether the frame loop is currently running.
pub fn is_running() -> bool {
    with_app(|app| app.runner.is_running()).unwrap_or(false)
}
