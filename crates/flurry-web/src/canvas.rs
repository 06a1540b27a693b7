//! Canvas 2D overlay: replays engine paths on a full-viewport `<canvas>`.

use flurry_engine::api::settings::CANVAS_ID;
use flurry_engine::{Paint, Surface, SurfaceProvider, Viewport};
use glam::Affine2;
use lyon::path::{Path, PathEvent};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

/// Covers the viewport, stays on top, and lets every click through.
const OVERLAY_STYLE: &str =
    "position:fixed;top:0;left:0;width:100vw;height:100vh;pointer-events:none;z-index:99999;";

fn log_js_err(what: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::debug!("{} failed: {:?}", what, err);
    }
}

/// [`Surface`] backed by a `CanvasRenderingContext2d`.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        let viewport = Viewport::new(canvas.width() as f32, canvas.height() as f32);
        Self { canvas, ctx, viewport }
    }

    /// Save state and apply transform plus global alpha. Pair with `restore`.
    fn place(&self, transform: &Affine2, paint: &Paint) {
        let m = transform.matrix2;
        let t = transform.translation;
        self.ctx.save();
        log_js_err(
            "setTransform",
            self.ctx.set_transform(
                m.x_axis.x as f64,
                m.x_axis.y as f64,
                m.y_axis.x as f64,
                m.y_axis.y as f64,
                t.x as f64,
                t.y as f64,
            ),
        );
        self.ctx.set_global_alpha(paint.alpha as f64);
    }

    fn trace(&self, path: &Path) {
        let ctx = &self.ctx;
        ctx.begin_path();
        for event in path.iter() {
            match event {
                PathEvent::Begin { at } => ctx.move_to(at.x as f64, at.y as f64),
                PathEvent::Line { to, .. } => ctx.line_to(to.x as f64, to.y as f64),
                PathEvent::Quadratic { ctrl, to, .. } => {
                    ctx.quadratic_curve_to(ctrl.x as f64, ctrl.y as f64, to.x as f64, to.y as f64)
                }
                PathEvent::Cubic { ctrl1, ctrl2, to, .. } => ctx.bezier_curve_to(
                    ctrl1.x as f64,
                    ctrl1.y as f64,
                    ctrl2.x as f64,
                    ctrl2.y as f64,
                    to.x as f64,
                    to.y as f64,
                ),
                PathEvent::End { close, .. } => {
                    if close {
                        ctx.close_path();
                    }
                }
            }
        }
    }
}

impl Surface for CanvasSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        // Assigning the backing size also wipes the canvas.
        self.canvas.set_width(viewport.width.max(0.0) as u32);
        self.canvas.set_height(viewport.height.max(0.0) as u32);
        self.viewport = viewport;
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.viewport.width as f64, self.viewport.height as f64);
    }

    fn fill_path(&mut self, path: &Path, transform: &Affine2, paint: &Paint) {
        let css = paint.color.to_css();
        self.place(transform, paint);
        self.ctx.set_fill_style_str(&css);
        if paint.glow > 0.0 {
            self.ctx.set_shadow_blur(paint.glow as f64);
            self.ctx.set_shadow_color(&css);
        }
        self.trace(path);
        self.ctx.fill();
        self.ctx.restore();
    }

    fn stroke_path(&mut self, path: &Path, transform: &Affine2, paint: &Paint, line_width: f32) {
        self.place(transform, paint);
        self.ctx.set_stroke_style_str(&paint.color.to_css());
        self.ctx.set_line_width(line_width as f64);
        self.trace(path);
        self.ctx.stroke();
        self.ctx.restore();
    }
}

/// Finds the overlay canvas by id, creating and attaching it when absent.
pub struct CanvasProvider {
    window: Window,
    document: Document,
}

impl CanvasProvider {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    fn find_or_create_canvas(&self) -> Option<HtmlCanvasElement> {
        if let Some(existing) = self.document.get_element_by_id(CANVAS_ID) {
            return existing.dyn_into::<HtmlCanvasElement>().ok();
        }
        // No body yet: the document is still loading.
        let body = self.document.body()?;
        let canvas = self
            .document
            .create_element("canvas")
            .ok()?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        canvas.set_id(CANVAS_ID);
        log_js_err("canvas style", canvas.set_attribute("style", OVERLAY_STYLE));
        body.append_child(&canvas).ok()?;
        Some(canvas)
    }
}

impl SurfaceProvider for CanvasProvider {
    type Surface = CanvasSurface;

    fn acquire(&mut self) -> Option<CanvasSurface> {
        let canvas = self.find_or_create_canvas()?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(CanvasSurface::new(canvas, ctx))
    }

    fn viewport(&self) -> Viewport {
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        Viewport::new(dim(self.window.inner_width()), dim(self.window.inner_height()))
    }
}
