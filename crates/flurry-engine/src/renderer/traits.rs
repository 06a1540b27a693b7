//! Drawing surface contract.
//!
//! The engine never touches a platform API directly. Particles hand lyon paths
//! in particle-local space plus a transform to a [`Surface`]; the web bridge
//! replays them on a Canvas 2D context, and [`VectorSurface`](super::vector::VectorSurface)
//! tessellates them on the CPU.

use glam::{Affine2, Vec2};
use lyon::path::Path;

use super::color::Color;

/// Pixel dimensions of the drawing surface, mirroring the browser viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Fill or stroke style for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    /// Global alpha applied on top of `color.a`.
    pub alpha: f32,
    /// Shadow blur radius in pixels, tinted with `color`. Zero disables it.
    pub glow: f32,
}

impl Paint {
    pub const fn new(color: Color, alpha: f32) -> Self {
        Self { color, alpha, glow: 0.0 }
    }

    pub const fn with_glow(self, glow: f32) -> Self {
        Self { glow, ..self }
    }

    /// Color with the global alpha folded in.
    pub fn effective_color(&self) -> Color {
        self.color.with_alpha(self.color.a * self.alpha)
    }
}

/// A full-viewport drawing target.
pub trait Surface {
    /// Current pixel dimensions.
    fn viewport(&self) -> Viewport;

    /// Adopt new pixel dimensions. Resizing also clears the contents.
    fn resize(&mut self, viewport: Viewport);

    /// Erase everything drawn so far.
    fn clear(&mut self);

    /// Fill a closed path given in local space, placed by `transform`.
    fn fill_path(&mut self, path: &Path, transform: &Affine2, paint: &Paint);

    /// Stroke a path given in local space, placed by `transform`.
    fn stroke_path(&mut self, path: &Path, transform: &Affine2, paint: &Paint, line_width: f32);
}
