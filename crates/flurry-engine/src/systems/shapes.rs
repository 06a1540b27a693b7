//! Procedural particle shapes.
//!
//! Each shape is a lyon path centered on the particle origin. The caller's
//! transform supplies position and rotation, so paths only depend on size.

use glam::Affine2;
use lyon::math::{point, vector, Angle};
use lyon::path::{Path, Winding};

use crate::api::config::EffectKind;
use crate::renderer::color::Color;
use crate::renderer::traits::{Paint, Surface};

/// Shadow blur around snowflakes, in pixels.
pub const SNOW_GLOW: f32 = 5.0;
/// Leaf vein stroke width.
pub const VEIN_WIDTH: f32 = 1.0;
/// How far the star's curves pull toward the center.
const STAR_PINCH: f32 = 2.0;

/// Filled disc of radius `r`.
pub fn snow_path(r: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_circle(point(0.0, 0.0), r, Winding::Positive);
    builder.build()
}

/// Four-pointed star: tip to tip through near-center control points.
pub fn star_path(r: f32) -> Path {
    let c = STAR_PINCH;
    let mut builder = Path::builder();
    builder.begin(point(0.0, -r));
    builder.quadratic_bezier_to(point(c, -c), point(r, 0.0));
    builder.quadratic_bezier_to(point(c, c), point(0.0, r));
    builder.quadratic_bezier_to(point(-c, c), point(-r, 0.0));
    builder.quadratic_bezier_to(point(-c, -c), point(0.0, -r));
    builder.close();
    builder.build()
}

/// Leaf blade: ellipse `r` wide, `r / 2` tall.
pub fn leaf_path(r: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_ellipse(
        point(0.0, 0.0),
        vector(r, r / 2.0),
        Angle::radians(0.0),
        Winding::Positive,
    );
    builder.build()
}

/// Horizontal center line across the leaf.
pub fn vein_path(r: f32) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(-r, 0.0));
    builder.line_to(point(r, 0.0));
    builder.end(false);
    builder.build()
}

/// Two mirrored lobes joining at the origin and at `(0, r)`.
pub fn petal_path(r: f32) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0));
    builder.cubic_bezier_to(point(r, -r), point(r * 2.0, 0.0), point(0.0, r));
    builder.cubic_bezier_to(point(-r * 2.0, 0.0), point(-r, -r), point(0.0, 0.0));
    builder.close();
    builder.build()
}

impl EffectKind {
    /// Draw one particle of radius `size` at `transform`.
    pub fn draw<S: Surface + ?Sized>(self, surface: &mut S, size: f32, transform: &Affine2, paint: &Paint) {
        if size.is_nan() || size <= 0.0 {
            return;
        }
        match self {
            Self::Snow => {
                surface.fill_path(&snow_path(size), transform, &paint.with_glow(SNOW_GLOW));
            }
            Self::Star => surface.fill_path(&star_path(size), transform, paint),
            Self::Leaf => {
                surface.fill_path(&leaf_path(size), transform, paint);
                let vein = Paint {
                    color: Color::VEIN,
                    ..*paint
                };
                surface.stroke_path(&vein_path(size), transform, &vein, VEIN_WIDTH);
            }
            Self::Flower => surface.fill_path(&petal_path(size), transform, paint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::traits::Viewport;
    use crate::renderer::vector::VectorSurface;
    use lyon::path::PathEvent;

    fn bounds(vertices: &[crate::renderer::vector::VectorVertex]) -> (f32, f32, f32, f32) {
        vertices.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(x0, y0, x1, y1), v| (x0.min(v.x), y0.min(v.y), x1.max(v.x), y1.max(v.y)),
        )
    }

    fn draw(kind: EffectKind, size: f32) -> VectorSurface {
        let mut surface = VectorSurface::new(Viewport::new(100.0, 100.0));
        kind.draw(&mut surface, size, &Affine2::IDENTITY, &Paint::new(Color::WHITE, 1.0));
        surface
    }

    #[test]
    fn every_kind_draws_something() {
        for kind in EffectKind::ALL {
            assert!(draw(kind, 4.0).vertex_count() > 0, "{:?} drew nothing", kind);
        }
    }

    #[test]
    fn zero_size_draws_nothing() {
        for kind in EffectKind::ALL {
            assert!(draw(kind, 0.0).is_blank());
        }
    }

    #[test]
    fn star_is_four_quadratics_tip_to_tip() {
        let path = star_path(5.0);
        let quads: Vec<_> = path
            .iter()
            .filter_map(|e| match e {
                PathEvent::Quadratic { ctrl, to, .. } => Some((ctrl, to)),
                _ => None,
            })
            .collect();
        assert_eq!(quads.len(), 4);
        assert_eq!(quads[0].1, point(5.0, 0.0));
        assert_eq!(quads[1].1, point(0.0, 5.0));
        assert_eq!(quads[2].1, point(-5.0, 0.0));
        assert_eq!(quads[3].1, point(0.0, -5.0));
        assert_eq!(quads[0].0, point(2.0, -2.0));
    }

    #[test]
    fn leaf_is_twice_as_wide_as_tall() {
        let surface = draw(EffectKind::Leaf, 8.0);
        let (x0, y0, x1, y1) = bounds(surface.vertices());
        assert!((x1 - x0 - 16.0).abs() < 0.5, "width {}", x1 - x0);
        // Vein stroke adds half a pixel above and below the axis at most.
        assert!(y1 - y0 <= 8.0 + 0.5, "height {}", y1 - y0);
    }

    #[test]
    fn leaf_vein_is_translucent_black() {
        let surface = draw(EffectKind::Leaf, 8.0);
        assert!(surface
            .vertices()
            .iter()
            .any(|v| v.r == 0.0 && v.g == 0.0 && v.b == 0.0 && (v.a - 0.2).abs() < 1e-6));
    }

    #[test]
    fn petal_spans_origin_to_tip() {
        let path = petal_path(4.0);
        let cubics: Vec<_> = path
            .iter()
            .filter_map(|e| match e {
                PathEvent::Cubic { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert_eq!(cubics, vec![point(0.0, 4.0), point(0.0, 0.0)]);
    }

    #[test]
    fn snow_disc_fits_its_radius() {
        let surface = draw(EffectKind::Snow, 3.0);
        let (x0, y0, x1, y1) = bounds(surface.vertices());
        assert!(x0 >= -3.0 - 1e-3 && x1 <= 3.0 + 1e-3);
        assert!(y0 >= -3.0 - 1e-3 && y1 <= 3.0 + 1e-3);
    }
}
