//! A single falling particle: randomized state, per-frame motion, drawing.

use glam::{Affine2, Vec2};

use super::rng::Rng;
use crate::api::config::{AmbientConfig, EffectKind};
use crate::renderer::traits::{Paint, Surface, Viewport};

/// How far outside the viewport a particle may drift before it is recycled.
/// Recycled particles re-enter this far above the top edge.
pub const EDGE_MARGIN: f32 = 20.0;

/// Vertical sway frequency, per pixel of fall.
const SWAY_FREQUENCY: f32 = 0.01;
/// Horizontal sway amplitude, in pixels per frame.
const SWAY_AMPLITUDE: f32 = 0.5;

/// One falling particle. Recycled in place rather than reallocated.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Instance radius.
    pub size: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    /// Rotation in degrees.
    pub angle: f32,
    /// Rotation per frame in degrees.
    pub spin: f32,
    pub opacity: f32,
}

impl Particle {
    /// Create a particle scattered over the whole viewport.
    pub fn new(config: &AmbientConfig, viewport: Viewport, rng: &mut Rng) -> Self {
        let mut p = Particle {
            x: 0.0,
            y: 0.0,
            size: 0.0,
            speed_x: 0.0,
            speed_y: 0.0,
            angle: 0.0,
            spin: 0.0,
            opacity: 0.0,
        };
        p.reset(true, config, viewport, rng);
        p
    }

    /// Re-randomize every field from the current configuration.
    ///
    /// `initial` scatters `y` over the full height so the first frame already
    /// looks mid-fall; otherwise the particle re-enters just above the top edge.
    pub fn reset(&mut self, initial: bool, config: &AmbientConfig, viewport: Viewport, rng: &mut Rng) {
        let (size, speed) = (config.size, config.speed);
        self.x = rng.range(0.0, viewport.width);
        self.y = if initial {
            rng.range(0.0, viewport.height)
        } else {
            -EDGE_MARGIN
        };
        self.size = rng.range(size * 0.5, size * 1.5);
        self.speed_y = rng.range(speed * 0.5, speed);
        self.speed_x = rng.range(speed * -0.25, speed * 0.25);
        self.angle = rng.range(0.0, 360.0);
        self.spin = rng.range(-1.0, 1.0);
        self.opacity = rng.range(0.3, 0.8);
    }

    /// Move one frame. Returns true when the particle left the viewport and was recycled.
    pub fn advance(&mut self, config: &AmbientConfig, viewport: Viewport, rng: &mut Rng) -> bool {
        self.y += self.speed_y;
        // Sway depends on height, not time, so it is reproducible from position.
        self.x += self.speed_x + (self.y * SWAY_FREQUENCY).sin() * SWAY_AMPLITUDE;
        self.angle += self.spin;

        if self.is_out_of_bounds(viewport) {
            self.reset(false, config, viewport, rng);
            return true;
        }
        false
    }

    /// Past the bottom, or off either side. Rising above the top never counts.
    pub fn is_out_of_bounds(&self, viewport: Viewport) -> bool {
        self.y > viewport.height + EDGE_MARGIN
            || self.x > viewport.width + EDGE_MARGIN
            || self.x < -EDGE_MARGIN
    }

    /// Local-to-surface transform: translate to position, then rotate.
    pub fn transform(&self) -> Affine2 {
        Affine2::from_angle_translation(self.angle.to_radians(), Vec2::new(self.x, self.y))
    }

    /// Draw with the shared kind and color; only the alpha is per particle.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, paint: &Paint, kind: EffectKind) {
        let paint = Paint {
            alpha: self.opacity,
            ..*paint
        };
        kind.draw(surface, self.size, &self.transform(), &paint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::color::Color;
    use crate::renderer::vector::VectorSurface;

    const VP: Viewport = Viewport::new(800.0, 600.0);

    fn config(size: f32, speed: f32) -> AmbientConfig {
        AmbientConfig {
            size,
            speed,
            ..AmbientConfig::default()
        }
    }

    #[test]
    fn reset_ranges_follow_config() {
        let cfg = config(3.0, 2.0);
        let mut rng = Rng::new(42);
        for _ in 0..2000 {
            let p = Particle::new(&cfg, VP, &mut rng);
            assert!(p.speed_y >= 1.0 && p.speed_y < 2.0, "speed_y {}", p.speed_y);
            assert!(p.size >= 1.5 && p.size < 4.5, "size {}", p.size);
            assert!(p.speed_x >= -0.5 && p.speed_x < 0.5, "speed_x {}", p.speed_x);
            assert!(p.spin >= -1.0 && p.spin < 1.0);
            assert!(p.opacity >= 0.3 && p.opacity < 0.8);
            assert!(p.angle >= 0.0 && p.angle < 360.0);
            assert!(p.x >= 0.0 && p.x < VP.width);
            assert!(p.y >= 0.0 && p.y < VP.height);
        }
    }

    #[test]
    fn advance_moves_down_with_sway() {
        let cfg = config(3.0, 2.0);
        let mut rng = Rng::new(1);
        let mut p = Particle::new(&cfg, VP, &mut rng);
        p.x = 400.0;
        p.y = 100.0;
        p.speed_x = 0.1;
        p.speed_y = 1.5;
        p.angle = 10.0;
        p.spin = 0.5;

        let recycled = p.advance(&cfg, VP, &mut rng);
        assert!(!recycled);
        assert_eq!(p.y, 101.5);
        let expected_x = 400.0 + 0.1 + (101.5f32 * 0.01).sin() * 0.5;
        assert!((p.x - expected_x).abs() < 1e-4);
        assert_eq!(p.angle, 10.5);
    }

    #[test]
    fn falling_past_bottom_recycles_above_top() {
        let cfg = config(3.0, 2.0);
        let mut rng = Rng::new(5);
        for _ in 0..200 {
            let mut p = Particle::new(&cfg, VP, &mut rng);
            p.y = VP.height + EDGE_MARGIN + 0.5;
            p.x = 400.0;
            assert!(p.advance(&cfg, VP, &mut rng));
            assert_eq!(p.y, -EDGE_MARGIN);
            assert!(p.x >= 0.0 && p.x < VP.width);
        }
    }

    #[test]
    fn drifting_off_either_side_recycles() {
        let cfg = config(3.0, 2.0);
        let mut rng = Rng::new(9);

        let mut p = Particle::new(&cfg, VP, &mut rng);
        p.speed_x = 0.0;
        p.speed_y = 0.0;
        p.y = 50.0;
        p.x = -EDGE_MARGIN - 5.0;
        assert!(p.advance(&cfg, VP, &mut rng));

        let mut p = Particle::new(&cfg, VP, &mut rng);
        p.speed_x = 0.0;
        p.speed_y = 0.0;
        p.y = 300.0;
        p.x = VP.width + EDGE_MARGIN + 5.0;
        assert!(p.advance(&cfg, VP, &mut rng));
    }

    #[test]
    fn floating_above_top_is_kept() {
        let cfg = config(3.0, 2.0);
        let mut rng = Rng::new(11);
        let mut p = Particle::new(&cfg, VP, &mut rng);
        p.x = 400.0;
        p.y = -500.0;
        p.speed_x = 0.0;
        p.speed_y = -1.0;
        assert!(!p.advance(&cfg, VP, &mut rng));
        assert_eq!(p.y, -501.0);
    }

    #[test]
    fn render_uses_particle_opacity() {
        let cfg = config(3.0, 2.0);
        let mut rng = Rng::new(13);
        let p = Particle::new(&cfg, VP, &mut rng);
        let mut surface = VectorSurface::new(VP);
        p.render(&mut surface, &Paint::new(Color::WHITE, 1.0), EffectKind::Snow);
        assert!(surface.vertex_count() > 0);
        assert!(surface.vertices().iter().all(|v| (v.a - p.opacity).abs() < 1e-6));
    }

    #[test]
    fn render_is_centered_on_position() {
        let cfg = config(3.0, 2.0);
        let mut rng = Rng::new(17);
        let mut p = Particle::new(&cfg, VP, &mut rng);
        p.x = 100.0;
        p.y = 200.0;
        let mut surface = VectorSurface::new(VP);
        p.render(&mut surface, &Paint::new(Color::WHITE, 1.0), EffectKind::Snow);
        for v in surface.vertices() {
            let d = Vec2::new(v.x - 100.0, v.y - 200.0).length();
            assert!(d <= p.size + 1e-3, "vertex {} px from center", d);
        }
    }
}
