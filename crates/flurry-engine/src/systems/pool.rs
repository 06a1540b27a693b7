use super::particle::Particle;
use super::rng::Rng;
use crate::api::config::AmbientConfig;
use crate::renderer::color::Color;
use crate::renderer::traits::{Paint, Surface};

/// The live set of particles.
/// Designed for small counts (hundreds), stored in a flat Vec.
pub struct ParticlePool {
    particles: Vec<Particle>,
    rng: Rng,
}

impl ParticlePool {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(300),
            rng: Rng::new(seed),
        }
    }

    /// Grow or shrink to exactly `target` particles.
    ///
    /// New particles go through the initial reset, so growth mid-session
    /// scatters them over the full height rather than dropping them in from the top.
    pub fn reconcile<S: Surface + ?Sized>(&mut self, target: usize, config: &AmbientConfig, surface: &S) {
        if self.particles.len() > target {
            self.particles.truncate(target);
            return;
        }
        let viewport = surface.viewport();
        while self.particles.len() < target {
            self.particles.push(Particle::new(config, viewport, &mut self.rng));
        }
    }

    /// Advance then draw every particle. Kind and color are read from `config` on each call.
    pub fn step<S: Surface + ?Sized>(&mut self, config: &AmbientConfig, surface: &mut S) {
        let viewport = surface.viewport();
        let paint = Paint::new(Color::parse_or_white(&config.color), 1.0);
        for p in &mut self.particles {
            p.advance(config, viewport, &mut self.rng);
            p.render(surface, &paint, config.kind);
        }
    }

    /// Drop every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
