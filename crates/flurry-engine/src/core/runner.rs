use std::cell::Cell;
use std::rc::Rc;

use crate::api::config::AmbientConfig;
use crate::api::settings::{SettingOutcome, SettingUpdate};
use crate::config::store::{ConfigStore, Storage};
use crate::renderer::traits::Surface;
use crate::systems::pool::ParticlePool;

/// What a frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Effect enabled: pool reconciled, advanced and drawn.
    Active,
    /// Effect disabled: pool emptied, nothing drawn.
    Idle,
}

/// Shared stop flag handed out when the loop starts.
/// Single-threaded; clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Per-frame driver: owns the configuration store and the particle pool.
///
/// The host calls [`tick`](Self::tick) once per display frame and keeps
/// rescheduling until it returns `None`.
pub struct AmbientRunner<S: Storage> {
    store: ConfigStore<S>,
    pool: ParticlePool,
    token: Option<CancelToken>,
    frame: u64,
}

impl<S: Storage> AmbientRunner<S> {
    /// Load the persisted configuration and create an empty pool.
    pub fn new(storage: S, seed: u64) -> Self {
        Self {
            store: ConfigStore::open(storage),
            pool: ParticlePool::new(seed),
            token: None,
            frame: 0,
        }
    }

    /// Begin running. Returns the token that stops this run.
    /// Calling again while running returns the same token.
    pub fn start(&mut self) -> CancelToken {
        match &self.token {
            Some(token) if !token.is_cancelled() => token.clone(),
            _ => {
                let token = CancelToken::new();
                self.token = Some(token.clone());
                log::info!("ambient loop started");
                token
            }
        }
    }

    /// Cancel the current run, if any.
    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
            log::info!("ambient loop stopped after {} frames", self.frame);
        }
    }

    pub fn is_running(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Run one frame: clear, then either reconcile + step, or empty the pool.
    /// Returns `None` once the run was cancelled (or never started); the host should stop scheduling.
    pub fn tick<Sf: Surface + ?Sized>(&mut self, surface: &mut Sf) -> Option<LoopState> {
        if !self.is_running() {
            return None;
        }
        self.frame += 1;
        surface.clear();

        let config = self.store.config();
        if config.enabled {
            self.pool.reconcile(config.count as usize, config, &*surface);
            self.pool.step(config, surface);
            Some(LoopState::Active)
        } else {
            self.pool.clear();
            Some(LoopState::Idle)
        }
    }

    /// Apply a control change from the settings panel.
    pub fn apply_setting(&mut self, update: SettingUpdate) -> SettingOutcome {
        update.apply(&mut self.store, &mut self.pool)
    }

    /// Empty the pool; it regrows on the next active frame.
    pub fn reset_particles(&mut self) {
        self.pool.clear();
    }

    pub fn config(&self) -> &AmbientConfig {
        self.store.config()
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::EffectKind;
    use crate::config::store::{MemoryStorage, STORAGE_KEY};
    use crate::renderer::color::Color;
    use crate::renderer::traits::{Paint, Viewport};
    use crate::renderer::vector::VectorSurface;
    use glam::Affine2;

    fn runner() -> AmbientRunner<MemoryStorage> {
        let mut r = AmbientRunner::new(MemoryStorage::new(), 42);
        r.start();
        r
    }

    fn surface() -> VectorSurface {
        VectorSurface::new(Viewport::new(800.0, 600.0))
    }

    #[test]
    fn idle_tick_empties_pool_and_blanks_surface() {
        let mut r = runner();
        let mut s = surface();
        // Something left over from an earlier frame.
        r.pool_mut().reconcile(100, &AmbientConfig::default(), &s);
        EffectKind::Snow.draw(&mut s, 3.0, &Affine2::IDENTITY, &Paint::new(Color::WHITE, 1.0));
        assert!(!s.is_blank());

        assert_eq!(r.tick(&mut s), Some(LoopState::Idle));
        assert!(r.pool().is_empty());
        assert!(s.is_blank());
    }

    #[test]
    fn enabling_grows_pool_to_count_in_one_tick() {
        let mut r = runner();
        let mut s = surface();
        assert_eq!(r.config().count, 100);
        r.tick(&mut s);
        assert!(r.pool().is_empty());

        r.apply_setting(SettingUpdate::Enabled(true));
        assert_eq!(r.tick(&mut s), Some(LoopState::Active));
        assert_eq!(r.pool().len(), 100);
        assert!(!s.is_blank());
    }

    #[test]
    fn count_change_converges_next_tick() {
        let mut r = runner();
        let mut s = surface();
        r.apply_setting(SettingUpdate::Enabled(true));
        r.tick(&mut s);

        r.apply_setting(SettingUpdate::Count(30));
        r.tick(&mut s);
        assert_eq!(r.pool().len(), 30);

        r.apply_setting(SettingUpdate::Count(250));
        r.tick(&mut s);
        assert_eq!(r.pool().len(), 250);
    }

    #[test]
    fn kind_change_resets_then_regrows() {
        let mut r = runner();
        let mut s = surface();
        r.apply_setting(SettingUpdate::Enabled(true));
        r.tick(&mut s);
        assert_eq!(r.pool().len(), 100);

        let outcome = r.apply_setting(SettingUpdate::Kind(EffectKind::Leaf));
        assert_eq!(outcome.suggested_color.as_deref(), Some("#88cc88"));
        assert_eq!(r.config().color, "#88cc88");
        assert_eq!(r.pool().len(), 0);

        r.tick(&mut s);
        assert_eq!(r.pool().len(), 100);
    }

    #[test]
    fn each_tick_clears_previous_frame() {
        // Twin runners with one seed draw identical frames.
        let mut reused = runner();
        let mut twin = runner();
        for r in [&mut reused, &mut twin] {
            r.apply_setting(SettingUpdate::Enabled(true));
            r.apply_setting(SettingUpdate::Count(10));
        }

        let mut s = surface();
        reused.tick(&mut s);
        twin.tick(&mut surface());
        assert!(s.vertex_count() > 0);

        reused.tick(&mut s);
        let mut fresh = surface();
        twin.tick(&mut fresh);
        assert_eq!(s.vertex_count(), fresh.vertex_count());
    }

    #[test]
    fn active_tick_wipes_stale_content() {
        let mut r = runner();
        r.apply_setting(SettingUpdate::Enabled(true));
        r.apply_setting(SettingUpdate::Count(10));
        let mut s = surface();
        EffectKind::Leaf.draw(&mut s, 50.0, &Affine2::IDENTITY, &Paint::new(Color::BLACK, 1.0));
        let stale = s.vertex_count();

        let mut fresh = surface();
        let mut twin = runner();
        twin.apply_setting(SettingUpdate::Enabled(true));
        twin.apply_setting(SettingUpdate::Count(10));
        twin.tick(&mut fresh);

        assert_eq!(r.tick(&mut s), Some(LoopState::Active));
        assert_eq!(s.vertex_count(), fresh.vertex_count());
        assert_ne!(s.vertex_count(), stale + fresh.vertex_count());
    }

    #[test]
    fn tick_without_start_does_nothing() {
        let mut r = AmbientRunner::new(MemoryStorage::new(), 1);
        let mut s = surface();
        assert_eq!(r.tick(&mut s), None);
        assert_eq!(r.frame(), 0);
    }

    #[test]
    fn cancelled_token_stops_the_loop() {
        let mut r = AmbientRunner::new(MemoryStorage::new(), 1);
        let token = r.start();
        let mut s = surface();
        assert!(r.tick(&mut s).is_some());

        token.cancel();
        assert!(!r.is_running());
        assert_eq!(r.tick(&mut s), None);
        assert_eq!(r.frame(), 1);
    }

    #[test]
    fn start_is_reentrant() {
        let mut r = AmbientRunner::new(MemoryStorage::new(), 1);
        let a = r.start();
        let b = r.start();
        b.cancel();
        assert!(a.is_cancelled());

        let c = r.start();
        assert!(!c.is_cancelled());
        assert!(r.is_running());
        r.stop();
        assert!(c.is_cancelled());
    }

    #[test]
    fn persisted_config_is_used_on_first_frame() {
        let storage = MemoryStorage::with_entry(
            STORAGE_KEY,
            r#"{"enabled":true,"type":"star","count":12}"#,
        );
        let mut r = AmbientRunner::new(storage, 9);
        r.start();
        let mut s = surface();
        assert_eq!(r.tick(&mut s), Some(LoopState::Active));
        assert_eq!(r.pool().len(), 12);
        assert_eq!(r.config().kind, EffectKind::Star);
    }
}
