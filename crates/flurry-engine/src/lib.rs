//! Ambient particle overlay engine: falling snow, stars, leaves and petals.
//!
//! Headless and platform-free. A host supplies a [`Surface`] to draw on and a
//! [`Storage`] to persist settings in, then calls [`AmbientRunner::tick`]
//! once per display frame.

pub mod api;
pub mod config;
pub mod core;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{AmbientConfig, EffectKind};
pub use api::settings::{SettingOutcome, SettingUpdate, SliderRange};
pub use config::store::{ConfigError, ConfigField, ConfigStore, MemoryStorage, Storage, StorageError, STORAGE_KEY};
pub use crate::core::discovery::{Backoff, ContainerLocator, Discovery, DiscoveryPoll};
pub use crate::core::runner::{AmbientRunner, CancelToken, LoopState};
pub use renderer::color::Color;
pub use renderer::manager::{SurfaceManager, SurfaceProvider};
pub use renderer::traits::{Paint, Surface, Viewport};
pub use renderer::vector::{VectorSurface, VectorVertex};
pub use systems::particle::{Particle, EDGE_MARGIN};
pub use systems::pool::ParticlePool;
pub use systems::rng::Rng;
