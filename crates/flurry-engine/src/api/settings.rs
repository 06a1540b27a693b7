//! Settings panel contract: control ids, slider bounds, and the mapping from a
//! control change to a configuration update.

use crate::api::config::EffectKind;
use crate::config::store::{ConfigField, ConfigStore, Storage};
use crate::systems::pool::ParticlePool;

/// Host element the panel is appended into.
pub const CONTAINER_ID: &str = "extensions_settings";
/// Root element of the injected panel; injection is keyed on it.
pub const PANEL_ID: &str = "ambient-effects-menu";
/// The overlay canvas.
pub const CANVAS_ID: &str = "st-ambient-canvas";

pub const ENABLED_ID: &str = "ambient_enabled";
pub const TYPE_ID: &str = "ambient_type";
pub const COLOR_ID: &str = "ambient_color";
pub const SIZE_ID: &str = "ambient_size";
pub const SPEED_ID: &str = "ambient_speed";
pub const COUNT_ID: &str = "ambient_count";

/// Bounds of an `<input type="range">`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

pub const SIZE_RANGE: SliderRange = SliderRange { min: 1.0, max: 10.0, step: 0.5 };
pub const SPEED_RANGE: SliderRange = SliderRange { min: 0.5, max: 10.0, step: 0.5 };
pub const COUNT_RANGE: SliderRange = SliderRange { min: 10.0, max: 300.0, step: 10.0 };

/// One control change from the settings panel.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingUpdate {
    Enabled(bool),
    Kind(EffectKind),
    Color(String),
    Size(f32),
    Speed(f32),
    Count(u32),
}

/// What the panel must reflect back after an update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingOutcome {
    /// New value for the color picker, when the update replaced the color.
    pub suggested_color: Option<String>,
    /// The pool was emptied and will regrow on the next frame.
    pub pool_reset: bool,
}

impl SettingUpdate {
    /// Build an update from a control id and its raw DOM value.
    /// Returns `None` for unknown ids and unparsable values.
    pub fn from_control(id: &str, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match id {
            ENABLED_ID => raw.parse().ok().map(Self::Enabled),
            TYPE_ID => EffectKind::from_name(raw).map(Self::Kind),
            COLOR_ID => Some(Self::Color(raw.to_string())),
            SIZE_ID => raw.parse().ok().map(Self::Size),
            SPEED_ID => raw.parse().ok().map(Self::Speed),
            COUNT_ID => parse_count(raw).map(Self::Count),
            _ => None,
        }
    }

    /// Apply to the store, persist, and reset the pool where the change would
    /// leave existing particles looking inconsistent.
    pub fn apply<S: Storage>(self, store: &mut ConfigStore<S>, pool: &mut ParticlePool) -> SettingOutcome {
        let mut outcome = SettingOutcome::default();
        match self {
            Self::Enabled(v) => store.update(ConfigField::Enabled(v)),
            Self::Kind(kind) => {
                let color = kind.suggested_color().to_string();
                store.update(ConfigField::Kind(kind));
                store.update(ConfigField::Color(color.clone()));
                outcome.suggested_color = Some(color);
                outcome.pool_reset = true;
            }
            Self::Color(v) => store.update(ConfigField::Color(v)),
            Self::Size(v) => {
                store.update(ConfigField::Size(v));
                outcome.pool_reset = true;
            }
            Self::Speed(v) => {
                store.update(ConfigField::Speed(v));
                outcome.pool_reset = true;
            }
            Self::Count(v) => store.update(ConfigField::Count(v)),
        }
        store.save();
        if outcome.pool_reset {
            pool.clear();
        }
        outcome
    }
}

// Integer parse that tolerates a fractional slider value, truncating like `parseInt`.
fn parse_count(raw: &str) -> Option<u32> {
    if let Ok(v) = raw.parse::<u32>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0).then(|| v.trunc() as u32)
}
