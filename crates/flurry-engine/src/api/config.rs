use serde::{Deserialize, Serialize};

/// Which shape every particle is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    /// Soft glowing circle.
    #[default]
    Snow,
    /// Four-pointed twinkle.
    Star,
    /// Squashed ellipse with a vein.
    Leaf,
    /// Two-lobed petal.
    #[serde(alias = "sakura")]
    Flower,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [Self::Snow, Self::Star, Self::Leaf, Self::Flower];

    /// Color offered to the user when this kind is picked.
    pub fn suggested_color(self) -> &'static str {
        match self {
            Self::Snow => "#ffffff",
            Self::Star => "#fff6cc",
            Self::Leaf => "#88cc88",
            Self::Flower => "#ffb7b2",
        }
    }

    /// Wire name, as stored and as used for `<option value>`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Snow => "snow",
            Self::Star => "star",
            Self::Leaf => "leaf",
            Self::Flower => "flower",
        }
    }

    /// Parse a wire name. Accepts the legacy `sakura` name for `Flower`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "snow" => Some(Self::Snow),
            "star" => Some(Self::Star),
            "leaf" => Some(Self::Leaf),
            "flower" | "sakura" => Some(Self::Flower),
            _ => None,
        }
    }
}

/// Animation parameters. Read every frame, written by the settings panel.
///
/// Ranges are not enforced here; the panel's slider bounds are the only clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientConfig {
    /// Master switch.
    pub enabled: bool,
    /// Shape variant.
    #[serde(rename = "type")]
    pub kind: EffectKind,
    /// Fall-speed multiplier.
    pub speed: f32,
    /// Base radius in pixels.
    pub size: f32,
    /// Target number of live particles.
    pub count: u32,
    /// CSS color used to fill every particle.
    pub color: String,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: EffectKind::Snow,
            speed: 2.0,
            size: 3.0,
            count: 100,
            color: EffectKind::Snow.suggested_color().to_string(),
        }
    }
}

impl AmbientConfig {
    /// Serialize to the flat JSON record used for persistence.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
