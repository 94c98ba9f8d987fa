use serde::{Deserialize, Serialize};

/// File the persisted bubble settings live in.
pub const SETTINGS_FILE: &str = "bubble_settings.json";

/// Margin the bubble keeps from the screen edges.
pub const SAFE_MARGIN: f32 = 10.0;
/// Extra band reserved at the top of the viewport.
pub const SAFE_TOP: f32 = 40.0;
/// Distance below which a released drag is pinned to an edge.
pub const SNAP_DISTANCE: f32 = 24.0;

pub const MIN_FONT: i32 = 12;
pub const MAX_FONT: i32 = 20;
pub const FONT_STEP: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// The single persisted settings record. Each field falls back to its
/// documented default when missing from the file; the record is always
/// written wholesale, so callers must carry the full merged state into
/// [`BubbleSettings::save`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleSettings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_font_size")]
    pub font_size: i32,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_left")]
    pub left: f32,
    #[serde(default = "default_top")]
    pub top: f32,
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

fn default_font_size() -> i32 {
    14
}

fn default_width() -> f32 {
    320.0
}

fn default_height() -> f32 {
    180.0
}

fn default_left() -> f32 {
    80.0
}

fn default_top() -> f32 {
    80.0
}

/// Primary subtag of the environment's UI language, falling back to English.
fn default_target_language() -> String {
    std::env::var("LANG")
        .ok()
        .and_then(|lang| {
            lang.split(['_', '.', '@'])
                .next()
                .map(|s| s.to_ascii_lowercase())
        })
        .filter(|l| l.len() >= 2 && l.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or_else(|| "en".into())
}

impl Default for BubbleSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            font_size: default_font_size(),
            width: default_width(),
            height: default_height(),
            left: default_left(),
            top: default_top(),
            target_language: default_target_language(),
        }
    }
}

impl BubbleSettings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            // A record that was never written is the defaults path; any
            // other read failure is a real storage error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                tracing::warn!("failed to read settings file {path}: {e}");
                return Err(e.into());
            }
        };
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
