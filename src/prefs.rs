//! User preferences persisted between launches.
//!
//! Stored as JSON in the platform config directory. Only the presentation layer
//! reads these; the chat core never does.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl BubbleColor {
    pub const ALL: [BubbleColor; 6] = [
        BubbleColor::Red,
        BubbleColor::Orange,
        BubbleColor::Yellow,
        BubbleColor::Green,
        BubbleColor::Blue,
        BubbleColor::Purple,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BubbleColor::Red => "Red",
            BubbleColor::Orange => "Orange",
            BubbleColor::Yellow => "Yellow",
            BubbleColor::Green => "Green",
            BubbleColor::Blue => "Blue",
            BubbleColor::Purple => "Purple",
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            BubbleColor::Red => [220, 60, 60],
            BubbleColor::Orange => [230, 140, 40],
            BubbleColor::Yellow => [220, 190, 40],
            BubbleColor::Green => [60, 170, 90],
            BubbleColor::Blue => [60, 120, 220],
            BubbleColor::Purple => [150, 90, 210],
        }
    }

    /// Top and bottom colors of a bubble. A flat fill uses the base color for both.
    pub fn fill(&self, gradient: bool) -> ([u8; 3], [u8; 3]) {
        let base = self.rgb();
        if !gradient {
            return (base, base);
        }
        // Top edge is the base blended 40% toward white.
        let top = base.map(|c| c + ((255 - c) as u16 * 2 / 5) as u8);
        (top, base)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,

    #[serde(default = "default_user_color")]
    pub chat_user_color: BubbleColor,

    #[serde(default = "default_ollama_color")]
    pub chat_ollama_color: BubbleColor,

    /// Off helps on older machines.
    #[serde(default = "default_true")]
    pub show_gradients: bool,

    #[serde(default = "default_true")]
    pub show_animations: bool,

    #[serde(default)]
    pub onboarding_shown: bool,
}

fn default_user_color() -> BubbleColor {
    BubbleColor::Yellow
}

fn default_ollama_color() -> BubbleColor {
    BubbleColor::Green
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            chat_user_color: default_user_color(),
            chat_ollama_color: default_ollama_color(),
            show_gradients: true,
            show_animations: true,
            onboarding_shown: false,
        }
    }
}

impl Preferences {
    /// `<config dir>/ollama-chat/preferences.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ollama-chat").join("preferences.json"))
    }

    /// Load from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading preferences from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing preferences in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("writing preferences to {}", path.display()))
    }
}
