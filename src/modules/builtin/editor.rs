use crate::modules::{ModuleConfig, ModuleKey};
use serde::{Deserialize, Serialize};

pub const EDITOR: ModuleKey<EditorConfig> = ModuleKey::from_static("editor");

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 72;

/// Editor appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default)]
    pub line_wrap: bool,
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_font_size() -> u32 {
    14
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            font_size: default_font_size(),
            line_wrap: false,
        }
    }
}

impl ModuleConfig for EditorConfig {
    fn normalize(mut self) -> Self {
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
        self
    }
}
