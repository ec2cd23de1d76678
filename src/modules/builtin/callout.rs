use crate::modules::{ModuleConfig, ModuleKey};
use serde::{Deserialize, Serialize};

pub const CALLOUT_CARDS: ModuleKey<CalloutCardsConfig> = ModuleKey::from_static("callout_cards");

pub const CALLOUT_KINDS: &[&str] = &["note", "tip", "warning", "danger", "quote"];

/// Callout card rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalloutCardsConfig {
    #[serde(default = "default_kind")]
    pub default_kind: String,

    #[serde(default)]
    pub collapsible: bool,

    #[serde(default = "default_true")]
    pub icons: bool,
}

fn default_kind() -> String {
    "note".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CalloutCardsConfig {
    fn default() -> Self {
        Self {
            default_kind: default_kind(),
            collapsible: false,
            icons: true,
        }
    }
}

impl ModuleConfig for CalloutCardsConfig {
    fn normalize(mut self) -> Self {
        if !CALLOUT_KINDS.iter().any(|kind| *kind == self.default_kind) {
            self.default_kind = default_kind();
        }
        self
    }
}
