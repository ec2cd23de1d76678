//! Code block module and the language capability probe

use crate::error::Result;
use crate::modules::{ConfigBinding, ConfigPatch, ModuleConfig, ModuleKey};
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const CODE_BLOCK: ModuleKey<CodeBlockConfig> = ModuleKey::from_static("code_block");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlockConfig {
    /// Highlighting language requested for the embedded editor
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_true")]
    pub line_numbers: bool,

    /// Result of the last language probe
    #[serde(default)]
    pub language_loaded: bool,
}

fn default_language() -> String {
    "plaintext".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CodeBlockConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            line_numbers: true,
            language_loaded: false,
        }
    }
}

impl ModuleConfig for CodeBlockConfig {
    fn normalize(mut self) -> Self {
        self.language = self.language.trim().to_lowercase();
        if self.language.is_empty() {
            self.language = default_language();
        }
        self
    }
}

/// Reports whether the embedded code editor could load support for a language
pub trait LanguageProbe {
    fn load_language(&self, name: &str) -> bool;
}

impl<F: Fn(&str) -> bool> LanguageProbe for F {
    fn load_language(&self, name: &str) -> bool {
        self(name)
    }
}

/// Probe `language` and record both the request and its outcome
pub fn select_language(
    binding: &mut ConfigBinding<CodeBlockConfig>,
    probe: &dyn LanguageProbe,
    language: &str,
) -> Result<bool> {
    let loaded = probe.load_language(language);
    if loaded {
        info!("Loaded code editor language '{}'", language);
    } else {
        warn!("Code editor language '{}' is unavailable", language);
    }

    binding.update(
        ConfigPatch::new()
            .set("language", language)
            .set("languageLoaded", loaded),
    )?;
    Ok(loaded)
}
