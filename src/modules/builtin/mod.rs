//! Modules shipped with the plugin

pub mod callout;
pub mod code_block;
pub mod editor;

pub use callout::{CalloutCardsConfig, CALLOUT_CARDS};
pub use code_block::{select_language, CodeBlockConfig, LanguageProbe, CODE_BLOCK};
pub use editor::{EditorConfig, EDITOR};

use crate::modules::ModuleId;
use std::fmt;

/// Every built-in module. Each variant maps to one configuration type
/// through its `ModuleKey` constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Editor,
    CodeBlock,
    CalloutCards,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 3] = [ModuleKind::Editor, ModuleKind::CodeBlock, ModuleKind::CalloutCards];

    pub fn id(self) -> ModuleId {
        match self {
            ModuleKind::Editor => EDITOR.id().clone(),
            ModuleKind::CodeBlock => CODE_BLOCK.id().clone(),
            ModuleKind::CalloutCards => CALLOUT_CARDS.id().clone(),
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id().as_str() == id)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModuleKind::Editor => "Editor",
            ModuleKind::CodeBlock => "Code Blocks",
            ModuleKind::CalloutCards => "Callout Cards",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip_through_kind() {
        for kind in ModuleKind::ALL {
            assert_eq!(ModuleKind::from_id(kind.id().as_str()), Some(kind));
        }
        assert_eq!(ModuleKind::from_id("missing"), None);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<ModuleId> = ModuleKind::ALL.iter().map(|k| k.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), ModuleKind::ALL.len());
    }
}
