use serde::{Deserialize, Serialize};

use super::bookmark::BookmarkColor;

/// Configuration from nook.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NookConfig {
    #[serde(default)]
    pub todos: TodoConfig,
    #[serde(default)]
    pub bookmarks: BookmarkConfig,
    #[serde(default)]
    pub scratch: ScratchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Show completed todos in listings
    #[serde(default = "default_true")]
    pub show_done: bool,
}

impl Default for TodoConfig {
    fn default() -> Self {
        TodoConfig { show_done: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkConfig {
    /// Color given to new bookmarks when none is requested
    #[serde(default)]
    pub default_color: BookmarkColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScratchConfig {
    /// Language recorded for new scratch files when none is given
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        ScratchConfig {
            default_language: default_language(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "plaintext".to_string()
}
