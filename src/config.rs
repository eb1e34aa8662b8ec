use crate::input::keybindings::{Action, KeyChord};
use crate::view::file_tree::SortOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub explorer: ExplorerConfig,

    #[serde(default = "default_keybindings")]
    pub keybindings: Vec<Keybinding>,
}

/// File explorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// How siblings are ordered in the tree
    #[serde(default)]
    pub sort_order: SortOrder,

    /// Ask the editing surface to format before writing
    #[serde(default = "default_true")]
    pub format_on_save: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::default(),
            format_on_save: true,
        }
    }
}

/// Keybinding definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keybinding {
    /// Key name (e.g., "s", "Enter", "F5")
    pub key: String,

    /// Modifiers (e.g., "ctrl", "alt", "shift", "cmd")
    #[serde(default)]
    pub modifiers: Vec<String>,

    /// Action to perform
    pub action: Action,
}

impl Keybinding {
    fn new(key: &str, modifiers: &[&str], action: Action) -> Self {
        Self {
            key: key.to_string(),
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
            action,
        }
    }

    pub fn chord(&self) -> Result<KeyChord, ConfigError> {
        KeyChord::parse(&self.key, &self.modifiers)
    }
}

fn default_keybindings() -> Vec<Keybinding> {
    vec![
        Keybinding::new("s", &["ctrl"], Action::Save),
        // Cmd+S on macOS
        Keybinding::new("s", &["super"], Action::Save),
        Keybinding::new("o", &["ctrl"], Action::OpenFolder),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            explorer: ExplorerConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shortcuts().map(|_| ())
    }

    /// Keybindings resolved to chords
    pub fn shortcuts(&self) -> Result<Vec<(KeyChord, Action)>, ConfigError> {
        self.keybindings
            .iter()
            .map(|binding| Ok((binding.chord()?, binding.action)))
            .collect()
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
