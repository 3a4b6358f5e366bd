//! Registry configuration - TOML file or environment

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-registry behavior knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcConfig {
    /// Sweep the registry every time a handle is dropped
    #[serde(default = "default_true")]
    pub collect_on_drop: bool,

    /// Report a dropped handle with no record at error level instead of debug
    #[serde(default = "default_false")]
    pub strict_drop: bool,

    /// Record table capacity reserved up front
    #[serde(default = "default_capacity")]
    pub initial_capacity: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            collect_on_drop: true,
            strict_drop: false,
            initial_capacity: default_capacity(),
        }
    }
}

fn default_true() -> bool { true }
fn default_false() -> bool { false }
fn default_capacity() -> usize { 16 }

impl GcConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Create config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // GC_POINTER_COLLECT_ON_DROP: 0/false disables the per-drop sweep
        if let Ok(val) = std::env::var("GC_POINTER_COLLECT_ON_DROP") {
            config.collect_on_drop = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("GC_POINTER_STRICT_DROP") {
            config.strict_drop = parse_flag(&val);
        }

        if let Some(capacity) = std::env::var("GC_POINTER_CAPACITY")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            config.initial_capacity = capacity;
        }

        config
    }

    /// Builder: disable the per-drop sweep (collection only via `collect`/`shutdown`)
    pub fn deferred(mut self) -> Self {
        self.collect_on_drop = false;
        self
    }

    pub fn with_strict_drop(mut self, strict: bool) -> Self {
        self.strict_drop = strict;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
