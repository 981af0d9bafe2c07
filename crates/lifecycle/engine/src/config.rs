//! Lifecycle configuration
//!
//! Stage catalogs are data, not code. They are read once at startup from a
//! TOML or YAML file (chosen by extension) and fall back to the built-in
//! catalogs compiled into this crate.

use lifecycle_timeline::LayoutOptions;
use lifecycle_types::{EntityKind, LifecycleError, LifecycleResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Catalogs shipped with the crate
pub const BUILTIN_CATALOGS: &str = include_str!("../catalogs/default.toml");

/// Top-level lifecycle configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// One catalog per entity kind. Empty means "use the built-in catalogs".
    #[serde(default)]
    pub catalogs: Vec<CatalogConfig>,

    #[serde(default)]
    pub timeline: LayoutOptions,

    /// Buffer size of the applied-event broadcast channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_event_channel_capacity() -> usize {
    256
}

/// Stage catalog for one entity kind, as written in configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub kind: EntityKind,
    /// Defaults to the first listed stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    /// Stages in display order
    pub stages: Vec<StageConfig>,
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub id: String,
    #[serde(default)]
    pub terminal: bool,
    /// Checklist items required to leave this stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<Vec<String>>,
}

/// Outgoing edges of one stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub from: String,
    pub to: Vec<String>,
}

impl LifecycleConfig {
    /// The built-in configuration
    pub fn builtin() -> LifecycleResult<Self> {
        Self::from_toml_str(BUILTIN_CATALOGS)
    }

    /// Load configuration from `path`, or the built-in configuration.
    ///
    /// A missing file is not an error. A file that lists no catalogs keeps
    /// its other settings and takes the built-in catalogs.
    pub fn load(path: Option<&Path>) -> LifecycleResult<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };

        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using built-in catalogs");
            return Self::builtin();
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            LifecycleError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents)?,
            _ => Self::from_toml_str(&contents)?,
        };

        if config.catalogs.is_empty() {
            config.catalogs = Self::builtin()?.catalogs;
        }

        tracing::info!(
            path = %path.display(),
            catalogs = config.catalogs.len(),
            "Lifecycle configuration loaded"
        );
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> LifecycleResult<Self> {
        toml::from_str(contents).map_err(|e| LifecycleError::Config(e.to_string()))
    }

    pub fn from_yaml_str(contents: &str) -> LifecycleResult<Self> {
        serde_yaml::from_str(contents).map_err(|e| LifecycleError::Config(e.to_string()))
    }

    /// The catalog configured for `kind`, if any
    pub fn catalog(&self, kind: EntityKind) -> Option<&CatalogConfig> {
        self.catalogs.iter().find(|c| c.kind == kind)
    }
}
