use crate::diagram::IdGenerator;
use crate::error::{Error, Result};
use crate::policy::{AttributeFilter, FilterMode, NamingPolicy, DEFAULT_INTERFACE_PATTERN};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub diagram: DiagramConfig,
    pub filter: FilterConfig,
    pub interfaces: InterfaceConfig,
}

/// Diagram settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Title used when a diagram is created without one
    pub title: String,
    /// Figure ids start right after this value
    pub first_id: u64,
}

/// Member filter settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub mode: FilterMode,
}

/// Interface detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Glob patterns matched against class names
    pub patterns: Vec<String>,
    /// Treat explicitly annotated classes as interfaces
    pub honor_annotations: bool,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            title: "No name".to_string(),
            first_id: 0,
        }
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            patterns: vec![DEFAULT_INTERFACE_PATTERN.to_string()],
            honor_annotations: true,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Parse and validate config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.diagram.title.trim().is_empty() {
            return Err(Error::config_validation("diagram title must not be empty"));
        }

        for pattern in &self.interfaces.patterns {
            if pattern.is_empty() {
                return Err(Error::config_validation("interface patterns must not be empty"));
            }
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }

    /// Member filter for `add_object`
    pub fn attribute_filter(&self) -> AttributeFilter {
        AttributeFilter::new(self.filter.mode)
    }

    /// Interface predicate built from the configured patterns
    pub fn interface_policy(&self) -> Result<NamingPolicy> {
        NamingPolicy::new(self.interfaces.patterns.as_slice(), self.interfaces.honor_annotations)
    }

    /// Fresh id generator seeded with `first_id`
    pub fn id_generator(&self) -> IdGenerator {
        IdGenerator::starting_at(self.diagram.first_id)
    }
}
