//! Configuration management for the generator.
//!
//! This module handles loading configuration from `nest-typegen.toml` files
//! and merging with command-line arguments.

use crate::error::{ConfigError, GenResult};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "nest-typegen.toml";

/// Capability interfaces whose concrete implementers are exported.
pub const DEFAULT_CAPABILITY_INTERFACES: [&str; 8] = [
    "IRequest",
    "IResponse",
    "ICharFilter",
    "ITokenFilter",
    "IAnalyzer",
    "ITokenizer",
    "IIndicesModuleSettings",
    "IProperty",
];

/// Builder, descriptor and attribute helpers never carry wire shapes.
pub const DEFAULT_EXCLUSION_PATTERN: &str = r"(Descriptor|Attribute)(?:Base)?(?:`.+$|$)";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source tree configuration.
    pub source: SourceConfig,

    /// Type registry configuration.
    pub registry: RegistryConfig,

    /// Output configuration.
    pub output: OutputConfig,

    /// Naming overrides.
    pub naming: NamingConfig,

    /// Type selection rules.
    pub filter: FilterConfig,
}

/// Source tree configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Root directory holding the client's declaration sources.
    pub root: PathBuf,

    /// Extension of declaration source files, without the dot.
    pub extension: String,

    /// Files whose immediate parent folder has one of these names are skipped.
    pub skip_folders: Vec<String>,
}

/// Type registry configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path to the JSON type registry.
    pub path: PathBuf,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file path.
    pub file: PathBuf,

    /// Whether to prefix declarations with their owning namespace.
    pub annotate_namespaces: bool,
}

/// Naming override configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Explicit type renames, keyed by bare source type name.
    pub renames: BTreeMap<String, String>,
}

/// Type selection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Interfaces that make an implementing class eligible for export.
    pub capability_interfaces: Vec<String>,

    /// Regex over type names; matching types are never exported.
    pub exclusion_pattern: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("../../src/Nest"),
            extension: "cs".to_string(),
            skip_folders: vec![
                "_Generated".to_string(),
                "Debug".to_string(),
                "Release".to_string(),
            ],
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("type-registry.json"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("typedefinitions.ts"),
            annotate_namespaces: true,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            capability_interfaces: DEFAULT_CAPABILITY_INTERFACES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclusion_pattern: DEFAULT_EXCLUSION_PATTERN.to_string(),
        }
    }
}

impl FilterConfig {
    /// Compile the exclusion pattern.
    pub fn exclusion_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.exclusion_pattern)
            .map_err(|e| ConfigError::invalid_value("filter.exclusion_pattern", e.to_string()))
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// Without an explicit path the default filename is tried and missing
    /// files fall back to defaults. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> GenResult<Config> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(ConfigError::not_found(p.to_path_buf()).into()),
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        Self::validate(&config)?;

        Ok(config)
    }

    /// Reject values that would only fail later in the pipeline.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        config.filter.exclusion_regex()?;

        if config.source.extension.is_empty() {
            return Err(ConfigError::invalid_value(
                "source.extension",
                "must not be empty",
            ));
        }

        if config.filter.capability_interfaces.is_empty() {
            return Err(ConfigError::invalid_value(
                "filter.capability_interfaces",
                "at least one interface is required",
            ));
        }

        Ok(())
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref root) = args.root {
            config.source.root = root.clone();
        }

        if let Some(ref registry) = args.registry {
            config.registry.path = registry.clone();
        }

        if let Some(ref output) = args.output {
            config.output.file = output.clone();
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# nest-typegen configuration file

[source]
# Root of the client declaration sources
root = "../../src/Nest"

# Extension of source files to scan
extension = "cs"

# Files directly inside folders with these names are ignored
skip_folders = ["_Generated", "Debug", "Release"]

[registry]
# JSON description of the model and low level type universes
path = "type-registry.json"

[output]
# Generated declaration file
file = "typedefinitions.ts"

# Prefix declarations with a namespace comment
annotate_namespaces = true

[naming.renames]
# Explicit type renames, keyed by bare source type name
# KeyValuePair = "key_value"

[filter]
# Concrete classes implementing one of these are exported
capability_interfaces = [
    "IRequest",
    "IResponse",
    "ICharFilter",
    "ITokenFilter",
    "IAnalyzer",
    "ITokenizer",
    "IIndicesModuleSettings",
    "IProperty",
]

# Type names matching this pattern are never exported
exclusion_pattern = '(Descriptor|Attribute)(?:Base)?(?:`.+$|$)'
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Source root override.
    pub root: Option<PathBuf>,

    /// Registry path override.
    pub registry: Option<PathBuf>,

    /// Output file override.
    pub output: Option<PathBuf>,
}
