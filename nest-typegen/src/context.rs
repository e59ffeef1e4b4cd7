//! Immutable state shared by the filter, naming engine and emitter.

use crate::config::Config;
use crate::error::ConfigError;
use crate::parameters::ParameterIndex;
use crate::symbols::SymbolTable;
use regex::Regex;
use std::collections::BTreeMap;

/// Everything the generation stages consult besides the registry itself.
///
/// Built once per run and passed by reference; nothing in it changes after
/// construction.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Explicit type renames, keyed by bare source name.
    pub renames: BTreeMap<String, String>,

    /// Interfaces that make a class eligible for export.
    pub capability_interfaces: Vec<String>,

    /// Type names matching this are never exported.
    pub exclusion_pattern: Regex,

    /// Declared type name → owning namespace.
    pub symbols: SymbolTable,

    /// Request name → low level parameter type.
    pub parameters: ParameterIndex,

    /// Whether declarations carry a namespace comment.
    pub annotate_namespaces: bool,
}

impl GenerationContext {
    /// Assemble a context from configuration and the prebuilt side tables.
    pub fn new(
        config: &Config,
        symbols: SymbolTable,
        parameters: ParameterIndex,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            renames: config.naming.renames.clone(),
            capability_interfaces: config.filter.capability_interfaces.clone(),
            exclusion_pattern: config.filter.exclusion_regex()?,
            symbols,
            parameters,
            annotate_namespaces: config.output.annotate_namespaces,
        })
    }
}
