//! # nest-typegen
//!
//! Generates structural TypeScript declarations for the NEST client's request,
//! response and mapping types.
//!
//! ## Architecture
//!
//! A run is a single sequential pass:
//!
//! - [`scanner`] walks the client sources and [`declarations`] extracts the
//!   namespace and top-level type names of every file
//! - [`symbols`] maps each declared type name to its owning namespace
//! - [`registry`] loads the model and low level type universes
//! - [`parameters`] indexes the low level request parameter types
//! - [`filter`] selects the concrete types worth exporting
//! - [`naming`] decides exported names and type shapes
//! - [`emitter`] renders the declaration file and [`writer`] puts it on disk
//!
//! [`config`], [`context`] and [`error`] hold the shared plumbing.

pub mod config;
pub mod context;
pub mod declarations;
pub mod emitter;
pub mod error;
pub mod filter;
pub mod naming;
pub mod parameters;
pub mod registry;
pub mod scanner;
pub mod symbols;
pub mod writer;

pub use config::{Config, ConfigManager};
pub use context::GenerationContext;
pub use emitter::{DeclarationEmitter, GeneratedOutput, GenerationReport};
pub use error::{GenError, GenResult};
pub use naming::NamingEngine;
pub use registry::TypeRegistry;
pub use scanner::SourceScanner;
pub use symbols::SymbolTable;
pub use writer::FileWriter;

use filter::select_with_context;
use parameters::ParameterIndex;
use std::path::Path;
use tracing::info;

/// Run the whole pipeline in memory.
///
/// Nothing is written; any failure aborts the run.
pub fn generate(config: &Config) -> GenResult<GeneratedOutput> {
    let registry = TypeRegistry::load(&config.registry.path)?;
    generate_with_registry(config, &registry)
}

/// Run the pipeline against an already loaded registry.
pub fn generate_with_registry(
    config: &Config,
    registry: &TypeRegistry,
) -> GenResult<GeneratedOutput> {
    let declarations = SourceScanner::new(&config.source.root)
        .with_extension(config.source.extension.clone())
        .with_skip_folders(config.source.skip_folders.iter().cloned())
        .scan()?;

    let symbols = SymbolTable::from_declarations(&declarations);
    let parameters = ParameterIndex::build(registry);
    let ctx = GenerationContext::new(config, symbols, parameters)?;

    let candidates = select_with_context(registry, &ctx);
    info!(candidates = candidates.len(), "emitting declarations");

    Ok(DeclarationEmitter::new(&ctx, registry).emit(&candidates))
}

/// Regenerate in memory and compare with an existing declaration file.
///
/// Leading and trailing whitespace is ignored. A missing or differing file is
/// a [`GenError::Validation`] failure.
pub fn validate_artifact(config: &Config, path: &Path) -> GenResult<()> {
    if !path.exists() {
        return Err(GenError::Validation(format!(
            "Declaration file not found: {}",
            path.display()
        )));
    }

    let existing = std::fs::read_to_string(path)?;
    let output = generate(config)?;

    if existing.trim() == output.content.trim() {
        Ok(())
    } else {
        Err(GenError::Validation(format!(
            "Declarations are out of date: {}",
            path.display()
        )))
    }
}
