//! CLI functionality for the measure tool
//!
//! This module contains all CLI-related functionality including:
//! - Measure listing
//! - Population evaluation
//! - Catalogue and dataset validation
//! - Output formatting

pub mod evaluate;
pub mod list;
pub mod output;
pub mod validate;

use anyhow::{Context, Result};
use octofhir_measure_registry::CodeSetRegistry;
use std::path::Path;

/// Load a catalogue from disk, or the built-in one
pub fn load_registry(path: Option<&Path>) -> Result<CodeSetRegistry> {
    match path {
        Some(path) => CodeSetRegistry::from_file(path)
            .with_context(|| format!("Failed to load code set registry: {}", path.display())),
        None => CodeSetRegistry::builtin().context("Failed to load built-in code set registry"),
    }
}
