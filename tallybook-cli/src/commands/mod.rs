//! CLI command implementations

pub mod export;
pub mod fields;
pub mod import;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tallybook_core::TallybookContext;

/// Get the tallybook directory from environment or default
pub fn get_tallybook_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TALLYBOOK_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".tallybook")
    }
}

/// Get or create the tallybook context
pub fn get_context() -> Result<TallybookContext> {
    let tallybook_dir = get_tallybook_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&tallybook_dir)
        .with_context(|| format!("Failed to create tallybook directory: {:?}", tallybook_dir))?;

    tracing::debug!(dir = %tallybook_dir.display(), "initializing context");

    TallybookContext::new(&tallybook_dir).context("Failed to initialize tallybook context")
}
