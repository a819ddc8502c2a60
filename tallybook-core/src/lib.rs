//! Tallybook Core - Import pipeline for tabular business records
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Field registries, cell values, header mapping
//! - **ports**: Trait definitions for external dependencies (Datastore)
//! - **services**: The import pipeline stages and the wizard that sequences them
//! - **adapters**: Concrete datastores (HTTP records API, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::{HttpDatastore, MemoryDatastore};
use config::{Config, DatastoreKind};

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{CellValue, Entity, FieldMapping, ImportSpec, MappingSet};
pub use ports::{Datastore, RecordId};
pub use services::{ImportOutcome, ImportWizard, WizardStep};

/// Main context for Tallybook operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration and the datastore the config selects, and hands out a
/// fresh wizard per import run.
pub struct TallybookContext {
    pub config: Config,
    pub datastore: Arc<dyn Datastore>,
    tallybook_dir: PathBuf,
}

impl TallybookContext {
    /// Create a new Tallybook context
    pub fn new(tallybook_dir: &Path) -> Result<Self> {
        let config = Config::load(tallybook_dir)?;

        let datastore: Arc<dyn Datastore> = match config.datastore.kind {
            DatastoreKind::Http => Arc::new(HttpDatastore::new(
                &config.datastore.base_url,
                config.datastore.api_key.clone(),
            )?),
            DatastoreKind::Memory => Arc::new(MemoryDatastore::new()),
        };

        Ok(Self {
            config,
            datastore,
            tallybook_dir: tallybook_dir.to_path_buf(),
        })
    }

    /// Start an import session for one record type
    pub fn wizard(&self, entity: Entity) -> ImportWizard {
        ImportWizard::new(entity.spec().clone())
    }

    /// Persist config changes back to settings.json
    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.tallybook_dir)
    }
}
