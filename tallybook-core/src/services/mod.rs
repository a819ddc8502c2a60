//! Service layer - the import pipeline stages
//!
//! Each stage is its own module with a small surface; the wizard sequences
//! them and is the only service holding state across calls.

mod executor;
mod export;
mod parse;
mod transform;
mod validate;
mod wizard;

pub use executor::{ImportExecutor, ImportOutcome, RowOutcome};
pub use export::export_csv;
pub use parse::{parse_file, ParsedFile};
pub use transform::apply_mappings;
pub use validate::{validate_rows, RowPartition, ValidationError};
pub use wizard::{ImportWizard, WizardStep};
