//! Datastore port - the remote collection API abstraction
//!
//! The import pipeline needs exactly one thing from the datastore: "insert
//! one record into collection C". Export additionally lists a collection.
//! Everything else about the datastore (schema, queries, transactions) is
//! outside the pipeline's contract.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::domain::TransformedRow;

/// Opaque identifier minted by the datastore for an inserted record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote datastore abstraction
///
/// A failed insert is a per-row outcome for the import executor, never a
/// fatal pipeline error. Implementations return `Err`, they do not panic.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Adapter name (e.g., "http", "memory")
    fn name(&self) -> &str;

    /// Insert a single record into a collection, returning its new id
    async fn insert_one(&self, collection: &str, record: &TransformedRow) -> Result<RecordId>;

    /// List all records in a collection (used by export, not by import)
    async fn list(&self, collection: &str) -> Result<Vec<TransformedRow>>;
}
