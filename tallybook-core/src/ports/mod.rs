//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces the pipeline expects from external
//! collaborators. The core depends only on these traits; adapters provide
//! the implementations.

mod datastore;

pub use datastore::{Datastore, RecordId};
