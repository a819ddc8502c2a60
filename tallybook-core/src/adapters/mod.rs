//! Adapter implementations
//!
//! Adapters implement the datastore port with concrete technologies:
//! - HTTP client for the remote records API
//! - In-memory store for offline use and for tests

pub mod http;
pub mod memory;

pub use http::HttpDatastore;
pub use memory::MemoryDatastore;
