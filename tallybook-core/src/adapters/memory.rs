//! In-memory datastore
//!
//! Keeps records in process memory: the CLI's offline mode and the store
//! the test suite runs against. Inserts can be made to fail on chosen
//! ordinals or for a whole collection, which is how commit failure paths
//! get exercised without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::TransformedRow;
use crate::ports::{Datastore, RecordId};

/// In-memory implementation of the datastore port
#[derive(Debug, Default)]
pub struct MemoryDatastore {
    collections: Mutex<HashMap<String, Vec<(RecordId, TransformedRow)>>>,
    /// 1-based insert ordinals, counted across all collections, that fail
    reject_ordinals: Vec<usize>,
    /// Collection whose inserts always fail
    reject_collection: Option<String>,
    inserts: AtomicUsize,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given insert attempts (1-based ordinals)
    pub fn with_reject_ordinals(mut self, ordinals: &[usize]) -> Self {
        self.reject_ordinals = ordinals.to_vec();
        self
    }

    /// Fail every insert into `collection`
    pub fn with_reject_collection(mut self, collection: &str) -> Self {
        self.reject_collection = Some(collection.to_string());
        self
    }

    /// Records inserted into `collection`, in insert order
    pub async fn records(&self, collection: &str) -> Vec<(RecordId, TransformedRow)> {
        self.collections
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Insert attempts seen so far, including rejected ones
    pub fn insert_attempts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert_one(&self, collection: &str, record: &TransformedRow) -> Result<RecordId> {
        let attempt = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;

        if self.reject_ordinals.contains(&attempt) {
            return Err(Error::datastore(format!("insert {} rejected", attempt)));
        }

        if self.reject_collection.as_deref() == Some(collection) {
            return Err(Error::datastore(format!(
                "collection {} is rejecting inserts",
                collection
            )));
        }

        let id = RecordId(Uuid::new_v4().to_string());
        self.collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), record.clone()));

        Ok(id)
    }

    async fn list(&self, collection: &str) -> Result<Vec<TransformedRow>> {
        Ok(self
            .collections
            .lock()
            .await
            .get(collection)
            .map(|records| records.iter().map(|(_, row)| row.clone()).collect())
            .unwrap_or_default())
    }
}
