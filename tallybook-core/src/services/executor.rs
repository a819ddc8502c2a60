//! Import executor - sequential per-row commit with independent outcomes

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::TransformedRow;
use crate::ports::{Datastore, RecordId};

/// What happened to one submitted row
#[derive(Debug, Clone, Serialize)]
pub struct RowOutcome {
    /// 1-based position in the submitted sequence
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RowOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// The commit ledger for one batch: one entry per submitted row,
/// with the aggregate counts derived from it
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportOutcome {
    pub outcomes: Vec<RowOutcome>,
}

impl ImportOutcome {
    pub fn submitted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn success(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.success()
    }

    /// Outcomes for rows whose insert was rejected
    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}

/// Commits validated rows through the datastore port
pub struct ImportExecutor {
    datastore: Arc<dyn Datastore>,
}

impl ImportExecutor {
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self { datastore }
    }

    /// Insert every row, one at a time, in order
    ///
    /// Each insert's outcome is recorded independently: a rejected row is
    /// counted and the batch continues. No retries, no rollback, and no
    /// error escapes; the returned ledger always covers every row.
    pub async fn commit(&self, collection: &str, rows: &[TransformedRow]) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            match self.datastore.insert_one(collection, row).await {
                Ok(record_id) => {
                    debug!(collection, row = row_number, id = %record_id, "row inserted");
                    outcome.outcomes.push(RowOutcome {
                        row: row_number,
                        record_id: Some(record_id),
                        error: None,
                    });
                }
                Err(e) => {
                    debug!(collection, row = row_number, error = %e, "row rejected");
                    outcome.outcomes.push(RowOutcome {
                        row: row_number,
                        record_id: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(
            collection,
            submitted = outcome.submitted(),
            success = outcome.success(),
            failed = outcome.failed(),
            "import batch finished"
        );

        outcome
    }
}
