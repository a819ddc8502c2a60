//! Validator - partitions transformed rows before any commit is attempted

use serde::Serialize;

use crate::domain::{ImportSpec, TransformedRow};

/// Why a row was rejected
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// 1-based position in the transformed sequence
    pub row: usize,
    /// Labels of the required fields that were missing or blank
    pub missing: Vec<String>,
    pub message: String,
}

/// Partition of transformed rows into importable and rejected
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowPartition {
    pub valid: Vec<TransformedRow>,
    pub errors: Vec<ValidationError>,
}

impl RowPartition {
    /// Number of rows the partition was built from
    pub fn total(&self) -> usize {
        self.valid.len() + self.errors.len()
    }
}

/// Check every row against the registry's required fields
///
/// A required field is missing when its key is absent or its value renders
/// to an empty string after trimming. Never fails: every input row lands on
/// exactly one side of the partition, and rejected rows keep their original
/// 1-based position.
pub fn validate_rows(rows: &[TransformedRow], spec: &ImportSpec) -> RowPartition {
    let required = spec.required_fields();
    let mut partition = RowPartition::default();

    for (index, row) in rows.iter().enumerate() {
        let missing: Vec<String> = required
            .iter()
            .filter(|f| {
                row.get(f.field)
                    .map(|v| v.render().trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|f| f.label.to_string())
            .collect();

        if missing.is_empty() {
            partition.valid.push(row.clone());
        } else {
            partition.errors.push(ValidationError {
                row: index + 1,
                message: format!("Missing required fields: {}", missing.join(", ")),
                missing,
            });
        }
    }

    partition
}
