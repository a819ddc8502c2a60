//! CSV export - writes datastore records back out with registry labels

use std::path::Path;

use tracing::info;

use crate::domain::result::Result;
use crate::domain::{CellValue, ImportSpec, TransformedRow};

/// Write records to a CSV file, one column per registry field.
///
/// The header row uses the human labels; cells render the way the preview
/// table does, with absent fields left blank. Returns the number of data
/// rows written.
pub fn export_csv(path: &Path, spec: &ImportSpec, records: &[TransformedRow]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;

    let labels: Vec<&str> = spec.fields.iter().map(|f| f.label).collect();
    writer.write_record(&labels)?;

    for record in records {
        let cells: Vec<String> = spec
            .fields
            .iter()
            .map(|f| record.get(f.field).map(CellValue::render).unwrap_or_default())
            .collect();
        writer.write_record(&cells)?;
    }

    writer.flush()?;
    info!(
        collection = spec.collection,
        rows = records.len(),
        path = %path.display(),
        "exported records"
    );
    Ok(records.len())
}
