//! Export command - write a datastore collection back to CSV

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::get_context;
use crate::output;
use tallybook_core::services::export_csv;
use tallybook_core::Entity;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportReport {
    entity: &'static str,
    records: usize,
    path: String,
}

pub async fn run(entity: &str, output_path: &Path, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let entity: Entity = entity.parse()?;

    let records = ctx.datastore.list(entity.collection()).await?;
    let written = export_csv(output_path, entity.spec(), &records)?;

    if json {
        let report = ExportReport {
            entity: entity.collection(),
            records: written,
            path: output_path.display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if written == 0 {
        output::warning(&format!(
            "No {} records in the datastore; wrote header only",
            entity
        ));
    } else {
        output::success(&format!(
            "Exported {} records to {}",
            written,
            output_path.display()
        ));
    }
    Ok(())
}
