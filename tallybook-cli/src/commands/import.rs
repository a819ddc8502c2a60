//! Import command - drive the wizard from file to datastore

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use indicatif::ProgressBar;
use serde::Serialize;

use super::get_context;
use crate::output;
use tallybook_core::adapters::MemoryDatastore;
use tallybook_core::config::ImportProfile;
use tallybook_core::domain::TargetField;
use tallybook_core::{
    CellValue, Datastore, Entity, FieldMapping, ImportOutcome, ImportWizard, TallybookContext,
};

/// Machine-readable summary of one import run
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReport {
    entity: &'static str,
    rows: usize,
    valid: usize,
    rejected: usize,
    preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<ImportOutcome>,
}

#[allow(clippy::too_many_arguments)]
pub async fn run(
    entity: Option<String>,
    file: Option<PathBuf>,
    map: Vec<String>,
    unmap: Vec<String>,
    preview: bool,
    dry_run: bool,
    profile: Option<String>,
    save_profile: Option<String>,
    list_profiles: bool,
    yes: bool,
    json: bool,
) -> Result<()> {
    let mut ctx = get_context()?;

    // List profiles
    if list_profiles {
        return print_profiles(&ctx, json);
    }

    let entity: Entity = entity
        .ok_or_else(|| anyhow::anyhow!("Record type required (e.g. tb import customers data.csv)"))?
        .parse()?;
    let file = file.ok_or_else(|| anyhow::anyhow!("File path required for import"))?;

    let mut wizard = ctx.wizard(entity);
    wizard.load_file(&file).await?;

    if !json {
        println!(
            "Loaded {} rows, {} columns from {}",
            wizard.row_count(),
            wizard.headers().len(),
            file.display()
        );
        println!();
    }

    // Profile mappings replay first, --map/--unmap flags override them
    if let Some(name) = &profile {
        apply_profile(&ctx, &mut wizard, name, entity, json)?;
    }
    for pair in &map {
        let (target, source) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("--map expects TARGET=SOURCE, got '{}'", pair))?;
        wizard.set_mapping(target.trim(), Some(source.trim()))?;
    }
    for target in &unmap {
        wizard.set_mapping(target.trim(), None)?;
    }

    if !json {
        print_mappings(&wizard);
    }

    // Offer to fill in required fields the matcher missed
    if !yes && !json && atty::is(atty::Stream::Stdin) {
        prompt_missing(&mut wizard)?;
    }

    wizard.confirm_mapping()?;

    let (valid, rejected) = {
        let partition = wizard
            .partition()
            .ok_or_else(|| anyhow::anyhow!("No rows validated"))?;
        (partition.valid.len(), partition.errors.len())
    };

    if !json {
        print_preview(&wizard);
    }

    if preview {
        if let Some(name) = &save_profile {
            store_profile(&mut ctx, name, entity, &wizard, json)?;
        }
        if json {
            let report = ImportReport {
                entity: entity.collection(),
                rows: wizard.row_count(),
                valid,
                rejected,
                preview: true,
                outcome: None,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!();
            println!("{}", "PREVIEW MODE - No records imported".yellow());
        }
        return Ok(());
    }

    // Confirm before touching the real datastore
    if !yes && !json && atty::is(atty::Stream::Stdin) {
        let prompt = if dry_run {
            format!("Import {} records into a throwaway datastore?", valid)
        } else {
            format!("Import {} records into '{}'?", valid, entity)
        };
        if !Confirm::new().with_prompt(prompt).default(true).interact()? {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let datastore: Arc<dyn Datastore> = if dry_run {
        Arc::new(MemoryDatastore::new())
    } else {
        Arc::clone(&ctx.datastore)
    };

    let spinner = if json {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_message(format!("Importing {} records...", valid));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    };

    let outcome = wizard.execute(datastore).await?.clone();

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if let Some(name) = &save_profile {
        store_profile(&mut ctx, name, entity, &wizard, json)?;
    }

    if json {
        let report = ImportReport {
            entity: entity.collection(),
            rows: wizard.row_count(),
            valid,
            rejected,
            preview: false,
            outcome: Some(outcome.clone()),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_outcome(&outcome, dry_run);
    }

    // Exit with code 1 if any rows were rejected on the way in
    if outcome.failed() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_profiles(ctx: &TallybookContext, json: bool) -> Result<()> {
    let profiles = &ctx.config.import_profiles;

    if json {
        println!("{}", serde_json::to_string_pretty(profiles)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No saved profiles.");
        return Ok(());
    }

    println!("Saved import profiles:");
    let mut names: Vec<_> = profiles.keys().collect();
    names.sort();
    for name in names {
        let profile = &profiles[name];
        println!();
        println!("  {}", name.green());
        println!("    Entity: {}", profile.entity);
        for mapping in &profile.mappings {
            println!("    {}: {}", mapping.target, mapping.source);
        }
    }
    Ok(())
}

fn apply_profile(
    ctx: &TallybookContext,
    wizard: &mut ImportWizard,
    name: &str,
    entity: Entity,
    json: bool,
) -> Result<()> {
    let profile = ctx
        .config
        .profile(name)
        .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", name))?
        .clone();

    if profile.entity != entity.collection() {
        anyhow::bail!(
            "Profile '{}' was saved for {}, not {}",
            name,
            profile.entity,
            entity
        );
    }

    for mapping in &profile.mappings {
        // The file may not have every column the profile expects
        if let Err(e) = wizard.set_mapping(&mapping.target, Some(&mapping.source)) {
            output::warning(&format!("Skipping profile mapping: {}", e));
        }
    }

    if !json {
        println!("Using profile '{}'", name);
    }
    Ok(())
}

fn store_profile(
    ctx: &mut TallybookContext,
    name: &str,
    entity: Entity,
    wizard: &ImportWizard,
    json: bool,
) -> Result<()> {
    let mappings: Vec<FieldMapping> = wizard.mappings().iter().cloned().collect();
    ctx.config.set_profile(
        name,
        ImportProfile {
            entity: entity.collection().to_string(),
            mappings,
        },
    );
    ctx.save_config()?;
    if !json {
        println!("Profile '{}' saved", name);
    }
    Ok(())
}

fn print_mappings(wizard: &ImportWizard) {
    println!("{}", "Column mappings:".cyan());
    for field in wizard.spec().fields {
        match wizard.mappings().source_for(field.field) {
            Some(source) => println!("  {}: {}", field.label, source),
            None if field.required => {
                println!("  {}: {}", field.label, "(unmapped, required)".red())
            }
            None => println!("  {}: {}", field.label, "-".dimmed()),
        }
    }
    println!();
}

fn prompt_missing(wizard: &mut ImportWizard) -> Result<()> {
    let missing: Vec<(&'static str, &'static str)> = wizard
        .missing_required()
        .iter()
        .map(|f| (f.field, f.label))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    println!("{}", "Required fields without a column:".yellow());
    println!("  Available columns: {}", wizard.headers().join(", ").dimmed());

    for (field, label) in missing {
        let source: String = Input::new()
            .with_prompt(format!("Column for '{}' (blank to skip)", label))
            .allow_empty(true)
            .interact_text()?;
        let source = source.trim();
        if !source.is_empty() {
            if let Err(e) = wizard.set_mapping(field, Some(source)) {
                output::error(&e.to_string());
            }
        }
    }
    println!();
    Ok(())
}

fn print_preview(wizard: &ImportWizard) {
    let Some(partition) = wizard.partition() else {
        return;
    };
    let spec = wizard.spec();

    println!(
        "{} valid, {} rejected of {} rows",
        partition.valid.len(),
        partition.errors.len(),
        partition.total()
    );

    let mapped: Vec<&TargetField> = spec
        .fields
        .iter()
        .filter(|f| wizard.mappings().is_mapped(f.field))
        .collect();

    if !partition.valid.is_empty() && !mapped.is_empty() {
        println!();
        let mut table = output::create_table();
        table.set_header(mapped.iter().map(|f| f.label).collect::<Vec<_>>());
        for row in partition.valid.iter().take(10) {
            table.add_row(
                mapped
                    .iter()
                    .map(|f| row.get(f.field).map(CellValue::render).unwrap_or_default())
                    .collect::<Vec<_>>(),
            );
        }
        println!("{}", table);
        if partition.valid.len() > 10 {
            println!("... and {} more", partition.valid.len() - 10);
        }
    }

    if !partition.errors.is_empty() {
        println!();
        output::warning(&format!("{} rows will be skipped:", partition.errors.len()));
        let mut table = output::create_table();
        table.set_header(vec!["Row", "Problem"]);
        for error in partition.errors.iter().take(10) {
            table.add_row(vec![error.row.to_string(), error.message.clone()]);
        }
        println!("{}", table);
        if partition.errors.len() > 10 {
            println!("... and {} more", partition.errors.len() - 10);
        }
    }
}

fn print_outcome(outcome: &ImportOutcome, dry_run: bool) {
    println!();
    if dry_run {
        println!("{}", "DRY RUN - configured datastore untouched".yellow());
    }
    if outcome.failed() == 0 {
        output::success("Import complete");
    } else {
        output::warning("Import finished with failures");
    }
    println!();
    println!("  Imported: {}", outcome.success());
    println!("  Failed: {}", outcome.failed());

    if outcome.failed() > 0 {
        println!();
        let mut table = output::create_table();
        table.set_header(vec!["Row", "Error"]);
        for failure in outcome.failures().take(10) {
            table.add_row(vec![
                failure.row.to_string(),
                failure.error.clone().unwrap_or_default(),
            ]);
        }
        println!("{}", table);
        if outcome.failed() > 10 {
            println!("... and {} more", outcome.failed() - 10);
        }
    }
}
