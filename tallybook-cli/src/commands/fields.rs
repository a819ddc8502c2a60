//! Fields command - show the import field registries

use std::collections::BTreeMap;

use anyhow::Result;
use colored::Colorize;

use crate::output;
use tallybook_core::domain::Transform;
use tallybook_core::{Entity, ImportSpec};

pub fn run(entity: Option<&str>, json: bool) -> Result<()> {
    let entities: Vec<Entity> = match entity {
        Some(name) => vec![name.parse()?],
        None => Entity::ALL.to_vec(),
    };

    if json {
        let specs: BTreeMap<&str, &ImportSpec> = entities
            .iter()
            .map(|e| (e.collection(), e.spec()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    for entity in entities {
        let spec = entity.spec();
        println!("{}", entity.collection().bold());

        let mut table = output::create_table();
        table.set_header(vec![
            "Field",
            "Label",
            "Required",
            "Transform",
            "Accepted headers",
        ]);
        for field in spec.fields {
            table.add_row(vec![
                field.field.to_string(),
                field.label.to_string(),
                if field.required { "yes" } else { "" }.to_string(),
                spec.transform_for(field.field)
                    .map(transform_name)
                    .unwrap_or("")
                    .to_string(),
                spec.aliases_for(field.field).join(", "),
            ]);
        }
        println!("{}", table);
        println!();
    }
    Ok(())
}

fn transform_name(transform: Transform) -> &'static str {
    match transform {
        Transform::Trim => "trim",
        Transform::Uppercase => "uppercase",
        Transform::Decimal => "decimal",
        Transform::Date => "date",
    }
}
