use anyhow::Result;
use colored::Colorize;
use declarative::{Attribute, BlockSchema, Presence, Schema};
use std::collections::BTreeMap;

use crate::resource;
use crate::ui;

fn display_attribute(attr: &Attribute, indent: usize) {
    let presence = match attr.presence {
        Presence::Required => "required".yellow(),
        Presence::Optional => "optional".dimmed(),
        Presence::Computed => "computed".cyan(),
    };
    println!(
        "{:indent$}{} ({}, {}) {}",
        "",
        attr.name.bold(),
        attr.kind.name(),
        presence,
        attr.description.dimmed()
    );
}

fn display_block(block: &BlockSchema, indent: usize) {
    let count = match (block.min_items, block.max_items) {
        (0, None) => String::new(),
        (min, None) => format!("at least {min}"),
        (min, Some(max)) if min == max => format!("exactly {max}"),
        (min, Some(max)) => format!("{min} to {max}"),
    };
    println!(
        "{:indent$}{} {}",
        "",
        format!("{} {{ }}", block.name).bold(),
        count.dimmed()
    );
    for attr in &block.attributes {
        display_attribute(attr, indent + 2);
    }
    for nested in &block.blocks {
        display_block(nested, indent + 2);
    }
}

fn display_schema(type_name: &str, schema: &Schema, import: &str) {
    ui::header(type_name);
    if !schema.description.is_empty() {
        ui::dim(schema.description);
    }
    ui::kv("Import ID", import);
    println!();
    for attr in &schema.attributes {
        display_attribute(attr, 2);
    }
    for block in &schema.blocks {
        display_block(block, 2);
    }
}

/// Describe one resource type, or all of them
pub fn run(type_name: Option<&str>, json: bool) -> Result<()> {
    let registry = resource::registry();
    let names: Vec<&str> = match type_name {
        Some(name) => {
            registry.get(name)?;
            vec![name]
        }
        None => registry.type_names().collect(),
    };

    if json {
        let mut schemas = BTreeMap::new();
        for name in &names {
            schemas.insert(*name, registry.get(name)?.schema());
        }
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    for name in names {
        let handler = registry.get(name)?;
        display_schema(name, &handler.schema(), &handler.import_format().describe());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type() {
        assert!(run(Some("junos_vlan"), false).is_err());
        assert!(run(Some("junos_application"), true).is_ok());
    }
}
