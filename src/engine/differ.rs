//! Plan display - per-object actions, attribute changes and set-line diffs

use colored::{ColoredString, Colorize};
use declarative::{Action, PlannedChange, Plan, Registry, attribute_changes, group_by_type};
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

fn colored_symbol(action: Action) -> ColoredString {
    let symbol = action.symbol();
    match action {
        Action::Create => symbol.green(),
        Action::Update => symbol.yellow(),
        Action::Replace => symbol.magenta(),
        Action::Delete => symbol.red(),
        Action::NoChange => symbol.dimmed(),
    }
}

fn show_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "(unset)".to_string(),
        Some(Value::String(s)) => format!("{s:?}"),
        Some(v) => v.to_string(),
    }
}

/// Line-level diff between two renderings, unchanged lines included
pub fn line_diff(before: &[String], after: &[String]) -> Vec<(ChangeTag, String)> {
    let join = |lines: &[String]| {
        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    };
    let (old, new) = (join(before), join(after));
    TextDiff::from_lines(&old, &new)
        .iter_all_changes()
        .map(|change| (change.tag(), change.value().trim_end().to_string()))
        .collect()
}

/// Lines the device holds now and will hold afterwards
fn renderings(registry: &Registry, change: &PlannedChange) -> (Vec<String>, Vec<String>) {
    let render = |value: Option<&Value>| {
        value
            .and_then(|v| {
                registry
                    .get(&change.address.type_name)
                    .and_then(|handler| handler.render(v))
                    .inspect_err(|e| log::debug!("cannot render {}: {e}", change.address))
                    .ok()
            })
            .unwrap_or_default()
    };
    (render(change.prior.as_ref()), render(change.planned.as_ref()))
}

fn display_change(registry: &Registry, change: &PlannedChange, verbose: bool) {
    let forces = if change.replace_because.is_empty() {
        String::new()
    } else {
        format!(" (forces replacement: {})", change.replace_because.join(", "))
            .red()
            .to_string()
    };
    println!(
        "│   {} {}{}",
        colored_symbol(change.action),
        change.address,
        forces
    );

    if change.action != Action::Delete {
        for attr in attribute_changes(change.prior.as_ref(), change.planned.as_ref()) {
            println!(
                "│       {}: {} → {}",
                attr.name,
                show_value(attr.before.as_ref()).dimmed(),
                show_value(attr.after.as_ref())
            );
        }
    }

    if !verbose {
        return;
    }
    let (before, after) = renderings(registry, change);
    for (tag, line) in line_diff(&before, &after) {
        match tag {
            ChangeTag::Delete => println!("│       {}", format!("- {line}").red()),
            ChangeTag::Insert => println!("│       {}", format!("+ {line}").green()),
            ChangeTag::Equal => println!("│       {}", format!("  {line}").dimmed()),
        }
    }
}

/// Display a plan in a user-friendly format
///
/// With `verbose`, each object also shows the set lines it renders to.
pub fn display_plan(plan: &Plan, registry: &Registry, verbose: bool) {
    let actionable: Vec<PlannedChange> = plan.actionable().cloned().collect();
    if actionable.is_empty() {
        println!();
        println!("  {} No changes. Device matches the configuration.", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Execution Plan".bold()
    );
    println!("│");
    for (type_name, changes) in group_by_type(&actionable) {
        println!("│ {}", type_name.bold());
        for change in changes {
            display_change(registry, change, verbose);
        }
        println!("│");
    }

    let summary = plan.summary();
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Plan: {} to add, {} to change, {} to replace, {} to destroy",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.replacements.to_string().magenta(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_line_diff_marks_changed_lines() {
        let before = lines(&[
            "set applications application app1 protocol tcp",
            "set applications application app1 destination-port \"80\"",
        ]);
        let after = lines(&[
            "set applications application app1 protocol tcp",
            "set applications application app1 destination-port \"443\"",
        ]);
        let diff = line_diff(&before, &after);
        assert_eq!(diff.len(), 3);
        assert_eq!(diff[0].0, ChangeTag::Equal);
        assert_eq!(
            diff[1],
            (
                ChangeTag::Delete,
                "set applications application app1 destination-port \"80\"".to_string()
            )
        );
        assert_eq!(diff[2].0, ChangeTag::Insert);
    }

    #[test]
    fn test_line_diff_create() {
        let diff = line_diff(&[], &lines(&["set a b"]));
        assert_eq!(diff, vec![(ChangeTag::Insert, "set a b".to_string())]);
    }

    #[test]
    fn test_show_value() {
        assert_eq!(show_value(None), "(unset)");
        assert_eq!(show_value(Some(&Value::from("tcp"))), "\"tcp\"");
        assert_eq!(show_value(Some(&Value::from(300))), "300");
    }
}
