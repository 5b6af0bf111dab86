//! Plan and result display

use colored::{ColoredString, Colorize};
use declarative::{
    Action, ApplyResult, AttributeChange, AttributeDiff, ConfirmCallback, ExecuteSummary,
    ExecutionPlan, PlannedChange, ProgressCallback, Resource,
};

/// Render one attribute change, e.g. `"a" → (known after apply)`
pub fn format_attribute(diff: &AttributeDiff) -> String {
    match (&diff.old, &diff.new) {
        (Some(old), AttributeChange::Unchanged) => format!("{old:?}"),
        (Some(old), new) => format!("{old:?} → {new}"),
        (None, new) => new.to_string(),
    }
}

fn action_symbol(action: Action) -> ColoredString {
    match action {
        Action::Create => action.symbol().green(),
        Action::Update => action.symbol().yellow(),
        Action::Delete => action.symbol().red(),
        Action::NoChange => action.symbol().dimmed(),
    }
}

/// Attributes shown for a change: full configuration for creates, only
/// what moves for updates, the record identity for deletes
fn shown_attributes<R: Resource>(resource: &R, change: &PlannedChange<R>) -> Vec<AttributeDiff> {
    match change.action {
        Action::Create => {
            let mut attributes: Vec<AttributeDiff> = change
                .desired
                .as_ref()
                .map(|config| {
                    resource
                        .attributes(config)
                        .into_iter()
                        .map(|(name, value)| {
                            AttributeDiff::new(name, None, AttributeChange::Known(value))
                        })
                        .collect()
                })
                .unwrap_or_default();
            attributes.extend(change.attributes.iter().cloned());
            attributes
        }
        Action::Delete => change
            .prior
            .as_ref()
            .map(|prior| {
                resource
                    .record_attributes(&prior.record)
                    .into_iter()
                    .map(|(name, value)| {
                        AttributeDiff::new(name, Some(value), AttributeChange::Unchanged)
                    })
                    .collect()
            })
            .unwrap_or_default(),
        Action::Update | Action::NoChange => change.attributes.clone(),
    }
}

/// Display a plan in a user-friendly format
pub fn display_plan<R: Resource>(resource: &R, plan: &ExecutionPlan<R>) {
    if plan.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Execution Plan".bold()
    );
    println!("│");
    println!("│ {}", resource.resource_type().bold());

    for change in plan.pending() {
        let description = change
            .desired
            .as_ref()
            .map(|config| resource.describe(config))
            .unwrap_or_else(|| change.action.to_string());

        println!(
            "│   {} {:<24} {}",
            action_symbol(change.action),
            change.name,
            description.dimmed()
        );

        let attributes = shown_attributes(resource, change);
        let width = attributes.iter().map(|a| a.name.len()).max().unwrap_or(0);
        for attribute in &attributes {
            println!(
                "│       {:<width$}  {}",
                attribute.name,
                format_attribute(attribute),
                width = width
            );
        }
    }
    println!("│");

    let summary = plan.summary();
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Plan: {} to create, {} to update, {} to delete, {} unchanged",
        summary.creates.to_string().green(),
        summary.updates.to_string().yellow(),
        summary.deletes.to_string().red(),
        summary.unchanged
    );
    println!("└─────────────────────────────────────────────────────┘");
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Apply complete!", "✓".green().bold());
    } else {
        println!("  {} Apply finished with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} versions created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} versions updated", summary.modified);
    }
    if summary.removed > 0 {
        println!("    • {} versions forgotten", summary.removed);
    }
    if summary.skipped > 0 {
        println!("    • {} versions skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "versions".red());
    }
}

/// Line-per-resource progress on the terminal
pub struct TerminalProgress {
    verbose: bool,
}

impl TerminalProgress {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_batch_start(&mut self, count: usize) {
        println!();
        println!("  {} Applying {} change(s)...", "→".cyan(), count);
    }

    fn on_resource_start(&mut self, name: &str, description: &str) {
        if self.verbose {
            println!("    {} {} {}", "…".dimmed(), name, description.dimmed());
        }
    }

    fn on_resource_complete(&mut self, name: &str, result: &ApplyResult) {
        match result {
            ApplyResult::Failed { error } => {
                println!("    {} {} {}", "✗".red(), name, error.red());
            }
            ApplyResult::Skipped { reason } => {
                println!("    {} {} {}", "⊘".dimmed(), name, reason.dimmed());
            }
            ApplyResult::NoChange => println!("    {} {}", "○".dimmed(), name),
            ApplyResult::Created | ApplyResult::Modified | ApplyResult::Removed => {
                println!("    {} {}", "✓".green(), name);
            }
        }
    }

    fn on_batch_complete(&mut self) {}
}

/// Interactive confirmation via dialoguer
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool> {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;

        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_attribute() {
        let create = AttributeDiff::new("label", None, AttributeChange::Known("v1".into()));
        assert_eq!(format_attribute(&create), "\"v1\"");

        let computed = AttributeDiff::new("arn", Some("arn:a".into()), AttributeChange::Computed);
        assert_eq!(format_attribute(&computed), "\"arn:a\" → (known after apply)");

        let kept = AttributeDiff::new("arn", Some("arn:a".into()), AttributeChange::Unchanged);
        assert_eq!(format_attribute(&kept), "\"arn:a\"");
    }
}
