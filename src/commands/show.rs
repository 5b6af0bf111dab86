//! `appver show` - recorded versions

use anyhow::Result;
use declarative::{Resource, parse_target};

use super::Project;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    ui::header("Recorded Versions");

    let project = Project::load(ctx)?;
    let resource = project.resource(ctx)?;

    let (resource_type, name_filter) = match target.map(parse_target) {
        Some((resource_type, name)) => (resource_type, Some(name)),
        None => (None, None),
    };
    if resource_type.is_some_and(|rt| rt != resource.resource_type()) {
        ui::warn(&format!("Unknown resource type in target '{}'", target.unwrap_or_default()));
        return Ok(());
    }

    let mut shown = 0;
    for (name, state) in &project.state.resources {
        if name_filter.is_some_and(|wanted| wanted != name.as_str()) {
            continue;
        }
        shown += 1;

        ui::section(&format!("{}.{}", resource.resource_type(), name));
        for (key, value) in resource.record_attributes(&state.record) {
            ui::kv(key, &value);
        }
        for (key, value) in resource.attributes(&state.config) {
            ui::kv(key, &value);
        }
        ui::kv("applied_at", &state.applied_at.to_rfc3339());

        match project.desired.get(name) {
            None => ui::dim("No longer configured; apply will forget it"),
            Some(config) if *config != state.config => {
                ui::dim("Configuration changed since last apply; run `appver plan`");
            }
            Some(_) => {}
        }
    }

    if shown == 0 {
        ui::info("No versions recorded");
    } else if ctx.verbose > 0 {
        println!();
        ui::dim(&format!(
            "State file: {}",
            ui::truncate_start(&project.state_path.display().to_string(), 60)
        ));
    }

    Ok(())
}
