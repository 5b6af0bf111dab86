//! `appver plan` - preview what apply would change
//!
//! Planning reads the project and state files only; nothing is uploaded
//! and the registry is not consulted.

use anyhow::Result;

use super::Project;
use super::display::display_plan;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    if !ctx.quiet {
        ui::header("Plan");
    }

    let project = Project::load(ctx)?;
    let resource = project.resource(ctx)?;
    let plan = project.plan(&resource, target)?;

    display_plan(&resource, &plan);

    if !plan.is_empty() && !ctx.quiet {
        println!();
        ui::dim("Run `appver apply` to perform these changes");
    }

    Ok(())
}
