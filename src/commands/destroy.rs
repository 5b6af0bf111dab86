//! `appver destroy` - forget recorded versions
//!
//! Registered versions are immutable history: the delete hook leaves them
//! in the registry and the uploaded bundles in the store. Only the state
//! records go away.

use anyhow::Result;
use declarative::{AutoConfirm, ExecuteOptions, ExecutionPlan, execute};
use std::collections::BTreeMap;

use super::Project;
use super::display::{PromptConfirm, TerminalProgress, display_plan, print_summary};
use crate::Context;
use crate::cli::DestroyArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &DestroyArgs) -> Result<()> {
    ui::header("Destroy");

    let mut project = Project::load(ctx)?;
    let resource = project.resource(ctx)?;
    let plan = ExecutionPlan::build(&resource, &BTreeMap::new(), &project.state.prior())?
        .filter_by_target(&resource, args.target.as_deref());

    display_plan(&resource, &plan);
    if plan.is_empty() {
        return Ok(());
    }

    println!();
    ui::dim("Registered versions and uploaded bundles are left in place");

    let pending = plan.total_changes();
    let opts = ExecuteOptions {
        dry_run: false,
        jobs: 1,
    };
    let mut progress = TerminalProgress::new(ctx.verbose > 0);
    let outcome = if args.yes {
        execute(&resource, plan, opts, &mut progress, &mut AutoConfirm)?
    } else {
        execute(&resource, plan, opts, &mut progress, &mut PromptConfirm)?
    };

    if outcome.summary.skipped == pending {
        println!();
        ui::warn("Aborted");
        return Ok(());
    }

    project.state.merge(&BTreeMap::new(), &outcome);
    project.save_state()?;
    print_summary(&outcome.summary);

    Ok(())
}
