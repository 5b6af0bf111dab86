//! `appver apply` - upload bundles and register or adopt versions

use anyhow::Result;
use declarative::{AutoConfirm, ExecuteOptions, execute};

use super::Project;
use super::display::{PromptConfirm, TerminalProgress, display_plan, print_summary};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    ui::header("Applying Configuration");

    if args.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let mut project = Project::load(ctx)?;
    let resource = project.resource(ctx)?;
    let plan = project.plan(&resource, args.target.as_deref())?;

    display_plan(&resource, &plan);
    if plan.is_empty() {
        return Ok(());
    }

    let pending = plan.total_changes();
    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        jobs: usize::from(args.jobs.max(1)),
    };
    let mut progress = TerminalProgress::new(ctx.verbose > 0);

    println!();
    let outcome = if args.yes || args.dry_run {
        execute(&resource, plan, opts, &mut progress, &mut AutoConfirm)?
    } else {
        execute(&resource, plan, opts, &mut progress, &mut PromptConfirm)?
    };

    if args.dry_run {
        println!();
        ui::info("Dry run - no changes made");
        return Ok(());
    }

    if outcome.summary.skipped == pending {
        println!();
        ui::warn("Aborted");
        return Ok(());
    }

    if outcome.summary.total_changes() > 0 {
        project.state.merge(&project.desired, &outcome);
        project.save_state()?;
        log::info!("State saved to {}", project.state_path.display());
    }

    print_summary(&outcome.summary);

    let failed = outcome.failures.len();
    let mut failures = outcome.failures.into_iter();
    if let Some((name, first)) = failures.next() {
        for (name, error) in failures {
            log::error!("{name}: {error:#}");
        }
        return Err(first.context(format!(
            "{failed} of {pending} change(s) failed, first in '{name}'; \
             their previous records were kept"
        )));
    }

    Ok(())
}
