//! Execution engine - applies a plan, in parallel across resources

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::planner::{ExecutionPlan, PlannedChange};
use crate::resource::Resource;
use crate::types::{Action, ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;

/// What an execution did, per resource
#[derive(Debug)]
pub struct ExecuteOutcome<T> {
    pub summary: ExecuteSummary,
    /// New records for created and updated resources, by name
    pub applied: Vec<(String, T)>,
    /// Names of deleted resources
    pub removed: Vec<String>,
    /// Names and errors of failed resources, with their full cause chain
    pub failures: Vec<(String, anyhow::Error)>,
}

impl<T> Default for ExecuteOutcome<T> {
    fn default() -> Self {
        Self {
            summary: ExecuteSummary::default(),
            applied: Vec::new(),
            removed: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Execute a plan with the given options and callbacks
///
/// A failing resource never aborts the others and never yields a record;
/// its previous record stays authoritative.
///
/// # Arguments
/// * `resource` - Lifecycle hooks for the planned resources
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run, jobs)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback
pub fn execute<R, P, C>(
    resource: &R,
    plan: ExecutionPlan<R>,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteOutcome<R::Record>>
where
    R: Resource,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let mut outcome = ExecuteOutcome::default();
    let (pending, unchanged): (Vec<_>, Vec<_>) =
        plan.changes.into_iter().partition(|c| c.is_pending());
    outcome.summary.no_change = unchanged.len();

    if pending.is_empty() {
        return Ok(outcome);
    }

    if opts.dry_run {
        skip_pending(&pending, "dry run", &mut outcome.summary, progress);
        return Ok(outcome);
    }

    // Confirm before proceeding
    let prompt = format!("Apply {} change(s)?", pending.len());
    if !confirm.confirm(&prompt)? {
        skip_pending(&pending, "declined", &mut outcome.summary, progress);
        return Ok(outcome);
    }

    progress.on_batch_start(pending.len());
    let results = execute_batch(resource, &pending, opts.jobs, progress)?;
    progress.on_batch_complete();

    for change in results {
        outcome.summary.add_result(&change.result);
        if let Some(error) = change.error {
            outcome.failures.push((change.name, error));
            continue;
        }
        match (change.result, change.record) {
            (ApplyResult::Removed, _) => outcome.removed.push(change.name),
            (_, Some(record)) => outcome.applied.push((change.name, record)),
            _ => {}
        }
    }

    Ok(outcome)
}

/// Report every pending change as skipped without touching it
fn skip_pending<R: Resource, P: ProgressCallback>(
    pending: &[PlannedChange<R>],
    reason: &str,
    summary: &mut ExecuteSummary,
    progress: &mut P,
) {
    for change in pending {
        let result = ApplyResult::Skipped {
            reason: reason.to_string(),
        };
        progress.on_resource_complete(&change.name, &result);
        summary.add_result(&result);
    }
}

/// One applied change; `error` is set exactly when `result` is `Failed`
struct ChangeResult<T> {
    name: String,
    result: ApplyResult,
    record: Option<T>,
    error: Option<anyhow::Error>,
}

/// Execute a batch of pending changes
fn execute_batch<R: Resource, P: ProgressCallback>(
    resource: &R,
    changes: &[PlannedChange<R>],
    jobs: usize,
    progress: &mut P,
) -> Result<Vec<ChangeResult<R::Record>>> {
    if jobs <= 1 || changes.len() == 1 {
        // Sequential execution
        let mut results = Vec::with_capacity(changes.len());
        for change in changes {
            progress.on_resource_start(&change.name, &describe(resource, change));
            let applied = apply_change(resource, change);
            progress.on_resource_complete(&change.name, &applied.result);
            results.push(applied);
        }
        Ok(results)
    } else {
        execute_parallel(resource, changes, jobs, progress)
    }
}

/// Execute changes in parallel using rayon
fn execute_parallel<R: Resource, P: ProgressCallback>(
    resource: &R,
    changes: &[PlannedChange<R>],
    jobs: usize,
    progress: &mut P,
) -> Result<Vec<ChangeResult<R::Record>>> {
    // The progress callback is not shared across threads; results are
    // reported once the pool is done.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to create thread pool")?;

    let results: Vec<ChangeResult<R::Record>> = pool.install(|| {
        changes
            .par_iter()
            .map(|change| apply_change(resource, change))
            .collect()
    });

    for applied in &results {
        progress.on_resource_complete(&applied.name, &applied.result);
    }

    Ok(results)
}

fn describe<R: Resource>(resource: &R, change: &PlannedChange<R>) -> String {
    match (&change.desired, &change.prior) {
        (Some(config), _) => resource.describe(config),
        (None, Some(prior)) => format!(
            "{} {}",
            resource.resource_type(),
            resource.record_id(&prior.record)
        ),
        (None, None) => change.name.clone(),
    }
}

/// Apply a single planned change
fn apply_change<R: Resource>(
    resource: &R,
    change: &PlannedChange<R>,
) -> ChangeResult<R::Record> {
    let name = change.name.clone();
    match run_hooks(resource, change) {
        Ok((result, record)) => ChangeResult {
            name,
            result,
            record,
            error: None,
        },
        Err(e) => {
            log::warn!("{}: {:#}", change.name, e);
            ChangeResult {
                name,
                result: ApplyResult::Failed {
                    error: format!("{e:#}"),
                },
                record: None,
                error: Some(e),
            }
        }
    }
}

fn run_hooks<R: Resource>(
    resource: &R,
    change: &PlannedChange<R>,
) -> Result<(ApplyResult, Option<R::Record>)> {
    match change.action {
        Action::NoChange => Ok((ApplyResult::NoChange, None)),
        Action::Create => {
            let config = change
                .desired
                .as_ref()
                .ok_or_else(|| anyhow!("create planned without configuration"))?;
            let record = resource.create(config)?;
            let record = resource.read(config, &record)?;
            Ok((ApplyResult::Created, Some(record)))
        }
        Action::Update => {
            let config = change
                .desired
                .as_ref()
                .ok_or_else(|| anyhow!("update planned without configuration"))?;
            let prior = change
                .prior
                .as_ref()
                .ok_or_else(|| anyhow!("update planned without a record"))?;
            let record = resource.update(&prior.config, config, &prior.record)?;
            let record = resource.read(config, &record)?;
            Ok((ApplyResult::Modified, Some(record)))
        }
        Action::Delete => {
            let prior = change
                .prior
                .as_ref()
                .ok_or_else(|| anyhow!("delete planned without a record"))?;
            resource.delete(&prior.record)?;
            Ok((ApplyResult::Removed, None))
        }
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple<R: Resource>(
    resource: &R,
    plan: ExecutionPlan<R>,
    opts: ExecuteOptions,
) -> Result<ExecuteOutcome<R::Record>> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(resource, plan, opts, &mut NoProgress, &mut AutoConfirm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, NoProgress};
    use crate::planner::Prior;
    use crate::testing::{TestConfig, TestResource};
    use std::collections::BTreeMap;

    fn plan(
        resource: &TestResource,
        desired: &[(&str, &str)],
        prior: &[(&str, &str)],
    ) -> ExecutionPlan<TestResource> {
        let desired = desired
            .iter()
            .map(|(n, v)| (n.to_string(), TestConfig::new(v)))
            .collect();
        let prior: BTreeMap<_, _> = prior
            .iter()
            .map(|(n, v)| {
                (
                    n.to_string(),
                    Prior {
                        config: TestConfig::new(v),
                        record: format!("id-{v}"),
                    },
                )
            })
            .collect();
        ExecutionPlan::build(resource, &desired, &prior).unwrap()
    }

    /// Progress callback that records events
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ProgressCallback for Recorder {
        fn on_batch_start(&mut self, count: usize) {
            self.events.push(format!("batch:{count}"));
        }
        fn on_resource_start(&mut self, name: &str, _description: &str) {
            self.events.push(format!("start:{name}"));
        }
        fn on_resource_complete(&mut self, name: &str, result: &ApplyResult) {
            match result {
                ApplyResult::Skipped { reason } => {
                    self.events.push(format!("skipped:{name}:{reason}"));
                }
                ApplyResult::Failed { .. } => self.events.push(format!("failed:{name}")),
                _ => self.events.push(format!("done:{name}")),
            }
        }
        fn on_batch_complete(&mut self) {
            self.events.push("complete".to_string());
        }
    }

    #[test]
    fn test_execute_empty_plan() {
        let resource = TestResource::default();
        let plan = plan(&resource, &[], &[]);
        let outcome = execute(
            &resource,
            plan,
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(outcome.summary.total(), 0);
        assert!(resource.calls().is_empty());
    }

    #[test]
    fn test_execute_no_changes() {
        let resource = TestResource::default();
        let plan = plan(&resource, &[("a", "one")], &[("a", "one")]);
        let outcome = execute(
            &resource,
            plan,
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(outcome.summary.no_change, 1);
        assert!(outcome.applied.is_empty());
        assert!(resource.calls().is_empty());
    }

    #[test]
    fn test_execute_sequential_lifecycle() {
        let resource = TestResource::default();
        let plan = plan(
            &resource,
            &[("a", "new"), ("b", "changed")],
            &[("b", "old"), ("c", "gone")],
        );
        let mut progress = Recorder::default();
        let outcome = execute(
            &resource,
            plan,
            ExecuteOptions {
                dry_run: false,
                jobs: 1,
            },
            &mut progress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(outcome.summary.created, 1);
        assert_eq!(outcome.summary.modified, 1);
        assert_eq!(outcome.summary.removed, 1);
        assert_eq!(
            outcome.applied,
            vec![
                ("a".to_string(), "id-new".to_string()),
                ("b".to_string(), "id-changed".to_string()),
            ]
        );
        assert_eq!(outcome.removed, vec!["c".to_string()]);
        assert_eq!(
            resource.calls(),
            [
                "create:changed",
                "create:new",
                "delete:id-gone",
                "read:changed",
                "read:new",
            ]
        );
        assert_eq!(
            progress.events,
            [
                "batch:3", "start:a", "done:a", "start:b", "done:b", "start:c", "done:c",
                "complete",
            ]
        );
    }

    #[test]
    fn test_execute_parallel_isolates_failures() {
        let resource = TestResource::default();
        let plan = plan(
            &resource,
            &[("a", "one"), ("b", "fail-two"), ("c", "three")],
            &[],
        );
        let mut progress = Recorder::default();
        let outcome = execute(
            &resource,
            plan,
            ExecuteOptions {
                dry_run: false,
                jobs: 4,
            },
            &mut progress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(outcome.summary.created, 2);
        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "b");
        assert!(format!("{:#}", outcome.failures[0].1).contains("cannot create fail-two"));
        assert!(outcome.applied.iter().all(|(name, _)| name != "b"));
        assert_eq!(
            progress.events,
            ["batch:3", "done:a", "failed:b", "done:c", "complete"]
        );
    }

    #[test]
    fn test_execute_declined() {
        let resource = TestResource::default();
        let plan = plan(&resource, &[("a", "one")], &[]);
        let mut progress = Recorder::default();
        let outcome = execute(
            &resource,
            plan,
            ExecuteOptions::default(),
            &mut progress,
            &mut AutoDecline,
        )
        .unwrap();

        assert_eq!(outcome.summary.skipped, 1);
        assert_eq!(progress.events, ["skipped:a:declined"]);
        assert!(resource.calls().is_empty());
    }

    #[test]
    fn test_execute_dry_run() {
        let resource = TestResource::default();
        let plan = plan(&resource, &[("a", "one")], &[]);
        let mut progress = Recorder::default();
        let outcome = execute(
            &resource,
            plan,
            ExecuteOptions {
                dry_run: true,
                jobs: 1,
            },
            &mut progress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(outcome.summary.skipped, 1);
        assert_eq!(outcome.summary.total(), 1);
        assert_eq!(progress.events, ["skipped:a:dry run"]);
        assert!(resource.calls().is_empty());
    }
}
