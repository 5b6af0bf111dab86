//! # Declarative
//!
//! A framework for declarative resource lifecycles.
//!
//! The caller owns desired configuration and the records persisted from
//! previous applies. This crate plans what has to happen per named
//! resource and runs the resource's lifecycle hooks to get there.
//!
//! ## Core Concepts
//!
//! - **Resource**: Lifecycle hooks (`create`, `read`, `update`, `delete`,
//!   `plan_diff`) for one kind of remote object
//! - **Prior**: The configuration and record produced by the last apply
//! - **ExecutionPlan**: One planned action per resource, computed offline
//! - **Executor**: Applies pending actions with parallelism across resources
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{execute_simple, ExecuteOptions, ExecutionPlan};
//! use std::collections::BTreeMap;
//!
//! let mut desired = BTreeMap::new();
//! desired.insert("web".to_string(), config);
//!
//! let plan = ExecutionPlan::build(&resource, &desired, &BTreeMap::new())?;
//! for change in plan.pending() {
//!     println!("{} {} ({})", change.action.symbol(), change.name, change.action);
//! }
//!
//! let outcome = execute_simple(&resource, plan, ExecuteOptions::default())?;
//! for (name, record) in outcome.applied {
//!     // persist record under name
//! }
//! ```
//!
//! ## Provider Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::DiffSummary;
pub use executor::{ExecuteOutcome, execute, execute_simple};
pub use planner::{ExecutionPlan, PlanError, PlannedChange, Prior, parse_target};
pub use resource::{Resource, config_changes};
pub use types::{
    Action, ApplyResult, AttributeChange, AttributeDiff, ExecuteOptions, ExecuteSummary,
};
