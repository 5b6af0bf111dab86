//! Core types for declarative resource management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Planned change of a single attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeChange {
    /// Stays as it is
    Unchanged,
    /// Changes to a value known at plan time
    Known(String),
    /// Changes to a value only known after apply
    Computed,
}

impl AttributeChange {
    /// Check if no change is planned
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Check if the value is only known after apply
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed)
    }
}

impl fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "(unchanged)"),
            Self::Known(value) => write!(f, "{value:?}"),
            Self::Computed => write!(f, "(known after apply)"),
        }
    }
}

/// A named attribute with its prior value and planned change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDiff {
    /// Engine-visible attribute name
    pub name: String,
    /// Value before the change, if there was one
    pub old: Option<String>,
    /// Planned change
    pub new: AttributeChange,
}

impl AttributeDiff {
    pub fn new(name: impl Into<String>, old: Option<String>, new: AttributeChange) -> Self {
        Self {
            name: name.into(),
            old,
            new,
        }
    }
}

/// What the planner decided for one named resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// No record yet
    Create,
    /// Recorded configuration differs from desired
    Update,
    /// Recorded configuration matches desired
    NoChange,
    /// Recorded but no longer desired
    Delete,
}

impl Action {
    /// Plan symbol for display
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Create => "+",
            Self::Update => "~",
            Self::NoChange => " ",
            Self::Delete => "-",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update in-place"),
            Self::NoChange => write!(f, "no change"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was modified
    Modified,
    /// Resource was removed
    Removed,
    /// Apply failed
    Failed { error: String },
    /// Not applied: dry run or declined
    Skipped { reason: String },
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.created + self.modified + self.removed + self.skipped + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Modified => self.modified += 1,
            ApplyResult::Removed => self.removed += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of resources applied concurrently
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
        }
    }
}
