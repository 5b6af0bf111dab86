//! Plan-time prediction of derived attribute changes.
//!
//! Pure and offline. Only a change of `version_filename` can move the
//! derived attributes, because the label depends on nothing else.

use crate::config::DesiredConfiguration;
use crate::label::derive_label;
use declarative::AttributeChange;

/// Predicted changes to the computed attributes of a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub version_label: AttributeChange,
    pub version_arn: AttributeChange,
}

impl DiffResult {
    /// No derived attribute changes.
    pub fn unchanged() -> Self {
        Self {
            version_label: AttributeChange::Unchanged,
            version_arn: AttributeChange::Unchanged,
        }
    }

    /// Whether nothing is predicted to change.
    pub fn is_empty(&self) -> bool {
        self.version_label.is_unchanged() && self.version_arn.is_unchanged()
    }
}

/// Predict how the derived attributes move from `old` to `new`.
pub fn predict_diff(old: &DesiredConfiguration, new: &DesiredConfiguration) -> DiffResult {
    if new.version_filename == old.version_filename {
        return DiffResult::unchanged();
    }

    DiffResult {
        version_label: AttributeChange::Known(derive_label(&new.version_filename)),
        version_arn: AttributeChange::Computed,
    }
}
