//! Plan summaries

use crate::types::Action;

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Number of resources to create
    pub creates: usize,
    /// Number of resources to update
    pub updates: usize,
    /// Number of resources to delete
    pub deletes: usize,
    /// Number of resources already converged
    pub unchanged: usize,
}

impl DiffSummary {
    /// Create a summary from planned actions
    pub fn from_actions(actions: impl IntoIterator<Item = Action>) -> Self {
        let mut summary = Self::default();
        for action in actions {
            match action {
                Action::Create => summary.creates += 1,
                Action::Update => summary.updates += 1,
                Action::Delete => summary.deletes += 1,
                Action::NoChange => summary.unchanged += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_actions() {
        let summary = DiffSummary::from_actions([
            Action::Create,
            Action::Create,
            Action::NoChange,
            Action::Delete,
        ]);
        assert_eq!(summary.creates, 2);
        assert_eq!(summary.deletes, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(DiffSummary::from_actions([Action::NoChange]).total(), 0);
    }
}
