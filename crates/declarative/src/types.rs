//! Core types for plan execution

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of applying one planned change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeResult {
    /// Nothing to do
    NoChange,
    /// Object was created
    Created,
    /// Object was updated in place
    Updated,
    /// Object was deleted and created again
    Replaced,
    /// Object was deleted
    Deleted,
    /// Change failed
    Failed { error: String },
    /// Change was skipped
    Skipped { reason: String },
}

impl ChangeResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::Updated | Self::Replaced | Self::Deleted
        )
    }
}

/// What to record in state after a change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
    /// Leave the tracked entry as it was
    Keep,
    /// Track these attributes
    Set(Value),
    /// Stop tracking the object
    Remove,
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.replaced + self.deleted
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of changes processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.skipped + self.failed + self.no_change
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &Self) {
        self.created += other.created;
        self.updated += other.updated;
        self.replaced += other.replaced;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.no_change += other.no_change;
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ChangeResult) {
        match result {
            ChangeResult::NoChange => self.no_change += 1,
            ChangeResult::Created => self.created += 1,
            ChangeResult::Updated => self.updated += 1,
            ChangeResult::Replaced => self.replaced += 1,
            ChangeResult::Deleted => self.deleted += 1,
            ChangeResult::Failed { .. } => self.failed += 1,
            ChangeResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of objects changed in parallel
    pub jobs: usize,
    /// Verbose output
    pub verbose: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = ExecuteSummary::default();
        summary.add_result(&ChangeResult::Created);
        summary.add_result(&ChangeResult::Replaced);
        summary.add_result(&ChangeResult::Failed { error: "x".into() });
        summary.add_result(&ChangeResult::NoChange);
        assert_eq!(summary.total_changes(), 2);
        assert_eq!(summary.total(), 4);
        assert!(!summary.is_success());

        let mut other = ExecuteSummary::default();
        other.merge(&summary);
        assert_eq!(other, summary);
    }
}
