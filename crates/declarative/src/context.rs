//! Progress and confirmation callbacks
//!
//! These traits keep the crate free of any particular UI: the binary plugs in
//! a progress bar and an interactive prompt, tests plug in the no-op versions.

use crate::planner::Action;
use crate::types::ChangeResult;
use anyhow::Result;

/// Progress callback for execution operations
pub trait ProgressCallback: Send {
    /// Called once before the first change, with the number of changes
    fn on_start(&mut self, count: usize);

    /// Called when a change starts
    fn on_change_start(&mut self, address: &str, action: Action);

    /// Called when a change completes
    fn on_change_complete(&mut self, address: &str, result: &ChangeResult);

    /// Called after the last change
    fn on_finish(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm an action
    ///
    /// Returns `true` if the user confirmed.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&mut self, _count: usize) {}
    fn on_change_start(&mut self, _address: &str, _action: Action) {}
    fn on_change_complete(&mut self, _address: &str, _result: &ChangeResult) {}
    fn on_finish(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
