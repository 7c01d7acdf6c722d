//! Execution engine for junosform
//!
//! 1. Planning - validate configuration and compare it with state
//! 2. Diffing - show attribute changes and set-line diffs
//! 3. Executing - apply changes on the device and record state

pub mod differ;
pub mod executor;
pub mod planner;

pub use differ::display_plan;
pub use executor::{ApplyOptions, apply};
