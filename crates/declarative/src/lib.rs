//! # Declarative
//!
//! Declarative management of Junos configuration objects.
//!
//! Each resource type describes a typed attribute set, how to render it as
//! `set` lines and how to parse it back from the device. This crate provides
//! everything around that contract: schema validation with path-addressed
//! diagnostics, the session orchestrator that applies a resource safely, and
//! the planner and executor that converge a whole configuration.
//!
//! ## Core Concepts
//!
//! - **Resource**: a typed Junos object ([`Resource`])
//! - **Schema**: attributes, blocks and constraints ([`Schema`])
//! - **Client**: lock, pre-check, set, commit, post-check ([`Client`])
//! - **Plan**: per-object create/update/replace/delete actions ([`Plan`])
//! - **Executor**: applies a plan with parallelism ([`execute`])
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`Transport`] / [`Session`]: device access
//! - [`ProgressCallback`]: receives progress updates
//! - [`ConfirmCallback`]: handles user confirmations
//!
//! This keeps the crate free of any particular device transport or UI.

pub mod client;
pub mod context;
pub mod diag;
pub mod diff;
pub mod error;
pub mod executor;
pub mod planner;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use client::{Client, Options};
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diag::{AttrPath, Diagnostic, Diagnostics, Severity, summary};
pub use diff::{AttributeChange, DiffSummary, attribute_changes, group_by_type};
pub use error::{Error, ErrorCategory, RenderError, Result};
pub use executor::{Execution, Outcome, execute};
pub use planner::{Action, Address, Plan, PlannedChange};
pub use registry::{Handler, Registry, ResourceType};
pub use resource::{Collision, Identity, ImportFormat, Resource, check, require_one_of};
pub use schema::{AttrKind, Attribute, BlockSchema, Constraint, NameFormat, Presence, Schema};
pub use transport::{Session, Transport};
pub use types::{ChangeResult, ExecuteOptions, ExecuteSummary, StateChange};
