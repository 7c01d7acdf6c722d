//! Execution engine - applies planned changes in parallel
//!
//! Deletes run first so that a replaced or renamed object frees its name
//! before anything is created. Within each phase, changes to different
//! objects run concurrently on a rayon pool; each change runs its own
//! sequential session on the device.

use crate::client::Client;
use crate::context::{ConfirmCallback, ProgressCallback};
use crate::planner::{Action, Address, Plan, PlannedChange};
use crate::registry::Registry;
use crate::types::{ChangeResult, ExecuteOptions, ExecuteSummary, StateChange};
use anyhow::Result;
use log::debug;
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};

/// Result of one change, with what to record in state
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Object address
    pub address: Address,
    /// What happened
    pub result: ChangeResult,
    /// State update
    pub state: StateChange,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default)]
pub struct Execution {
    /// Counts per result
    pub summary: ExecuteSummary,
    /// Per-object outcomes in completion order
    pub outcomes: Vec<Outcome>,
}

/// Execute a plan with the given options and callbacks
///
/// Nothing is done when the plan has no actionable change or the user
/// declines; every change is reported as skipped in the latter case.
pub fn execute<P, C>(
    plan: Plan,
    registry: &Registry,
    client: &Client,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<Execution>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let changes: Vec<PlannedChange> = plan
        .into_changes()
        .into_iter()
        .filter(|c| c.action != Action::NoChange)
        .collect();

    if changes.is_empty() || opts.dry_run {
        return Ok(Execution::default());
    }

    let prompt = format!("Apply {} change(s)?", changes.len());
    if !confirm.confirm(&prompt)? {
        let outcomes: Vec<Outcome> = changes
            .into_iter()
            .map(|c| Outcome {
                address: c.address,
                result: ChangeResult::Skipped {
                    reason: "Declined".into(),
                },
                state: StateChange::Keep,
            })
            .collect();
        return Ok(summarize(outcomes));
    }

    let (deletes, others): (Vec<_>, Vec<_>) =
        changes.into_iter().partition(|c| c.action == Action::Delete);

    progress.on_start(deletes.len() + others.len());
    let progress = Mutex::new(progress);
    let mut outcomes = Vec::new();
    for phase in [deletes, others] {
        if phase.is_empty() {
            continue;
        }
        debug!("applying {} change(s) with {} job(s)", phase.len(), opts.jobs);
        outcomes.extend(execute_batch(&phase, registry, client, opts.jobs, &progress)?);
    }
    progress
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .on_finish();

    Ok(summarize(outcomes))
}

fn summarize(outcomes: Vec<Outcome>) -> Execution {
    let mut summary = ExecuteSummary::default();
    for outcome in &outcomes {
        summary.add_result(&outcome.result);
    }
    Execution { summary, outcomes }
}

/// Execute a batch of independent changes
fn execute_batch<P: ProgressCallback>(
    changes: &[PlannedChange],
    registry: &Registry,
    client: &Client,
    jobs: usize,
    progress: &Mutex<&mut P>,
) -> Result<Vec<Outcome>> {
    let run = |change: &PlannedChange| {
        report(progress, |p| p.on_change_start(&change.address.to_string(), change.action));
        let outcome = apply_change(change, registry, client);
        report(progress, |p| {
            p.on_change_complete(&change.address.to_string(), &outcome.result);
        });
        outcome
    };

    if jobs <= 1 || changes.len() == 1 {
        return Ok(changes.iter().map(run).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {e}"))?;

    Ok(pool.install(|| changes.par_iter().map(run).collect()))
}

fn report<P: ProgressCallback>(progress: &Mutex<&mut P>, f: impl FnOnce(&mut P)) {
    let mut guard = progress.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut **guard);
}

/// Apply a single change
fn apply_change(change: &PlannedChange, registry: &Registry, client: &Client) -> Outcome {
    let failed = |err: &dyn std::fmt::Display, state: StateChange| Outcome {
        address: change.address.clone(),
        result: ChangeResult::Failed {
            error: err.to_string(),
        },
        state,
    };
    let done = |result: ChangeResult, state: StateChange| Outcome {
        address: change.address.clone(),
        result,
        state,
    };

    let handler = match registry.get(&change.address.type_name) {
        Ok(h) => h,
        Err(e) => return failed(&e, StateChange::Keep),
    };

    match (change.action, &change.prior, &change.planned) {
        (Action::Create, _, Some(planned)) => match handler.create(client, planned) {
            Ok(state) => done(ChangeResult::Created, StateChange::Set(state)),
            Err(e) => failed(&e, StateChange::Keep),
        },
        (Action::Update, Some(prior), Some(planned)) => {
            match handler.update(client, prior, planned) {
                Ok(state) => done(ChangeResult::Updated, StateChange::Set(state)),
                Err(e) => failed(&e, StateChange::Keep),
            }
        }
        (Action::Replace, Some(prior), Some(planned)) => {
            if let Err(e) = handler.delete(client, prior) {
                return failed(&e, StateChange::Keep);
            }
            match handler.create(client, planned) {
                Ok(state) => done(ChangeResult::Replaced, StateChange::Set(state)),
                Err(e) => failed(&e, StateChange::Remove),
            }
        }
        (Action::Delete, Some(prior), _) => match handler.delete(client, prior) {
            Ok(()) => done(ChangeResult::Deleted, StateChange::Remove),
            Err(e) => failed(&e, StateChange::Keep),
        },
        (action, _, _) => done(
            ChangeResult::Skipped {
                reason: format!("nothing to {}", action.verb()),
            },
            StateChange::Keep,
        ),
    }
}
