//! Compensating multi-write sequences.
//!
//! The store has no multi-collection transactions. A [`Saga`] runs writes in
//! order and records an undo action for each completed one. When a later
//! write fails, the recorded undos run newest first. The caller learns whether
//! the store is back where it started (`SideEffectFailed { compensated: true }`)
//! or whether collections now disagree (`CompensationFailed`).

use futures_util::future::BoxFuture;
use kennel_core::{ConsistencyError, KennelError, KennelResult};
use std::future::Future;
use tracing::{error, warn};

/// An undo action recorded for a completed step.
pub type Undo = BoxFuture<'static, KennelResult<()>>;

pub struct Saga {
    name: &'static str,
    completed: Vec<(&'static str, Undo)>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            completed: Vec::new(),
        }
    }

    /// Run one step. On success, `undo` builds the compensation from the
    /// step's output; return `None` when there is nothing to undo.
    ///
    /// When the very first step fails there is nothing to compensate and its
    /// error is returned unchanged.
    pub async fn step<T, F, U>(
        &mut self,
        step: &'static str,
        action: F,
        undo: U,
    ) -> KennelResult<T>
    where
        F: Future<Output = KennelResult<T>>,
        U: FnOnce(&T) -> Option<Undo>,
    {
        match action.await {
            Ok(output) => {
                if let Some(compensation) = undo(&output) {
                    self.completed.push((step, compensation));
                }
                Ok(output)
            }
            Err(err) => Err(self.compensate(step, err).await),
        }
    }

    /// Run a final step that needs no undo of its own.
    pub async fn finish<T, F>(&mut self, step: &'static str, action: F) -> KennelResult<T>
    where
        F: Future<Output = KennelResult<T>>,
    {
        self.step(step, action, |_| None).await
    }

    async fn compensate(&mut self, failed_step: &'static str, cause: KennelError) -> KennelError {
        if self.completed.is_empty() {
            return cause;
        }

        warn!(
            saga = self.name,
            step = failed_step,
            error = %cause,
            undo_steps = self.completed.len(),
            "Saga step failed, compensating"
        );
        while let Some((done_step, undo)) = self.completed.pop() {
            if let Err(undo_err) = undo.await {
                error!(
                    saga = self.name,
                    step = failed_step,
                    undo_of = done_step,
                    error = %undo_err,
                    "Compensation failed, collections diverged"
                );
                return ConsistencyError::CompensationFailed {
                    step: failed_step.to_string(),
                    reason: format!("{cause}; undo of '{done_step}' failed: {undo_err}"),
                }
                .into();
            }
        }

        ConsistencyError::SideEffectFailed {
            step: failed_step.to_string(),
            reason: cause.to_string(),
            compensated: true,
        }
        .into()
    }
}
