use std::time::Duration;

use dra_core::ResourceModel;
use serde::{Deserialize, Serialize};

/// Continuation state carried between invocations of one logical operation.
///
/// Created empty when the operation starts, handed back to the host with
/// every in-progress event, and dropped once the operation reaches success
/// or failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackContext {
    /// Index of the first step not yet completed.
    #[serde(default)]
    pub cursor: usize,
    /// The step at `cursor` has issued its mutation and is waiting for the
    /// association to settle. Resuming must poll, not mutate again.
    #[serde(default)]
    pub stabilizing: bool,
    /// Time spent waiting on the step at `cursor`, across invocations.
    #[serde(default)]
    pub waited_ms: u64,
    /// Identity discovered by a create call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association_id: Option<String>,
    /// Names of completed steps, in completion order.
    #[serde(default)]
    pub completed: Vec<String>,
    /// Completed steps that found nothing to change.
    #[serde(default)]
    pub unchanged: Vec<String>,
}

impl CallbackContext {
    pub fn waited(&self) -> Duration {
        Duration::from_millis(self.waited_ms)
    }

    pub fn add_wait(&mut self, slept: Duration) {
        let slept = u64::try_from(slept.as_millis()).unwrap_or(u64::MAX);
        self.waited_ms = self.waited_ms.saturating_add(slept);
    }

    /// Mark the step at `cursor` done and move to the next one.
    pub fn advance(&mut self, step: &str, mutated: bool) {
        self.completed.push(step.to_string());
        if !mutated {
            self.unchanged.push(step.to_string());
        }
        self.cursor += 1;
        self.stabilizing = false;
        self.waited_ms = 0;
    }

    pub fn is_completed(&self, step: &str) -> bool {
        self.completed.iter().any(|s| s == step)
    }

    /// Fill in an identity discovered by an earlier invocation. A model that
    /// already carries one keeps it.
    pub fn restore_identity(&self, model: &mut ResourceModel) {
        if model.identifier().is_none() {
            if let Some(id) = &self.association_id {
                model.association_id = Some(id.clone());
            }
        }
    }

    pub fn remember_identity(&mut self, model: &ResourceModel) {
        if let Some(id) = model.identifier() {
            self.association_id = Some(id.to_string());
        }
    }
}
