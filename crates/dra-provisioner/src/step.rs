//! Step executor.
//!
//! An operation is an ordered list of [`Step`] descriptors run by a single
//! driver loop. The continuation context records the position in that list,
//! so a re-invoked operation resumes at the first step not yet completed
//! instead of starting over.

use dra_core::association::single_association;
use dra_core::{LifecyclePolicy, ResourceModel, Stabilization};
use tokio::time::Instant;

use crate::api::{BoxFuture, DescribeRequest, FsxApi};
use crate::config::StabilizeConfig;
use crate::context::CallbackContext;
use crate::error::HandlerError;

/// What a step's invoker did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A remote mutation was issued.
    Mutated,
    /// The remote state already matched; nothing was sent.
    Unchanged,
    /// The operation's goal is already met; no later step runs.
    Finished,
}

/// How to decide that the association settled after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stabilizer {
    /// The mutation takes effect synchronously.
    None,
    /// Poll until the lifecycle lands in the policy's available set.
    Lifecycle(LifecyclePolicy),
    /// Poll until the association is gone.
    Absence,
}

/// One named unit of work within an operation.
pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    fn stabilizer(&self) -> Stabilizer {
        Stabilizer::None
    }

    /// Build the request from the current model, check whether the remote
    /// state already reflects it, and issue the mutation if not.
    ///
    /// Must be safe to run again after a crash between the mutation and the
    /// context being persisted.
    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>>;
}

/// Outcome of driving a step list for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Every step completed.
    Done,
    /// The invocation budget ran out while polling; resume with the context.
    Suspended,
}

enum Poll {
    Stable,
    Yield,
}

pub struct Executor<'a> {
    api: &'a dyn FsxApi,
    config: StabilizeConfig,
}

impl<'a> Executor<'a> {
    pub fn new(api: &'a dyn FsxApi, config: StabilizeConfig) -> Self {
        Self { api, config }
    }

    /// Run `steps` in order starting at `ctx.cursor`.
    ///
    /// A step's mutation is never issued before the previous step has been
    /// observed stable (or skipped). Errors abort the whole run.
    pub async fn run(
        &self,
        steps: &[Box<dyn Step>],
        model: &mut ResourceModel,
        ctx: &mut CallbackContext,
    ) -> Result<Progress, HandlerError> {
        let started = Instant::now();

        while let Some(step) = steps.get(ctx.cursor) {
            let name = step.name();

            if ctx.stabilizing {
                tracing::info!(step = name, waited_ms = ctx.waited_ms, "resuming stabilization");
            } else {
                let applied = step.apply(self.api, model).await;
                let applied = applied.map_err(|e| e.for_association(model.identifier()))?;
                ctx.remember_identity(model);

                match applied {
                    Applied::Unchanged => {
                        tracing::info!(step = name, "already in desired state, skipping");
                        ctx.advance(name, false);
                        continue;
                    }
                    Applied::Finished => {
                        tracing::info!(step = name, "nothing left to do");
                        ctx.advance(name, false);
                        ctx.cursor = steps.len();
                        break;
                    }
                    Applied::Mutated if step.stabilizer() == Stabilizer::None => {
                        ctx.advance(name, true);
                        continue;
                    }
                    Applied::Mutated => {
                        ctx.stabilizing = true;
                        ctx.waited_ms = 0;
                    }
                }
            }

            let polled = self.stabilize(step.as_ref(), model, ctx, started).await;
            match polled.map_err(|e| e.for_association(model.identifier()))? {
                Poll::Stable => ctx.advance(name, true),
                Poll::Yield => return Ok(Progress::Suspended),
            }
        }

        Ok(Progress::Done)
    }

    async fn stabilize(
        &self,
        step: &dyn Step,
        model: &ResourceModel,
        ctx: &mut CallbackContext,
        started: Instant,
    ) -> Result<Poll, HandlerError> {
        let identifier = model
            .identifier()
            .ok_or_else(HandlerError::missing_identifier)?
            .to_string();

        loop {
            let polled_at = Instant::now();
            let stabilized = match step.stabilizer() {
                Stabilizer::None => true,
                Stabilizer::Lifecycle(policy) => self.lifecycle_settled(&identifier, policy).await?,
                Stabilizer::Absence => self.is_absent(&identifier).await?,
            };

            tracing::info!(
                association_id = %identifier,
                step = step.name(),
                stabilized,
                waited_ms = ctx.waited_ms,
                "polled association"
            );

            if stabilized {
                return Ok(Poll::Stable);
            }
            // Timeout before budget: a resumed invocation always polls once
            // before it can yield again.
            if ctx.waited() >= self.config.max_wait {
                return Err(HandlerError::NotStabilized {
                    identifier,
                    reason: format!("still transitioning after {:?}", self.config.max_wait),
                });
            }
            if let Some(budget) = self.config.invocation_budget {
                if started.elapsed() >= budget {
                    return Ok(Poll::Yield);
                }
            }

            tokio::time::sleep(self.config.poll_every()).await;
            // Count describe latency too, not just the sleep.
            ctx.add_wait(polled_at.elapsed());
        }
    }

    async fn lifecycle_settled(
        &self,
        identifier: &str,
        policy: LifecyclePolicy,
    ) -> Result<bool, HandlerError> {
        let response = self
            .api
            .describe_associations(DescribeRequest::ById(identifier.to_string()))
            .await?;

        // An empty or ambiguous describe keeps us polling until the timeout.
        match policy.classify(single_association(&response.associations)) {
            Stabilization::Stable => Ok(true),
            Stabilization::Pending => Ok(false),
            Stabilization::Failed {
                lifecycle,
                failure_details,
            } => {
                let details = failure_details.unwrap_or_default();
                tracing::warn!(
                    association_id = %identifier,
                    lifecycle = %lifecycle,
                    failure_details = %details,
                    "association entered a failed lifecycle"
                );
                Err(HandlerError::NotStabilized {
                    identifier: identifier.to_string(),
                    reason: format!("lifecycle {lifecycle}: {details}"),
                })
            }
        }
    }

    async fn is_absent(&self, identifier: &str) -> Result<bool, HandlerError> {
        match self
            .api
            .describe_associations(DescribeRequest::ById(identifier.to_string()))
            .await
        {
            Ok(response) => Ok(response.associations.is_empty()),
            Err(err) => {
                let err = HandlerError::from(err);
                if err.is_not_found() { Ok(true) } else { Err(err) }
            }
        }
    }
}
