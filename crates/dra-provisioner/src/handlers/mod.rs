//! Entry points, one per lifecycle operation.
//!
//! Every entry point returns `Ok` with a progress event for success,
//! in-progress and classified failures, and `Err` with the untouched service
//! error for anything the error table does not recognize.

pub mod create;
pub mod delete;
pub mod list;
pub mod read;
pub mod update;

use dra_core::association::single_association;
use dra_core::{Association, ResourceModel};

use crate::api::{ApiError, DescribeRequest, FsxApi};
use crate::config::StabilizeConfig;
use crate::context::CallbackContext;
use crate::error::HandlerError;
use crate::event::ProgressEvent;
use crate::request::{Action, HandlerRequest};
use crate::step::{Executor, Progress, Step};

/// Route a host request to the matching operation.
pub async fn dispatch(
    api: &dyn FsxApi,
    request: &HandlerRequest,
    config: &StabilizeConfig,
) -> Result<ProgressEvent, ApiError> {
    tracing::info!(action = ?request.action, "handling request");
    match request.action {
        Action::Create => create::create(api, request, config).await,
        Action::Read => read::read(api, request).await,
        Action::Update => update::update(api, request, config).await,
        Action::Delete => delete::delete(api, request, config).await,
        Action::List => list::list(api, request).await,
    }
}

pub(crate) fn finish(result: Result<ProgressEvent, HandlerError>) -> Result<ProgressEvent, ApiError> {
    match result {
        Ok(event) => Ok(event),
        Err(err) => {
            match err.error_code() {
                Some(code) => tracing::warn!(code = %code, error = %err, "operation failed"),
                None => tracing::error!(error = %err, "unhandled service error, propagating"),
            }
            ProgressEvent::from_error(err)
        }
    }
}

/// Run `steps` and, once all are done, read the association back.
///
/// Suspends with an in-progress event when the invocation budget runs out
/// mid-stabilization.
pub(crate) async fn run_then_read(
    api: &dyn FsxApi,
    config: &StabilizeConfig,
    steps: &[Box<dyn Step>],
    mut model: ResourceModel,
    mut ctx: CallbackContext,
) -> Result<ProgressEvent, HandlerError> {
    match Executor::new(api, *config).run(steps, &mut model, &mut ctx).await? {
        Progress::Suspended => Ok(ProgressEvent::in_progress(
            model,
            ctx,
            config.poll_every().as_secs(),
        )),
        Progress::Done => {
            let identifier = model.identifier().ok_or_else(HandlerError::missing_identifier)?;
            let model = read::read_model(api, identifier)
                .await
                .map_err(|e| e.for_association(Some(identifier)))?;
            Ok(ProgressEvent::success(Some(model)))
        }
    }
}

/// Describe one association by id, failing with not-found when the service
/// does not report exactly one recognizable record.
pub(crate) async fn describe_existing(
    api: &dyn FsxApi,
    association_id: &str,
) -> Result<Association, HandlerError> {
    let response = api
        .describe_associations(DescribeRequest::ById(association_id.to_string()))
        .await?;
    single_association(&response.associations)
        .cloned()
        .ok_or_else(|| HandlerError::does_not_exist(association_id))
}
