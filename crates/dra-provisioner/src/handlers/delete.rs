use dra_core::{ResourceModel, TYPE_NAME};

use crate::api::{ApiError, BoxFuture, DeleteRequest, DescribeRequest, FsxApi};
use crate::config::StabilizeConfig;
use crate::error::HandlerError;
use crate::event::ProgressEvent;
use crate::handlers::finish;
use crate::request::HandlerRequest;
use crate::step::{Applied, Executor, Progress, Stabilizer, Step};

pub async fn delete(
    api: &dyn FsxApi,
    request: &HandlerRequest,
    config: &StabilizeConfig,
) -> Result<ProgressEvent, ApiError> {
    finish(run(api, request, config).await)
}

async fn run(
    api: &dyn FsxApi,
    request: &HandlerRequest,
    config: &StabilizeConfig,
) -> Result<ProgressEvent, HandlerError> {
    let mut model = request.desired();
    if model.identifier().is_none() {
        return Err(HandlerError::missing_identifier());
    }
    let mut ctx = request.context();

    let steps: Vec<Box<dyn Step>> = vec![
        Box::new(PreDeletionCheck),
        Box::new(DeleteAssociation {
            client_request_token: request.client_request_token.clone(),
        }),
    ];

    match Executor::new(api, *config)
        .run(&steps, &mut model, &mut ctx)
        .await?
    {
        Progress::Suspended => Ok(ProgressEvent::in_progress(
            model,
            ctx,
            config.poll_every().as_secs(),
        )),
        Progress::Done => Ok(ProgressEvent::success(None)),
    }
}

/// Finish early when the association is already gone.
struct PreDeletionCheck;

impl Step for PreDeletionCheck {
    fn name(&self) -> &'static str {
        "Delete::PreDeletionCheck"
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>> {
        Box::pin(async move {
            let id = model
                .identifier()
                .ok_or_else(HandlerError::missing_identifier)?
                .to_string();

            let present = match api
                .describe_associations(DescribeRequest::ById(id.clone()))
                .await
            {
                Ok(response) => !response.associations.is_empty(),
                Err(err) => match HandlerError::from(err) {
                    err if err.is_not_found() => false,
                    err => return Err(err),
                },
            };

            if present {
                Ok(Applied::Unchanged)
            } else {
                tracing::info!(
                    resource_type = TYPE_NAME,
                    association_id = %id,
                    "association already deleted"
                );
                Ok(Applied::Finished)
            }
        })
    }
}

struct DeleteAssociation {
    client_request_token: Option<String>,
}

impl Step for DeleteAssociation {
    fn name(&self) -> &'static str {
        "Delete"
    }

    fn stabilizer(&self) -> Stabilizer {
        Stabilizer::Absence
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>> {
        Box::pin(async move {
            let id = model
                .identifier()
                .ok_or_else(HandlerError::missing_identifier)?
                .to_string();

            api.delete_association(DeleteRequest {
                association_id: id.clone(),
                client_request_token: self.client_request_token.clone(),
                delete_data_in_file_system: false,
            })
            .await?;

            tracing::info!(resource_type = TYPE_NAME, association_id = %id, "association deletion started");
            Ok(Applied::Mutated)
        })
    }
}
