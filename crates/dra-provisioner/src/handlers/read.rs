use dra_core::{ResourceModel, TYPE_NAME};

use crate::api::{ApiError, FsxApi};
use crate::error::HandlerError;
use crate::event::ProgressEvent;
use crate::handlers::{describe_existing, finish};
use crate::request::HandlerRequest;

/// Describe the association and project it into the resource model.
pub async fn read(api: &dyn FsxApi, request: &HandlerRequest) -> Result<ProgressEvent, ApiError> {
    let desired = request.desired();
    let result = match desired.identifier() {
        Some(id) => read_model(api, id)
            .await
            .map(|m| ProgressEvent::success(Some(m)))
            .map_err(|e| e.for_association(Some(id))),
        None => Err(HandlerError::missing_identifier()),
    };
    finish(result)
}

/// Read-back projection shared by every operation.
pub(crate) async fn read_model(
    api: &dyn FsxApi,
    association_id: &str,
) -> Result<ResourceModel, HandlerError> {
    let association = describe_existing(api, association_id).await?;
    tracing::info!(
        resource_type = TYPE_NAME,
        association_id,
        lifecycle = %association.lifecycle,
        "association read"
    );
    Ok(association.to_model())
}
