use dra_core::ResourceModel;

use crate::api::{ApiError, DescribeRequest, FsxApi};
use crate::event::ProgressEvent;
use crate::handlers::finish;
use crate::request::HandlerRequest;

/// One page of association identities. Full detail needs a separate read.
pub async fn list(api: &dyn FsxApi, request: &HandlerRequest) -> Result<ProgressEvent, ApiError> {
    let result = api
        .describe_associations(DescribeRequest::Page {
            next_token: request.next_token.clone(),
        })
        .await
        .map(|page| {
            let models: Vec<ResourceModel> = page
                .associations
                .iter()
                .filter_map(|a| a.association_id.as_deref())
                .map(ResourceModel::identifier_only)
                .collect();
            tracing::debug!(count = models.len(), more = page.next_token.is_some(), "listed associations");
            ProgressEvent::listed(models, page.next_token)
        })
        .map_err(Into::into);
    finish(result)
}
