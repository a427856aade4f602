use dra_core::model::tags_from_pairs;
use dra_core::{LifecyclePolicy, ResourceModel, TagSet, TYPE_NAME, tags};

use crate::api::{ApiError, BoxFuture, CreateRequest, FsxApi};
use crate::config::StabilizeConfig;
use crate::error::HandlerError;
use crate::event::ProgressEvent;
use crate::handlers::{finish, run_then_read};
use crate::request::HandlerRequest;
use crate::step::{Applied, Stabilizer, Step};

pub async fn create(
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
    let ctx = request.context();
    ctx.restore_identity(&mut model);

    let resource_tags = model.tags.clone().unwrap_or_default();
    tags::validate(&resource_tags)?;

    let tag_set = TagSet {
        resource_tags,
        stack_tags: tags_from_pairs(request.desired_resource_tags.as_ref()),
        system_tags: tags_from_pairs(request.system_tags.as_ref()),
    };

    let steps: Vec<Box<dyn Step>> = vec![Box::new(CreateAssociation {
        tags: tag_set,
        client_request_token: request.client_request_token.clone(),
    })];

    run_then_read(api, config, &steps, model, ctx).await
}

struct CreateAssociation {
    tags: TagSet,
    client_request_token: Option<String>,
}

impl CreateAssociation {
    fn build_request(&self, model: &ResourceModel) -> CreateRequest {
        CreateRequest {
            file_system_id: model.file_system_id.clone(),
            file_system_path: model.file_system_path.clone(),
            data_repository_path: model.data_repository_path.clone(),
            batch_import_meta_data_on_create: model.batch_import_meta_data_on_create,
            imported_file_chunk_size: model.imported_file_chunk_size,
            s3: model.s3.clone(),
            tags: if self.tags.is_empty() {
                Vec::new()
            } else {
                self.tags.merge()
            },
            client_request_token: self.client_request_token.clone(),
        }
    }
}

impl Step for CreateAssociation {
    fn name(&self) -> &'static str {
        "Create"
    }

    fn stabilizer(&self) -> Stabilizer {
        Stabilizer::Lifecycle(LifecyclePolicy::CREATE)
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>> {
        Box::pin(async move {
            // Replaying the token returns the association from the first
            // attempt instead of creating a second one.
            let created = api.create_association(self.build_request(model)).await?;

            if model.identifier().is_none() {
                model.association_id = created.association_id.clone();
            }

            tracing::info!(
                resource_type = TYPE_NAME,
                association_id = created.association_id.as_deref().unwrap_or_default(),
                "association created"
            );
            Ok(Applied::Mutated)
        })
    }
}
