//! Update: immutable-field check, then one step per independently mutable
//! property.
//!
//! The service cannot take a second mutation while the association is still
//! transitioning from the first, so each property update waits for the
//! association to settle before the next one is sent.

use dra_core::model::{desired_tags, map_to_tags, previous_tags};
use dra_core::{
    AutoExportPolicy, AutoImportPolicy, LifecyclePolicy, ResourceModel, S3Config, TYPE_NAME,
    TagMap, tags,
};

use crate::api::{ApiError, BoxFuture, FsxApi, UpdateRequest};
use crate::config::StabilizeConfig;
use crate::error::HandlerError;
use crate::event::ProgressEvent;
use crate::handlers::{describe_existing, finish, run_then_read};
use crate::request::HandlerRequest;
use crate::step::{Applied, Stabilizer, Step};

pub async fn update(
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
    let desired = request.desired();
    let previous = request
        .previous_resource_state
        .clone()
        .unwrap_or_else(|| desired.clone());

    check_updatable(&desired, &previous)?;
    if desired.identifier().is_none() || previous.identifier().is_none() {
        return Err(HandlerError::missing_identifier());
    }

    let steps = plan(request, &desired, &previous);
    run_then_read(api, config, &steps, desired, request.context()).await
}

/// Reject changes to properties fixed at creation.
///
/// Properties are checked in a fixed order and the first violation is
/// reported. A property the previous state never set may be filled in.
pub fn check_updatable(
    desired: &ResourceModel,
    previous: &ResourceModel,
) -> Result<(), HandlerError> {
    let violations = [
        ("ResourceARN", str_changed(&previous.resource_arn, &desired.resource_arn)),
        ("FileSystemId", str_changed(&previous.file_system_id, &desired.file_system_id)),
        ("FileSystemPath", str_changed(&previous.file_system_path, &desired.file_system_path)),
        (
            "DataRepositoryPath",
            str_changed(&previous.data_repository_path, &desired.data_repository_path),
        ),
        (
            "BatchImportMetaDataOnCreate",
            previous.batch_import_meta_data_on_create.is_some()
                && previous.batch_import_meta_data_on_create
                    != desired.batch_import_meta_data_on_create,
        ),
    ];

    match violations.into_iter().find(|(_, changed)| *changed) {
        Some((property, _)) => Err(HandlerError::NotUpdatable {
            property,
            identifier: desired.identifier().map(str::to_owned),
        }),
        None => Ok(()),
    }
}

fn str_changed(previous: &Option<String>, desired: &Option<String>) -> bool {
    let set = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);
    match set(previous) {
        Some(prev) => set(desired).as_ref() != Some(&prev),
        None => false,
    }
}

/// The fixed step list. Every step is always present so the continuation
/// cursor means the same thing on every invocation; steps with nothing to do
/// report themselves unchanged.
fn plan(
    request: &HandlerRequest,
    desired: &ResourceModel,
    previous: &ResourceModel,
) -> Vec<Box<dyn Step>> {
    let desired_import = S3Config::import_policy_or_empty(desired.s3.as_ref());
    let desired_export = S3Config::export_policy_or_empty(desired.s3.as_ref());

    let previous_tags = previous_tags(
        request.previous_resource_tags.as_ref(),
        request.previous_resource_state.as_ref(),
    );
    let desired_tags = desired_tags(request.desired_resource_tags.as_ref(), Some(desired));
    let token = &request.client_request_token;

    vec![
        Box::new(PreUpdateCheck),
        Box::new(UpdateChunkSize {
            client_request_token: token.clone(),
            planned: desired.imported_file_chunk_size != previous.imported_file_chunk_size,
            desired: desired.imported_file_chunk_size,
        }),
        Box::new(UpdateImportPolicy {
            client_request_token: token.clone(),
            planned: desired_import != S3Config::import_policy_or_empty(previous.s3.as_ref()),
            desired: desired_import,
        }),
        Box::new(UpdateExportPolicy {
            client_request_token: token.clone(),
            planned: desired_export != S3Config::export_policy_or_empty(previous.s3.as_ref()),
            desired: desired_export,
        }),
        Box::new(RemoveTags {
            keys: tags::tags_to_remove(&previous_tags, &desired_tags),
        }),
        Box::new(AddTags {
            tags: tags::tags_to_add(&previous_tags, &desired_tags),
        }),
    ]
}

fn association_id(model: &ResourceModel) -> Result<String, HandlerError> {
    model
        .identifier()
        .map(str::to_owned)
        .ok_or_else(HandlerError::missing_identifier)
}

/// Fail before any mutation if the association does not exist.
struct PreUpdateCheck;

impl Step for PreUpdateCheck {
    fn name(&self) -> &'static str {
        "Update::PreUpdateCheck"
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>> {
        Box::pin(async move {
            describe_existing(api, &association_id(model)?).await?;
            Ok(Applied::Unchanged)
        })
    }
}

struct UpdateChunkSize {
    client_request_token: Option<String>,
    planned: bool,
    desired: Option<i32>,
}

impl Step for UpdateChunkSize {
    fn name(&self) -> &'static str {
        "Update::ChunkSize"
    }

    fn stabilizer(&self) -> Stabilizer {
        Stabilizer::Lifecycle(LifecyclePolicy::UPDATE)
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>> {
        Box::pin(async move {
            if !self.planned {
                return Ok(Applied::Unchanged);
            }
            let id = association_id(model)?;
            let observed = describe_existing(api, &id).await?;
            if observed.imported_file_chunk_size == self.desired {
                return Ok(Applied::Unchanged);
            }

            api.update_association(UpdateRequest {
                association_id: id.clone(),
                imported_file_chunk_size: self.desired,
                s3: None,
                client_request_token: self.client_request_token.clone(),
            })
            .await?;

            tracing::info!(
                resource_type = TYPE_NAME,
                association_id = %id,
                "property 'ImportedFileChunkSize' updated"
            );
            Ok(Applied::Mutated)
        })
    }
}

struct UpdateImportPolicy {
    client_request_token: Option<String>,
    planned: bool,
    desired: AutoImportPolicy,
}

impl Step for UpdateImportPolicy {
    fn name(&self) -> &'static str {
        "Update::S3AutoImport"
    }

    fn stabilizer(&self) -> Stabilizer {
        Stabilizer::Lifecycle(LifecyclePolicy::UPDATE)
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>> {
        Box::pin(async move {
            if !self.planned {
                return Ok(Applied::Unchanged);
            }
            let id = association_id(model)?;
            let observed = describe_existing(api, &id).await?;
            if S3Config::import_policy_or_empty(observed.s3.as_ref()) == self.desired {
                return Ok(Applied::Unchanged);
            }

            // An empty event list clears the policy.
            api.update_association(UpdateRequest {
                association_id: id.clone(),
                imported_file_chunk_size: None,
                s3: Some(S3Config {
                    auto_import_policy: Some(self.desired.clone()),
                    auto_export_policy: None,
                }),
                client_request_token: self.client_request_token.clone(),
            })
            .await?;

            tracing::info!(
                resource_type = TYPE_NAME,
                association_id = %id,
                events = ?self.desired.events,
                "property 'AutoImportPolicy' updated"
            );
            Ok(Applied::Mutated)
        })
    }
}

struct UpdateExportPolicy {
    client_request_token: Option<String>,
    planned: bool,
    desired: AutoExportPolicy,
}

impl Step for UpdateExportPolicy {
    fn name(&self) -> &'static str {
        "Update::S3AutoExport"
    }

    fn stabilizer(&self) -> Stabilizer {
        Stabilizer::Lifecycle(LifecyclePolicy::UPDATE)
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>> {
        Box::pin(async move {
            if !self.planned {
                return Ok(Applied::Unchanged);
            }
            let id = association_id(model)?;
            let observed = describe_existing(api, &id).await?;
            if S3Config::export_policy_or_empty(observed.s3.as_ref()) == self.desired {
                return Ok(Applied::Unchanged);
            }

            api.update_association(UpdateRequest {
                association_id: id.clone(),
                imported_file_chunk_size: None,
                s3: Some(S3Config {
                    auto_import_policy: None,
                    auto_export_policy: Some(self.desired.clone()),
                }),
                client_request_token: self.client_request_token.clone(),
            })
            .await?;

            tracing::info!(
                resource_type = TYPE_NAME,
                association_id = %id,
                events = ?self.desired.events,
                "property 'AutoExportPolicy' updated"
            );
            Ok(Applied::Mutated)
        })
    }
}

struct RemoveTags {
    keys: Vec<String>,
}

impl Step for RemoveTags {
    fn name(&self) -> &'static str {
        "Update::RemoveTags"
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>> {
        Box::pin(async move {
            if self.keys.is_empty() {
                return Ok(Applied::Unchanged);
            }
            let id = association_id(model)?;
            let observed = describe_existing(api, &id).await?;

            let attached: Vec<String> = self
                .keys
                .iter()
                .filter(|key| observed.tags.iter().any(|t| &t.key == *key))
                .cloned()
                .collect();
            if attached.is_empty() {
                return Ok(Applied::Unchanged);
            }

            let arn = resource_arn(&observed.resource_arn, &id)?;
            api.untag_resource(arn, attached).await?;

            tracing::info!(resource_type = TYPE_NAME, association_id = %id, "old tags removed");
            Ok(Applied::Mutated)
        })
    }
}

struct AddTags {
    tags: TagMap,
}

impl Step for AddTags {
    fn name(&self) -> &'static str {
        "Update::AddTags"
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn FsxApi,
        model: &'a mut ResourceModel,
    ) -> BoxFuture<'a, Result<Applied, HandlerError>> {
        Box::pin(async move {
            if self.tags.is_empty() {
                return Ok(Applied::Unchanged);
            }
            let to_send = map_to_tags(&self.tags);
            tags::validate(&tags::non_system_tags(&to_send))?;

            let id = association_id(model)?;
            let observed = describe_existing(api, &id).await?;

            let pending: Vec<_> = to_send
                .into_iter()
                .filter(|tag| !observed.tags.contains(tag))
                .collect();
            if pending.is_empty() {
                return Ok(Applied::Unchanged);
            }

            let arn = resource_arn(&observed.resource_arn, &id)?;
            api.tag_resource(arn, pending).await?;

            tracing::info!(resource_type = TYPE_NAME, association_id = %id, "new tags added");
            Ok(Applied::Mutated)
        })
    }
}

fn resource_arn(arn: &Option<String>, association_id: &str) -> Result<String, HandlerError> {
    arn.clone().filter(|a| !a.is_empty()).ok_or_else(|| {
        HandlerError::InvalidRequest(format!(
            "Data repository association {association_id} reported no resource ARN."
        ))
    })
}
