//! [`FsxApi`] backed by the AWS SDK. SDK shapes are converted to the domain
//! types here and nowhere else.

use aws_sdk_fsx::Client;
use aws_sdk_fsx::error::ProvideErrorMetadata;
use aws_sdk_fsx::types as sdk;
use dra_core::{
    Association, AutoExportPolicy, AutoImportPolicy, Lifecycle, S3Config, Tag,
};

use crate::api::{
    ApiError, BoxFuture, CreateRequest, DeleteRequest, DescribeRequest, DescribeResponse, FsxApi,
    UpdateRequest,
};
use crate::error::format_err_chain;

pub struct SdkFsxApi {
    client: Client,
}

impl SdkFsxApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn api_error<E>(err: E) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    ApiError {
        code: err.code().map(str::to_owned),
        message: err
            .message()
            .map(str::to_owned)
            .unwrap_or_else(|| format_err_chain(&err)),
    }
}

fn to_sdk_tags(tags: &[Tag]) -> Vec<sdk::Tag> {
    tags.iter()
        .map(|tag| sdk::Tag::builder().key(&tag.key).value(&tag.value).build())
        .collect()
}

fn to_sdk_events<'a>(events: impl IntoIterator<Item = &'a String>) -> Vec<sdk::EventType> {
    events
        .into_iter()
        .map(|e| sdk::EventType::from(e.as_str()))
        .collect()
}

fn to_sdk_s3(s3: &S3Config) -> sdk::S3DataRepositoryConfiguration {
    let mut builder = sdk::S3DataRepositoryConfiguration::builder();
    if let Some(policy) = &s3.auto_import_policy {
        builder = builder.auto_import_policy(
            sdk::AutoImportPolicy::builder()
                .set_events(Some(to_sdk_events(&policy.events)))
                .build(),
        );
    }
    if let Some(policy) = &s3.auto_export_policy {
        builder = builder.auto_export_policy(
            sdk::AutoExportPolicy::builder()
                .set_events(Some(to_sdk_events(&policy.events)))
                .build(),
        );
    }
    builder.build()
}

fn from_sdk_s3(s3: &sdk::S3DataRepositoryConfiguration) -> S3Config {
    S3Config {
        auto_import_policy: s3.auto_import_policy().map(|p| AutoImportPolicy {
            events: p.events().iter().map(|e| e.as_str().to_string()).collect(),
        }),
        auto_export_policy: s3.auto_export_policy().map(|p| AutoExportPolicy {
            events: p.events().iter().map(|e| e.as_str().to_string()).collect(),
        }),
    }
}

fn from_sdk(association: &sdk::DataRepositoryAssociation) -> Association {
    Association {
        association_id: association.association_id().map(str::to_owned),
        resource_arn: association.resource_arn().map(str::to_owned),
        file_system_id: association.file_system_id().map(str::to_owned),
        file_system_path: association.file_system_path().map(str::to_owned),
        data_repository_path: association.data_repository_path().map(str::to_owned),
        batch_import_meta_data_on_create: association.batch_import_meta_data_on_create(),
        imported_file_chunk_size: association.imported_file_chunk_size(),
        s3: association.s3().map(from_sdk_s3),
        // A tag without a key cannot be addressed; drop it.
        tags: association
            .tags()
            .iter()
            .filter_map(|t| Some(Tag::new(t.key()?, t.value().unwrap_or_default())))
            .collect(),
        lifecycle: association
            .lifecycle()
            .map(|l| Lifecycle::parse(l.as_str()))
            .unwrap_or_else(|| Lifecycle::Unrecognized(String::new())),
        failure_details: association
            .failure_details()
            .and_then(|d| d.message())
            .map(str::to_owned),
    }
}

impl FsxApi for SdkFsxApi {
    fn create_association(
        &self,
        request: CreateRequest,
    ) -> BoxFuture<'_, Result<Association, ApiError>> {
        Box::pin(async move {
            let tags = to_sdk_tags(&request.tags);
            let resp = self
                .client
                .create_data_repository_association()
                .set_file_system_id(request.file_system_id)
                .set_file_system_path(request.file_system_path)
                .set_data_repository_path(request.data_repository_path)
                .set_batch_import_meta_data_on_create(request.batch_import_meta_data_on_create)
                .set_imported_file_chunk_size(request.imported_file_chunk_size)
                .set_s3(request.s3.as_ref().map(to_sdk_s3))
                .set_tags((!tags.is_empty()).then_some(tags))
                .set_client_request_token(request.client_request_token)
                .send()
                .await
                .map_err(api_error)?;

            resp.association()
                .map(from_sdk)
                .ok_or_else(|| ApiError::local("create response carried no association"))
        })
    }

    fn describe_associations(
        &self,
        request: DescribeRequest,
    ) -> BoxFuture<'_, Result<DescribeResponse, ApiError>> {
        Box::pin(async move {
            let builder = self.client.describe_data_repository_associations();
            let builder = match request {
                DescribeRequest::ById(id) => builder.association_ids(id),
                DescribeRequest::Page { next_token } => builder.set_next_token(next_token),
            };
            let resp = builder.send().await.map_err(api_error)?;

            Ok(DescribeResponse {
                associations: resp.associations().iter().map(from_sdk).collect(),
                next_token: resp.next_token().map(str::to_owned),
            })
        })
    }

    fn update_association(&self, request: UpdateRequest) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move {
            self.client
                .update_data_repository_association()
                .association_id(request.association_id)
                .set_imported_file_chunk_size(request.imported_file_chunk_size)
                .set_s3(request.s3.as_ref().map(to_sdk_s3))
                .set_client_request_token(request.client_request_token)
                .send()
                .await
                .map_err(api_error)?;
            Ok(())
        })
    }

    fn delete_association(&self, request: DeleteRequest) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move {
            self.client
                .delete_data_repository_association()
                .association_id(request.association_id)
                .set_client_request_token(request.client_request_token)
                .delete_data_in_file_system(request.delete_data_in_file_system)
                .send()
                .await
                .map_err(api_error)?;
            Ok(())
        })
    }

    fn tag_resource(
        &self,
        resource_arn: String,
        tags: Vec<Tag>,
    ) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move {
            self.client
                .tag_resource()
                .resource_arn(resource_arn)
                .set_tags(Some(to_sdk_tags(&tags)))
                .send()
                .await
                .map_err(api_error)?;
            Ok(())
        })
    }

    fn untag_resource(
        &self,
        resource_arn: String,
        tag_keys: Vec<String>,
    ) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move {
            self.client
                .untag_resource()
                .resource_arn(resource_arn)
                .set_tag_keys(Some(tag_keys))
                .send()
                .await
                .map_err(api_error)?;
            Ok(())
        })
    }
}
