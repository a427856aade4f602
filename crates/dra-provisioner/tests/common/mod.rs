#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use dra_core::{Association, Lifecycle, ResourceModel, S3Config, Tag};
use dra_provisioner::api::{
    ApiError, BoxFuture, CreateRequest, DeleteRequest, DescribeRequest, DescribeResponse, FsxApi,
    UpdateRequest,
};

pub const ASSOCIATION_ID: &str = "dra-0123456789abcdef0";
pub const ASSOCIATION_ARN: &str =
    "arn:aws:fsx:us-east-1:123456789012:association/fs-0123456789abcdef0/dra-0123456789abcdef0";

/// Remote calls as observed by the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(CreateRequest),
    Describe(DescribeRequest),
    Update(UpdateRequest),
    Delete(DeleteRequest),
    Tag(String, Vec<Tag>),
    Untag(String, Vec<String>),
}

/// Scripted [`FsxApi`].
///
/// Describe calls pop from `describes` first; once the script is exhausted
/// they report `current` (or nothing, when it is `None`). Mutations are
/// recorded and, for tags, applied to `current`.
#[derive(Default)]
pub struct MockFsx {
    calls: Mutex<Vec<Call>>,
    describes: Mutex<VecDeque<Result<DescribeResponse, ApiError>>>,
    current: Mutex<Option<Association>>,
    pages: Mutex<VecDeque<Result<DescribeResponse, ApiError>>>,
    create_error: Mutex<Option<ApiError>>,
    update_error: Mutex<Option<ApiError>>,
}

impl MockFsx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current(association: Association) -> Self {
        let mock = Self::new();
        *mock.current.lock().unwrap() = Some(association);
        mock
    }

    pub fn script_describe(&self, result: Result<DescribeResponse, ApiError>) {
        self.describes.lock().unwrap().push_back(result);
    }

    pub fn script_lifecycle(&self, lifecycle: Lifecycle) {
        let mut association = self
            .current
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| available());
        association.lifecycle = lifecycle;
        self.script_describe(Ok(found(association)));
    }

    pub fn script_page(&self, page: Result<DescribeResponse, ApiError>) {
        self.pages.lock().unwrap().push_back(page);
    }

    pub fn fail_create(&self, err: ApiError) {
        *self.create_error.lock().unwrap() = Some(err);
    }

    pub fn fail_update(&self, err: ApiError) {
        *self.update_error.lock().unwrap() = Some(err);
    }

    pub fn set_current(&self, association: Option<Association>) {
        *self.current.lock().unwrap() = association;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn describe_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Describe(_)))
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Describe(_)))
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl FsxApi for MockFsx {
    fn create_association(
        &self,
        request: CreateRequest,
    ) -> BoxFuture<'_, Result<Association, ApiError>> {
        Box::pin(async move {
            self.record(Call::Create(request.clone()));
            if let Some(err) = self.create_error.lock().unwrap().clone() {
                return Err(err);
            }
            let mut created = available();
            created.lifecycle = Lifecycle::Creating;
            created.file_system_id = request.file_system_id;
            created.file_system_path = request.file_system_path;
            created.data_repository_path = request.data_repository_path;
            created.imported_file_chunk_size = request.imported_file_chunk_size;
            created.s3 = request.s3;
            created.tags = request.tags;
            let mut settled = created.clone();
            settled.lifecycle = Lifecycle::Available;
            self.set_current(Some(settled));
            Ok(created)
        })
    }

    fn describe_associations(
        &self,
        request: DescribeRequest,
    ) -> BoxFuture<'_, Result<DescribeResponse, ApiError>> {
        Box::pin(async move {
            self.record(Call::Describe(request.clone()));
            if let DescribeRequest::Page { .. } = request {
                return self.pages.lock().unwrap().pop_front().unwrap_or_else(|| Ok(DescribeResponse::default()));
            }
            if let Some(scripted) = self.describes.lock().unwrap().pop_front() {
                return scripted;
            }
            Ok(match self.current.lock().unwrap().clone() {
                Some(association) => found(association),
                None => DescribeResponse::default(),
            })
        })
    }

    fn update_association(&self, request: UpdateRequest) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move {
            self.record(Call::Update(request.clone()));
            if let Some(err) = self.update_error.lock().unwrap().clone() {
                return Err(err);
            }
            if let Some(current) = self.current.lock().unwrap().as_mut() {
                if request.imported_file_chunk_size.is_some() {
                    current.imported_file_chunk_size = request.imported_file_chunk_size;
                }
                if let Some(s3) = request.s3 {
                    let merged = current.s3.get_or_insert_with(S3Config::default);
                    if s3.auto_import_policy.is_some() {
                        merged.auto_import_policy = s3.auto_import_policy;
                    }
                    if s3.auto_export_policy.is_some() {
                        merged.auto_export_policy = s3.auto_export_policy;
                    }
                }
            }
            Ok(())
        })
    }

    fn delete_association(&self, request: DeleteRequest) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move {
            self.record(Call::Delete(request));
            self.set_current(None);
            Ok(())
        })
    }

    fn tag_resource(
        &self,
        resource_arn: String,
        tags: Vec<Tag>,
    ) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move {
            self.record(Call::Tag(resource_arn, tags.clone()));
            if let Some(current) = self.current.lock().unwrap().as_mut() {
                for tag in tags {
                    current.tags.retain(|t| t.key != tag.key);
                    current.tags.push(tag);
                }
            }
            Ok(())
        })
    }

    fn untag_resource(
        &self,
        resource_arn: String,
        tag_keys: Vec<String>,
    ) -> BoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move {
            self.record(Call::Untag(resource_arn, tag_keys.clone()));
            if let Some(current) = self.current.lock().unwrap().as_mut() {
                current.tags.retain(|t| !tag_keys.contains(&t.key));
            }
            Ok(())
        })
    }
}

pub fn available() -> Association {
    Association {
        association_id: Some(ASSOCIATION_ID.into()),
        resource_arn: Some(ASSOCIATION_ARN.into()),
        file_system_id: Some("fs-0123456789abcdef0".into()),
        file_system_path: Some("/ns1".into()),
        data_repository_path: Some("s3://example-bucket/prefix".into()),
        batch_import_meta_data_on_create: Some(false),
        imported_file_chunk_size: Some(1024),
        s3: None,
        tags: vec![],
        lifecycle: Lifecycle::Available,
        failure_details: None,
    }
}

pub fn found(association: Association) -> DescribeResponse {
    DescribeResponse {
        associations: vec![association],
        next_token: None,
    }
}

/// Desired state for a fresh association, without identity.
pub fn desired_model() -> ResourceModel {
    ResourceModel {
        file_system_id: Some("fs-0123456789abcdef0".into()),
        file_system_path: Some("/ns1".into()),
        data_repository_path: Some("s3://example-bucket/prefix".into()),
        batch_import_meta_data_on_create: Some(false),
        imported_file_chunk_size: Some(1024),
        ..ResourceModel::default()
    }
}

/// Model of the association as it exists remotely.
pub fn existing_model() -> ResourceModel {
    available().to_model()
}
