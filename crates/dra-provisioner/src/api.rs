use std::future::Future;
use std::pin::Pin;

use dra_core::{Association, S3Config, Tag};
use thiserror::Error;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An error raised by the remote service.
///
/// `code` is the service's error identity (e.g. `BadRequest`); it is `None`
/// when the failure never reached the service or carried no code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", code.as_deref().unwrap_or("Unknown"))]
pub struct ApiError {
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// A failure raised on this side of the wire, with no service code.
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRequest {
    pub file_system_id: Option<String>,
    pub file_system_path: Option<String>,
    pub data_repository_path: Option<String>,
    pub batch_import_meta_data_on_create: Option<bool>,
    pub imported_file_chunk_size: Option<i32>,
    pub s3: Option<S3Config>,
    pub tags: Vec<Tag>,
    /// Idempotency token; replaying it returns the association created by
    /// the first call.
    pub client_request_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescribeRequest {
    ById(String),
    Page { next_token: Option<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeResponse {
    pub associations: Vec<Association>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    pub association_id: String,
    pub imported_file_chunk_size: Option<i32>,
    pub s3: Option<S3Config>,
    pub client_request_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub association_id: String,
    pub client_request_token: Option<String>,
    pub delete_data_in_file_system: bool,
}

/// The remote operations the orchestrators rely on.
///
/// Implementations are stateless handles; `describe_associations` must be
/// safe to repeat since it is used for both existence checks and polling.
/// Methods return boxed futures for dyn compatibility.
pub trait FsxApi: Send + Sync {
    fn create_association(&self, request: CreateRequest)
    -> BoxFuture<'_, Result<Association, ApiError>>;

    fn describe_associations(
        &self,
        request: DescribeRequest,
    ) -> BoxFuture<'_, Result<DescribeResponse, ApiError>>;

    fn update_association(&self, request: UpdateRequest) -> BoxFuture<'_, Result<(), ApiError>>;

    fn delete_association(&self, request: DeleteRequest) -> BoxFuture<'_, Result<(), ApiError>>;

    fn tag_resource(
        &self,
        resource_arn: String,
        tags: Vec<Tag>,
    ) -> BoxFuture<'_, Result<(), ApiError>>;

    fn untag_resource(
        &self,
        resource_arn: String,
        tag_keys: Vec<String>,
    ) -> BoxFuture<'_, Result<(), ApiError>>;
}
