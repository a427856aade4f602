use dra_core::ResourceModel;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::context::CallbackContext;
use crate::error::{HandlerError, HandlerErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
}

/// What one invocation hands back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<ResourceModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<ResourceModel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<CallbackContext>,
    #[serde(default)]
    pub callback_delay_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<HandlerErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl ProgressEvent {
    fn with_status(status: OperationStatus) -> Self {
        Self {
            status,
            resource_model: None,
            resource_models: None,
            callback_context: None,
            callback_delay_seconds: 0,
            error_code: None,
            message: None,
            next_token: None,
        }
    }

    pub fn success(model: Option<ResourceModel>) -> Self {
        Self {
            resource_model: model,
            ..Self::with_status(OperationStatus::Success)
        }
    }

    pub fn in_progress(model: ResourceModel, context: CallbackContext, delay_seconds: u64) -> Self {
        Self {
            resource_model: Some(model),
            callback_context: Some(context),
            callback_delay_seconds: delay_seconds,
            ..Self::with_status(OperationStatus::InProgress)
        }
    }

    pub fn failed(code: HandlerErrorCode, message: impl Into<String>) -> Self {
        Self {
            error_code: Some(code),
            message: Some(message.into()),
            ..Self::with_status(OperationStatus::Failed)
        }
    }

    pub fn listed(models: Vec<ResourceModel>, next_token: Option<String>) -> Self {
        Self {
            resource_models: Some(models),
            next_token,
            ..Self::with_status(OperationStatus::Success)
        }
    }

    /// Translate a classified error into a failure event. An unhandled
    /// service error is handed back unchanged for the host to deal with.
    pub fn from_error(err: HandlerError) -> Result<Self, ApiError> {
        match (err.error_code(), err) {
            (Some(code), err) => Ok(Self::failed(code, err.to_string())),
            (None, HandlerError::Unhandled(source)) => Err(source),
            (None, other) => Err(ApiError::local(other.to_string())),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != OperationStatus::InProgress
    }
}
