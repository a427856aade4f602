use std::collections::BTreeMap;

use dra_core::ResourceModel;
use serde::{Deserialize, Serialize};

use crate::context::CallbackContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

/// One invocation as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    pub action: Action,
    #[serde(default)]
    pub desired_resource_state: Option<ResourceModel>,
    #[serde(default)]
    pub previous_resource_state: Option<ResourceModel>,
    /// Stack-level tags to apply.
    #[serde(default)]
    pub desired_resource_tags: Option<BTreeMap<String, String>>,
    /// Stack-level tags applied by the previous deployment.
    #[serde(default)]
    pub previous_resource_tags: Option<BTreeMap<String, String>>,
    /// Platform-injected tags.
    #[serde(default)]
    pub system_tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub client_request_token: Option<String>,
    #[serde(default)]
    pub callback_context: Option<CallbackContext>,
    #[serde(default)]
    pub next_token: Option<String>,
}

impl HandlerRequest {
    pub fn new(action: Action, desired: ResourceModel) -> Self {
        Self {
            action,
            desired_resource_state: Some(desired),
            previous_resource_state: None,
            desired_resource_tags: None,
            previous_resource_tags: None,
            system_tags: None,
            client_request_token: None,
            callback_context: None,
            next_token: None,
        }
    }

    pub fn desired(&self) -> ResourceModel {
        self.desired_resource_state.clone().unwrap_or_default()
    }

    pub fn context(&self) -> CallbackContext {
        self.callback_context.clone().unwrap_or_default()
    }
}
