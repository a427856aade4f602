use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Canonical ordered key -> value association for tags.
///
/// Insertion order is the order in which a key was first seen.
pub type TagMap = IndexMap<String, String>;

/// The desired (or previously applied) shape of one data repository
/// association, as supplied by the host and as projected back after every
/// successful operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub association_id: Option<String>,
    #[serde(rename = "ResourceARN", skip_serializing_if = "Option::is_none")]
    pub resource_arn: Option<String>,

    // ── fixed at creation ──
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_repository_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_import_meta_data_on_create: Option<bool>,

    // ── mutable ──
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_file_chunk_size: Option<i32>,
    #[serde(rename = "S3", skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl ResourceModel {
    /// A model carrying only the primary identifier (what List returns).
    pub fn identifier_only(association_id: impl Into<String>) -> Self {
        Self {
            association_id: Some(association_id.into()),
            ..Self::default()
        }
    }

    /// The association id, treating an empty string as absent.
    pub fn identifier(&self) -> Option<&str> {
        self.association_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn tag_map(&self) -> TagMap {
        self.tags.as_deref().map(tags_to_map).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_import_policy: Option<AutoImportPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_export_policy: Option<AutoExportPolicy>,
}

impl S3Config {
    /// The import policy of `s3`, with "no S3 block" and "no import policy"
    /// both collapsing to the empty policy so they compare equal.
    pub fn import_policy_or_empty(s3: Option<&S3Config>) -> AutoImportPolicy {
        s3.and_then(|s| s.auto_import_policy.clone())
            .unwrap_or_default()
    }

    /// Export-side counterpart of [`S3Config::import_policy_or_empty`].
    pub fn export_policy_or_empty(s3: Option<&S3Config>) -> AutoExportPolicy {
        s3.and_then(|s| s.auto_export_policy.clone())
            .unwrap_or_default()
    }
}

/// Events on the data repository that are imported into the file system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoImportPolicy {
    #[serde(default)]
    pub events: BTreeSet<String>,
}

/// Events on the file system that are exported to the data repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoExportPolicy {
    #[serde(default)]
    pub events: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Collapse a tag list into a map. A repeated key keeps the position of its
/// first occurrence and the value of its last.
pub fn tags_to_map(tags: &[Tag]) -> TagMap {
    let mut map = TagMap::with_capacity(tags.len());
    for tag in tags {
        map.insert(tag.key.clone(), tag.value.clone());
    }
    map
}

pub fn map_to_tags(map: &TagMap) -> Vec<Tag> {
    map.iter().map(|(k, v)| Tag::new(k, v)).collect()
}

/// Convert a host-supplied key/value map (stack or system tags) into tags.
pub fn tags_from_pairs(pairs: Option<&BTreeMap<String, String>>) -> Vec<Tag> {
    pairs
        .map(|m| m.iter().map(|(k, v)| Tag::new(k, v)).collect())
        .unwrap_or_default()
}

/// Tags previously attached: the previous stack-level map overlaid by the
/// previous model's own tags.
pub fn previous_tags(
    previous_stack_tags: Option<&BTreeMap<String, String>>,
    previous_model: Option<&ResourceModel>,
) -> TagMap {
    overlay(previous_stack_tags, previous_model)
}

/// Tags that should be attached after the update, assembled the same way as
/// [`previous_tags`].
pub fn desired_tags(
    desired_stack_tags: Option<&BTreeMap<String, String>>,
    desired_model: Option<&ResourceModel>,
) -> TagMap {
    overlay(desired_stack_tags, desired_model)
}

fn overlay(
    stack_tags: Option<&BTreeMap<String, String>>,
    model: Option<&ResourceModel>,
) -> TagMap {
    let mut map: TagMap = stack_tags
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();
    if let Some(model) = model {
        map.extend(model.tag_map());
    }
    map
}
