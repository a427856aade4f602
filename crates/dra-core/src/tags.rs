//! Tag reconciliation.
//!
//! Pure functions over tags: the three-tier merge used when creating an
//! association, format validation, and the add/remove sets computed when
//! updating one.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{TagError, TagField};
use crate::model::{Tag, TagMap};

/// Prefix of tags injected by the deployment platform itself.
pub const SYSTEM_TAG_PREFIX: &str = "aws:cloudformation";

/// Prefix no caller-supplied key may carry (matched case-insensitively).
pub const RESERVED_KEY_PREFIX: &str = "aws:";

pub const TAG_KEY_PATTERN: &str = r"^(?!aws:)[\p{L}\p{Z}\p{N}_.:/=+\-@]*$";
pub const TAG_VALUE_PATTERN: &str = r"^[\p{L}\p{Z}\p{N}_.:/=+\-@]*$";

// `regex` has no look-around; the reserved prefix is checked separately.
static ALLOWED_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{Z}\p{N}_.:/=+\-@]*$").expect("static tag pattern compiles")
});

/// The three sources of tags for a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    /// Attached directly to the resource.
    pub resource_tags: Vec<Tag>,
    /// Propagated from the owning stack.
    pub stack_tags: Vec<Tag>,
    /// Injected by the platform.
    pub system_tags: Vec<Tag>,
}

impl TagSet {
    pub fn is_empty(&self) -> bool {
        self.resource_tags.is_empty() && self.stack_tags.is_empty() && self.system_tags.is_empty()
    }

    /// Merge the three tiers into one list with unique keys.
    ///
    /// Resource tags take priority over stack tags, which take priority over
    /// system tags. The first tag seen for a key wins; output order is
    /// first-seen order.
    pub fn merge(&self) -> Vec<Tag> {
        let mut merged: IndexMap<&str, &Tag> = IndexMap::new();
        for tag in self
            .resource_tags
            .iter()
            .chain(&self.stack_tags)
            .chain(&self.system_tags)
        {
            merged.entry(tag.key.as_str()).or_insert(tag);
        }
        merged.into_values().cloned().collect()
    }
}

fn has_reserved_prefix(key: &str) -> bool {
    key.get(..RESERVED_KEY_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(RESERVED_KEY_PREFIX))
}

/// Check every tag against the key and value patterns.
///
/// Stops at the first violation and reports its 0-based position in the
/// iteration order of `tags`.
pub fn validate<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> Result<(), TagError> {
    for (index, tag) in tags.into_iter().enumerate() {
        if has_reserved_prefix(&tag.key) || !ALLOWED_CHARS.is_match(&tag.key) {
            return Err(TagError::InvalidTagFormat {
                index,
                field: TagField::Key,
                value: tag.key.clone(),
                pattern: TAG_KEY_PATTERN,
            });
        }
        if !ALLOWED_CHARS.is_match(&tag.value) {
            return Err(TagError::InvalidTagFormat {
                index,
                field: TagField::Value,
                value: tag.value.clone(),
                pattern: TAG_VALUE_PATTERN,
            });
        }
    }
    Ok(())
}

/// Tags whose key was not injected by the platform.
pub fn non_system_tags<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> Vec<Tag> {
    tags.into_iter()
        .filter(|tag| !tag.key.starts_with(SYSTEM_TAG_PREFIX))
        .cloned()
        .collect()
}

/// Entries of `desired` that are new or carry a different value than in
/// `previous`.
pub fn tags_to_add(previous: &TagMap, desired: &TagMap) -> TagMap {
    desired
        .iter()
        .filter(|(key, value)| previous.get(*key) != Some(*value))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Keys of `previous` that `desired` no longer carries.
pub fn tags_to_remove(previous: &TagMap, desired: &TagMap) -> Vec<String> {
    previous
        .keys()
        .filter(|key| !desired.contains_key(*key))
        .cloned()
        .collect()
}
