use std::fmt;

use thiserror::Error;

/// Which half of a tag failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Key,
    Value,
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Key => f.write_str("key"),
            Self::Value => f.write_str("value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error(
        "1 validation error detected: Value '{value}' at 'tags.{index}.member.{field}' \
         failed to satisfy constraint: Member must satisfy regular expression pattern: {pattern}"
    )]
    InvalidTagFormat {
        /// 0-based position of the offending tag in iteration order.
        index: usize,
        field: TagField,
        value: String,
        pattern: &'static str,
    },
}
