use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{ResourceModel, S3Config, Tag};

/// Lifecycle of an association as reported by the service. The service
/// drives it asynchronously after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    Creating,
    Available,
    Updating,
    Misconfigured,
    Failed,
    Deleting,
    /// A value this client does not know about.
    Unrecognized(String),
}

impl Lifecycle {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "CREATING" => Self::Creating,
            "AVAILABLE" => Self::Available,
            "UPDATING" => Self::Updating,
            "MISCONFIGURED" => Self::Misconfigured,
            "FAILED" => Self::Failed,
            "DELETING" => Self::Deleting,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "CREATING",
            Self::Available => "AVAILABLE",
            Self::Updating => "UPDATING",
            Self::Misconfigured => "MISCONFIGURED",
            Self::Failed => "FAILED",
            Self::Deleting => "DELETING",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The service's view of one association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub association_id: Option<String>,
    pub resource_arn: Option<String>,
    pub file_system_id: Option<String>,
    pub file_system_path: Option<String>,
    pub data_repository_path: Option<String>,
    pub batch_import_meta_data_on_create: Option<bool>,
    pub imported_file_chunk_size: Option<i32>,
    pub s3: Option<S3Config>,
    pub tags: Vec<Tag>,
    pub lifecycle: Lifecycle,
    pub failure_details: Option<String>,
}

impl Association {
    /// Project the remote representation into the canonical resource model.
    pub fn to_model(&self) -> ResourceModel {
        ResourceModel {
            association_id: self.association_id.clone(),
            resource_arn: self.resource_arn.clone(),
            file_system_id: self.file_system_id.clone(),
            file_system_path: self.file_system_path.clone(),
            data_repository_path: self.data_repository_path.clone(),
            batch_import_meta_data_on_create: self.batch_import_meta_data_on_create,
            imported_file_chunk_size: self.imported_file_chunk_size,
            s3: self.s3.clone(),
            tags: Some(self.tags.clone()),
        }
    }
}

/// The one association a describe-by-id returned, if it is usable.
///
/// Zero records, more than one record, or a record whose lifecycle is not
/// recognized all mean "not observable".
pub fn single_association(associations: &[Association]) -> Option<&Association> {
    match associations {
        [only] if only.lifecycle.is_recognized() => Some(only),
        _ => None,
    }
}
