//! dra-core
//!
//! Pure domain types for a data repository association: the resource model,
//! the observed remote association, the tag reconciler and the lifecycle
//! classifier. No AWS SDK dependency and no I/O.

pub mod association;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod tags;

pub use crate::association::{Association, Lifecycle};
pub use crate::error::TagError;
pub use crate::lifecycle::{LifecyclePolicy, Stabilization};
pub use crate::model::{AutoExportPolicy, AutoImportPolicy, ResourceModel, S3Config, Tag, TagMap};
pub use crate::tags::TagSet;

/// Resource type name used in log lines and failure messages.
pub const TYPE_NAME: &str = "AWS::FSx::DataRepositoryAssociation";
