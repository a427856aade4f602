//! dra-provisioner
//!
//! Reconciliation orchestrator for an FSx data repository association.
//!
//! Public API:
//! - `handlers::dispatch()`: route one host request to its operation
//! - `handlers::{create, read, update, delete, list}`: the operations
//! - `FsxApi`: the remote client seam; `SdkFsxApi` is the AWS SDK impl
//!
//! Each mutating operation is a fixed list of steps driven by
//! [`step::Executor`], polling the association between steps until its
//! lifecycle settles. Progress is resumable through [`CallbackContext`].

pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod fsx;
pub mod handlers;
pub mod request;
pub mod step;

pub use crate::api::{ApiError, FsxApi};
pub use crate::config::{HandlerConfig, StabilizeConfig};
pub use crate::context::CallbackContext;
pub use crate::error::{HandlerError, HandlerErrorCode};
pub use crate::event::{OperationStatus, ProgressEvent};
pub use crate::fsx::SdkFsxApi;
pub use crate::handlers::dispatch;
pub use crate::request::{Action, HandlerRequest};
