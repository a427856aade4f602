use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use dra_core::{TagError, TYPE_NAME};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;

/// Failure codes reported back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerErrorCode {
    NotFound,
    InvalidRequest,
    InternalFailure,
    ServiceLimitExceeded,
    NotUpdatable,
    NotStabilized,
}

impl fmt::Display for HandlerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Service error code -> failure code. Codes absent from the table are not
/// translated; they surface as [`HandlerError::Unhandled`].
#[derive(Debug)]
pub struct ErrorTable {
    codes: HashMap<&'static str, HandlerErrorCode>,
}

impl ErrorTable {
    pub fn standard() -> Self {
        use HandlerErrorCode::*;
        let codes = HashMap::from([
            ("FileSystemNotFound", NotFound),
            ("ResourceNotFound", NotFound),
            ("DataRepositoryAssociationNotFound", NotFound),
            ("BadRequest", InvalidRequest),
            ("IncompatibleParameterError", InvalidRequest),
            ("InvalidDataRepositoryType", InvalidRequest),
            ("InternalServerError", InternalFailure),
            ("ServiceLimitExceeded", ServiceLimitExceeded),
        ]);
        Self { codes }
    }

    pub fn classify(&self, err: &ApiError) -> Option<HandlerErrorCode> {
        err.code
            .as_deref()
            .and_then(|code| self.codes.get(code))
            .copied()
    }
}

static ERROR_TABLE: LazyLock<ErrorTable> = LazyLock::new(ErrorTable::standard);

pub fn error_table() -> &'static ErrorTable {
    &ERROR_TABLE
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    InvalidTag(#[from] TagError),

    #[error("{}", not_updatable(.property, .identifier))]
    NotUpdatable {
        property: &'static str,
        identifier: Option<String>,
    },

    #[error(
        "Resource of type '{}' with identifier '{identifier}' did not stabilize: {reason}",
        TYPE_NAME
    )]
    NotStabilized { identifier: String, reason: String },

    /// A documented service error, translated through the error table.
    #[error("{}", identified(.identifier, .source))]
    Service {
        code: HandlerErrorCode,
        identifier: Option<String>,
        source: ApiError,
    },

    /// Anything the error table does not know. Never turned into a failure
    /// event; handed back to the host as-is.
    #[error("unhandled service error: {0}")]
    Unhandled(ApiError),
}

impl HandlerError {
    pub fn missing_identifier() -> Self {
        Self::NotFound {
            message: "Parameter 'AssociationId' must be provided.".into(),
        }
    }

    pub fn does_not_exist(association_id: &str) -> Self {
        Self::NotFound {
            message: format!("Data repository association does not exist for: {association_id}."),
        }
    }

    pub fn error_code(&self) -> Option<HandlerErrorCode> {
        match self {
            Self::NotFound { .. } => Some(HandlerErrorCode::NotFound),
            Self::InvalidRequest(_) | Self::InvalidTag(_) => Some(HandlerErrorCode::InvalidRequest),
            Self::NotUpdatable { .. } => Some(HandlerErrorCode::NotUpdatable),
            Self::NotStabilized { .. } => Some(HandlerErrorCode::NotStabilized),
            Self::Service { code, .. } => Some(*code),
            Self::Unhandled(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.error_code() == Some(HandlerErrorCode::NotFound)
    }

    /// Attach the association id to an error raised without one.
    pub fn for_association(mut self, association_id: Option<&str>) -> Self {
        if let Self::Service { identifier, .. } | Self::NotUpdatable { identifier, .. } = &mut self {
            if identifier.is_none() {
                *identifier = association_id.map(str::to_owned);
            }
        }
        self
    }
}

fn identified(identifier: &Option<String>, message: impl fmt::Display) -> String {
    match identifier {
        Some(id) => format!("Resource of type '{TYPE_NAME}' with identifier '{id}': {message}"),
        None => message.to_string(),
    }
}

fn not_updatable(property: &str, identifier: &Option<String>) -> String {
    identified(identifier, format_args!("Parameter '{property}' is not updatable."))
}

impl From<ApiError> for HandlerError {
    fn from(err: ApiError) -> Self {
        match error_table().classify(&err) {
            Some(code) => Self::Service {
                code,
                identifier: None,
                source: err,
            },
            None => Self::Unhandled(err),
        }
    }
}

/// Walk the full error chain and join all causes into one string.
///
/// AWS SDK errors often have terse `Display` impls (e.g. "service error")
/// but useful detail in the source chain.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_codes_are_classified() {
        let table = ErrorTable::standard();
        let cases = [
            ("DataRepositoryAssociationNotFound", HandlerErrorCode::NotFound),
            ("FileSystemNotFound", HandlerErrorCode::NotFound),
            ("IncompatibleParameterError", HandlerErrorCode::InvalidRequest),
            ("InternalServerError", HandlerErrorCode::InternalFailure),
            ("ServiceLimitExceeded", HandlerErrorCode::ServiceLimitExceeded),
        ];
        for (code, expected) in cases {
            assert_eq!(table.classify(&ApiError::new(code, "boom")), Some(expected));
        }
    }

    #[test]
    fn unknown_codes_stay_unhandled() {
        let err = HandlerError::from(ApiError::new("ThrottlingException", "slow down"));
        assert!(matches!(err, HandlerError::Unhandled(_)));
        assert_eq!(err.error_code(), None);

        let err = HandlerError::from(ApiError::local("dispatch failure"));
        assert!(matches!(err, HandlerError::Unhandled(_)));
    }

    #[test]
    fn service_errors_name_the_association_once_known() {
        let err = HandlerError::from(ApiError::new("BadRequest", "chunk size out of range"));
        assert_eq!(err.to_string(), "BadRequest: chunk size out of range");

        let err = err.for_association(Some("dra-0123456789abcdef0"));
        assert_eq!(err.error_code(), Some(HandlerErrorCode::InvalidRequest));
        assert_eq!(
            err.to_string(),
            "Resource of type 'AWS::FSx::DataRepositoryAssociation' with identifier \
             'dra-0123456789abcdef0': BadRequest: chunk size out of range"
        );

        // The first id attached wins.
        let err = err.for_association(Some("dra-other"));
        assert!(err.to_string().contains("dra-0123456789abcdef0"));
    }
}
