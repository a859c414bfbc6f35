use crate::error::InternalError;
use thiserror::Error as ThisError;

///
/// AdminError
///
/// Request-terminating failures at the controller boundary. Validation
/// failures are not errors here; they re-render the form.
///

#[derive(Debug, ThisError)]
pub enum AdminError {
    #[error("permission denied: cannot {action} {model}")]
    PermissionDenied {
        action: &'static str,
        model: &'static str,
    },

    #[error("{model} object with primary key '{key}' does not exist")]
    NotFound { model: String, key: String },

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl AdminError {
    pub(crate) fn not_found(model: &str, key: &str) -> Self {
        Self::NotFound {
            model: model.to_string(),
            key: key.to_string(),
        }
    }
}
