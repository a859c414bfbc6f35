use crate::{admin::AdminError, config::ConfigError, form::FactoryError, formset::ConstructionError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; the facade crate maps it into its public error.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a form-origin validation error (saving data that did not clean).
    pub(crate) fn form_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Validation, ErrorOrigin::Form, message)
    }

    /// Construct a form-origin unsupported error.
    pub(crate) fn form_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Form, message)
    }

    /// Construct a form-origin internal error.
    pub(crate) fn form_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Form, message)
    }

    /// Construct a store-origin internal error.
    pub fn store_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, message)
    }

    /// Construct an admin-origin invariant error.
    pub(crate) fn admin_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Admin, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self.class, ErrorClass::PermissionDenied)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<FactoryError> for InternalError {
    fn from(err: FactoryError) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Factory, err.to_string())
    }
}

impl From<ConstructionError> for InternalError {
    fn from(err: ConstructionError) -> Self {
        Self::new(ErrorClass::Construction, ErrorOrigin::Formset, err.to_string())
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Config, err.to_string())
    }
}

impl From<AdminError> for InternalError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::PermissionDenied { .. } => Self::new(
                ErrorClass::PermissionDenied,
                ErrorOrigin::Admin,
                err.to_string(),
            ),
            AdminError::NotFound { .. } => {
                Self::new(ErrorClass::NotFound, ErrorOrigin::Admin, err.to_string())
            }
            AdminError::Internal(inner) => inner,
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Validation,
    PermissionDenied,
    NotFound,
    Configuration,
    Construction,
    Unsupported,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::Configuration => "configuration",
            Self::Construction => "construction",
            Self::Unsupported => "unsupported",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Layer that raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Form,
    Formset,
    Factory,
    Admin,
    Store,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Form => "form",
            Self::Formset => "formset",
            Self::Factory => "factory",
            Self::Admin => "admin",
            Self::Store => "store",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
