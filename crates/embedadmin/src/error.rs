use derive_more::Display;
use embedadmin_core::{
    admin::AdminError,
    config::ConfigError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
    form::FactoryError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::PermissionDenied => ErrorKind::Admin(AdminErrorKind::PermissionDenied),
            ErrorClass::NotFound => ErrorKind::Admin(AdminErrorKind::NotFound),
            ErrorClass::Configuration => ErrorKind::Config,
            ErrorClass::Construction => ErrorKind::Submission(SubmissionErrorKind::Malformed),
            ErrorClass::Validation => ErrorKind::Submission(SubmissionErrorKind::Invalid),
            ErrorClass::Unsupported => ErrorKind::Unsupported,
            ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<AdminError> for Error {
    fn from(err: AdminError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<FactoryError> for Error {
    fn from(err: FactoryError) -> Self {
        InternalError::from(err).into()
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Admin(AdminErrorKind),
    Submission(SubmissionErrorKind),

    /// Admin or embedded options are inconsistent with the models.
    Config,

    Unsupported,

    /// The caller cannot remediate this.
    Internal,
}

///
/// AdminErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AdminErrorKind {
    PermissionDenied,

    /// The requested object does not exist (or its key did not parse).
    NotFound,
}

///
/// SubmissionErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SubmissionErrorKind {
    /// Management data missing or inconsistent with the stored collection.
    Malformed,

    /// Data that did not clean reached a save path.
    Invalid,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Form,
    Formset,
    Factory,
    Admin,
    Store,
    Config,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Form => Self::Form,
            CoreErrorOrigin::Formset => Self::Formset,
            CoreErrorOrigin::Factory => Self::Factory,
            CoreErrorOrigin::Admin => Self::Admin,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Config => Self::Config,
        }
    }
}

///
/// TESTS
///
