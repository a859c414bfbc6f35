//! Core runtime for EmbedAdmin: row forms, reconciling formsets, embedded
//! collection registration, the admin add/change controller, and the
//! presentation adapters a renderer walks.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod admin;
pub mod config;
pub mod embedded;
pub mod error;
pub mod form;
pub mod formset;
pub mod model;
pub mod obs;
pub mod present;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Per-row checkbox that marks a row for removal.
pub const DELETION_FIELD_NAME: &str = "DELETE";

/// Per-row integer input carrying the submitted position.
pub const ORDERING_FIELD_NAME: &str = "ORDER";

/// Error key for messages not tied to one field.
pub const NON_FIELD_ERRORS: &str = "__all__";

///
/// Prelude
///
/// Domain vocabulary only: the traits a parent or child record implements
/// and the types used to declare an embedded collection.
///

pub mod prelude {
    pub use crate::{
        config::{AdminOptions, EmbeddedOptions},
        embedded::EmbeddedSpec,
        form::{FormField, ModelFormClass},
        model::{FieldKind, FieldModel, ModelDef},
        traits::{Entity, Record},
        value::Value,
    };
}
