//! ## Crate layout
//! - `core`: forms, reconciling formsets, embedded collections, the admin
//!   controller and presentation adapters.
//! - `error`: public error type for callers.
//!
//! The `prelude` module carries what a parent/child record definition and
//! an admin registration need.

pub use embedadmin_core as core;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        admin::{
            AdminRequest, AdminResponse, Collaborators, ModelAdmin, NextStep,
            ParentStore as _, Permissions as _, Principal,
        },
        embedded::EmbeddedAdmin as _,
        formset::FormsetView as _,
        obs::HistorySink as _,
        prelude::*,
    };
    pub use serde::{Deserialize, Serialize};
}
