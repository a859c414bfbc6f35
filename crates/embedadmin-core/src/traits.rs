use crate::{form::ErrorContext, model::ModelDef, value::Value};
use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

///
/// Record
///
/// A typed record whose plain fields can be read and written by name.
/// Embedded children and parent objects both implement it; collections of
/// embedded children are NOT fields and are reached through typed accessors.
///

pub trait Record: Clone + Debug + Default + Display + 'static {
    const MODEL: &'static ModelDef;

    /// Current value of a declared field; `Value::None` for unknown names.
    fn value(&self, field: &str) -> Value;

    /// Store a cleaned value. Errors describe a value the record cannot hold.
    fn set_value(&mut self, field: &str, value: Value) -> Result<(), String>;

    /// Record-level validation, run once every field cleaned without error.
    fn validate_custom(&self, _ctx: &mut dyn ErrorContext) {}
}

///
/// Entity
///
/// A record with independent identity in the datastore (the parent side).
///

pub trait Entity: Record {
    type Key: Clone + Debug + Display + FromStr + PartialEq;

    /// Primary key, `None` until the store assigns one.
    fn key(&self) -> Option<Self::Key>;
}
