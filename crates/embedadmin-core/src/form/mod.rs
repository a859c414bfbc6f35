//! Row forms: submitted data, field cleaning, error collection, and the
//! `RowForm` contract every formset row satisfies.

mod data;
mod errors;
mod field;
mod model_form;
mod resolve;

pub use data::FormData;
pub use errors::{ErrorContext, FormErrors, Issue, ScopedContext};
pub use field::{FormField, is_checked};
pub use model_form::{ModelForm, ModelFormClass};
pub use resolve::{FactoryError, FieldCallback, fields_for_model};

use crate::{error::InternalError, traits::Record, value::Value};
use std::{collections::BTreeMap, sync::Arc};

///
/// FormView
///
/// Object-safe read surface of a form, consumed by presentation adapters.
///

pub trait FormView {
    fn prefix(&self) -> Option<&str>;

    fn fields(&self) -> &[FormField];

    fn field(&self, name: &str) -> Option<&FormField> {
        self.fields().iter().find(|field| field.name == name)
    }

    /// Submission key for a field (`<prefix>-<field>` when prefixed).
    fn add_prefix(&self, field: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{prefix}-{field}"),
            None => field.to_string(),
        }
    }

    fn is_bound(&self) -> bool;

    fn errors(&self) -> &FormErrors;

    /// Text a widget should show: submitted data when bound, initial otherwise.
    fn display_value(&self, field: &str) -> String;

    /// Value of the edited instance, used for read-only presentation.
    fn instance_value(&self, field: &str) -> Option<Value>;

    fn has_instance(&self) -> bool;
}

///
/// RowForm
///
/// Capability set of a formset row. `save(false)` materializes the edited
/// item and never persists anything.
///

pub trait RowForm: FormView {
    type Item;

    fn is_valid(&self) -> bool;

    fn has_changed(&self) -> bool;

    fn changed_data(&self) -> Vec<String>;

    fn save(&self, commit: bool) -> Result<Self::Item, InternalError>;

    /// Raw submitted value for a field, before cleaning.
    fn raw_value(&self, field: &str) -> Option<&str>;

    fn instance(&self) -> Option<&Self::Item>;

    fn empty_permitted(&self) -> bool;
}

///
/// RowFormClass
///
/// Builds row forms for one record type. The field list handed to `build`
/// is already resolved (selection, callback, formset-added inputs).
///

pub trait RowFormClass: 'static {
    type Item: Record;
    type Form: RowForm<Item = Self::Item> + 'static;

    /// Fields the class declares itself; each must name a model field.
    fn declared_fields(&self) -> Vec<FormField> {
        Vec::new()
    }

    fn build(&self, fields: Vec<FormField>, args: FormArgs<Self::Item>) -> Self::Form;
}

///
/// FormArgs
///

#[derive(Clone, Debug)]
pub struct FormArgs<R> {
    pub prefix: Option<String>,
    pub data: Option<Arc<FormData>>,
    pub instance: Option<R>,
    pub initial: BTreeMap<String, Value>,
    pub empty_permitted: bool,
}

impl<R> FormArgs<R> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prefix: None,
            data: None,
            instance: None,
            initial: BTreeMap::new(),
            empty_permitted: false,
        }
    }

    #[must_use]
    pub fn prefixed(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn bound(mut self, data: Option<Arc<FormData>>) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn with_instance(mut self, instance: R) -> Self {
        self.instance = Some(instance);
        self
    }

    #[must_use]
    pub fn with_initial(mut self, initial: BTreeMap<String, Value>) -> Self {
        self.initial = initial;
        self
    }

    #[must_use]
    pub const fn empty_permitted(mut self, permitted: bool) -> Self {
        self.empty_permitted = permitted;
        self
    }
}

impl<R> Default for FormArgs<R> {
    fn default() -> Self {
        Self::new()
    }
}
