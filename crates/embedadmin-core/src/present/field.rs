use crate::{
    form::{FormField, FormView},
    model::ModelDef,
    value::Value,
};

///
/// AdminField
/// An editable input with its submission name, current value and errors.
///

#[derive(Clone, Debug)]
pub struct AdminField<'a> {
    pub field: &'a FormField,
    /// Prefixed submission key.
    pub name: String,
    pub value: String,
    pub errors: &'a [String],
    pub is_first: bool,
    pub is_checkbox: bool,
}

impl<'a> AdminField<'a> {
    /// `None` when the form has no such field.
    #[must_use]
    pub fn new(form: &'a dyn FormView, name: &str, is_first: bool) -> Option<Self> {
        let field = form.field(name)?;

        Some(Self {
            field,
            name: form.add_prefix(name),
            value: form.display_value(name),
            errors: form.errors().field(name),
            is_first,
            is_checkbox: field.is_checkbox(),
        })
    }
}

///
/// AdminReadonlyField
/// Label plus display text for a field that must not be edited.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminReadonlyField {
    pub name: String,
    pub label: String,
    pub contents: String,
    pub is_first: bool,
}

impl AdminReadonlyField {
    #[must_use]
    pub fn new(form: &dyn FormView, model: &ModelDef, name: &str, is_first: bool) -> Self {
        let contents = form
            .instance_value(name)
            .unwrap_or(Value::None)
            .to_string();

        Self {
            name: name.to_string(),
            label: model.label_for(name),
            contents,
            is_first,
        }
    }
}

///
/// AdminFieldView
///

#[derive(Clone, Debug)]
pub enum AdminFieldView<'a> {
    Editable(AdminField<'a>),
    ReadOnly(AdminReadonlyField),
}

impl AdminFieldView<'_> {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Editable(field) => &field.field.name,
            Self::ReadOnly(field) => &field.name,
        }
    }
}

///
/// Fieldline
///

#[derive(Clone, Debug)]
pub struct Fieldline<'a> {
    pub fields: Vec<AdminFieldView<'a>>,
}

///
/// InlineFieldHeader
/// Column header of a tabular inline.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InlineFieldHeader {
    pub label: String,
    pub required: bool,
    pub hidden: bool,
    pub read_only: bool,
    pub help_text: Option<String>,
}

impl InlineFieldHeader {
    #[must_use]
    pub const fn read_only(label: String) -> Self {
        Self {
            label,
            required: false,
            hidden: false,
            read_only: true,
            help_text: None,
        }
    }

    #[must_use]
    pub fn from_field(field: &FormField) -> Self {
        Self {
            label: field.label.clone(),
            required: field.required,
            hidden: field.hidden,
            read_only: false,
            help_text: field.help_text.clone(),
        }
    }
}
