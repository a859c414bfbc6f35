use crate::{
    model::{FieldKind, FieldModel},
    value::Value,
};
use std::collections::BTreeSet;

const REQUIRED: &str = "This field is required.";

///
/// FormField
///
/// One editable input of a form. Built from a `FieldModel` or declared
/// directly (the formset's deletion and ordering inputs).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub hidden: bool,
    pub help_text: Option<String>,
}

impl FormField {
    #[must_use]
    pub fn from_model(model: &FieldModel) -> Self {
        Self {
            name: model.name.to_string(),
            label: model.label(),
            kind: model.kind,
            // a checkbox cannot express "absent", so booleans never require input
            required: model.required && !matches!(model.kind, FieldKind::Bool),
            hidden: false,
            help_text: None,
        }
    }

    /// Optional checkbox input.
    #[must_use]
    pub fn checkbox(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Bool,
            required: false,
            hidden: false,
            help_text: None,
        }
    }

    /// Optional integer input.
    #[must_use]
    pub fn integer(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::INT,
            required: false,
            hidden: false,
            help_text: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub const fn is_checkbox(&self) -> bool {
        matches!(self.kind, FieldKind::Bool)
    }

    /// Clean submitted values into a typed value or a user-facing message.
    pub fn clean(&self, raw: &[String]) -> Result<Value, String> {
        match self.kind {
            FieldKind::Bool => {
                let checked = is_checked(raw.last().map(String::as_str));
                if self.required && !checked {
                    return Err(REQUIRED.to_string());
                }

                Ok(Value::Bool(checked))
            }

            FieldKind::ManyToMany => {
                let keys: Vec<String> = raw.iter().filter(|v| !v.is_empty()).cloned().collect();
                if self.required && keys.is_empty() {
                    return Err(REQUIRED.to_string());
                }

                Ok(Value::List(keys))
            }

            FieldKind::Int { min, max } => match self.scalar_text(raw)? {
                Some(text) => clean_int(text, min, max),
                None => Ok(Value::None),
            },

            FieldKind::Text { max_len } => match self.scalar_text(raw)? {
                Some(text) => clean_text(text, max_len),
                None => Ok(Value::None),
            },

            FieldKind::Choice(choices) => match self.scalar_text(raw)? {
                Some(text) if choices.contains(&text) => Ok(Value::Text(text.to_string())),
                Some(text) => Err(format!(
                    "Select a valid choice. {text} is not one of the available choices."
                )),
                None => Ok(Value::None),
            },
        }
    }

    // Last submitted value; `None` when empty and optional.
    fn scalar_text<'a>(&self, raw: &'a [String]) -> Result<Option<&'a str>, String> {
        match raw.last().map(String::as_str) {
            Some(text) if !text.is_empty() => Ok(Some(text)),
            _ if self.required => Err(REQUIRED.to_string()),
            _ => Ok(None),
        }
    }

    /// Whether submitted values differ from the initial value.
    #[must_use]
    pub fn has_changed(&self, initial: &Value, raw: &[String]) -> bool {
        match self.kind {
            FieldKind::Bool => {
                initial.as_bool().unwrap_or(false) != is_checked(raw.last().map(String::as_str))
            }

            FieldKind::ManyToMany => {
                let before: BTreeSet<&str> = initial
                    .as_list()
                    .unwrap_or_default()
                    .iter()
                    .map(String::as_str)
                    .collect();
                let after: BTreeSet<&str> = raw
                    .iter()
                    .filter(|v| !v.is_empty())
                    .map(String::as_str)
                    .collect();

                before != after
            }

            _ => initial.to_form_string() != raw.last().map_or("", String::as_str),
        }
    }
}

fn clean_int(text: &str, min: Option<i64>, max: Option<i64>) -> Result<Value, String> {
    let n: i64 = text
        .trim()
        .parse()
        .map_err(|_| "Enter a whole number.".to_string())?;

    if let Some(min) = min
        && n < min
    {
        return Err(format!("Ensure this value is greater than or equal to {min}."));
    }
    if let Some(max) = max
        && n > max
    {
        return Err(format!("Ensure this value is less than or equal to {max}."));
    }

    Ok(Value::Int(n))
}

fn clean_text(text: &str, max_len: Option<usize>) -> Result<Value, String> {
    let len = text.chars().count();
    if let Some(max) = max_len
        && len > max
    {
        return Err(format!("Ensure this value has at most {max} characters (it has {len})."));
    }

    Ok(Value::Text(text.to_string()))
}

/// Checkbox semantics for a raw submitted value.
#[must_use]
pub fn is_checked(raw: Option<&str>) -> bool {
    match raw {
        None => false,
        Some(value) => !matches!(
            value.to_ascii_lowercase().as_str(),
            "" | "false" | "0" | "off"
        ),
    }
}

///
/// TESTS
///
