use crate::{
    form::FormField,
    model::{FieldModel, ModelDef},
};
use std::sync::Arc;
use thiserror::Error as ThisError;

/// Per-field hook deciding the form field for a model field; `None` drops it.
pub type FieldCallback = Arc<dyn Fn(&FieldModel) -> Option<FormField> + Send + Sync>;

///
/// FactoryError
/// Incompatibility between a form declaration and its model's field set.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum FactoryError {
    #[error("unknown field(s) ({}) specified for {model}", fields.join(", "))]
    UnknownFields {
        model: &'static str,
        fields: Vec<String>,
    },

    #[error("field '{field}' of {model} is not editable")]
    NonEditableField { model: &'static str, field: String },

    #[error("included and excluded fields are mutually exclusive ({model})")]
    ConflictingSelection { model: &'static str },

    #[error("form field '{field}' does not exist on model {model}")]
    IncompatibleForm { model: &'static str, field: String },

    #[error("field '{field}' of {model} appears in more than one fieldset")]
    DuplicateField { model: &'static str, field: String },
}

/// Resolve the editable form fields of `model`.
///
/// `fields` selects and orders explicitly; otherwise every editable model
/// field is used minus `exclude`. Declared form fields replace the generated
/// field of the same name but never re-add an excluded one.
pub fn fields_for_model(
    model: &'static ModelDef,
    fields: Option<&[String]>,
    exclude: &[String],
    callback: Option<&FieldCallback>,
    declared: &[FormField],
) -> Result<Vec<FormField>, FactoryError> {
    if fields.is_some() && !exclude.is_empty() {
        return Err(FactoryError::ConflictingSelection { model: model.name });
    }

    if let Some(stray) = declared.iter().find(|field| !model.has_field(&field.name)) {
        return Err(FactoryError::IncompatibleForm {
            model: model.name,
            field: stray.name.clone(),
        });
    }

    let selected: Vec<&FieldModel> = match fields {
        Some(names) => {
            let unknown: Vec<String> = names
                .iter()
                .filter(|name| !model.has_field(name))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(FactoryError::UnknownFields {
                    model: model.name,
                    fields: unknown,
                });
            }

            let mut selected = Vec::with_capacity(names.len());
            for name in names {
                if let Some(field) = model.field(name) {
                    if !field.editable {
                        return Err(FactoryError::NonEditableField {
                            model: model.name,
                            field: name.clone(),
                        });
                    }
                    selected.push(field);
                }
            }

            selected
        }
        None => model
            .fields
            .iter()
            .filter(|field| field.editable && !exclude.iter().any(|ex| ex == field.name))
            .collect(),
    };

    let resolved = selected
        .into_iter()
        .filter_map(|model_field| {
            if let Some(field) = declared.iter().find(|d| d.name == model_field.name) {
                return Some(field.clone());
            }

            match callback {
                Some(callback) => callback(model_field),
                None => Some(FormField::from_model(model_field)),
            }
        })
        .collect();

    Ok(resolved)
}

///
/// TESTS
///
