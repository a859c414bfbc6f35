//! Declarative admin options, loadable from JSON. Typed accessors for
//! embedded collections are attached in code, never named here.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid admin options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field '{field}' appears in more than one fieldset")]
    DuplicateFieldsetField { field: String },

    #[error("'fields' and 'fieldsets' cannot both be declared")]
    FieldsAndFieldsets,
}

///
/// FieldLine
///
/// One line of a fieldset: a single field or several shown side by side.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldLine {
    Single(String),
    Multi(Vec<String>),
}

impl FieldLine {
    #[must_use]
    pub fn names(&self) -> &[String] {
        match self {
            Self::Single(name) => std::slice::from_ref(name),
            Self::Multi(names) => names,
        }
    }
}

impl From<&str> for FieldLine {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

///
/// Fieldset
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fieldset {
    pub name: Option<String>,
    pub fields: Vec<FieldLine>,
    pub classes: Vec<String>,
    pub description: Option<String>,
}

impl Fieldset {
    /// Unnamed fieldset with one field per line.
    #[must_use]
    pub fn unnamed<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|name| FieldLine::Single(name.into()))
                .collect(),
            ..Self::default()
        }
    }
}

/// Every field named by `fieldsets`, in declaration order.
#[must_use]
pub fn flatten_fieldsets(fieldsets: &[Fieldset]) -> Vec<String> {
    fieldsets
        .iter()
        .flat_map(|fieldset| fieldset.fields.iter())
        .flat_map(FieldLine::names)
        .cloned()
        .collect()
}

/// First field named by more than one fieldset entry.
#[must_use]
pub fn duplicate_fieldset_field(fieldsets: &[Fieldset]) -> Option<String> {
    let mut seen = BTreeSet::new();

    flatten_fieldsets(fieldsets)
        .into_iter()
        .find(|field| !seen.insert(field.clone()))
}

fn check_fieldsets(fieldsets: &[Fieldset]) -> Result<(), ConfigError> {
    match duplicate_fieldset_field(fieldsets) {
        Some(field) => Err(ConfigError::DuplicateFieldsetField { field }),
        None => Ok(()),
    }
}

///
/// ConstructionFailurePolicy
///
/// What the commit gate does when an embedded formset cannot be built
/// from the submitted data.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionFailurePolicy {
    /// Record the failure as an error and refuse to commit.
    #[default]
    BlockCommit,
    /// Treat the formset as absent and commit the rest.
    Skip,
}

///
/// EmbeddedOptions
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddedOptions {
    pub max_items: usize,
    pub extra: usize,
    pub can_delete: bool,
    pub can_order: bool,
    pub verbose_name: Option<String>,
    pub fieldsets: Vec<Fieldset>,
    pub readonly_fields: Vec<String>,
    pub exclude: Vec<String>,
}

impl EmbeddedOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        check_fieldsets(&options.fieldsets)?;

        Ok(options)
    }

    /// Editable field selection: declared fieldsets minus excluded and
    /// read-only names, or `None` to take every model field.
    #[must_use]
    pub fn field_selection(&self) -> (Option<Vec<String>>, Vec<String>) {
        compose_selection(None, &self.fieldsets, &self.exclude, &self.readonly_fields)
    }
}

impl Default for EmbeddedOptions {
    fn default() -> Self {
        Self {
            max_items: 12,
            extra: 1,
            can_delete: true,
            can_order: false,
            verbose_name: None,
            fieldsets: Vec::new(),
            readonly_fields: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

///
/// AdminOptions
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminOptions {
    pub fieldsets: Vec<Fieldset>,
    pub fields: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub readonly_fields: Vec<String>,
    /// Target field -> source fields a renderer may slugify into it.
    pub prepopulated_fields: BTreeMap<String, Vec<String>>,
    pub save_as: bool,
    pub construction_failure: ConstructionFailurePolicy,
}

impl AdminOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;

        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fields.is_some() && !self.fieldsets.is_empty() {
            return Err(ConfigError::FieldsAndFieldsets);
        }

        check_fieldsets(&self.fieldsets)
    }

    #[must_use]
    pub fn field_selection(&self) -> (Option<Vec<String>>, Vec<String>) {
        compose_selection(
            self.fields.as_deref(),
            &self.fieldsets,
            &self.exclude,
            &self.readonly_fields,
        )
    }
}

// Read-only names are never editable. An explicit list (fields or fieldsets)
// has them removed; otherwise they join the exclusions.
fn compose_selection(
    fields: Option<&[String]>,
    fieldsets: &[Fieldset],
    exclude: &[String],
    readonly: &[String],
) -> (Option<Vec<String>>, Vec<String>) {
    let explicit = match fields {
        Some(fields) => Some(fields.to_vec()),
        None if !fieldsets.is_empty() => Some(flatten_fieldsets(fieldsets)),
        None => None,
    };

    match explicit {
        Some(names) => (
            Some(
                names
                    .into_iter()
                    .filter(|name| !exclude.contains(name) && !readonly.contains(name))
                    .collect(),
            ),
            Vec::new(),
        ),
        None => {
            let mut excluded = exclude.to_vec();
            excluded.extend(readonly.iter().filter(|name| !exclude.contains(name)).cloned());

            (None, excluded)
        }
    }
}

///
/// TESTS
///
