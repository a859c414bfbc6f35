//! Static record metadata: the field set a row form is checked against.

///
/// ModelDef
/// Runtime model metadata used by form resolution and presentation.
///

#[derive(Debug)]
pub struct ModelDef {
    /// Type name as declared (e.g. `Phone`).
    pub name: &'static str,
    pub verbose_name: &'static str,
    /// Primary-key field, absent for embedded records.
    pub primary_key: Option<&'static str>,
    pub fields: &'static [FieldModel],
}

impl ModelDef {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Lowercased type name; the default embedded formset prefix.
    #[must_use]
    pub fn object_name_lower(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Human label for a field, falling back to a prettified name for
    /// names the model does not declare (read-only computed fields).
    #[must_use]
    pub fn label_for(&self, name: &str) -> String {
        self.field(name)
            .map_or_else(|| pretty_name(name), FieldModel::label)
    }
}

///
/// FieldModel
///

#[derive(Clone, Copy, Debug)]
pub struct FieldModel {
    pub name: &'static str,
    pub label: Option<&'static str>,
    pub kind: FieldKind,
    pub required: bool,
    pub editable: bool,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label: None,
            kind,
            required: true,
            editable: true,
        }
    }

    #[must_use]
    pub const fn labeled(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub const fn non_editable(mut self) -> Self {
        self.editable = false;
        self
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.label
            .map_or_else(|| pretty_name(self.name), ToString::to_string)
    }
}

///
/// FieldKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Bool,
    Int { min: Option<i64>, max: Option<i64> },
    Text { max_len: Option<usize> },
    Choice(&'static [&'static str]),
    ManyToMany,
}

impl FieldKind {
    pub const TEXT: Self = Self::Text { max_len: None };
    pub const INT: Self = Self::Int {
        min: None,
        max: None,
    };

    #[must_use]
    pub const fn is_many_to_many(self) -> bool {
        matches!(self, Self::ManyToMany)
    }
}

/// `first_name` -> `First name`
#[must_use]
pub fn pretty_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

///
/// TESTS
///
