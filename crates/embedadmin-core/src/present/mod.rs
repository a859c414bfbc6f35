//! Presentation adapters.
//!
//! Read-only wrappers that turn forms and formsets into the shapes a
//! renderer walks: fieldsets, field lines, editable or read-only fields.
//! No validation or persistence happens here.

mod field;

pub use field::{AdminField, AdminFieldView, AdminReadonlyField, Fieldline, InlineFieldHeader};

use crate::{
    DELETION_FIELD_NAME, ORDERING_FIELD_NAME,
    config::{FieldLine, Fieldset, flatten_fieldsets},
    form::{FormErrors, FormView},
    formset::FormsetView,
    model::ModelDef,
};
use std::collections::BTreeMap;

/// Declared fieldsets, or one unnamed set of every form field followed by
/// the read-only fields.
#[must_use]
pub fn resolve_fieldsets(
    declared: &[Fieldset],
    form_fields: &[String],
    readonly: &[String],
) -> Vec<Fieldset> {
    if !declared.is_empty() {
        return declared.to_vec();
    }

    let names = form_fields
        .iter()
        .chain(readonly.iter().filter(|name| !form_fields.contains(name)));

    vec![Fieldset::unnamed(names.cloned())]
}

///
/// AdminFieldset
///

#[derive(Debug)]
pub struct AdminFieldset<'a> {
    pub name: Option<&'a str>,
    pub classes: &'a [String],
    pub description: Option<&'a str>,
    pub lines: Vec<Fieldline<'a>>,
}

fn admin_fieldsets<'a>(
    form: &'a dyn FormView,
    model: &'static ModelDef,
    fieldsets: &'a [Fieldset],
    readonly: &'a [String],
) -> Vec<AdminFieldset<'a>> {
    fieldsets
        .iter()
        .map(|fieldset| AdminFieldset {
            name: fieldset.name.as_deref(),
            classes: &fieldset.classes,
            description: fieldset.description.as_deref(),
            lines: fieldset
                .fields
                .iter()
                .map(|line| fieldline(form, model, line, readonly))
                .collect(),
        })
        .collect()
}

fn fieldline<'a>(
    form: &'a dyn FormView,
    model: &'static ModelDef,
    line: &'a FieldLine,
    readonly: &[String],
) -> Fieldline<'a> {
    let fields = line
        .names()
        .iter()
        .enumerate()
        .filter_map(|(index, name)| {
            let is_first = index == 0;
            if readonly.contains(name) {
                return Some(AdminFieldView::ReadOnly(AdminReadonlyField::new(
                    form, model, name, is_first,
                )));
            }

            AdminField::new(form, name, is_first).map(AdminFieldView::Editable)
        })
        .collect();

    Fieldline { fields }
}

///
/// AdminForm
///
/// The parent form with its fieldset layout.
///

#[derive(Debug)]
pub struct AdminForm<F> {
    form: F,
    model: &'static ModelDef,
    fieldsets: Vec<Fieldset>,
    readonly_fields: Vec<String>,
    prepopulated_fields: BTreeMap<String, Vec<String>>,
}

impl<F: FormView> AdminForm<F> {
    #[must_use]
    pub fn new(
        form: F,
        model: &'static ModelDef,
        fieldsets: &[Fieldset],
        readonly_fields: Vec<String>,
        prepopulated_fields: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let names: Vec<String> = form.fields().iter().map(|f| f.name.clone()).collect();
        let fieldsets = resolve_fieldsets(fieldsets, &names, &readonly_fields);

        Self {
            form,
            model,
            fieldsets,
            readonly_fields,
            prepopulated_fields,
        }
    }

    #[must_use]
    pub const fn form(&self) -> &F {
        &self.form
    }

    #[must_use]
    pub fn errors(&self) -> &FormErrors {
        self.form.errors()
    }

    #[must_use]
    pub fn fieldsets(&self) -> Vec<AdminFieldset<'_>> {
        admin_fieldsets(&self.form, self.model, &self.fieldsets, &self.readonly_fields)
    }

    /// Prepopulated targets that are editable on this form.
    #[must_use]
    pub fn prepopulated_fields(&self) -> Vec<(AdminField<'_>, &[String])> {
        self.prepopulated_fields
            .iter()
            .filter_map(|(target, sources)| {
                AdminField::new(&self.form, target, false).map(|field| (field, sources.as_slice()))
            })
            .collect()
    }
}

///
/// InlineAdminFormset
///
/// A related or embedded formset wrapped for the inline rendering
/// contract.
///

pub struct InlineAdminFormset {
    formset: Box<dyn FormsetView>,
    verbose_name: String,
    fieldsets: Vec<Fieldset>,
    readonly_fields: Vec<String>,
}

impl InlineAdminFormset {
    #[must_use]
    pub fn new(
        formset: Box<dyn FormsetView>,
        verbose_name: String,
        fieldsets: &[Fieldset],
        readonly_fields: Vec<String>,
    ) -> Self {
        let names: Vec<String> = formset
            .base_fields()
            .iter()
            .map(|field| field.name.clone())
            .collect();
        let fieldsets = resolve_fieldsets(fieldsets, &names, &readonly_fields);

        Self {
            formset,
            verbose_name,
            fieldsets,
            readonly_fields,
        }
    }

    #[must_use]
    pub fn formset(&self) -> &dyn FormsetView {
        self.formset.as_ref()
    }

    #[must_use]
    pub fn verbose_name(&self) -> &str {
        &self.verbose_name
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        self.formset.prefix()
    }

    /// Column headers in flattened fieldset order; read-only fields get a
    /// placeholder header instead of their form field.
    #[must_use]
    pub fn fields(&self) -> Vec<InlineFieldHeader> {
        let model = self.formset.model();
        let template = self.formset.empty_form_view();

        flatten_fieldsets(&self.fieldsets)
            .into_iter()
            .filter_map(|name| {
                if self.readonly_fields.contains(&name) {
                    return Some(InlineFieldHeader::read_only(model.label_for(&name)));
                }

                template.field(&name).map(InlineFieldHeader::from_field)
            })
            .collect()
    }

    #[must_use]
    pub fn forms(&self) -> Vec<InlineAdminForm<'_>> {
        let initial = self.formset.initial_form_count();

        self.formset
            .form_views()
            .into_iter()
            .enumerate()
            .map(|(index, form)| self.wrap(form, index < initial))
            .collect()
    }

    /// Template row a renderer clones for "add another".
    #[must_use]
    pub fn empty_form(&self) -> InlineAdminForm<'_> {
        self.wrap(self.formset.empty_form_view(), false)
    }

    /// Hidden management inputs.
    #[must_use]
    pub fn management_form(&self) -> Vec<(String, String)> {
        self.formset.management_data().to_pairs(self.formset.prefix())
    }

    #[must_use]
    pub fn non_form_errors(&self) -> &[String] {
        self.formset.non_form_errors()
    }

    fn wrap<'a>(&'a self, form: &'a dyn FormView, original: bool) -> InlineAdminForm<'a> {
        InlineAdminForm {
            form,
            model: self.formset.model(),
            fieldsets: &self.fieldsets,
            readonly_fields: &self.readonly_fields,
            original: original && form.has_instance(),
            can_delete: self.formset.can_delete(),
            can_order: self.formset.can_order(),
        }
    }
}

impl std::fmt::Debug for InlineAdminFormset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineAdminFormset")
            .field("prefix", &self.formset.prefix())
            .field("verbose_name", &self.verbose_name)
            .field("fieldsets", &self.fieldsets)
            .field("readonly_fields", &self.readonly_fields)
            .finish_non_exhaustive()
    }
}

///
/// InlineAdminForm
///

pub struct InlineAdminForm<'a> {
    form: &'a dyn FormView,
    model: &'static ModelDef,
    fieldsets: &'a [Fieldset],
    readonly_fields: &'a [String],
    original: bool,
    can_delete: bool,
    can_order: bool,
}

impl<'a> InlineAdminForm<'a> {
    #[must_use]
    pub fn form(&self) -> &'a dyn FormView {
        self.form
    }

    /// Whether the row edits an existing item.
    #[must_use]
    pub const fn original(&self) -> bool {
        self.original
    }

    #[must_use]
    pub fn fieldsets(&self) -> Vec<AdminFieldset<'a>> {
        admin_fieldsets(self.form, self.model, self.fieldsets, self.readonly_fields)
    }

    /// Primary-key input; embedded items have none.
    #[must_use]
    pub fn pk_field(&self) -> Option<AdminField<'a>> {
        self.model
            .primary_key
            .and_then(|pk| AdminField::new(self.form, pk, false))
    }

    #[must_use]
    pub fn deletion_field(&self) -> Option<AdminField<'a>> {
        if !self.can_delete {
            return None;
        }

        AdminField::new(self.form, DELETION_FIELD_NAME, false)
    }

    #[must_use]
    pub fn ordering_field(&self) -> Option<AdminField<'a>> {
        if !self.can_order {
            return None;
        }

        AdminField::new(self.form, ORDERING_FIELD_NAME, false)
    }
}

///
/// TESTS
///
