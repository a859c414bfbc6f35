//! Embedded (denormalized) child collections: declaration, registration
//! against a parent admin, and the request-scoped formsets they produce.

use crate::{
    config::{EmbeddedOptions, Fieldset, duplicate_fieldset_field},
    error::InternalError,
    form::{
        FactoryError, FieldCallback, FormData, FormField, FormView, ModelFormClass, RowFormClass,
    },
    formset::{
        ChangeSummary, ConstructionError, FormsetArgs, FormsetOptions, FormsetType, FormsetView,
        ManagementData, ReconcilingFormset, formset_factory,
    },
    model::ModelDef,
    traits::Record,
};
use std::sync::Arc;

///
/// Accessor
///
/// Typed getter/setter pair for one embedded collection on the parent.
///

pub struct Accessor<P, C> {
    pub get: fn(&P) -> &[C],
    pub set: fn(&mut P, Vec<C>),
}

impl<P, C> Clone for Accessor<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for Accessor<P, C> {}

///
/// EmbeddedSpec
///
/// Declaration of one embedded child type: the parent attribute holding
/// the collection, its accessor, the row form class and formset options.
///

pub struct EmbeddedSpec<P, F: RowFormClass> {
    attribute: &'static str,
    accessor: Accessor<P, F::Item>,
    form: F,
    options: EmbeddedOptions,
    callback: Option<FieldCallback>,
}

impl<P: 'static, C: Record> EmbeddedSpec<P, ModelFormClass<C>> {
    #[must_use]
    pub fn new(attribute: &'static str, get: fn(&P) -> &[C], set: fn(&mut P, Vec<C>)) -> Self {
        Self {
            attribute,
            accessor: Accessor { get, set },
            form: ModelFormClass::new(),
            options: EmbeddedOptions::default(),
            callback: None,
        }
    }
}

impl<P: 'static, F: RowFormClass> EmbeddedSpec<P, F> {
    /// Replace the row form class.
    #[must_use]
    pub fn with_form<G: RowFormClass<Item = F::Item>>(self, form: G) -> EmbeddedSpec<P, G> {
        EmbeddedSpec {
            attribute: self.attribute,
            accessor: self.accessor,
            form,
            options: self.options,
            callback: self.callback,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: EmbeddedOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_callback(mut self, callback: FieldCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Resolve the formset type once. Incompatible forms fail here, at
    /// registration, never per request.
    pub fn register(self) -> Result<EmbeddedInline<P, F>, FactoryError> {
        if let Some(field) = duplicate_fieldset_field(&self.options.fieldsets) {
            return Err(FactoryError::DuplicateField {
                model: F::Item::MODEL.name,
                field,
            });
        }

        let (fields, exclude) = self.options.field_selection();
        let formset = formset_factory(
            self.form,
            FormsetOptions {
                max_items: self.options.max_items,
                extra: self.options.extra,
                can_delete: self.options.can_delete,
                can_order: self.options.can_order,
                fields,
                exclude,
                callback: self.callback,
            },
        )?;

        tracing::debug!(
            attribute = self.attribute,
            model = F::Item::MODEL.name,
            fields = formset.base_fields().len(),
            "embedded collection registered"
        );

        Ok(EmbeddedInline {
            accessor: self.accessor,
            options: self.options,
            formset,
        })
    }
}

///
/// EmbeddedAdmin
///
/// Object-safe handle a parent admin keeps per embedded collection.
///

pub trait EmbeddedAdmin<P> {
    fn model(&self) -> &'static ModelDef;

    fn verbose_name(&self) -> String;

    fn default_prefix(&self) -> String;

    /// Declared fieldsets; empty means "all fields in one unnamed set".
    fn fieldsets(&self) -> &[Fieldset];

    fn readonly_fields(&self) -> &[String];

    fn build(
        &self,
        parent: Option<&P>,
        data: Option<Arc<FormData>>,
        prefix: String,
        save_as_new: bool,
    ) -> Result<Box<dyn EmbeddedFormset<P>>, ConstructionError>;
}

///
/// EmbeddedFormset
///
/// A constructed embedded formset that can write its reconciled
/// collection back onto the parent.
///

pub trait EmbeddedFormset<P>: FormsetView {
    /// Reconcile and assign the kept items onto the parent.
    fn apply_to(&self, parent: &mut P) -> Result<ChangeSummary, InternalError>;
}

///
/// EmbeddedInline
///

pub struct EmbeddedInline<P, F: RowFormClass> {
    accessor: Accessor<P, F::Item>,
    options: EmbeddedOptions,
    formset: FormsetType<F>,
}

impl<P: 'static, F: RowFormClass> EmbeddedInline<P, F> {
    #[must_use]
    pub const fn formset_type(&self) -> &FormsetType<F> {
        &self.formset
    }

    /// Build the typed formset directly.
    pub fn construct(
        &self,
        parent: Option<&P>,
        data: Option<Arc<FormData>>,
        prefix: String,
        save_as_new: bool,
    ) -> Result<ReconcilingFormset<F>, ConstructionError> {
        let source = parent.map_or_else(Vec::new, |parent| (self.accessor.get)(parent).to_vec());
        let mut args = FormsetArgs::new(source)
            .prefixed(prefix)
            .save_as_new(save_as_new);
        if let Some(data) = data {
            args = args.bound(data);
        }

        self.formset.construct(args)
    }
}

impl<P: 'static, F: RowFormClass> EmbeddedAdmin<P> for EmbeddedInline<P, F> {
    fn model(&self) -> &'static ModelDef {
        F::Item::MODEL
    }

    fn verbose_name(&self) -> String {
        self.options
            .verbose_name
            .clone()
            .unwrap_or_else(|| F::Item::MODEL.verbose_name.to_string())
    }

    fn default_prefix(&self) -> String {
        self.formset.default_prefix()
    }

    fn fieldsets(&self) -> &[Fieldset] {
        &self.options.fieldsets
    }

    fn readonly_fields(&self) -> &[String] {
        &self.options.readonly_fields
    }

    fn build(
        &self,
        parent: Option<&P>,
        data: Option<Arc<FormData>>,
        prefix: String,
        save_as_new: bool,
    ) -> Result<Box<dyn EmbeddedFormset<P>>, ConstructionError> {
        let formset = self.construct(parent, data, prefix, save_as_new)?;

        Ok(Box::new(BoundEmbedded {
            formset,
            set: self.accessor.set,
            name: self.verbose_name(),
        }))
    }
}

// Request-scoped formset plus the setter it writes through.
struct BoundEmbedded<P, F: RowFormClass> {
    formset: ReconcilingFormset<F>,
    set: fn(&mut P, Vec<F::Item>),
    name: String,
}

impl<P, F: RowFormClass> FormsetView for BoundEmbedded<P, F> {
    fn prefix(&self) -> &str {
        self.formset.prefix()
    }

    fn model(&self) -> &'static ModelDef {
        F::Item::MODEL
    }

    fn base_fields(&self) -> &[FormField] {
        FormsetView::base_fields(&self.formset)
    }

    fn form_views(&self) -> Vec<&dyn FormView> {
        self.formset.form_views()
    }

    fn initial_form_count(&self) -> usize {
        self.formset.initial_form_count()
    }

    fn empty_form_view(&self) -> &dyn FormView {
        self.formset.empty_form_view()
    }

    fn management_data(&self) -> ManagementData {
        self.formset.management_data()
    }

    fn non_form_errors(&self) -> &[String] {
        self.formset.non_form_errors()
    }

    fn can_delete(&self) -> bool {
        FormsetView::can_delete(&self.formset)
    }

    fn can_order(&self) -> bool {
        FormsetView::can_order(&self.formset)
    }

    fn is_bound(&self) -> bool {
        self.formset.is_bound()
    }

    fn is_valid(&self) -> bool {
        self.formset.is_valid()
    }
}

impl<P, F: RowFormClass> EmbeddedFormset<P> for BoundEmbedded<P, F> {
    fn apply_to(&self, parent: &mut P) -> Result<ChangeSummary, InternalError> {
        // an invalid formset reconciles to nothing; assigning that would wipe the collection
        if !self.formset.is_valid() {
            return Err(InternalError::admin_internal(format!(
                "embedded formset '{}' applied while invalid",
                self.formset.prefix()
            )));
        }

        let result = self.formset.reconcile()?;
        let summary = result.summary(&self.name);
        (self.set)(parent, result.kept);

        Ok(summary)
    }
}

///
/// TESTS
///
