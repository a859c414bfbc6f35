use crate::{
    form::{FactoryError, FieldCallback, FormData, FormField, RowFormClass, fields_for_model},
    formset::{ConstructionError, ReconcilingFormset},
    traits::Record,
};
use std::{fmt, sync::Arc};

///
/// FormsetOptions
///
/// Parameters bound into a formset type. `fields` and `exclude` are
/// mutually exclusive.
///

#[derive(Clone)]
pub struct FormsetOptions {
    pub max_items: usize,
    pub extra: usize,
    pub can_delete: bool,
    pub can_order: bool,
    pub fields: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub callback: Option<FieldCallback>,
}

impl FormsetOptions {
    pub const DEFAULT_MAX_ITEMS: usize = 12;
    pub const DEFAULT_EXTRA: usize = 1;
}

impl Default for FormsetOptions {
    fn default() -> Self {
        Self {
            max_items: Self::DEFAULT_MAX_ITEMS,
            extra: Self::DEFAULT_EXTRA,
            can_delete: true,
            can_order: false,
            fields: None,
            exclude: Vec::new(),
            callback: None,
        }
    }
}

impl fmt::Debug for FormsetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormsetOptions")
            .field("max_items", &self.max_items)
            .field("extra", &self.extra)
            .field("can_delete", &self.can_delete)
            .field("can_order", &self.can_order)
            .field("fields", &self.fields)
            .field("exclude", &self.exclude)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

///
/// FormsetType
///
/// A row form class bound to its resolved field list and row-count
/// parameters. Cheap to clone; every constructed formset shares it.
///

pub struct FormsetType<F: RowFormClass> {
    pub(crate) form: Arc<F>,
    pub(crate) base_fields: Arc<[FormField]>,
    pub(crate) max_items: usize,
    pub(crate) extra: usize,
    pub(crate) can_delete: bool,
    pub(crate) can_order: bool,
}

impl<F: RowFormClass> FormsetType<F> {
    /// Lowercased child model name.
    #[must_use]
    pub fn default_prefix(&self) -> String {
        F::Item::MODEL.object_name_lower()
    }

    #[must_use]
    pub fn base_fields(&self) -> &[FormField] {
        &self.base_fields
    }

    #[must_use]
    pub const fn max_items(&self) -> usize {
        self.max_items
    }

    #[must_use]
    pub const fn extra(&self) -> usize {
        self.extra
    }

    #[must_use]
    pub const fn can_delete(&self) -> bool {
        self.can_delete
    }

    #[must_use]
    pub const fn can_order(&self) -> bool {
        self.can_order
    }

    /// Build a formset over `args.source`, bound when `args.data` is set.
    pub fn construct(
        &self,
        args: FormsetArgs<F::Item>,
    ) -> Result<ReconcilingFormset<F>, ConstructionError> {
        ReconcilingFormset::new(self.clone(), args)
    }
}

impl<F: RowFormClass> Clone for FormsetType<F> {
    fn clone(&self) -> Self {
        Self {
            form: Arc::clone(&self.form),
            base_fields: Arc::clone(&self.base_fields),
            max_items: self.max_items,
            extra: self.extra,
            can_delete: self.can_delete,
            can_order: self.can_order,
        }
    }
}

impl<F: RowFormClass> fmt::Debug for FormsetType<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormsetType")
            .field("model", &F::Item::MODEL.name)
            .field("base_fields", &self.base_fields)
            .field("max_items", &self.max_items)
            .field("extra", &self.extra)
            .field("can_delete", &self.can_delete)
            .field("can_order", &self.can_order)
            .finish()
    }
}

///
/// FormsetArgs
///

#[derive(Clone, Debug)]
pub struct FormsetArgs<R> {
    pub data: Option<Arc<FormData>>,
    pub prefix: Option<String>,
    pub source: Vec<R>,
    /// Treat every submitted row as new (initial count forced to zero).
    pub save_as_new: bool,
}

impl<R> FormsetArgs<R> {
    #[must_use]
    pub const fn new(source: Vec<R>) -> Self {
        Self {
            data: None,
            prefix: None,
            source,
            save_as_new: false,
        }
    }

    #[must_use]
    pub fn bound(mut self, data: Arc<FormData>) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn prefixed(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub const fn save_as_new(mut self, save_as_new: bool) -> Self {
        self.save_as_new = save_as_new;
        self
    }
}

/// Bind a row form class and its parameters into a reusable formset type.
///
/// Fails when the selection names fields the child model lacks, or when the
/// form class declares fields the model does not have.
pub fn formset_factory<F: RowFormClass>(
    form: F,
    options: FormsetOptions,
) -> Result<FormsetType<F>, FactoryError> {
    let base_fields = fields_for_model(
        F::Item::MODEL,
        options.fields.as_deref(),
        &options.exclude,
        options.callback.as_ref(),
        &form.declared_fields(),
    )?;

    Ok(FormsetType {
        form: Arc::new(form),
        base_fields: base_fields.into(),
        max_items: options.max_items,
        extra: options.extra,
        can_delete: options.can_delete,
        can_order: options.can_order,
    })
}

///
/// TESTS
///
