//! Contracts the controller consumes from the surrounding framework.

use crate::{
    admin::Principal,
    config::Fieldset,
    error::InternalError,
    form::FormData,
    formset::{ChangeSummary, ConstructionError, FormsetView},
    model::ModelDef,
    obs::HistorySink,
    traits::Entity,
    value::Value,
};
use std::{collections::BTreeMap, sync::Arc};

///
/// ParentStore
///
/// Persistence of the parent object. Calls between `begin` and
/// `commit`/`rollback` form one all-or-nothing unit.
///

pub trait ParentStore<P: Entity> {
    fn load(&self, key: &P::Key) -> Result<Option<P>, InternalError>;

    fn begin(&mut self) -> Result<(), InternalError>;

    fn commit(&mut self) -> Result<(), InternalError>;

    fn rollback(&mut self);

    /// Persist the parent; a new object may be assigned its key here.
    fn save_parent(&mut self, object: P, change: bool) -> Result<P, InternalError>;

    fn save_m2m(&mut self, object: &P, values: &BTreeMap<String, Value>)
    -> Result<(), InternalError>;
}

///
/// Permissions
///

pub trait Permissions<P> {
    fn has_add_permission(&self, principal: &Principal) -> bool;

    fn has_change_permission(&self, principal: &Principal, object: Option<&P>) -> bool;

    fn has_delete_permission(&self, principal: &Principal, object: Option<&P>) -> bool;
}

///
/// RelatedInline
///
/// A regular (row-backed) child admin. Its formsets persist their own
/// rows; the controller only sequences them.
///

pub trait RelatedInline<P> {
    fn model(&self) -> &'static ModelDef;

    fn verbose_name(&self) -> String;

    fn default_prefix(&self) -> String;

    fn fieldsets(&self) -> &[Fieldset] {
        &[]
    }

    fn readonly_fields(&self) -> &[String] {
        &[]
    }

    fn build(
        &self,
        parent: &P,
        data: Option<Arc<FormData>>,
        prefix: String,
        save_as_new: bool,
    ) -> Result<Box<dyn RelatedFormset<P>>, ConstructionError>;
}

///
/// RelatedFormset
///

pub trait RelatedFormset<P>: FormsetView {
    /// Persist the rows against the saved parent.
    fn save(&self, parent: &P) -> Result<ChangeSummary, InternalError>;
}

///
/// Collaborators
///
/// Per-request handles passed down the call chain.
///

pub struct Collaborators<'a, P: Entity> {
    pub store: &'a mut dyn ParentStore<P>,
    pub permissions: &'a dyn Permissions<P>,
    pub history: &'a dyn HistorySink,
}

impl<'a, P: Entity> Collaborators<'a, P> {
    pub fn new(
        store: &'a mut dyn ParentStore<P>,
        permissions: &'a dyn Permissions<P>,
        history: &'a dyn HistorySink,
    ) -> Self {
        Self {
            store,
            permissions,
            history,
        }
    }
}
