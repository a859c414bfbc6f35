//! Admin view controller.
//!
//! Per request: build the parent form, the related formsets and the
//! embedded formsets; validate them together; and only when all are valid,
//! fold the embedded collections onto the parent before it is persisted.

mod collab;
mod context;
mod error;
mod message;
mod prefix;
mod request;
mod transaction;

pub use collab::{Collaborators, ParentStore, Permissions, RelatedFormset, RelatedInline};
pub use context::{
    AdminErrorList, AdminResponse, ChangeFormContext, PermissionFlags, SavedResponse,
};
pub use error::AdminError;
pub use message::{construct_change_message, get_text_list};
pub use prefix::PrefixAllocator;
pub use request::{
    ADD_ANOTHER_VAR, AdminRequest, CONTINUE_VAR, IS_POPUP_VAR, Method, NextStep, Principal,
    SAVE_AS_NEW_VAR,
};
pub use transaction::Transaction;

use crate::{
    config::{AdminOptions, ConstructionFailurePolicy},
    embedded::{EmbeddedAdmin, EmbeddedFormset, EmbeddedSpec},
    error::InternalError,
    form::{
        FactoryError, FormArgs, FormData, FormField, ModelForm, ModelFormClass, RowForm,
        RowFormClass, fields_for_model,
    },
    formset::{ChangeSummary, ConstructionError, FormsetView},
    obs::ObjectRef,
    present::{AdminForm, InlineAdminFormset},
    traits::Entity,
    value::Value,
};
use std::{collections::BTreeMap, sync::Arc};

// Formsets built for one request, in registration order.
struct Formsets<P> {
    related: Vec<(usize, Box<dyn RelatedFormset<P>>)>,
    embedded: Vec<(usize, Box<dyn EmbeddedFormset<P>>)>,
    failures: Vec<String>,
}

impl<P> Formsets<P> {
    fn views(&self) -> Vec<&dyn FormsetView> {
        let related = self
            .related
            .iter()
            .map(|(_, formset)| formset.as_ref() as &dyn FormsetView);
        let embedded = self
            .embedded
            .iter()
            .map(|(_, formset)| formset.as_ref() as &dyn FormsetView);

        related.chain(embedded).collect()
    }

    fn all_valid(&self) -> bool {
        self.failures.is_empty() && self.views().iter().all(|formset| formset.is_valid())
    }
}

// Add or change, with what the page needs to know about it.
struct FlowKind<'a, P> {
    original: Option<&'a P>,
    object_id: Option<&'a str>,
    form_url: String,
    save_as_new: bool,
}

///
/// ModelAdmin
///
/// Admin configuration for one parent entity. Owns its related inlines and
/// embedded collections; holds no per-request state.
///

pub struct ModelAdmin<P: Entity> {
    options: AdminOptions,
    form: ModelFormClass<P>,
    fields: Vec<FormField>,
    inlines: Vec<Box<dyn RelatedInline<P>>>,
    embedded: Vec<Box<dyn EmbeddedAdmin<P>>>,
}

impl<P: Entity> ModelAdmin<P> {
    pub fn new(options: AdminOptions) -> Result<Self, InternalError> {
        Self::with_form(options, ModelFormClass::new())
    }

    /// Use a parent form class with declared field overrides.
    pub fn with_form(
        options: AdminOptions,
        form: ModelFormClass<P>,
    ) -> Result<Self, InternalError> {
        options.validate()?;

        let (fields, exclude) = options.field_selection();
        let fields = fields_for_model(
            P::MODEL,
            fields.as_deref(),
            &exclude,
            None,
            &form.declared_fields(),
        )?;

        Ok(Self {
            options,
            form,
            fields,
            inlines: Vec::new(),
            embedded: Vec::new(),
        })
    }

    #[must_use]
    pub fn inline(mut self, inline: Box<dyn RelatedInline<P>>) -> Self {
        self.inlines.push(inline);
        self
    }

    /// Register an embedded collection. Incompatible forms fail here.
    pub fn embed<F: RowFormClass>(
        mut self,
        spec: EmbeddedSpec<P, F>,
    ) -> Result<Self, FactoryError> {
        self.embedded.push(Box::new(spec.register()?));

        Ok(self)
    }

    #[must_use]
    pub const fn options(&self) -> &AdminOptions {
        &self.options
    }

    #[must_use]
    pub fn embedded(&self) -> &[Box<dyn EmbeddedAdmin<P>>] {
        &self.embedded
    }

    pub fn add_view(
        &self,
        request: &AdminRequest,
        collab: &mut Collaborators<'_, P>,
    ) -> Result<AdminResponse<P>, AdminError> {
        self.add_flow(request, collab, String::new())
    }

    pub fn change_view(
        &self,
        request: &AdminRequest,
        object_id: &str,
        collab: &mut Collaborators<'_, P>,
    ) -> Result<AdminResponse<P>, AdminError> {
        let original = match object_id.parse::<P::Key>() {
            Ok(key) => collab.store.load(&key)?,
            Err(_) => None,
        };

        if !collab
            .permissions
            .has_change_permission(&request.principal, original.as_ref())
        {
            return Err(AdminError::PermissionDenied {
                action: "change",
                model: P::MODEL.name,
            });
        }

        let Some(original) = original else {
            return Err(AdminError::not_found(P::MODEL.verbose_name, object_id));
        };

        // the copy is added through the add flow once the source checks out
        if request.save_as_new() {
            return self.add_flow(request, collab, "../add/".to_string());
        }

        self.changeform(
            request,
            collab,
            FlowKind {
                original: Some(&original),
                object_id: Some(object_id),
                form_url: String::new(),
                save_as_new: false,
            },
        )
    }

    fn add_flow(
        &self,
        request: &AdminRequest,
        collab: &mut Collaborators<'_, P>,
        form_url: String,
    ) -> Result<AdminResponse<P>, AdminError> {
        if !collab.permissions.has_add_permission(&request.principal) {
            return Err(AdminError::PermissionDenied {
                action: "add",
                model: P::MODEL.name,
            });
        }

        self.changeform(
            request,
            collab,
            FlowKind {
                original: None,
                object_id: None,
                form_url,
                save_as_new: request.save_as_new(),
            },
        )
    }

    fn changeform(
        &self,
        request: &AdminRequest,
        collab: &mut Collaborators<'_, P>,
        flow: FlowKind<'_, P>,
    ) -> Result<AdminResponse<P>, AdminError> {
        let mut prefixes = PrefixAllocator::default();

        if !request.is_post() {
            let mut args = FormArgs::new();
            match flow.original {
                Some(original) => args = args.with_instance(original.clone()),
                None => args = args.with_initial(self.initial_from_query(&request.query)),
            }
            let form = self.form.build(self.fields.clone(), args);
            let parent = flow.original.cloned().unwrap_or_default();
            let formsets = self.build_formsets(&parent, flow.original, None, false, &mut prefixes);

            return Ok(self.render(request, collab, form, formsets, &flow));
        }

        let data = Arc::clone(&request.post);
        let mut args = FormArgs::new().bound(Some(Arc::clone(&data)));
        if let Some(original) = flow.original {
            args = args.with_instance(original.clone());
        }
        let form = self.form.build(self.fields.clone(), args);

        let form_valid = form.is_valid();
        let object = if form_valid {
            form.save(false)?
        } else {
            flow.original.cloned().unwrap_or_default()
        };

        let formsets = self.build_formsets(
            &object,
            flow.original,
            Some(data),
            flow.save_as_new,
            &mut prefixes,
        );

        if !(form_valid && formsets.all_valid()) {
            tracing::debug!(
                model = P::MODEL.name,
                form_valid,
                failures = formsets.failures.len(),
                "submission invalid; re-rendering"
            );

            return Ok(self.render(request, collab, form, formsets, &flow));
        }

        let change = flow.original.is_some();
        let (saved, message) = self.commit(request, collab, &form, object, &formsets, change)?;

        let action = if change { "change" } else { "addition" };
        let key = saved.key().map(|key| key.to_string()).unwrap_or_default();
        tracing::info!(model = P::MODEL.name, %key, action, %message, "object saved");

        let verb = if change { "changed" } else { "added" };
        let flash = format!(
            "The {} \"{saved}\" was {verb} successfully.",
            P::MODEL.verbose_name
        );

        Ok(AdminResponse::Saved(SavedResponse {
            object: saved,
            added: !change,
            next: request.next_step(),
            message: flash,
        }))
    }

    // The all-or-nothing commit path. Any error drops the transaction,
    // which rolls the store back.
    fn commit(
        &self,
        request: &AdminRequest,
        collab: &mut Collaborators<'_, P>,
        form: &ModelForm<P>,
        mut object: P,
        formsets: &Formsets<P>,
        change: bool,
    ) -> Result<(P, String), InternalError> {
        let mut tx = Transaction::begin(&mut *collab.store)?;
        let mut summaries: Vec<ChangeSummary> = Vec::new();

        // embedded collections land on the parent before it is persisted
        for (_, formset) in &formsets.embedded {
            summaries.push(formset.apply_to(&mut object)?);
        }

        let saved = tx.store().save_parent(object, change)?;
        tx.store().save_m2m(&saved, &form.m2m_data())?;

        let mut related = Vec::with_capacity(formsets.related.len());
        for (_, formset) in &formsets.related {
            related.push(formset.save(&saved)?);
        }
        // regular inlines come first in the message, as on the page
        related.append(&mut summaries);

        let principal = request.principal.as_str();
        let message = if change {
            let message = construct_change_message(&form.changed_data(), &related);
            collab
                .history
                .log_change(principal, ObjectRef::of(&saved), message.clone());

            message
        } else {
            collab.history.log_addition(principal, ObjectRef::of(&saved));

            String::new()
        };

        tx.commit()?;

        Ok((saved, message))
    }

    fn build_formsets(
        &self,
        related_parent: &P,
        embedded_parent: Option<&P>,
        data: Option<Arc<FormData>>,
        save_as_new: bool,
        prefixes: &mut PrefixAllocator,
    ) -> Formsets<P> {
        let mut formsets = Formsets {
            related: Vec::new(),
            embedded: Vec::new(),
            failures: Vec::new(),
        };

        for (index, inline) in self.inlines.iter().enumerate() {
            let prefix = prefixes.next(&inline.default_prefix());
            match inline.build(related_parent, data.clone(), prefix, save_as_new) {
                Ok(formset) => formsets.related.push((index, formset)),
                Err(err) => self.construction_failed(&mut formsets, &inline.verbose_name(), &err),
            }
        }

        for (index, embedded) in self.embedded.iter().enumerate() {
            let prefix = prefixes.next(&embedded.default_prefix());
            match embedded.build(embedded_parent, data.clone(), prefix, save_as_new) {
                Ok(formset) => formsets.embedded.push((index, formset)),
                Err(err) => {
                    self.construction_failed(&mut formsets, &embedded.verbose_name(), &err);
                }
            }
        }

        formsets
    }

    fn construction_failed(&self, formsets: &mut Formsets<P>, name: &str, err: &ConstructionError) {
        match self.options.construction_failure {
            ConstructionFailurePolicy::BlockCommit => {
                tracing::warn!(formset = name, error = %err, "formset construction failed");
                formsets.failures.push(format!("{name}: {err}"));
            }
            ConstructionFailurePolicy::Skip => {
                tracing::warn!(
                    formset = name,
                    error = %err,
                    "formset construction failed; skipped"
                );
            }
        }
    }

    // GET parameters prefill the add form; many-to-many values are
    // comma-separated keys.
    fn initial_from_query(&self, query: &FormData) -> BTreeMap<String, Value> {
        self.fields
            .iter()
            .filter_map(|field| {
                let raw = query.get(&field.name)?;
                let value = if field.kind.is_many_to_many() {
                    Value::List(
                        raw.split(',')
                            .filter(|key| !key.is_empty())
                            .map(ToString::to_string)
                            .collect(),
                    )
                } else {
                    Value::Text(raw.to_string())
                };

                Some((field.name.clone(), value))
            })
            .collect()
    }

    fn render(
        &self,
        request: &AdminRequest,
        collab: &Collaborators<'_, P>,
        form: ModelForm<P>,
        formsets: Formsets<P>,
        flow: &FlowKind<'_, P>,
    ) -> AdminResponse<P> {
        let errors = AdminErrorList::new(&form, &formsets.views(), &formsets.failures);

        let inline_formsets = formsets
            .related
            .into_iter()
            .map(|(index, formset)| {
                let inline = &self.inlines[index];
                InlineAdminFormset::new(
                    formset,
                    inline.verbose_name(),
                    inline.fieldsets(),
                    inline.readonly_fields().to_vec(),
                )
            })
            .collect();

        let embedded_formsets = formsets
            .embedded
            .into_iter()
            .map(|(index, formset)| {
                let embedded = &self.embedded[index];
                InlineAdminFormset::new(
                    formset,
                    embedded.verbose_name(),
                    embedded.fieldsets(),
                    embedded.readonly_fields().to_vec(),
                )
            })
            .collect();

        let principal = &request.principal;
        let permissions = PermissionFlags {
            add: collab.permissions.has_add_permission(principal),
            change: collab
                .permissions
                .has_change_permission(principal, flow.original),
            delete: collab
                .permissions
                .has_delete_permission(principal, flow.original),
        };

        let add = flow.original.is_none();
        let verbose = P::MODEL.verbose_name;

        AdminResponse::Render(Box::new(ChangeFormContext {
            title: if add {
                format!("Add {verbose}")
            } else {
                format!("Change {verbose}")
            },
            adminform: AdminForm::new(
                form,
                P::MODEL,
                &self.options.fieldsets,
                self.options.readonly_fields.clone(),
                self.options.prepopulated_fields.clone(),
            ),
            inline_formsets,
            embedded_formsets,
            errors,
            permissions,
            is_popup: request.is_popup(),
            add,
            change: !add,
            show_delete: !add,
            save_as: self.options.save_as,
            object_id: flow.object_id.map(ToString::to_string),
            form_url: flow.form_url.clone(),
        }))
    }
}

///
/// TESTS
///
