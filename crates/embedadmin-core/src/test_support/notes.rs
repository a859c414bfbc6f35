use crate::{
    admin::{RelatedFormset, RelatedInline},
    error::InternalError,
    form::{FormData, FormField, FormView, ModelFormClass},
    formset::{
        ChangeSummary, ConstructionError, FormsetArgs, FormsetOptions, FormsetType, FormsetView,
        ManagementData, ReconcilingFormset, formset_factory,
    },
    model::{FieldKind, FieldModel, ModelDef},
    test_support::Contact,
    traits::Record,
    value::Value,
};
use std::{cell::RefCell, fmt, rc::Rc, sync::Arc};

///
/// Note
///
/// Row-backed child of `Contact`, persisted by its own formset.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Note {
    pub(crate) id: Option<u64>,
    pub(crate) body: String,
}

static NOTE_FIELDS: [FieldModel; 2] = [
    FieldModel::new("id", FieldKind::INT).labeled("ID").optional(),
    FieldModel::new("body", FieldKind::TEXT),
];

static NOTE_MODEL: ModelDef = ModelDef {
    name: "Note",
    verbose_name: "note",
    primary_key: Some("id"),
    fields: &NOTE_FIELDS,
};

impl Record for Note {
    const MODEL: &'static ModelDef = &NOTE_MODEL;

    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self
                .id
                .and_then(|id| i64::try_from(id).ok())
                .map_or(Value::None, Value::Int),
            "body" => Value::from(self.body.as_str()),
            _ => Value::None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), String> {
        match (field, value) {
            ("id", Value::None) => self.id = None,
            ("id", Value::Int(id)) => {
                self.id = Some(u64::try_from(id).map_err(|_| format!("id: negative key {id}"))?);
            }
            ("body", Value::Text(body)) => self.body = body,
            ("body", Value::None) => self.body.clear(),
            (field, other) => return Err(format!("{field}: unexpected value {other:?}")),
        }

        Ok(())
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)
    }
}

///
/// NoteInline
///

#[derive(Clone, Debug)]
pub(crate) struct NoteInline {
    ty: FormsetType<ModelFormClass<Note>>,
    pub(crate) existing: Vec<Note>,
    pub(crate) fail_save: bool,
    saved: Rc<RefCell<Vec<Note>>>,
}

impl NoteInline {
    pub(crate) fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            existing: notes,
            ..Self::default()
        }
    }

    /// Notes written by the last successful `save`.
    pub(crate) fn saved(&self) -> Vec<Note> {
        self.saved.borrow().clone()
    }
}

impl Default for NoteInline {
    fn default() -> Self {
        let form = ModelFormClass::<Note>::new().declare(FormField::integer("id", "ID").hidden());
        let ty = formset_factory(form, FormsetOptions::default())
            .expect("note formset should build");

        Self {
            ty,
            existing: Vec::new(),
            fail_save: false,
            saved: Rc::default(),
        }
    }
}

impl RelatedInline<Contact> for NoteInline {
    fn model(&self) -> &'static ModelDef {
        Note::MODEL
    }

    fn verbose_name(&self) -> String {
        Note::MODEL.verbose_name.to_string()
    }

    fn default_prefix(&self) -> String {
        self.ty.default_prefix()
    }

    fn build(
        &self,
        parent: &Contact,
        data: Option<Arc<FormData>>,
        prefix: String,
        save_as_new: bool,
    ) -> Result<Box<dyn RelatedFormset<Contact>>, ConstructionError> {
        // a parent without a key has no rows yet
        let source = if parent.id.is_some() {
            self.existing.clone()
        } else {
            Vec::new()
        };

        let mut args = FormsetArgs::new(source)
            .prefixed(prefix)
            .save_as_new(save_as_new);
        if let Some(data) = data {
            args = args.bound(data);
        }

        Ok(Box::new(NoteFormset {
            formset: self.ty.construct(args)?,
            fail_save: self.fail_save,
            saved: Rc::clone(&self.saved),
        }))
    }
}

struct NoteFormset {
    formset: ReconcilingFormset<ModelFormClass<Note>>,
    fail_save: bool,
    saved: Rc<RefCell<Vec<Note>>>,
}

impl FormsetView for NoteFormset {
    fn prefix(&self) -> &str {
        FormsetView::prefix(&self.formset)
    }

    fn model(&self) -> &'static ModelDef {
        Note::MODEL
    }

    fn base_fields(&self) -> &[FormField] {
        FormsetView::base_fields(&self.formset)
    }

    fn form_views(&self) -> Vec<&dyn FormView> {
        FormsetView::form_views(&self.formset)
    }

    fn initial_form_count(&self) -> usize {
        FormsetView::initial_form_count(&self.formset)
    }

    fn empty_form_view(&self) -> &dyn FormView {
        FormsetView::empty_form_view(&self.formset)
    }

    fn management_data(&self) -> ManagementData {
        FormsetView::management_data(&self.formset)
    }

    fn non_form_errors(&self) -> &[String] {
        FormsetView::non_form_errors(&self.formset)
    }

    fn can_delete(&self) -> bool {
        FormsetView::can_delete(&self.formset)
    }

    fn can_order(&self) -> bool {
        FormsetView::can_order(&self.formset)
    }

    fn is_bound(&self) -> bool {
        FormsetView::is_bound(&self.formset)
    }

    fn is_valid(&self) -> bool {
        FormsetView::is_valid(&self.formset)
    }
}

impl RelatedFormset<Contact> for NoteFormset {
    fn save(&self, parent: &Contact) -> Result<ChangeSummary, InternalError> {
        if self.fail_save {
            return Err(InternalError::store_internal("note table is read-only"));
        }
        if parent.id.is_none() {
            return Err(InternalError::store_internal("notes saved before their contact"));
        }

        let result = self.formset.reconcile()?;
        let summary = result.summary(Note::MODEL.verbose_name);
        *self.saved.borrow_mut() = result.kept;

        Ok(summary)
    }
}
