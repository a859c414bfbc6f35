use crate::{
    error::InternalError,
    form::{FormArgs, FormData, FormErrors, FormField, FormView, RowForm, RowFormClass},
    traits::Record,
    value::Value,
};
use std::{collections::BTreeMap, marker::PhantomData, sync::Arc};

///
/// ModelForm
///
/// Default row form: edits the plain fields of one record. Cleaning runs
/// once at construction; an unbound form is never valid.
///

#[derive(Clone, Debug)]
pub struct ModelForm<R: Record> {
    fields: Vec<FormField>,
    prefix: Option<String>,
    data: Option<Arc<FormData>>,
    instance: Option<R>,
    initial: BTreeMap<String, Value>,
    empty_permitted: bool,
    changed: Vec<String>,
    cleaned: BTreeMap<String, Value>,
    errors: FormErrors,
}

impl<R: Record> ModelForm<R> {
    #[must_use]
    pub fn new(fields: Vec<FormField>, args: FormArgs<R>) -> Self {
        let initial = fields
            .iter()
            .map(|field| {
                let value = args
                    .initial
                    .get(&field.name)
                    .cloned()
                    .or_else(|| args.instance.as_ref().map(|item| item.value(&field.name)))
                    .unwrap_or_default();

                (field.name.clone(), value)
            })
            .collect();

        let mut form = Self {
            fields,
            prefix: args.prefix,
            data: args.data,
            instance: args.instance,
            initial,
            empty_permitted: args.empty_permitted,
            changed: Vec::new(),
            cleaned: BTreeMap::new(),
            errors: FormErrors::new(),
        };
        form.full_clean();

        form
    }

    /// Initial value of a field (explicit initial, then instance).
    #[must_use]
    pub fn initial(&self, field: &str) -> &Value {
        static NONE: Value = Value::None;

        self.initial.get(field).unwrap_or(&NONE)
    }

    #[must_use]
    pub const fn cleaned_data(&self) -> &BTreeMap<String, Value> {
        &self.cleaned
    }

    /// Cleaned many-to-many values; persisted apart from the record.
    #[must_use]
    pub fn m2m_data(&self) -> BTreeMap<String, Value> {
        self.fields
            .iter()
            .filter(|field| field.kind.is_many_to_many())
            .filter_map(|field| {
                self.cleaned
                    .get(&field.name)
                    .map(|value| (field.name.clone(), value.clone()))
            })
            .collect()
    }

    fn raw(&self, field: &str) -> &[String] {
        match &self.data {
            Some(data) => data.get_list(&self.add_prefix(field)),
            None => &[],
        }
    }

    fn full_clean(&mut self) {
        if self.data.is_none() {
            return;
        }

        self.changed = self
            .fields
            .iter()
            .filter(|field| field.has_changed(self.initial(&field.name), self.raw(&field.name)))
            .map(|field| field.name.clone())
            .collect();

        // an untouched optional row is trivially valid and never cleaned
        if self.empty_permitted && self.changed.is_empty() {
            return;
        }

        let mut cleaned = BTreeMap::new();
        let mut errors = FormErrors::new();
        for field in &self.fields {
            match field.clean(self.raw(&field.name)) {
                Ok(value) => {
                    cleaned.insert(field.name.clone(), value);
                }
                Err(message) => errors.add(field.name.clone(), message),
            }
        }
        self.cleaned = cleaned;

        if errors.is_empty() {
            match self.apply_cleaned() {
                Ok(candidate) => candidate.validate_custom(&mut errors),
                Err((field, message)) => errors.add(field, message),
            }
        }
        self.errors = errors;
    }

    // Copy of the instance (or a fresh record) carrying the cleaned values.
    fn apply_cleaned(&self) -> Result<R, (String, String)> {
        let mut item = self.instance.clone().unwrap_or_default();

        for (name, value) in &self.cleaned {
            let Some(model) = R::MODEL.field(name) else {
                continue;
            };
            if !model.editable || model.kind.is_many_to_many() {
                continue;
            }

            item.set_value(name, value.clone())
                .map_err(|message| (name.clone(), message))?;
        }

        Ok(item)
    }
}

impl<R: Record> FormView for ModelForm<R> {
    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn fields(&self) -> &[FormField] {
        &self.fields
    }

    fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    fn errors(&self) -> &FormErrors {
        &self.errors
    }

    fn display_value(&self, field: &str) -> String {
        if self.is_bound() {
            let raw = self.raw(field);
            let many = self
                .field(field)
                .is_some_and(|field| field.kind.is_many_to_many());

            if many {
                raw.join(",")
            } else {
                raw.last().cloned().unwrap_or_default()
            }
        } else {
            self.initial(field).to_form_string()
        }
    }

    fn instance_value(&self, field: &str) -> Option<Value> {
        self.instance.as_ref().map(|item| item.value(field))
    }

    fn has_instance(&self) -> bool {
        self.instance.is_some()
    }
}

impl<R: Record> RowForm for ModelForm<R> {
    type Item = R;

    fn is_valid(&self) -> bool {
        self.is_bound() && self.errors.is_empty()
    }

    fn has_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    fn changed_data(&self) -> Vec<String> {
        self.changed.clone()
    }

    fn save(&self, commit: bool) -> Result<R, InternalError> {
        let verbose = R::MODEL.verbose_name;

        if commit {
            return Err(InternalError::form_unsupported(format!(
                "{verbose} records are persisted by their owner; save with commit=false"
            )));
        }

        if !self.is_valid() {
            let verb = if self.instance.is_some() {
                "changed"
            } else {
                "created"
            };

            return Err(InternalError::form_validation(format!(
                "the {verbose} could not be {verb} because the data didn't validate"
            )));
        }

        self.apply_cleaned().map_err(|(field, message)| {
            InternalError::form_internal(format!("{verbose}.{field}: {message}"))
        })
    }

    fn raw_value(&self, field: &str) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.get(&self.add_prefix(field)))
    }

    fn instance(&self) -> Option<&R> {
        self.instance.as_ref()
    }

    fn empty_permitted(&self) -> bool {
        self.empty_permitted
    }
}

///
/// ModelFormClass
///
/// Row form class producing `ModelForm<R>`, with optional declared
/// overrides of the generated fields.
///

#[derive(Clone, Debug)]
pub struct ModelFormClass<R> {
    declared: Vec<FormField>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> ModelFormClass<R> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            declared: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Override the generated field of the same name.
    #[must_use]
    pub fn declare(mut self, field: FormField) -> Self {
        self.declared.retain(|existing| existing.name != field.name);
        self.declared.push(field);
        self
    }
}

impl<R: Record> Default for ModelFormClass<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RowFormClass for ModelFormClass<R> {
    type Item = R;
    type Form = ModelForm<R>;

    fn declared_fields(&self) -> Vec<FormField> {
        self.declared.clone()
    }

    fn build(&self, fields: Vec<FormField>, args: FormArgs<R>) -> ModelForm<R> {
        ModelForm::new(fields, args)
    }
}

///
/// TESTS
///
