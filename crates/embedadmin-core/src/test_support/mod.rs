//! Fixtures shared by unit tests: a `Contact` parent with embedded phones
//! and addresses, a related `Note` inline, and in-memory collaborators.

mod notes;
mod records;
mod store;

pub(crate) use notes::{Note, NoteInline};
pub(crate) use records::{Address, Contact, Phone, address, contact, phone};
pub(crate) use store::{MemoryStore, PermissionStub, RecordingHistory};

use crate::{
    admin::{ChangeFormContext, ModelAdmin},
    config::AdminOptions,
    form::{FormData, FormView, is_checked},
    formset::FormsetView,
};

/// What a browser would send back for an untouched formset.
pub(crate) fn resubmit(formset: &dyn FormsetView) -> FormData {
    let mut data: FormData = formset
        .management_data()
        .to_pairs(formset.prefix())
        .into_iter()
        .collect();

    for form in formset.form_views() {
        submit_form(&mut data, form);
    }

    data
}

/// Append a form's current widget values to `data`.
pub(crate) fn submit_form(data: &mut FormData, form: &dyn FormView) {
    for field in form.fields() {
        let key = form.add_prefix(&field.name);
        let value = form.display_value(&field.name);

        if field.is_checkbox() {
            if is_checked(Some(&value)) {
                data.insert(key, "on");
            }
        } else if field.kind.is_many_to_many() {
            for item in value.split(',').filter(|item| !item.is_empty()) {
                data.insert(key.clone(), item);
            }
        } else {
            data.insert(key, value);
        }
    }
}

/// Resubmit a whole rendered page unchanged.
pub(crate) fn resubmit_page(context: &ChangeFormContext<Contact>) -> FormData {
    let mut data = FormData::new();
    submit_form(&mut data, context.adminform.form());

    for adapter in context
        .inline_formsets
        .iter()
        .chain(context.embedded_formsets.iter())
    {
        for (key, value) in resubmit(adapter.formset()).iter() {
            for item in value {
                data.insert(key, item.clone());
            }
        }
    }

    data
}

/// Contact admin with both embedded collections registered.
pub(crate) fn contact_admin(options: AdminOptions) -> ModelAdmin<Contact> {
    ModelAdmin::new(options)
        .expect("contact admin should build")
        .embed(Contact::phones_spec())
        .expect("phones should register")
        .embed(Contact::addresses_spec())
        .expect("addresses should register")
}
