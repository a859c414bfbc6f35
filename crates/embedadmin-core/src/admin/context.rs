use crate::{
    admin::NextStep,
    form::{FormView, ModelForm},
    formset::FormsetView,
    present::{AdminForm, InlineAdminFormset},
    traits::Record,
};

///
/// AdminErrorList
///
/// Every message shown at the top of a re-rendered form: parent form
/// errors, then each formset's row and non-form errors.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AdminErrorList(Vec<String>);

impl AdminErrorList {
    #[must_use]
    pub fn new(form: &dyn FormView, formsets: &[&dyn FormsetView], extra: &[String]) -> Self {
        let mut messages: Vec<String> = Vec::new();

        if form.is_bound() {
            for (_, errors) in form.errors().iter() {
                messages.extend(errors.iter().cloned());
            }

            for formset in formsets {
                for row in formset.form_views() {
                    for (_, errors) in row.errors().iter() {
                        messages.extend(errors.iter().cloned());
                    }
                }
                messages.extend(formset.non_form_errors().iter().cloned());
            }
        }
        messages.extend(extra.iter().cloned());

        Self(messages)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

///
/// PermissionFlags
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PermissionFlags {
    pub add: bool,
    pub change: bool,
    pub delete: bool,
}

///
/// ChangeFormContext
///
/// Everything a renderer needs for the add/change page.
///

#[derive(Debug)]
pub struct ChangeFormContext<P: Record> {
    pub title: String,
    pub adminform: AdminForm<ModelForm<P>>,
    pub inline_formsets: Vec<InlineAdminFormset>,
    pub embedded_formsets: Vec<InlineAdminFormset>,
    pub errors: AdminErrorList,
    pub permissions: PermissionFlags,
    pub is_popup: bool,
    pub add: bool,
    pub change: bool,
    pub show_delete: bool,
    pub save_as: bool,
    pub object_id: Option<String>,
    pub form_url: String,
}

///
/// SavedResponse
///

#[derive(Clone, Debug)]
pub struct SavedResponse<P> {
    pub object: P,
    pub added: bool,
    pub next: NextStep,
    /// Flash message for the user.
    pub message: String,
}

///
/// AdminResponse
///

#[derive(Debug)]
pub enum AdminResponse<P: Record> {
    Render(Box<ChangeFormContext<P>>),
    Saved(SavedResponse<P>),
}

impl<P: Record> AdminResponse<P> {
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    #[must_use]
    pub fn context(&self) -> Option<&ChangeFormContext<P>> {
        match self {
            Self::Render(context) => Some(context),
            Self::Saved(_) => None,
        }
    }

    #[must_use]
    pub const fn saved(&self) -> Option<&SavedResponse<P>> {
        match self {
            Self::Saved(saved) => Some(saved),
            Self::Render(_) => None,
        }
    }
}
