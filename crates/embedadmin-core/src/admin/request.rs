use crate::form::FormData;
use derive_more::{Display, From};
use std::sync::Arc;

pub const IS_POPUP_VAR: &str = "_popup";
pub const CONTINUE_VAR: &str = "_continue";
pub const ADD_ANOTHER_VAR: &str = "_addanother";
pub const SAVE_AS_NEW_VAR: &str = "_saveasnew";

///
/// Method
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
}

///
/// Principal
/// Acting user, as named in history records.
///

#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
pub struct Principal(String);

impl Principal {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Principal {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

///
/// NextStep
/// Where the caller should send the user after a successful save.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NextStep {
    Changelist,
    ContinueEditing,
    AddAnother,
    ClosePopup,
}

///
/// AdminRequest
///

#[derive(Clone, Debug)]
pub struct AdminRequest {
    pub method: Method,
    pub principal: Principal,
    pub query: FormData,
    pub post: Arc<FormData>,
}

impl AdminRequest {
    #[must_use]
    pub fn get(principal: impl Into<Principal>) -> Self {
        Self {
            method: Method::Get,
            principal: principal.into(),
            query: FormData::new(),
            post: Arc::new(FormData::new()),
        }
    }

    #[must_use]
    pub fn post(principal: impl Into<Principal>, data: FormData) -> Self {
        Self {
            method: Method::Post,
            principal: principal.into(),
            query: FormData::new(),
            post: Arc::new(data),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: FormData) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn is_post(&self) -> bool {
        self.method == Method::Post
    }

    #[must_use]
    pub fn is_popup(&self) -> bool {
        self.query.contains(IS_POPUP_VAR) || self.post.contains(IS_POPUP_VAR)
    }

    /// "Save as new" only applies to submissions.
    #[must_use]
    pub fn save_as_new(&self) -> bool {
        self.is_post() && self.post.contains(SAVE_AS_NEW_VAR)
    }

    #[must_use]
    pub fn next_step(&self) -> NextStep {
        if self.is_popup() {
            NextStep::ClosePopup
        } else if self.post.contains(CONTINUE_VAR) || self.post.contains(SAVE_AS_NEW_VAR) {
            NextStep::ContinueEditing
        } else if self.post.contains(ADD_ANOTHER_VAR) {
            NextStep::AddAnother
        } else {
            NextStep::Changelist
        }
    }
}

///
/// TESTS
///
