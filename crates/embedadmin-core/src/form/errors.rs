use crate::NON_FIELD_ERRORS;
use serde::Serialize;
use std::collections::BTreeMap;

///
/// ErrorContext
/// Narrow interface exposed to cleaning hooks for reporting non-fatal issues.
///

pub trait ErrorContext {
    fn add_issue(&mut self, issue: Issue);
    fn add_issue_at(&mut self, field: &str, issue: Issue);
}

impl dyn ErrorContext + '_ {
    pub fn issue(&mut self, msg: impl Into<String>) {
        self.add_issue(Issue {
            message: msg.into(),
        });
    }

    pub fn issue_at(&mut self, field: &str, msg: impl Into<String>) {
        self.add_issue_at(
            field,
            Issue {
                message: msg.into(),
            },
        );
    }
}

/// ErrorContext that pins all issues to a single field.
pub struct ScopedContext<'a> {
    ctx: &'a mut dyn ErrorContext,
    field: &'a str,
}

impl<'a> ScopedContext<'a> {
    #[must_use]
    pub fn new(ctx: &'a mut dyn ErrorContext, field: &'a str) -> Self {
        Self { ctx, field }
    }
}

impl ErrorContext for ScopedContext<'_> {
    fn add_issue(&mut self, issue: Issue) {
        self.ctx.add_issue_at(self.field, issue);
    }

    fn add_issue_at(&mut self, _field: &str, issue: Issue) {
        self.ctx.add_issue_at(self.field, issue);
    }
}

///
/// Issue
///

#[derive(Clone, Debug, Default)]
pub struct Issue {
    pub message: String,
}

///
/// FormErrors
///
/// Field name -> messages. Non-field messages live under `__all__`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of messages across all fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn non_field_errors(&self) -> &[String] {
        self.field(NON_FIELD_ERRORS)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl ErrorContext for FormErrors {
    fn add_issue(&mut self, issue: Issue) {
        self.add(NON_FIELD_ERRORS, issue.message);
    }

    fn add_issue_at(&mut self, field: &str, issue: Issue) {
        self.add(field, issue.message);
    }
}

///
/// TESTS
///
