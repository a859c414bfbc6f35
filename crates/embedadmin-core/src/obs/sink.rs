use crate::traits::Entity;

///
/// HistoryAction
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HistoryAction {
    Addition,
    Change,
}

///
/// ObjectRef
/// Display snapshot of the object an event refers to.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectRef {
    pub model: &'static str,
    pub key: Option<String>,
    pub repr: String,
}

impl ObjectRef {
    #[must_use]
    pub fn of<P: Entity>(object: &P) -> Self {
        Self {
            model: P::MODEL.name,
            key: object.key().map(|key| key.to_string()),
            repr: object.to_string(),
        }
    }
}

///
/// HistoryEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryEvent {
    pub action: HistoryAction,
    pub principal: String,
    pub object: ObjectRef,
    /// Change message; empty for additions.
    pub message: String,
}

///
/// HistorySink
///
/// Fire-and-forget audit sink. Recording happens inside the commit
/// transaction, so a sink that persists should share that transaction.
///

pub trait HistorySink {
    fn record(&self, event: HistoryEvent);

    fn log_addition(&self, principal: &str, object: ObjectRef) {
        self.record(HistoryEvent {
            action: HistoryAction::Addition,
            principal: principal.to_string(),
            object,
            message: String::new(),
        });
    }

    fn log_change(&self, principal: &str, object: ObjectRef, message: String) {
        self.record(HistoryEvent {
            action: HistoryAction::Change,
            principal: principal.to_string(),
            object,
            message,
        });
    }
}

///
/// NoopHistory
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHistory;

impl HistorySink for NoopHistory {
    fn record(&self, _event: HistoryEvent) {}
}

///
/// TESTS
///
