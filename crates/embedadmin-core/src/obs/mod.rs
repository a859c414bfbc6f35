//! Change-history boundary.
//!
//! The controller never writes audit records itself; every addition or
//! change flows through `HistoryEvent` into a `HistorySink`.

mod sink;

pub use sink::{HistoryAction, HistoryEvent, HistorySink, NoopHistory, ObjectRef};
