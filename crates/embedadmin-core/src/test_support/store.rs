use crate::{
    admin::{ParentStore, Permissions, Principal},
    error::InternalError,
    obs::{HistoryEvent, HistorySink},
    test_support::Contact,
    value::Value,
};
use std::{cell::RefCell, collections::BTreeMap};

///
/// MemoryStore
///
/// Contact rows with snapshot transactions.
///

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    rows: BTreeMap<u64, Contact>,
    snapshot: Option<BTreeMap<u64, Contact>>,
    next_id: u64,
    pub(crate) fail_save: bool,
    saves: usize,
    commits: usize,
    rollbacks: usize,
}

impl MemoryStore {
    pub(crate) fn with_rows(rows: impl IntoIterator<Item = Contact>) -> Self {
        let mut store = Self::default();
        for mut row in rows {
            store.next_id += 1;
            let id = *row.id.get_or_insert(store.next_id);
            store.next_id = store.next_id.max(id);
            store.rows.insert(id, row);
        }

        store
    }

    pub(crate) fn row(&self, id: u64) -> Option<&Contact> {
        self.rows.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) const fn saves(&self) -> usize {
        self.saves
    }

    pub(crate) const fn commits(&self) -> usize {
        self.commits
    }

    pub(crate) const fn rollbacks(&self) -> usize {
        self.rollbacks
    }
}

impl ParentStore<Contact> for MemoryStore {
    fn load(&self, key: &u64) -> Result<Option<Contact>, InternalError> {
        Ok(self.rows.get(key).cloned())
    }

    fn begin(&mut self) -> Result<(), InternalError> {
        if self.snapshot.is_some() {
            return Err(InternalError::store_internal("transaction already open"));
        }
        self.snapshot = Some(self.rows.clone());

        Ok(())
    }

    fn commit(&mut self) -> Result<(), InternalError> {
        self.snapshot
            .take()
            .ok_or_else(|| InternalError::store_internal("no open transaction"))?;
        self.commits += 1;

        Ok(())
    }

    fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.rows = snapshot;
        }
        self.rollbacks += 1;
    }

    fn save_parent(
        &mut self,
        mut object: Contact,
        _change: bool,
    ) -> Result<Contact, InternalError> {
        if self.fail_save {
            return Err(InternalError::store_internal("contact table is read-only"));
        }

        let id = match object.id {
            Some(id) => id,
            None => {
                self.next_id += 1;
                object.id = Some(self.next_id);
                self.next_id
            }
        };
        self.rows.insert(id, object.clone());
        self.saves += 1;

        Ok(object)
    }

    fn save_m2m(
        &mut self,
        object: &Contact,
        values: &BTreeMap<String, Value>,
    ) -> Result<(), InternalError> {
        let row = object
            .id
            .and_then(|id| self.rows.get_mut(&id))
            .ok_or_else(|| InternalError::store_internal("m2m save before parent save"))?;

        if let Some(tags) = values.get("tags").and_then(Value::as_list) {
            row.tags = tags.to_vec();
        }

        Ok(())
    }
}

///
/// PermissionStub
///

#[derive(Clone, Copy, Debug)]
pub(crate) struct PermissionStub {
    pub(crate) add: bool,
    pub(crate) change: bool,
    pub(crate) delete: bool,
}

impl Default for PermissionStub {
    fn default() -> Self {
        Self {
            add: true,
            change: true,
            delete: true,
        }
    }
}

impl Permissions<Contact> for PermissionStub {
    fn has_add_permission(&self, _principal: &Principal) -> bool {
        self.add
    }

    fn has_change_permission(&self, _principal: &Principal, _object: Option<&Contact>) -> bool {
        self.change
    }

    fn has_delete_permission(&self, _principal: &Principal, _object: Option<&Contact>) -> bool {
        self.delete
    }
}

///
/// RecordingHistory
///

#[derive(Debug, Default)]
pub(crate) struct RecordingHistory {
    events: RefCell<Vec<HistoryEvent>>,
}

impl RecordingHistory {
    pub(crate) fn events(&self) -> Vec<HistoryEvent> {
        self.events.borrow().clone()
    }
}

impl HistorySink for RecordingHistory {
    fn record(&self, event: HistoryEvent) {
        self.events.borrow_mut().push(event);
    }
}
