use crate::{admin::ParentStore, error::InternalError, traits::Entity};

///
/// Transaction
///
/// Commit-path guard over the parent store. Dropping it without `commit`
/// rolls the store back, so every `?` inside the commit path undoes the
/// writes made so far.
///

pub struct Transaction<'a, P: Entity> {
    store: &'a mut dyn ParentStore<P>,
    finished: bool,
}

impl<'a, P: Entity> Transaction<'a, P> {
    pub fn begin(store: &'a mut dyn ParentStore<P>) -> Result<Self, InternalError> {
        store.begin()?;

        Ok(Self {
            store,
            finished: false,
        })
    }

    pub fn store(&mut self) -> &mut dyn ParentStore<P> {
        &mut *self.store
    }

    pub fn commit(mut self) -> Result<(), InternalError> {
        // a failed commit is still rolled back by drop
        self.store.commit()?;
        self.finished = true;

        Ok(())
    }
}

impl<P: Entity> Drop for Transaction<'_, P> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(model = P::MODEL.name, "commit path failed; rolling back");
            self.store.rollback();
        }
    }
}

///
/// TESTS
///
