use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::{
    BatchError,
    core::item::{ContactSink, Profile},
};

/// A contact stored by [`InMemoryContactSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContact {
    /// Identifier assigned at commit time, starting at 1.
    pub raw_contact_id: u64,
    pub profile: Profile,
}

#[derive(Default)]
struct Store {
    contacts: Vec<StoredContact>,
    next_id: u64,
}

/// In-process contacts store.
///
/// Every committed profile gets its own raw contact id. With a capacity set,
/// commits beyond it are refused with `Ok(false)`.
#[derive(Default)]
pub struct InMemoryContactSink {
    store: Mutex<Store>,
    capacity: Option<usize>,
}

impl InMemoryContactSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that accepts at most `capacity` contacts.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Mutex::default(),
            capacity: Some(capacity),
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the stored contacts, in commit order.
    pub fn contacts(&self) -> Vec<StoredContact> {
        self.store().contacts.clone()
    }

    pub fn len(&self) -> usize {
        self.store().contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store().contacts.is_empty()
    }

    pub fn clear(&self) {
        self.store().contacts.clear();
    }
}

impl ContactSink for InMemoryContactSink {
    fn commit(&self, profile: &Profile) -> Result<bool, BatchError> {
        let mut store = self.store();

        if self
            .capacity
            .is_some_and(|capacity| store.contacts.len() >= capacity)
        {
            debug!("Store full, refusing contact: {}", profile);
            return Ok(false);
        }

        store.next_id += 1;
        let raw_contact_id = store.next_id;
        store.contacts.push(StoredContact {
            raw_contact_id,
            profile: profile.clone(),
        });

        Ok(true)
    }
}
