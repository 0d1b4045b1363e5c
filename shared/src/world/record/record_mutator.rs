use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::warn;

use crate::{NetComponentId, PropertyIndex};

use super::{error::RecordError, replication_record::ReplicationRecord};

/// Shared handle to one entity's [`ReplicationRecord`].
///
/// The binding keeps one handle and clones are handed to components at
/// attach time, so properties can raise their own bits. The lock is held
/// only for the duration of a single mark, snapshot, or commit.
///
/// Alongside the record it keeps the bits marked since the last outbound
/// snapshot, so a commit never lowers a property written after its value
/// was encoded. Locks are always taken record first.
#[derive(Clone)]
pub struct RecordMutator {
    record: Arc<RwLock<ReplicationRecord>>,
    marked_since_send: Arc<RwLock<ReplicationRecord>>,
}

impl RecordMutator {
    pub fn new(record: ReplicationRecord) -> Self {
        Self {
            record: Arc::new(RwLock::new(record)),
            marked_since_send: Arc::new(RwLock::new(ReplicationRecord::new())),
        }
    }

    /// Raise a property's bit
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned. An undeclared component or index is
    /// logged and ignored.
    /// Consider using `try_mark` for non-panicking error handling.
    pub fn mark(&self, component: NetComponentId, index: PropertyIndex) {
        match self.try_mark(component, index) {
            Ok(()) => {}
            Err(RecordError::LockPoisoned) => panic!("Lock on ReplicationRecord is poisoned"),
            Err(error) => warn!("Dropping property mutation: {}", error),
        }
    }

    pub fn try_mark(&self, component: NetComponentId, index: PropertyIndex) -> Result<(), RecordError> {
        let mut record = self.try_write()?;
        record.mark(component, index)?;
        let mut marked = self.try_write_marked()?;
        if !marked.contains_component(component) {
            if let Some(bits) = record.bits(component) {
                marked.add_component(component, bits.bit_count())?;
            }
        }
        marked.mark(component, index)
    }

    /// Raise every bit of one component
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned. An undeclared component is logged and
    /// ignored.
    /// Consider using `try_mark_component` for non-panicking error handling.
    pub fn mark_component(&self, component: NetComponentId) {
        match self.try_mark_component(component) {
            Ok(()) => {}
            Err(RecordError::LockPoisoned) => panic!("Lock on ReplicationRecord is poisoned"),
            Err(error) => warn!("Dropping component mutation: {}", error),
        }
    }

    pub fn try_mark_component(&self, component: NetComponentId) -> Result<(), RecordError> {
        let mut record = self.try_write()?;
        let bits = record
            .bits_mut(component)
            .ok_or(RecordError::ComponentNotRecorded { component })?;
        bits.set_all();
        let bits = bits.clone();
        let mut marked = self.try_write_marked()?;
        marked.remove_component(component);
        marked.add_bits(component, bits)
    }

    /// Copy of the record as it stands now
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_snapshot` for non-panicking error handling.
    pub fn snapshot(&self) -> ReplicationRecord {
        self.try_snapshot()
            .expect("Lock on ReplicationRecord is poisoned")
    }

    pub fn try_snapshot(&self) -> Result<ReplicationRecord, RecordError> {
        Ok(self.try_read()?.clone())
    }

    /// Copy of the record for an outbound pass. Marks made from now on are
    /// remembered until [`RecordMutator::commit`].
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_send_snapshot` for non-panicking error handling.
    pub fn send_snapshot(&self) -> ReplicationRecord {
        self.try_send_snapshot()
            .expect("Lock on ReplicationRecord is poisoned")
    }

    pub fn try_send_snapshot(&self) -> Result<ReplicationRecord, RecordError> {
        let record = self.try_read()?;
        let mut marked = self.try_write_marked()?;
        *marked = record.clone();
        marked.clear_all();
        Ok(record.clone())
    }

    /// Lower the bits of a send snapshot that went out on the wire. A bit
    /// marked again since [`RecordMutator::send_snapshot`] stays raised,
    /// since its newest value has not been encoded.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_commit` for non-panicking error handling.
    pub fn commit(&self, sent: &ReplicationRecord) {
        self.try_commit(sent)
            .expect("Lock on ReplicationRecord is poisoned")
    }

    pub fn try_commit(&self, sent: &ReplicationRecord) -> Result<(), RecordError> {
        let mut record = self.try_write()?;
        let marked = self.try_read_marked()?;
        let mut lowered = sent.clone();
        lowered.subtract(&marked);
        record.subtract(&lowered);
        Ok(())
    }

    /// Lower every bit carried by `other`, whenever it was raised
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_subtract` for non-panicking error handling.
    pub fn subtract(&self, other: &ReplicationRecord) {
        self.try_subtract(other)
            .expect("Lock on ReplicationRecord is poisoned")
    }

    pub fn try_subtract(&self, other: &ReplicationRecord) -> Result<(), RecordError> {
        self.try_write()?.subtract(other);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn clear_all(&self) {
        self.write().clear_all();
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn mark_all(&self) {
        let mut record = self.write();
        record.mark_all();
        let mut marked = self
            .try_write_marked()
            .expect("Lock on ReplicationRecord is poisoned");
        *marked = record.clone();
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn is_clear(&self) -> bool {
        self.read().is_clear()
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn read(&self) -> RwLockReadGuard<'_, ReplicationRecord> {
        self.try_read()
            .expect("Lock on ReplicationRecord is poisoned")
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn write(&self) -> RwLockWriteGuard<'_, ReplicationRecord> {
        self.try_write()
            .expect("Lock on ReplicationRecord is poisoned")
    }

    pub fn try_read(&self) -> Result<RwLockReadGuard<'_, ReplicationRecord>, RecordError> {
        self.record.read().map_err(|_| RecordError::LockPoisoned)
    }

    pub fn try_write(&self) -> Result<RwLockWriteGuard<'_, ReplicationRecord>, RecordError> {
        self.record.write().map_err(|_| RecordError::LockPoisoned)
    }

    fn try_read_marked(&self) -> Result<RwLockReadGuard<'_, ReplicationRecord>, RecordError> {
        self.marked_since_send
            .read()
            .map_err(|_| RecordError::LockPoisoned)
    }

    fn try_write_marked(&self) -> Result<RwLockWriteGuard<'_, ReplicationRecord>, RecordError> {
        self.marked_since_send
            .write()
            .map_err(|_| RecordError::LockPoisoned)
    }
}
