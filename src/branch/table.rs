//! Shared Xid → branch map for one resource kind.
//!
//! Every participant of a kind holds the same `BranchTable`, so two handles to
//! the same logical resource cooperate on one Xid space. All mutation goes
//! through [`BranchTable::compute`], which runs its closure while holding the
//! entry for that Xid. Operations on one Xid are therefore totally ordered,
//! and unrelated Xids only meet on the map's shard locks.

use std::sync::{Arc, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::branch::state::{BranchInfo, TransactionBranch};
use crate::participant::ParticipantId;
use crate::xa::{XaResult, Xid};

/// A participant's `associated_xid` cell, shared with the table by handle.
pub(crate) type AssociationSlot = Arc<Mutex<Option<Xid>>>;

/// What `compute` does with the entry after its closure returns `Ok`.
#[derive(Debug)]
pub enum BranchUpdate<R> {
    /// Leave the entry as the closure left it.
    Keep,
    /// Store a new branch (only meaningful when the entry was vacant).
    Insert(TransactionBranch<R>),
    /// Drop the entry.
    Remove,
}

/// Branches of one resource kind, shared by all of its participants.
pub struct BranchTable<R> {
    kind: String,
    branches: DashMap<Xid, TransactionBranch<R>>,
    /// Participant id → that participant's association cell.
    slots: DashMap<ParticipantId, Weak<Mutex<Option<Xid>>>>,
}

impl<R> BranchTable<R> {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            branches: DashMap::new(),
            slots: DashMap::new(),
        }
    }

    /// The resource kind this table belongs to.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Atomic read-modify-write on one Xid.
    ///
    /// The closure sees the current branch (or `None`) and returns what to do
    /// with the entry plus its own result. On `Err` nothing is inserted or
    /// removed. Closures run every fallible step before touching the branch,
    /// so an error leaves it as it was. The one exception is a failed branch
    /// that is rolled back and then reported as `XA_RBROLLBACK`: its flags are
    /// reset even though the call returns `Err`.
    pub fn compute<T, F>(&self, xid: &Xid, f: F) -> XaResult<T>
    where
        F: FnOnce(Option<&mut TransactionBranch<R>>) -> XaResult<(BranchUpdate<R>, T)>,
    {
        match self.branches.entry(xid.clone()) {
            Entry::Occupied(mut entry) => {
                let (update, out) = f(Some(entry.get_mut()))?;
                match update {
                    BranchUpdate::Keep => {}
                    BranchUpdate::Insert(branch) => {
                        entry.insert(branch);
                    }
                    BranchUpdate::Remove => {
                        entry.remove();
                    }
                }
                Ok(out)
            }
            Entry::Vacant(entry) => {
                let (update, out) = f(None)?;
                if let BranchUpdate::Insert(branch) = update {
                    entry.insert(branch);
                }
                Ok(out)
            }
        }
    }

    /// Run `f` against a branch's resource, if the branch exists.
    ///
    /// Only the resource lock is held while `f` runs. The entry is released
    /// first, so other Xids and `prepared_xids` are not held up.
    pub fn with_resource<T>(&self, xid: &Xid, f: impl FnOnce(&mut R) -> T) -> Option<T> {
        let resource = self.resource(xid)?;
        let mut resource = resource.lock();
        Some(f(&mut *resource))
    }

    /// Shared handle to a branch's resource.
    pub(crate) fn resource(&self, xid: &Xid) -> Option<Arc<Mutex<R>>> {
        self.branches
            .get(xid)
            .map(|branch| Arc::clone(&branch.resource))
    }

    pub fn contains(&self, xid: &Xid) -> bool {
        self.branches.contains_key(xid)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Snapshot of a branch's state.
    pub fn info(&self, xid: &Xid) -> Option<BranchInfo> {
        self.branches.get(xid).map(|branch| branch.info(xid))
    }

    /// Xids of every prepared branch, in Xid order.
    pub fn prepared_xids(&self) -> Vec<Xid> {
        let mut xids: Vec<Xid> = self
            .branches
            .iter()
            .filter(|entry| entry.value().prepared)
            .map(|entry| entry.key().clone())
            .collect();
        xids.sort();
        xids
    }

    pub(crate) fn register(&self, id: ParticipantId, slot: &AssociationSlot) {
        self.slots.insert(id, Arc::downgrade(slot));
    }

    pub(crate) fn unregister(&self, id: ParticipantId) {
        self.slots.remove(&id);
    }

    /// Clear `owner`'s association if it still points at `xid`.
    ///
    /// Called from inside `compute` closures. Lock order is always branch
    /// entry, then slot directory, then the slot itself.
    pub(crate) fn release(&self, owner: ParticipantId, xid: &Xid) {
        let slot = self.slots.get(&owner).and_then(|weak| weak.upgrade());
        if let Some(slot) = slot {
            let mut associated = slot.lock();
            if associated.as_ref() == Some(xid) {
                *associated = None;
            }
        }
    }

    /// Number of live participants registered against this table.
    pub fn participant_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }
}

impl<R> std::fmt::Debug for BranchTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchTable")
            .field("kind", &self.kind)
            .field("branches", &self.branches.len())
            .field("participants", &self.slots.len())
            .finish()
    }
}
