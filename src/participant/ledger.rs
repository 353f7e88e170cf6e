//! In-memory resource used by the participant tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::branch::BranchTable;
use crate::participant::{Participant, ResourceLifecycleHooks};

#[derive(Debug, Error)]
#[error("ledger failure: {0}")]
pub struct LedgerError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    Open,
    Prepared,
    Committed,
    RolledBack,
    Closed,
}

/// A handle that buffers entries until commit.
#[derive(Debug)]
pub struct Ledger {
    pub serial: usize,
    pub pending: Vec<String>,
    pub state: LedgerState,
}

impl Ledger {
    pub fn write(&mut self, entry: &str) {
        self.pending.push(entry.to_string());
    }
}

/// Hooks that publish committed entries to a shared journal.
#[derive(Debug, Default)]
pub struct LedgerHooks {
    pub journal: Mutex<Vec<String>>,
    pub created: AtomicUsize,
    pub closed: AtomicUsize,
    pub rollbacks: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_prepare: AtomicBool,
    pub fail_commit: AtomicBool,
    pub fail_rollback: AtomicBool,
    pub fail_close: AtomicBool,
    /// Empty ledgers vote read-only.
    pub read_only_when_empty: AtomicBool,
}

impl LedgerHooks {
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }
}

impl ResourceLifecycleHooks<Ledger> for LedgerHooks {
    type Error = LedgerError;

    fn create_resource(&self) -> Result<Ledger, LedgerError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(LedgerError("connection refused".into()));
        }
        let serial = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Ledger {
            serial,
            pending: Vec::new(),
            state: LedgerState::Open,
        })
    }

    fn prepare(&self, resource: &mut Ledger) -> Result<(), LedgerError> {
        if self.fail_prepare.load(Ordering::SeqCst) {
            return Err(LedgerError("prepare refused".into()));
        }
        resource.state = LedgerState::Prepared;
        Ok(())
    }

    fn commit(&self, resource: &mut Ledger) -> Result<(), LedgerError> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(LedgerError("disk full".into()));
        }
        self.journal.lock().append(&mut resource.pending);
        resource.state = LedgerState::Committed;
        Ok(())
    }

    fn rollback(&self, resource: &mut Ledger) -> Result<(), LedgerError> {
        if self.fail_rollback.load(Ordering::SeqCst) {
            return Err(LedgerError("undo log unavailable".into()));
        }
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        resource.pending.clear();
        resource.state = LedgerState::RolledBack;
        Ok(())
    }

    fn close(&self, resource: &mut Ledger) -> Result<(), LedgerError> {
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(LedgerError("handle busy".into()));
        }
        self.closed.fetch_add(1, Ordering::SeqCst);
        resource.state = LedgerState::Closed;
        Ok(())
    }

    fn is_read_only(&self, resource: &Ledger) -> bool {
        self.read_only_when_empty.load(Ordering::SeqCst) && resource.pending.is_empty()
    }
}

pub type LedgerParticipant = Participant<Ledger, LedgerHooks>;

pub fn setup() -> (Arc<BranchTable<Ledger>>, Arc<LedgerHooks>) {
    (
        Arc::new(BranchTable::new("ledger")),
        Arc::new(LedgerHooks::default()),
    )
}

pub fn participant(
    table: &Arc<BranchTable<Ledger>>,
    hooks: &Arc<LedgerHooks>,
) -> LedgerParticipant {
    Participant::new(Arc::clone(table), Arc::clone(hooks)).unwrap()
}
