//! Per-Xid branch record.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;
use crate::xa::Xid;

/// Whether a participant is currently driving a branch's resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssociationState {
    /// No participant is driving the branch. Completion is only legal here.
    #[default]
    Unassociated,
    /// A participant is doing work on the branch.
    Associated,
    /// A participant paused its work and may resume it.
    Suspended,
}

impl fmt::Display for AssociationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationState::Unassociated => write!(f, "unassociated"),
            AssociationState::Associated => write!(f, "associated"),
            AssociationState::Suspended => write!(f, "suspended"),
        }
    }
}

/// Mutable state of one resource's participation in one global transaction.
///
/// The branch owns its resource from `start(NOFLAGS)` until it is closed.
/// `owner` is a handle, never an ownership edge: it only lets the table clear
/// the owning participant's association when the branch leaves `Associated`.
///
/// The resource has its own lock. Business calls take it without holding the
/// table entry; lock order is entry, then resource.
#[derive(Debug)]
pub struct TransactionBranch<R> {
    pub(crate) resource: Arc<Mutex<R>>,
    pub(crate) association: AssociationState,
    pub(crate) success: bool,
    pub(crate) prepared: bool,
    pub(crate) owner: Option<ParticipantId>,
    pub(crate) started_at: DateTime<Utc>,
}

impl<R> TransactionBranch<R> {
    /// A freshly started branch, associated with `owner`.
    pub(crate) fn started(resource: R, owner: ParticipantId) -> Self {
        Self {
            resource: Arc::new(Mutex::new(resource)),
            association: AssociationState::Associated,
            success: true,
            prepared: false,
            owner: Some(owner),
            started_at: Utc::now(),
        }
    }

    pub fn association(&self) -> AssociationState {
        self.association
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn owner(&self) -> Option<ParticipantId> {
        self.owner
    }

    /// Snapshot of everything but the resource.
    pub fn info(&self, xid: &Xid) -> BranchInfo {
        BranchInfo {
            xid: xid.clone(),
            association: self.association,
            success: self.success,
            prepared: self.prepared,
            owner: self.owner,
            started_at: self.started_at,
        }
    }
}

/// Point-in-time view of a branch, detached from the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub xid: Xid,
    pub association: AssociationState,
    pub success: bool,
    pub prepared: bool,
    pub owner: Option<ParticipantId>,
    pub started_at: DateTime<Utc>,
}
