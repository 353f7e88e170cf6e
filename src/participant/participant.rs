//! The resource-manager side of the XA protocol.
//!
//! A `Participant` wraps one local resource and exposes the XA operation set
//! to an external transaction manager. While it is associated with a branch,
//! business calls made through [`Participant::apply`] run against the
//! branch's resource; otherwise they run against the local one.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::branch::{
    AssociationSlot, AssociationState, BranchInfo, BranchTable, BranchUpdate, TransactionBranch,
};
use crate::participant::config::ParticipantConfig;
use crate::participant::hooks::ResourceLifecycleHooks;
use crate::participant::id::ParticipantId;
use crate::participant::registry::ResourceRegistry;
use crate::xa::{EndFlags, RecoverFlags, StartFlags, Vote, XaError, XaResult, Xid};

/// One XA resource handle of a given kind.
///
/// Thread-safe: every method takes `&self`, so a participant can be shared
/// across threads behind an `Arc`.
pub struct Participant<R, H> {
    id: ParticipantId,
    config: ParticipantConfig,
    table: Arc<BranchTable<R>>,
    hooks: Arc<H>,
    /// The local resource. Its lock also serializes business calls.
    local: Mutex<R>,
    /// Branch this participant is currently associated with.
    associated: AssociationSlot,
}

fn unknown(xid: &Xid) -> XaError {
    XaError::NotA(format!("no branch for {}", xid))
}

/// Completion (prepare/commit/rollback) is only legal on an unassociated branch.
fn completable<'b, R>(
    xid: &Xid,
    branch: Option<&'b mut TransactionBranch<R>>,
    op: &str,
) -> XaResult<&'b mut TransactionBranch<R>> {
    let branch = branch.ok_or_else(|| unknown(xid))?;
    if branch.association != AssociationState::Unassociated {
        return Err(XaError::Proto(format!(
            "cannot {} {} while it is {}",
            op, xid, branch.association
        )));
    }
    Ok(branch)
}

impl<R, H> Participant<R, H>
where
    R: Send + Sync + 'static,
    H: ResourceLifecycleHooks<R>,
{
    /// Create a participant on an existing branch table.
    pub fn new(table: Arc<BranchTable<R>>, hooks: Arc<H>) -> XaResult<Self> {
        let config = ParticipantConfig::new(table.kind());
        Self::build(table, hooks, config)
    }

    /// Create a participant whose table is looked up in `registry` by kind.
    pub fn with_config(
        registry: &ResourceRegistry,
        config: ParticipantConfig,
        hooks: Arc<H>,
    ) -> XaResult<Self> {
        config
            .validate()
            .map_err(|e| XaError::Inval(e.to_string()))?;
        let table = registry.table::<R>(&config.kind)?;
        Self::build(table, hooks, config)
    }

    fn build(table: Arc<BranchTable<R>>, hooks: Arc<H>, config: ParticipantConfig) -> XaResult<Self> {
        let local = hooks.create_resource().map_err(|e| {
            XaError::rm_fail(
                format!("failed to create local resource of kind {}", table.kind()),
                e,
            )
        })?;

        let id = ParticipantId::new();
        let associated: AssociationSlot = Arc::new(Mutex::new(None));
        table.register(id, &associated);
        debug!(participant = %id, kind = table.kind(), "participant created");

        Ok(Self {
            id,
            config,
            table,
            hooks,
            local: Mutex::new(local),
            associated,
        })
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn config(&self) -> &ParticipantConfig {
        &self.config
    }

    pub fn table(&self) -> &Arc<BranchTable<R>> {
        &self.table
    }

    /// The branch this participant is currently bound to, if any.
    pub fn associated_xid(&self) -> Option<Xid> {
        self.associated.lock().clone()
    }

    /// Snapshot of a branch of this participant's kind.
    pub fn branch_info(&self, xid: &Xid) -> Option<BranchInfo> {
        self.table.info(xid)
    }

    // ==================== Association ====================

    /// Associate this participant with `xid`.
    pub fn start(&self, xid: &Xid, flags: StartFlags) -> XaResult<()> {
        debug!(participant = %self.id, %xid, %flags, "start");
        match flags {
            StartFlags::NoFlags => self.start_new(xid),
            StartFlags::Join => self.reassociate(xid, flags, AssociationState::Unassociated),
            StartFlags::Resume => self.reassociate(xid, flags, AssociationState::Suspended),
        }
    }

    fn start_new(&self, xid: &Xid) -> XaResult<()> {
        if self.config.strict_xid_limits {
            xid.validate()?;
        }

        self.table.compute(xid, |branch| {
            let mut associated = self.associated.lock();
            if let Some(current) = associated.as_ref() {
                return Err(XaError::Proto(format!(
                    "participant {} is already associated with {}",
                    self.id, current
                )));
            }
            if branch.is_some() {
                return Err(XaError::DupId(format!("branch {} already exists", xid)));
            }

            let resource = self.hooks.create_resource().map_err(|e| {
                XaError::rm_fail(format!("failed to create resource for {}", xid), e)
            })?;
            *associated = Some(xid.clone());
            info!(participant = %self.id, %xid, kind = self.table.kind(), "branch started");

            Ok((
                BranchUpdate::Insert(TransactionBranch::started(resource, self.id)),
                (),
            ))
        })
    }

    fn reassociate(&self, xid: &Xid, flags: StartFlags, expected: AssociationState) -> XaResult<()> {
        self.table.compute(xid, |branch| {
            let branch = branch.ok_or_else(|| unknown(xid))?;
            let mut associated = self.associated.lock();
            if let Some(current) = associated.as_ref() {
                return Err(XaError::Proto(format!(
                    "participant {} is already associated with {}",
                    self.id, current
                )));
            }
            if branch.association != expected {
                return Err(XaError::Proto(format!(
                    "cannot {} {} while it is {}",
                    flags, xid, branch.association
                )));
            }
            if branch.prepared {
                return Err(XaError::Proto(format!(
                    "cannot {} {} after it was prepared",
                    flags, xid
                )));
            }

            branch.association = AssociationState::Associated;
            branch.owner = Some(self.id);
            *associated = Some(xid.clone());
            Ok((BranchUpdate::Keep, ()))
        })
    }

    /// Detach the branch's current owner from `xid`.
    ///
    /// `Fail` marks the branch so that it can only be rolled back.
    pub fn end(&self, xid: &Xid, flags: EndFlags) -> XaResult<()> {
        debug!(participant = %self.id, %xid, %flags, "end");
        self.table.compute(xid, |branch| {
            let branch = branch.ok_or_else(|| unknown(xid))?;
            match flags {
                EndFlags::Suspend => {
                    if branch.association != AssociationState::Associated {
                        return Err(XaError::Proto(format!(
                            "cannot suspend {} while it is {}",
                            xid, branch.association
                        )));
                    }
                    branch.association = AssociationState::Suspended;
                }
                EndFlags::Success | EndFlags::Fail => {
                    if branch.association == AssociationState::Unassociated {
                        return Err(XaError::Proto(format!("{} is not associated", xid)));
                    }
                    branch.association = AssociationState::Unassociated;
                    if flags == EndFlags::Fail {
                        branch.success = false;
                    }
                }
            }

            if let Some(owner) = branch.owner {
                self.table.release(owner, xid);
            }
            if flags != EndFlags::Suspend {
                branch.owner = None;
            }
            Ok((BranchUpdate::Keep, ()))
        })
    }

    // ==================== Completion ====================

    /// Roll back a branch whose work was marked failed and build the error to
    /// report: `XA_RBROLLBACK` once the rollback went through.
    fn roll_back_failed(&self, xid: &Xid, branch: &mut TransactionBranch<R>) -> XaError {
        let rolled_back = self.hooks.rollback(&mut *branch.resource.lock());
        if let Err(e) = rolled_back {
            warn!(%xid, error = %e, "rollback of failed branch did not complete");
            return XaError::rm_err(format!("rollback failed for {}", xid), e);
        }
        branch.success = true;
        branch.prepared = false;
        warn!(%xid, "branch was marked failed, rolled back");
        XaError::RbRollback(format!("{} was marked failed and has been rolled back", xid))
    }

    /// Phase one.
    pub fn prepare(&self, xid: &Xid) -> XaResult<Vote> {
        debug!(participant = %self.id, %xid, "prepare");
        self.table.compute(xid, |branch| {
            let branch = completable(xid, branch, "prepare")?;
            if !branch.success {
                return Err(self.roll_back_failed(xid, branch));
            }

            let mut resource = branch.resource.lock();
            self.hooks.prepare(&mut *resource).map_err(|e| {
                warn!(%xid, error = %e, "prepare hook failed");
                XaError::rm_err(format!("prepare failed for {}", xid), e)
            })?;

            if self.hooks.is_read_only(&*resource) {
                if !self.config.release_read_only {
                    return Ok((BranchUpdate::Keep, Vote::ReadOnly));
                }
                self.hooks.close(&mut *resource).map_err(|e| {
                    XaError::rm_err(format!("close failed for read-only {}", xid), e)
                })?;
                info!(%xid, "read-only branch released");
                return Ok((BranchUpdate::Remove, Vote::ReadOnly));
            }

            branch.prepared = true;
            Ok((BranchUpdate::Keep, Vote::Ok))
        })
    }

    /// Phase two, or both phases at once when `one_phase` is set.
    pub fn commit(&self, xid: &Xid, one_phase: bool) -> XaResult<()> {
        debug!(participant = %self.id, %xid, one_phase, "commit");
        self.table.compute(xid, |branch| {
            let branch = completable(xid, branch, "commit")?;
            if !branch.success {
                return Err(self.roll_back_failed(xid, branch));
            }

            let committed = {
                let mut resource = branch.resource.lock();
                if one_phase {
                    self.hooks.prepare(&mut *resource).map_err(|e| {
                        XaError::rm_err(format!("one-phase prepare failed for {}", xid), e)
                    })?;
                }
                self.hooks.commit(&mut *resource)
            };
            committed.map_err(|e| {
                warn!(%xid, error = %e, "commit hook failed");
                XaError::rm_err(format!("commit failed for {}", xid), e)
            })?;
            branch.prepared = false;
            Ok((BranchUpdate::Keep, ()))
        })
    }

    pub fn rollback(&self, xid: &Xid) -> XaResult<()> {
        debug!(participant = %self.id, %xid, "rollback");
        self.table.compute(xid, |branch| {
            let branch = completable(xid, branch, "roll back")?;
            let rolled_back = self.hooks.rollback(&mut *branch.resource.lock());
            rolled_back.map_err(|e| {
                warn!(%xid, error = %e, "rollback hook failed");
                XaError::rm_err(format!("rollback failed for {}", xid), e)
            })?;
            branch.prepared = false;
            branch.success = true;
            Ok((BranchUpdate::Keep, ()))
        })
    }

    /// Discard a (heuristically) completed branch. Same as [`close`](Self::close).
    pub fn forget(&self, xid: &Xid) -> XaResult<()> {
        self.close(xid)
    }

    /// Close the branch's resource and drop the branch; the Xid may then be
    /// started again.
    pub fn close(&self, xid: &Xid) -> XaResult<()> {
        debug!(participant = %self.id, %xid, "close");
        self.table.compute(xid, |branch| {
            let branch = branch.ok_or_else(|| unknown(xid))?;
            let closed = self.hooks.close(&mut *branch.resource.lock());
            closed.map_err(|e| {
                warn!(%xid, error = %e, "close hook failed");
                XaError::rm_err(format!("close failed for {}", xid), e)
            })?;
            if let Some(owner) = branch.owner {
                self.table.release(owner, xid);
            }
            info!(%xid, kind = self.table.kind(), "branch removed");
            Ok((BranchUpdate::Remove, ()))
        })
    }

    /// Prepared branches of this participant's kind.
    pub fn recover(&self, flags: RecoverFlags) -> XaResult<Vec<Xid>> {
        flags.validate()?;
        let xids = self.table.prepared_xids();
        debug!(participant = %self.id, flags = flags.bits(), found = xids.len(), "recover");
        Ok(xids)
    }

    /// Whether `other` drives the same resource manager, i.e. shares this
    /// participant's branch table.
    pub fn is_same_resource_manager<H2>(&self, other: &Participant<R, H2>) -> bool {
        Arc::ptr_eq(&self.table, &other.table)
    }

    /// Timeouts are not enforced here.
    pub fn get_transaction_timeout(&self) -> u32 {
        0
    }

    /// Always refuses; see [`get_transaction_timeout`](Self::get_transaction_timeout).
    pub fn set_transaction_timeout(&self, seconds: u32) -> bool {
        debug!(participant = %self.id, seconds, "transaction timeout ignored");
        false
    }

    // ==================== Business calls ====================

    /// Run `f` against the currently effective resource: the associated
    /// branch's resource if there is one, else the local resource.
    ///
    /// `f` runs holding this participant's lock and the resource's lock, never
    /// a table entry, so other branches and `recover` proceed meanwhile.
    pub fn apply<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut R) -> T,
    {
        let mut local = self.local.lock();
        let associated = self.associated.lock().clone();
        match associated.and_then(|xid| self.table.resource(&xid)) {
            Some(resource) => f(&mut *resource.lock()),
            None => f(&mut *local),
        }
    }

    /// [`apply`](Self::apply) for calls with no result.
    pub fn accept<F>(&self, f: F)
    where
        F: FnOnce(&mut R),
    {
        self.apply(f)
    }

    /// Close the local resource. Branches this participant worked on are
    /// unaffected and must still be completed by the TM.
    pub fn shutdown(self) -> XaResult<()> {
        if let Some(xid) = self.associated_xid() {
            warn!(participant = %self.id, %xid, "shutting down while associated");
        }
        let closed = {
            let mut local = self.local.lock();
            self.hooks.close(&mut *local)
        };
        closed.map_err(|e| {
            XaError::rm_err(format!("failed to close local resource of {}", self.id), e)
        })
    }
}

impl<R, H> Drop for Participant<R, H> {
    fn drop(&mut self) {
        self.table.unregister(self.id);
    }
}

impl<R, H> std::fmt::Debug for Participant<R, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("id", &self.id)
            .field("kind", &self.table.kind())
            .field("associated", &*self.associated.lock())
            .finish()
    }
}
