//! XA error taxonomy.
//!
//! Every participant operation fails with exactly one of these variants. The
//! numeric codes are the ones defined by the X/Open XA specification so a
//! transaction manager can map them straight onto its own vocabulary.

use thiserror::Error;

/// Boxed error from a resource lifecycle hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for XA operations.
pub type XaResult<T> = Result<T, XaError>;

// ==================== Return codes ====================

/// Normal execution.
pub const XA_OK: i32 = 0;
/// Routine returned with no effect and may be reissued.
pub const XA_RETRY: i32 = 4;
/// The branch was read-only and has been committed.
pub const XA_RDONLY: i32 = 3;
/// Work was partially committed and partially rolled back.
pub const XA_HEURMIX: i32 = 5;
/// Work was heuristically rolled back.
pub const XA_HEURRB: i32 = 6;
/// Work was heuristically committed.
pub const XA_HEURCOM: i32 = 7;
/// Work may have been heuristically completed.
pub const XA_HEURHAZ: i32 = 8;

pub const XA_RBBASE: i32 = 100;
/// Rolled back for an unspecified reason.
pub const XA_RBROLLBACK: i32 = XA_RBBASE;
pub const XA_RBCOMMFAIL: i32 = XA_RBBASE + 1;
pub const XA_RBDEADLOCK: i32 = XA_RBBASE + 2;
pub const XA_RBINTEGRITY: i32 = XA_RBBASE + 3;
pub const XA_RBOTHER: i32 = XA_RBBASE + 4;
pub const XA_RBPROTO: i32 = XA_RBBASE + 5;
pub const XA_RBTIMEOUT: i32 = XA_RBBASE + 6;
pub const XA_RBTRANSIENT: i32 = XA_RBBASE + 7;
pub const XA_RBEND: i32 = XA_RBTRANSIENT;

// ==================== Error codes ====================

/// Asynchronous operation already outstanding.
pub const XAER_ASYNC: i32 = -2;
/// A resource manager error occurred in the branch.
pub const XAER_RMERR: i32 = -3;
/// The Xid is not valid.
pub const XAER_NOTA: i32 = -4;
/// Invalid arguments were given.
pub const XAER_INVAL: i32 = -5;
/// Routine invoked in an improper context.
pub const XAER_PROTO: i32 = -6;
/// Resource manager unavailable.
pub const XAER_RMFAIL: i32 = -7;
/// The Xid already exists.
pub const XAER_DUPID: i32 = -8;
/// Resource manager doing work outside a global transaction.
pub const XAER_OUTSIDE: i32 = -9;

/// Errors returned by participant operations.
#[derive(Debug, Error)]
pub enum XaError {
    /// Unknown Xid.
    #[error("XAER_NOTA: {0}")]
    NotA(String),

    /// Operation is illegal in the current state.
    #[error("XAER_PROTO: {0}")]
    Proto(String),

    /// A fresh start named an Xid that already exists.
    #[error("XAER_DUPID: {0}")]
    DupId(String),

    /// Bad flags or arguments.
    #[error("XAER_INVAL: {0}")]
    Inval(String),

    /// The branch was rolled back instead of prepared or committed.
    #[error("XA_RBROLLBACK: {0}")]
    RbRollback(String),

    /// The resource manager is unavailable.
    #[error("XAER_RMFAIL: {message}")]
    RmFail {
        message: String,
        #[source]
        source: HookError,
    },

    /// The resource manager failed while working on a branch.
    #[error("XAER_RMERR: {message}")]
    RmErr {
        message: String,
        #[source]
        source: HookError,
    },
}

impl XaError {
    /// The XA integer code for this error.
    pub fn code(&self) -> i32 {
        match self {
            XaError::NotA(_) => XAER_NOTA,
            XaError::Proto(_) => XAER_PROTO,
            XaError::DupId(_) => XAER_DUPID,
            XaError::Inval(_) => XAER_INVAL,
            XaError::RbRollback(_) => XA_RBROLLBACK,
            XaError::RmFail { .. } => XAER_RMFAIL,
            XaError::RmErr { .. } => XAER_RMERR,
        }
    }

    /// Whether the TM may re-drive the same call later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, XaError::RmFail { .. })
    }

    /// Whether the branch has been rolled back.
    pub fn is_rollback(&self) -> bool {
        (XA_RBBASE..=XA_RBEND).contains(&self.code())
    }

    /// Whether a recovery sweep can skip this error and move on.
    pub fn is_ignorable_during_recovery(&self) -> bool {
        matches!(self, XaError::NotA(_))
    }

    pub(crate) fn rm_fail(message: impl Into<String>, source: impl Into<HookError>) -> Self {
        XaError::RmFail {
            message: message.into(),
            source: source.into(),
        }
    }

    pub(crate) fn rm_err(message: impl Into<String>, source: impl Into<HookError>) -> Self {
        XaError::RmErr {
            message: message.into(),
            source: source.into(),
        }
    }
}
