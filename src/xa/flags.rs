//! Flags accepted by the XA entry points, and the prepare vote.

use std::fmt;
use std::ops::BitOr;

use crate::xa::error::{XaError, XA_OK, XA_RDONLY};

/// No flags set.
pub const TMNOFLAGS: i32 = 0x0000_0000;
/// Join an existing branch.
pub const TMJOIN: i32 = 0x0020_0000;
/// Resume a suspended association.
pub const TMRESUME: i32 = 0x0800_0000;
/// Dissociate, work succeeded.
pub const TMSUCCESS: i32 = 0x0400_0000;
/// Dissociate, work failed.
pub const TMFAIL: i32 = 0x2000_0000;
/// Suspend the association.
pub const TMSUSPEND: i32 = 0x0200_0000;
/// Start a recovery scan.
pub const TMSTARTRSCAN: i32 = 0x0100_0000;
/// End a recovery scan.
pub const TMENDRSCAN: i32 = 0x0080_0000;

/// Flags for `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartFlags {
    /// Begin a new branch.
    NoFlags,
    /// Join a branch that has been ended by another participant.
    Join,
    /// Resume a suspended branch.
    Resume,
}

impl StartFlags {
    pub fn bits(self) -> i32 {
        match self {
            StartFlags::NoFlags => TMNOFLAGS,
            StartFlags::Join => TMJOIN,
            StartFlags::Resume => TMRESUME,
        }
    }
}

impl TryFrom<i32> for StartFlags {
    type Error = XaError;

    fn try_from(bits: i32) -> Result<Self, Self::Error> {
        match bits {
            TMNOFLAGS => Ok(StartFlags::NoFlags),
            TMJOIN => Ok(StartFlags::Join),
            TMRESUME => Ok(StartFlags::Resume),
            _ => Err(XaError::Inval(format!("invalid start flags {:#010x}", bits))),
        }
    }
}

impl fmt::Display for StartFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartFlags::NoFlags => write!(f, "TMNOFLAGS"),
            StartFlags::Join => write!(f, "TMJOIN"),
            StartFlags::Resume => write!(f, "TMRESUME"),
        }
    }
}

/// Flags for `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndFlags {
    /// Work on the branch succeeded.
    Success,
    /// Work on the branch failed; it can only be rolled back.
    Fail,
    /// Temporarily detach; the branch can be resumed.
    Suspend,
}

impl EndFlags {
    pub fn bits(self) -> i32 {
        match self {
            EndFlags::Success => TMSUCCESS,
            EndFlags::Fail => TMFAIL,
            EndFlags::Suspend => TMSUSPEND,
        }
    }
}

impl TryFrom<i32> for EndFlags {
    type Error = XaError;

    fn try_from(bits: i32) -> Result<Self, Self::Error> {
        match bits {
            TMSUCCESS => Ok(EndFlags::Success),
            TMFAIL => Ok(EndFlags::Fail),
            TMSUSPEND => Ok(EndFlags::Suspend),
            _ => Err(XaError::Inval(format!("invalid end flags {:#010x}", bits))),
        }
    }
}

impl fmt::Display for EndFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndFlags::Success => write!(f, "TMSUCCESS"),
            EndFlags::Fail => write!(f, "TMFAIL"),
            EndFlags::Suspend => write!(f, "TMSUSPEND"),
        }
    }
}

/// Flags for `recover`.
///
/// Kept as raw bits because the TM passes a combination; only the scan bits
/// are legal and anything else is rejected when `recover` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecoverFlags(i32);

impl RecoverFlags {
    pub const NO_FLAGS: RecoverFlags = RecoverFlags(TMNOFLAGS);
    pub const START_SCAN: RecoverFlags = RecoverFlags(TMSTARTRSCAN);
    pub const END_SCAN: RecoverFlags = RecoverFlags(TMENDRSCAN);

    pub fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> i32 {
        self.0
    }

    /// Reject any bit other than the two scan markers.
    pub fn validate(self) -> Result<(), XaError> {
        if self.0 & !(TMSTARTRSCAN | TMENDRSCAN) != 0 {
            return Err(XaError::Inval(format!(
                "invalid recover flags {:#010x}",
                self.0
            )));
        }
        Ok(())
    }
}

impl BitOr for RecoverFlags {
    type Output = RecoverFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        RecoverFlags(self.0 | rhs.0)
    }
}

/// Outcome of a successful prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    /// Prepared; the TM must follow up with commit or rollback.
    Ok,
    /// Nothing to commit; the branch is finished.
    ReadOnly,
}

impl Vote {
    pub fn code(self) -> i32 {
        match self {
            Vote::Ok => XA_OK,
            Vote::ReadOnly => XA_RDONLY,
        }
    }
}
