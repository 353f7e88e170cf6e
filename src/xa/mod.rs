//! XA protocol vocabulary.
//!
//! Value types shared by every other module: the branch identifier, the flag
//! sets accepted by `start`/`end`/`recover`, the prepare vote, and the closed
//! error taxonomy with its standard numeric codes.

mod error;
mod flags;
mod xid;

pub use error::*;
pub use flags::*;
pub use xid::Xid;
