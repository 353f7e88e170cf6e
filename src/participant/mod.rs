//! XA participants.
//!
//! A [`Participant`] is what a transaction manager talks to. It owns one local
//! resource for plain, non-transactional work and reaches every branch of its
//! kind through the shared [`BranchTable`](crate::branch::BranchTable).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ResourceRegistry                        │
//! │           (resource kind → shared BranchTable)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │ Participant │       │ Participant │       │  Lifecycle  │
//!  │ (local res) │       │ (local res) │       │    Hooks    │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use xabranch::participant::{Participant, ParticipantConfig, ResourceRegistry};
//! use xabranch::xa::{EndFlags, StartFlags, Vote, Xid};
//!
//! let registry = ResourceRegistry::new();
//! let p = Participant::with_config(&registry, ParticipantConfig::new("buffer"), hooks)?;
//!
//! let xid = Xid::generate();
//! p.start(&xid, StartFlags::NoFlags)?;
//! p.accept(|buf| buf.push_str("scoped to xid"));
//! p.end(&xid, EndFlags::Success)?;
//!
//! if p.prepare(&xid)? == Vote::Ok {
//!     p.commit(&xid, false)?;
//! }
//! p.forget(&xid)?;
//! ```

mod config;
mod hooks;
mod id;
#[allow(clippy::module_inception)]
mod participant;
mod registry;

#[cfg(test)]
pub(crate) mod ledger;

pub use config::{ConfigError, ParticipantConfig};
pub use hooks::ResourceLifecycleHooks;
pub use id::ParticipantId;
pub use participant::Participant;
pub use registry::ResourceRegistry;
