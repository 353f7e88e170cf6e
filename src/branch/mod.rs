//! Transaction branches and the table that holds them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Participant  │   │ Participant  │   │ Participant  │
//! └──────────────┘   └──────────────┘   └──────────────┘
//!        │                  │                  │
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!             ┌───────────────────────────┐
//!             │   BranchTable (per kind)  │
//!             │  Xid → TransactionBranch  │
//!             └───────────────────────────┘
//! ```
//!
//! The table is the only state shared between participants, and
//! [`BranchTable::compute`] is the only way to change it.

mod state;
mod table;

pub use state::{AssociationState, BranchInfo, TransactionBranch};
pub use table::{BranchTable, BranchUpdate};

pub(crate) use table::AssociationSlot;
