//! Participant identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Opaque handle naming one participant instance.
///
/// Branches refer to their owner through this id rather than a pointer, so
/// neither side keeps the other alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(Ulid);

impl ParticipantId {
    pub(crate) fn new() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string().to_lowercase())
    }
}
