//! Link progress of a single identity.

use serde::{Deserialize, Serialize};

/// `unlinked → challenge_issued → linked`.
///
/// Key and transaction proofs are checked within a single proof submission,
/// so they never show up as a phase at rest. `linked` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPhase {
    Unlinked,
    ChallengeIssued,
    Linked,
}
