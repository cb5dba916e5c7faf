//! Structured results returned for every command.

use crate::core::{Command, GuardRejection, SignalWrite};
use crate::store::StoreError;
use std::fmt;
use uuid::Uuid;

/// A store write that did not go through.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteFailure {
    pub write: SignalWrite,
    pub error: StoreError,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutcomeStatus {
    /// Every write reached the store. Empty for commands with nothing to do.
    Applied { writes: Vec<SignalWrite> },

    /// Preconditions failed; nothing was written.
    Rejected(GuardRejection),

    /// At least one store write failed.
    ///
    /// The local cache keeps every write that was attempted, so it may be
    /// ahead of the store until the live feed reports otherwise.
    StoreUnavailable {
        committed: Vec<SignalWrite>,
        failures: Vec<WriteFailure>,
        skipped: usize,
    },
}

/// What happened to one command.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandOutcome {
    pub id: Uuid,
    pub command: Command,
    pub status: OutcomeStatus,
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self.status, OutcomeStatus::Applied { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.status, OutcomeStatus::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&GuardRejection> {
        match &self.status {
            OutcomeStatus::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Writes that reached the store, in commit order.
    pub fn committed(&self) -> &[SignalWrite] {
        match &self.status {
            OutcomeStatus::Applied { writes } => writes,
            OutcomeStatus::StoreUnavailable { committed, .. } => committed,
            OutcomeStatus::Rejected(_) => &[],
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            OutcomeStatus::Applied { writes } if writes.is_empty() => {
                write!(f, "{}: nothing to change", self.command)
            }
            OutcomeStatus::Applied { writes } => {
                let changes: Vec<String> = writes
                    .iter()
                    .map(|w| format!("{}={}", w.path, w.value))
                    .collect();
                write!(f, "{} applied: {}", self.command, changes.join(", "))
            }
            OutcomeStatus::Rejected(rejection) => write!(f, "{}: {}", self.command, rejection),
            OutcomeStatus::StoreUnavailable {
                committed,
                failures,
                skipped,
            } => {
                write!(
                    f,
                    "{}: {} write(s) failed, {} committed, {} skipped",
                    self.command,
                    failures.len(),
                    committed.len(),
                    skipped
                )?;
                if let Some(first) = failures.first() {
                    write!(f, " ({})", first.error)?;
                }
                Ok(())
            }
        }
    }
}
