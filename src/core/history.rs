//! Gear change history.
//!
//! Immutable record of every gear change the controller has written,
//! including the automatic ones triggered by zero-crossings and stops.

use super::gear::Gear;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a gear change happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftCause {
    /// Explicit `ShiftGear` command.
    Operator,
    /// Speed crossed zero and the direction gear followed it.
    ZeroCrossing,
    /// Speed reached zero and the transmission dropped to Neutral.
    Stop,
}

/// Record of a single gear change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GearChange {
    pub from: Gear,
    pub to: Gear,
    pub cause: ShiftCause,
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of gear changes.
///
/// `record` returns a new history with the change appended and leaves the
/// original untouched.
///
/// # Example
///
/// ```rust
/// use vehicle_companion::core::{Gear, GearChange, GearHistory, ShiftCause};
/// use chrono::Utc;
///
/// let history = GearHistory::new().record(GearChange {
///     from: Gear::Park,
///     to: Gear::Drive,
///     cause: ShiftCause::Operator,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec![&Gear::Park, &Gear::Drive]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GearHistory {
    changes: Vec<GearChange>,
}

impl GearHistory {
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    /// Record a change, returning a new history.
    pub fn record(&self, change: GearChange) -> Self {
        let mut changes = self.changes.clone();
        changes.push(change);
        Self { changes }
    }

    pub fn changes(&self) -> &[GearChange] {
        &self.changes
    }

    pub fn last(&self) -> Option<&GearChange> {
        self.changes.last()
    }

    /// Gears traversed: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&Gear> {
        let mut path = Vec::new();
        if let Some(first) = self.changes.first() {
            path.push(&first.from);
        }
        for change in &self.changes {
            path.push(&change.to);
        }
        path
    }

    /// Number of changes with the given cause.
    pub fn count_by_cause(&self, cause: ShiftCause) -> usize {
        self.changes.iter().filter(|c| c.cause == cause).count()
    }
}
