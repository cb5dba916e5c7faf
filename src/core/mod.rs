//! Pure vehicle control core.
//!
//! This module contains everything that decides *what* happens:
//! - The signal catalog and typed values
//! - Guard predicates over state snapshots
//! - The command transition table
//!
//! Nothing in here performs I/O; the `control` module is the shell that
//! applies plans to the cache and the store.

mod catalog;
mod command;
mod gear;
pub mod guard;
mod history;
pub mod rules;
mod state;
mod trip;
mod value;

pub use catalog::SignalPath;
pub use command::Command;
pub use gear::{Gear, UnknownGear};
pub use guard::{Guard, GuardRejection, GuardViolation};
pub use history::{GearChange, GearHistory, ShiftCause};
pub use rules::{plan, EngineStopHook, HoldSpeed, Plan, PlannedShift, RuleContext};
pub use state::{SignalWrite, VehicleState};
pub use trip::{trip_seconds, TripEvent, TripTimer};
pub use value::{DataType, Datapoint, SignalValue, ValueKind};
