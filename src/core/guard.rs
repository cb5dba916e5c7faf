//! Guard predicates for controlling vehicle commands.
//!
//! Guards are pure checks over a [`VehicleState`] snapshot. Each check
//! yields a `Validation`, so a rejected command reports every failed
//! precondition at once instead of stopping at the first.

use super::gear::Gear;
use super::state::VehicleState;
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single failed precondition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GuardViolation {
    #[error("Engine is off. Turn on the engine first")]
    EngineOff,

    #[error("Parking brake is engaged. Release the parking brake first")]
    ParkingBrakeEngaged,

    #[error("Cannot shift into {target} while moving forward at {speed}")]
    VehicleMoving { speed: f32, target: Gear },
}

/// Every violation that blocked a command.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardRejection {
    pub guard: &'static str,
    pub violations: Vec<GuardViolation>,
}

impl GuardRejection {
    pub fn contains(&self, violation: &GuardViolation) -> bool {
        self.violations.contains(violation)
    }
}

impl fmt::Display for GuardRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "{} rejected: {}", self.guard, reasons.join("; "))
    }
}

impl std::error::Error for GuardRejection {}

/// Type alias for guard check functions
pub type GuardCheck =
    Box<dyn Fn(&VehicleState) -> Validation<(), NonEmptyVec<GuardViolation>> + Send + Sync>;

/// Named set of checks evaluated together before a transition.
///
/// # Example
///
/// ```rust
/// use vehicle_companion::core::{guard, GuardViolation, VehicleState};
///
/// let state = VehicleState {
///     engine_running: false,
///     parking_brake_engaged: true,
///     ..VehicleState::default()
/// };
///
/// let rejection = guard::allowed_to_move().evaluate(&state).unwrap_err();
/// assert!(rejection.contains(&GuardViolation::EngineOff));
/// assert!(rejection.contains(&GuardViolation::ParkingBrakeEngaged));
/// ```
pub struct Guard {
    name: &'static str,
    checks: Vec<GuardCheck>,
}

impl Guard {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            checks: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Add a predicate that must hold, with the violation to report when it
    /// does not.
    pub fn require<P, V>(mut self, predicate: P, violation: V) -> Self
    where
        P: Fn(&VehicleState) -> bool + Send + Sync + 'static,
        V: Fn(&VehicleState) -> GuardViolation + Send + Sync + 'static,
    {
        let check = move |state: &VehicleState| {
            if predicate(state) {
                Validation::success(())
            } else {
                Validation::fail(violation(state))
            }
        };
        self.checks.push(Box::new(check));
        self
    }

    /// Run every check, accumulating all violations.
    pub fn check(&self, state: &VehicleState) -> Validation<(), NonEmptyVec<GuardViolation>> {
        let checks: Vec<Validation<(), NonEmptyVec<GuardViolation>>> =
            self.checks.iter().map(|check| check(state)).collect();
        Validation::all_vec(checks).map(|_| ())
    }

    pub fn evaluate(&self, state: &VehicleState) -> Result<(), GuardRejection> {
        match self.check(state) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(GuardRejection {
                guard: self.name,
                violations: errors.iter().cloned().collect(),
            }),
        }
    }
}

fn engine_running(guard: Guard) -> Guard {
    guard.require(|s| s.engine_running, |_| GuardViolation::EngineOff)
}

fn parking_brake_released(guard: Guard) -> Guard {
    guard.require(
        |s| !s.parking_brake_engaged,
        |_| GuardViolation::ParkingBrakeEngaged,
    )
}

fn not_moving_forward(guard: Guard, target: Gear) -> Guard {
    guard.require(
        |s| s.speed <= 0.0,
        move |s| GuardViolation::VehicleMoving {
            speed: s.speed,
            target,
        },
    )
}

/// Engine running and parking brake released.
pub fn allowed_to_move() -> Guard {
    parking_brake_released(engine_running(Guard::new("allowed_to_move")))
}

/// Park tolerates an engaged parking brake but not forward motion.
pub fn allowed_to_park() -> Guard {
    not_moving_forward(engine_running(Guard::new("allowed_to_park")), Gear::Park)
}

/// Reverse needs the full movement guard and no forward motion.
///
/// Already rolling backwards is fine.
pub fn allowed_to_reverse() -> Guard {
    not_moving_forward(
        parking_brake_released(engine_running(Guard::new("allowed_to_reverse"))),
        Gear::Reverse,
    )
}
