//! Typed snapshot of the vehicle state.

use super::catalog::SignalPath;
use super::gear::Gear;
use super::value::SignalValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of every catalog signal.
///
/// Transition rules read a snapshot instead of the live cache, which keeps
/// them pure and lets tests build states directly.
///
/// # Example
///
/// ```rust
/// use vehicle_companion::core::{Gear, VehicleState};
///
/// let state = VehicleState {
///     engine_running: true,
///     speed: 20.0,
///     gear: Gear::Drive,
///     ..VehicleState::default()
/// };
/// assert!(state.speed > 0.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub speed: f32,
    pub steering_angle: f32,
    pub gear: Gear,
    pub engine_running: bool,
    pub parking_brake_engaged: bool,
    pub left_signal: bool,
    pub right_signal: bool,
    pub low_beam: bool,
    pub high_beam: bool,
    pub brake_pedal_position: u8,
    pub is_moving: bool,
    pub trip_start_time: Option<DateTime<Utc>>,
    /// Seconds.
    pub trip_duration: f32,
    pub emergency_brake_detected: bool,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            speed: 0.0,
            steering_angle: 0.0,
            gear: Gear::Park,
            engine_running: false,
            parking_brake_engaged: false,
            left_signal: false,
            right_signal: false,
            low_beam: false,
            high_beam: false,
            brake_pedal_position: 0,
            is_moving: false,
            trip_start_time: None,
            trip_duration: 0.0,
            emergency_brake_detected: false,
        }
    }
}

impl VehicleState {
    /// Store one signal value into the snapshot.
    ///
    /// Values whose kind does not match the path are ignored; the cache
    /// type-checks before anything reaches here.
    pub fn set(&mut self, path: SignalPath, value: &SignalValue) {
        match path {
            SignalPath::Speed => assign(&mut self.speed, value.as_float()),
            SignalPath::SteeringAngle => assign(&mut self.steering_angle, value.as_float()),
            SignalPath::Gear => assign(&mut self.gear, value.as_gear()),
            SignalPath::EngineRunning => assign(&mut self.engine_running, value.as_bool()),
            SignalPath::ParkingBrakeEngaged => {
                assign(&mut self.parking_brake_engaged, value.as_bool())
            }
            SignalPath::LeftSignal => assign(&mut self.left_signal, value.as_bool()),
            SignalPath::RightSignal => assign(&mut self.right_signal, value.as_bool()),
            SignalPath::LowBeam => assign(&mut self.low_beam, value.as_bool()),
            SignalPath::HighBeam => assign(&mut self.high_beam, value.as_bool()),
            SignalPath::BrakePedalPosition => {
                assign(&mut self.brake_pedal_position, value.as_percent())
            }
            SignalPath::IsMoving => assign(&mut self.is_moving, value.as_bool()),
            SignalPath::TripStartTime => {
                if let SignalValue::Timestamp(t) = value {
                    self.trip_start_time = *t;
                }
            }
            SignalPath::TripDuration => assign(&mut self.trip_duration, value.as_float()),
            SignalPath::EmergencyBrakeDetected => {
                assign(&mut self.emergency_brake_detected, value.as_bool())
            }
        }
    }

    /// Apply an ordered list of writes, as the cache would.
    pub fn with_writes<'a, I>(mut self, writes: I) -> Self
    where
        I: IntoIterator<Item = &'a SignalWrite>,
    {
        for write in writes {
            self.set(write.path, &write.value);
        }
        self
    }
}

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

/// One path/value commit produced by a transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalWrite {
    pub path: SignalPath,
    pub value: SignalValue,
}

impl SignalWrite {
    pub fn new(path: SignalPath, value: SignalValue) -> Self {
        Self { path, value }
    }

    pub fn bool(path: SignalPath, value: bool) -> Self {
        Self::new(path, SignalValue::Bool(value))
    }

    pub fn float(path: SignalPath, value: f32) -> Self {
        Self::new(path, SignalValue::Float(value))
    }

    pub fn gear(gear: Gear) -> Self {
        Self::new(SignalPath::Gear, SignalValue::Gear(gear))
    }

    pub fn brake_pedal(position: u8) -> Self {
        Self::new(SignalPath::BrakePedalPosition, SignalValue::Percent(position))
    }
}
