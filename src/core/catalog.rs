//! Static catalog of the vehicle signals this controller mirrors.

use super::gear::Gear;
use super::value::{DataType, SignalValue, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named vehicle-state variable held in the signal store.
///
/// The catalog is closed: every path the controller reads or writes is a
/// variant here, so cache lookups by `SignalPath` cannot miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalPath {
    Speed,
    SteeringAngle,
    Gear,
    EngineRunning,
    ParkingBrakeEngaged,
    LeftSignal,
    RightSignal,
    LowBeam,
    HighBeam,
    BrakePedalPosition,
    IsMoving,
    TripStartTime,
    TripDuration,
    EmergencyBrakeDetected,
}

impl SignalPath {
    pub const COUNT: usize = 14;

    pub const ALL: [SignalPath; Self::COUNT] = [
        SignalPath::Speed,
        SignalPath::SteeringAngle,
        SignalPath::Gear,
        SignalPath::EngineRunning,
        SignalPath::ParkingBrakeEngaged,
        SignalPath::LeftSignal,
        SignalPath::RightSignal,
        SignalPath::LowBeam,
        SignalPath::HighBeam,
        SignalPath::BrakePedalPosition,
        SignalPath::IsMoving,
        SignalPath::TripStartTime,
        SignalPath::TripDuration,
        SignalPath::EmergencyBrakeDetected,
    ];

    /// Store path in Vehicle Signal Specification notation.
    pub fn vss_path(&self) -> &'static str {
        match self {
            Self::Speed => "Vehicle.Speed",
            Self::SteeringAngle => "Vehicle.Chassis.Axle.Row1.SteeringAngle",
            Self::Gear => "Vehicle.Powertrain.Transmission.CurrentGear",
            Self::EngineRunning => "Vehicle.Powertrain.CombustionEngine.IsRunning",
            Self::ParkingBrakeEngaged => "Vehicle.Chassis.ParkingBrake.IsEngaged",
            Self::LeftSignal => "Vehicle.Body.Lights.DirectionIndicator.Left.IsSignaling",
            Self::RightSignal => "Vehicle.Body.Lights.DirectionIndicator.Right.IsSignaling",
            Self::LowBeam => "Vehicle.Body.Lights.Beam.Low.IsOn",
            Self::HighBeam => "Vehicle.Body.Lights.Beam.High.IsOn",
            Self::BrakePedalPosition => "Vehicle.Chassis.Brake.PedalPosition",
            Self::IsMoving => "Vehicle.IsMoving",
            Self::TripStartTime => "Vehicle.StartTime",
            Self::TripDuration => "Vehicle.TripDuration",
            Self::EmergencyBrakeDetected => "Vehicle.ADAS.EBA.IsEngaged",
        }
    }

    /// Look up a catalog entry by its store path.
    pub fn from_vss_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.vss_path() == path)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Speed | Self::SteeringAngle | Self::TripDuration => ValueKind::Float,
            Self::Gear => ValueKind::Gear,
            Self::BrakePedalPosition => ValueKind::Percent,
            Self::TripStartTime => ValueKind::Timestamp,
            Self::EngineRunning
            | Self::ParkingBrakeEngaged
            | Self::LeftSignal
            | Self::RightSignal
            | Self::LowBeam
            | Self::HighBeam
            | Self::IsMoving
            | Self::EmergencyBrakeDetected => ValueKind::Bool,
        }
    }

    /// Wire type used when writing this path.
    pub fn data_type(&self) -> DataType {
        match self.kind() {
            ValueKind::Bool => DataType::Boolean,
            ValueKind::Float => DataType::Float,
            ValueKind::Percent => DataType::Uint8,
            ValueKind::Gear => DataType::Int8,
            ValueKind::Timestamp => DataType::String,
        }
    }

    /// Value used when the store has nothing for this path.
    pub fn default_value(&self) -> SignalValue {
        match self.kind() {
            ValueKind::Bool => SignalValue::Bool(false),
            ValueKind::Float => SignalValue::Float(0.0),
            ValueKind::Percent => SignalValue::Percent(0),
            ValueKind::Gear => SignalValue::Gear(Gear::Park),
            ValueKind::Timestamp => SignalValue::Timestamp(None),
        }
    }

    /// Store paths of the whole catalog, in catalog order.
    pub fn vss_paths() -> Vec<String> {
        Self::ALL.iter().map(|p| p.vss_path().to_string()).collect()
    }
}

impl fmt::Display for SignalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vss_path())
    }
}
