//! Operator commands accepted by the controller.

use super::gear::Gear;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One discrete operator action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Accelerate,
    Decelerate,
    SteerLeft,
    SteerRight,
    ToggleLeftSignal,
    ToggleRightSignal,
    ToggleLowBeam,
    ToggleHighBeam,
    ToggleEnginePower,
    ShiftGear(Gear),
    /// Next gear in P-R-N-D-M order, resolved against the current gear.
    ShiftUp,
    /// Previous gear in P-R-N-D-M order.
    ShiftDown,
    ToggleParkingBrake,
    EmergencyBrake,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accelerate => "AccelerateOnce",
            Self::Decelerate => "DecelerateOnce",
            Self::SteerLeft => "SteerLeftOnce",
            Self::SteerRight => "SteerRightOnce",
            Self::ToggleLeftSignal => "ToggleLeftSignal",
            Self::ToggleRightSignal => "ToggleRightSignal",
            Self::ToggleLowBeam => "ToggleLowBeam",
            Self::ToggleHighBeam => "ToggleHighBeam",
            Self::ToggleEnginePower => "ToggleEnginePower",
            Self::ShiftGear(_) => "ShiftGear",
            Self::ShiftUp => "ShiftUp",
            Self::ShiftDown => "ShiftDown",
            Self::ToggleParkingBrake => "ToggleParkingBrake",
            Self::EmergencyBrake => "EmergencyBrake",
        }
    }

    /// Whether the command changes how the vehicle moves.
    pub fn affects_movement(&self) -> bool {
        matches!(
            self,
            Self::Accelerate
                | Self::Decelerate
                | Self::SteerLeft
                | Self::SteerRight
                | Self::ShiftGear(_)
                | Self::ShiftUp
                | Self::ShiftDown
                | Self::EmergencyBrake
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShiftGear(gear) => write!(f, "ShiftGear({gear})"),
            other => f.write_str(other.name()),
        }
    }
}
