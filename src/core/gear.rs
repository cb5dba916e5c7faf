//! Transmission gear selection.
//!
//! Gears are a single tagged enumeration inside the crate. The store's
//! numeric encoding only appears at the wire boundary via [`Gear::wire_code`]
//! and [`Gear::from_wire_code`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Selectable transmission gear.
///
/// # Example
///
/// ```rust
/// use vehicle_companion::core::Gear;
///
/// assert_eq!(Gear::Drive.wire_code(), 127);
/// assert_eq!(Gear::from_wire_code(-1), Some(Gear::Reverse));
/// assert_eq!("neutral".parse::<Gear>().unwrap(), Gear::Neutral);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gear {
    #[default]
    Park,
    Reverse,
    Neutral,
    Drive,
    Manual,
}

/// Gear name that does not match any known gear.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown gear '{0}'")]
pub struct UnknownGear(pub String);

impl Gear {
    /// Shift order used for sequential up/down shifting.
    pub const SEQUENCE: [Gear; 5] = [
        Gear::Park,
        Gear::Reverse,
        Gear::Neutral,
        Gear::Drive,
        Gear::Manual,
    ];

    /// Get the gear's name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Park => "Park",
            Self::Reverse => "Reverse",
            Self::Neutral => "Neutral",
            Self::Drive => "Drive",
            Self::Manual => "Manual",
        }
    }

    /// Int8 code written to `CurrentGear` in the store.
    pub fn wire_code(&self) -> i8 {
        match self {
            Self::Park => 126,
            Self::Reverse => -1,
            Self::Neutral => 0,
            Self::Drive => 127,
            Self::Manual => 1,
        }
    }

    pub fn from_wire_code(code: i8) -> Option<Self> {
        match code {
            126 => Some(Self::Park),
            -1 => Some(Self::Reverse),
            0 => Some(Self::Neutral),
            127 => Some(Self::Drive),
            1 => Some(Self::Manual),
            _ => None,
        }
    }

    /// Decode the single-letter codes older publishers write ("P", "D", ...).
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "P" => Some(Self::Park),
            "R" => Some(Self::Reverse),
            "N" => Some(Self::Neutral),
            "D" => Some(Self::Drive),
            "M" => Some(Self::Manual),
            _ => None,
        }
    }

    /// Next gear in shift order, saturating at the last one.
    pub fn up(&self) -> Self {
        let idx = self.position();
        Self::SEQUENCE[(idx + 1).min(Self::SEQUENCE.len() - 1)]
    }

    /// Previous gear in shift order, saturating at Park.
    pub fn down(&self) -> Self {
        Self::SEQUENCE[self.position().saturating_sub(1)]
    }

    fn position(&self) -> usize {
        Self::SEQUENCE
            .iter()
            .position(|g| g == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gear {
    type Err = UnknownGear;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(gear) = Self::from_letter(s) {
            return Ok(gear);
        }
        match s.to_ascii_lowercase().as_str() {
            "park" => Ok(Self::Park),
            "reverse" => Ok(Self::Reverse),
            "neutral" => Ok(Self::Neutral),
            "drive" => Ok(Self::Drive),
            "manual" => Ok(Self::Manual),
            _ => Err(UnknownGear(s.to_string())),
        }
    }
}
