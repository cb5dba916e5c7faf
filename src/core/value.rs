//! Typed signal values and their wire representation.
//!
//! [`SignalValue`] is what the cache and the transition rules work with.
//! [`Datapoint`] and [`DataType`] are what crosses the store boundary.

use super::gear::Gear;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of a [`SignalValue`], used to type-check cache writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Bool,
    Float,
    Percent,
    Gear,
    Timestamp,
}

/// Domain value of one catalog signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum SignalValue {
    Bool(bool),
    Float(f32),
    /// Integer percentage in `[0, 100]`.
    Percent(u8),
    Gear(Gear),
    /// `None` until the first trip has been started.
    Timestamp(Option<DateTime<Utc>>),
}

impl SignalValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Float(_) => ValueKind::Float,
            Self::Percent(_) => ValueKind::Percent,
            Self::Gear(_) => ValueKind::Gear,
            Self::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_percent(&self) -> Option<u8> {
        match self {
            Self::Percent(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_gear(&self) -> Option<Gear> {
        match self {
            Self::Gear(g) => Some(*g),
            _ => None,
        }
    }

    /// Translate into the store's representation.
    ///
    /// Gears become their Int8 code and timestamps RFC 3339 strings.
    pub fn to_datapoint(&self) -> Datapoint {
        match self {
            Self::Bool(b) => Datapoint::Bool(*b),
            Self::Float(f) => Datapoint::Float(*f),
            Self::Percent(p) => Datapoint::Uint8(*p),
            Self::Gear(g) => Datapoint::Int8(g.wire_code()),
            Self::Timestamp(Some(t)) => Datapoint::String(t.to_rfc3339()),
            Self::Timestamp(None) => Datapoint::String(String::new()),
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Gear(g) => write!(f, "{g}"),
            Self::Timestamp(Some(t)) => write!(f, "{}", t.to_rfc3339()),
            Self::Timestamp(None) => f.write_str("unset"),
        }
    }
}

/// Wire data type passed alongside every store write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Float,
    Int8,
    Uint8,
    String,
}

/// Raw value as the signal store holds it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Datapoint {
    Bool(bool),
    Float(f32),
    Int8(i8),
    Uint8(u8),
    String(String),
}

impl Datapoint {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Boolean,
            Self::Float(_) => DataType::Float,
            Self::Int8(_) => DataType::Int8,
            Self::Uint8(_) => DataType::Uint8,
            Self::String(_) => DataType::String,
        }
    }

    fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int8(i) => Some(f32::from(*i)),
            Self::Uint8(u) => Some(f32::from(*u)),
            _ => None,
        }
    }

    /// Decode into a domain value of the given kind.
    ///
    /// Numeric wire types are accepted interchangeably for numeric kinds.
    /// Returns `None` when the datapoint cannot represent `kind`, including
    /// non-finite numbers.
    pub fn decode(&self, kind: ValueKind) -> Option<SignalValue> {
        match kind {
            ValueKind::Bool => match self {
                Self::Bool(b) => Some(SignalValue::Bool(*b)),
                _ => None,
            },
            ValueKind::Float => self
                .as_f32()
                .filter(|v| v.is_finite())
                .map(SignalValue::Float),
            ValueKind::Percent => self
                .as_f32()
                .filter(|v| v.is_finite())
                .map(|v| SignalValue::Percent(v.round().clamp(0.0, 100.0) as u8)),
            ValueKind::Gear => match self {
                Self::Int8(code) => Gear::from_wire_code(*code).map(SignalValue::Gear),
                Self::String(letter) => Gear::from_letter(letter).map(SignalValue::Gear),
                _ => None,
            },
            ValueKind::Timestamp => match self {
                Self::String(s) if s.is_empty() => Some(SignalValue::Timestamp(None)),
                Self::String(s) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|t| SignalValue::Timestamp(Some(t.with_timezone(&Utc)))),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Datapoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int8(i) => write!(f, "{i}"),
            Self::Uint8(u) => write!(f, "{u}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}
