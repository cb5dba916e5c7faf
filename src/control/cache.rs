//! Local mirror of the catalog signals.

use crate::config::Limits;
use crate::core::rules;
use crate::core::{Datapoint, SignalPath, SignalValue, ValueKind, VehicleState};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    #[error("Unknown signal path '{0}'")]
    UnknownPath(String),

    #[error("Type mismatch for '{path}': expected {expected:?}, found {found:?}")]
    TypeMismatch {
        path: SignalPath,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// Process-wide mirror of every catalog path.
///
/// Entries exist for the whole catalog from construction on and are never
/// removed. There is no history: a write replaces the value and is visible to
/// the next read.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleStateCache {
    values: [SignalValue; SignalPath::COUNT],
}

impl Default for VehicleStateCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl VehicleStateCache {
    /// Cache holding the catalog default for every path.
    pub fn with_defaults() -> Self {
        Self {
            values: SignalPath::ALL.map(|p| p.default_value()),
        }
    }

    /// Build from a store fetch, falling back to catalog defaults for
    /// absent or undecodable entries.
    ///
    /// Speed and steering angle are clamped to `limits`.
    pub fn provisioned(fetched: &HashMap<String, Option<Datapoint>>, limits: &Limits) -> Self {
        let mut cache = Self::with_defaults();
        for path in SignalPath::ALL {
            let Some(Some(datapoint)) = fetched.get(path.vss_path()) else {
                continue;
            };
            match datapoint.decode(path.kind()) {
                Some(value) => {
                    cache.values[path as usize] = rules::clamp_reported(path, value, limits)
                }
                None => warn!(%path, value = %datapoint, "undecodable value, using default"),
            }
        }
        cache
    }

    /// Typed read; cannot miss because the catalog is closed.
    pub fn value(&self, path: SignalPath) -> &SignalValue {
        &self.values[path as usize]
    }

    /// Read by store path.
    pub fn get(&self, path: &str) -> Result<&SignalValue, CacheError> {
        SignalPath::from_vss_path(path)
            .map(|p| self.value(p))
            .ok_or_else(|| CacheError::UnknownPath(path.to_string()))
    }

    /// Write issued by the controller itself.
    ///
    /// A kind mismatch here is a bug in the transition rules and trips a
    /// debug assertion.
    pub fn set_local(&mut self, path: SignalPath, value: SignalValue) -> Result<(), CacheError> {
        let result = self.store(path, value);
        debug_assert!(result.is_ok(), "local write rejected: {result:?}");
        result
    }

    /// Write arriving from the live feed.
    pub fn apply_remote(&mut self, path: SignalPath, value: SignalValue) -> Result<(), CacheError> {
        self.store(path, value)
    }

    fn store(&mut self, path: SignalPath, value: SignalValue) -> Result<(), CacheError> {
        if value.kind() != path.kind() {
            return Err(CacheError::TypeMismatch {
                path,
                expected: path.kind(),
                found: value.kind(),
            });
        }
        self.values[path as usize] = value;
        Ok(())
    }

    /// Every catalog path with its current value, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalPath, &SignalValue)> {
        SignalPath::ALL.into_iter().zip(self.values.iter())
    }

    /// Copy the current values into a [`VehicleState`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use vehicle_companion::control::VehicleStateCache;
    /// use vehicle_companion::core::{SignalPath, SignalValue};
    ///
    /// let mut cache = VehicleStateCache::with_defaults();
    /// cache
    ///     .apply_remote(SignalPath::LowBeam, SignalValue::Bool(true))
    ///     .unwrap();
    /// assert!(cache.snapshot().low_beam);
    /// ```
    pub fn snapshot(&self) -> VehicleState {
        let mut state = VehicleState::default();
        for (path, value) in self.iter() {
            state.set(path, value);
        }
        state
    }
}
