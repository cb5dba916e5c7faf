//! Trip timing between engine start and engine stop.

use chrono::{DateTime, Utc};

/// Trip boundary produced by an engine power transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TripEvent {
    Started(DateTime<Utc>),
    Stopped,
}

/// Remembers when the current trip began.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripTimer {
    started_at: Option<DateTime<Utc>>,
}

impl TripTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue a trip that was already running when the process started.
    pub fn resumed(started_at: Option<DateTime<Utc>>) -> Self {
        Self { started_at }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn apply(&mut self, event: TripEvent) {
        match event {
            TripEvent::Started(at) => self.started_at = Some(at),
            TripEvent::Stopped => self.started_at = None,
        }
    }
}

/// Seconds between `start` and `end`, never negative.
pub fn trip_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f32 {
    let millis = end.signed_duration_since(start).num_milliseconds().max(0);
    millis as f32 / 1000.0
}
