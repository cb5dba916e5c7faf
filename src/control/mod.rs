//! Imperative shell around the pure core.
//!
//! - [`VehicleStateCache`]: local mirror of the catalog signals
//! - [`VehicleController`]: applies transition plans to cache and store
//! - [`spawn`] / [`Companion`]: single-writer actor fed by commands and the
//!   live subscription through one mailbox

mod actor;
mod cache;
mod controller;
mod echo;
mod error;
mod outcome;

pub use actor::{spawn, spawn_feed, Companion, ControllerHandle};
pub use cache::{CacheError, VehicleStateCache};
pub use controller::VehicleController;
pub use echo::EchoTracker;
pub use error::{programming_error, ControlError};
pub use outcome::{CommandOutcome, OutcomeStatus, WriteFailure};
