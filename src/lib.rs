//! Vehicle Companion: manual control surface for a simulated vehicle
//!
//! The vehicle's state lives in an external signal store. This crate turns
//! discrete operator commands into consistent writes against that store
//! while a live subscription keeps a local cache in sync.
//!
//! It follows a "pure core, imperative shell" split:
//!
//! - [`core`]: signal catalog, guards and the command transition table, all
//!   pure functions over a [`core::VehicleState`] snapshot
//! - [`control`]: the cache, the controller that commits plans, and the
//!   single-writer actor serializing commands with feed updates
//! - [`store`]: the signal store boundary and an in-memory implementation
//!
//! # Example
//!
//! ```rust
//! use vehicle_companion::core::{rules, Command, Gear, HoldSpeed, RuleContext, VehicleState};
//! use vehicle_companion::config::Limits;
//! use chrono::Utc;
//!
//! let state = VehicleState {
//!     engine_running: true,
//!     ..VehicleState::default()
//! };
//! let limits = Limits::default();
//! let ctx = RuleContext {
//!     limits: &limits,
//!     now: Utc::now(),
//!     trip_started_at: None,
//!     engine_stop_hook: &HoldSpeed,
//! };
//!
//! let plan = rules::plan(&Command::Accelerate, &state, &ctx).unwrap();
//! let next = state.with_writes(&plan.writes);
//! assert_eq!(next.speed, 5.0);
//! assert_eq!(next.gear, Gear::Drive);
//! ```

pub mod config;
pub mod control;
pub mod core;
pub mod keymap;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use control::{Companion, CommandOutcome, ControllerHandle, VehicleController};
pub use core::{Command, Gear, VehicleState};
pub use store::{InMemoryStore, SignalStore};
