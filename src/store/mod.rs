//! Boundary to the external signal store.
//!
//! The store is a path→value data broker. Values cross this boundary as
//! wire [`Datapoint`]s; translation to domain values happens in the
//! controller.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::InMemoryStore;

use crate::core::{DataType, Datapoint};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// A value change pushed by the store's subscription.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreUpdate {
    pub path: String,
    pub value: Datapoint,
}

/// Endless stream of updates for the subscribed paths.
pub type SignalStream = mpsc::UnboundedReceiver<StoreUpdate>;

/// Typed path/value API of the signal store.
///
/// Implementations must be `Send + Sync` so the controller can hold them as
/// `Arc<dyn SignalStore>`.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Current value of every requested path; `None` when the store has no
    /// value for it.
    async fn fetch_all(
        &self,
        paths: &[String],
    ) -> Result<HashMap<String, Option<Datapoint>>, StoreError>;

    /// Commit a single value.
    ///
    /// Returns once the store has accepted the write, or fails; writes are
    /// never dropped silently.
    async fn write(&self, path: &str, value: Datapoint, data_type: DataType)
        -> Result<(), StoreError>;

    /// Subscribe to value changes of `paths`.
    async fn subscribe(&self, paths: &[String]) -> Result<SignalStream, StoreError>;
}
