//! In-process signal store.
//!
//! Holds values in a map and fans every change out to matching
//! subscribers. Connectivity loss can be simulated globally or per path,
//! and writes to a path can be made to hang. [`InMemoryStore::inject`]
//! stands in for another client changing a value behind the controller's
//! back.

use super::{SignalStore, SignalStream, StoreError, StoreUpdate};
use crate::core::{DataType, Datapoint};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

struct Subscriber {
    paths: HashSet<String>,
    tx: mpsc::UnboundedSender<StoreUpdate>,
}

#[derive(Default)]
struct Inner {
    values: HashMap<String, Datapoint>,
    subscribers: Vec<Subscriber>,
    write_log: Vec<StoreUpdate>,
    failing_paths: HashSet<String>,
    stalled_paths: HashSet<String>,
}

impl Inner {
    fn publish(&mut self, update: &StoreUpdate) {
        self.values.insert(update.path.clone(), update.value.clone());
        self.subscribers.retain(|sub| {
            !sub.paths.contains(&update.path) || sub.tx.send(update.clone()).is_ok()
        });
    }
}

pub struct InMemoryStore {
    inner: Mutex<Inner>,
    available: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Pre-populate the store.
    pub fn with_values<I, P>(values: I) -> Self
    where
        I: IntoIterator<Item = (P, Datapoint)>,
        P: Into<String>,
    {
        let store = Self::new();
        {
            let mut inner = store.lock();
            inner
                .values
                .extend(values.into_iter().map(|(p, v)| (p.into(), v)));
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    /// Simulate the store going down or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make writes to one path fail while the rest keep working.
    pub fn fail_writes_to(&self, path: &str) {
        self.lock().failing_paths.insert(path.to_string());
    }

    /// Make writes to one path never complete, as a store that stopped
    /// answering would.
    pub fn stall_writes_to(&self, path: &str) {
        self.lock().stalled_paths.insert(path.to_string());
    }

    /// Current value of `path`, if any client has set one.
    pub fn value(&self, path: &str) -> Option<Datapoint> {
        self.lock().values.get(path).cloned()
    }

    /// Every write accepted through [`SignalStore::write`], in order.
    pub fn write_log(&self) -> Vec<StoreUpdate> {
        self.lock().write_log.clone()
    }

    pub fn clear_write_log(&self) {
        self.lock().write_log.clear();
    }

    /// Change a value as another client would.
    pub fn inject(&self, path: &str, value: Datapoint) {
        let update = StoreUpdate {
            path: path.to_string(),
            value,
        };
        debug!(path = %update.path, value = %update.value, "injected external update");
        self.lock().publish(&update);
    }
}

#[async_trait]
impl SignalStore for InMemoryStore {
    async fn fetch_all(
        &self,
        paths: &[String],
    ) -> Result<HashMap<String, Option<Datapoint>>, StoreError> {
        self.ensure_available()?;
        let inner = self.lock();
        Ok(paths
            .iter()
            .map(|p| (p.clone(), inner.values.get(p).cloned()))
            .collect())
    }

    async fn write(
        &self,
        path: &str,
        value: Datapoint,
        data_type: DataType,
    ) -> Result<(), StoreError> {
        self.ensure_available()?;
        if value.data_type() != data_type {
            return Err(StoreError::Serialization {
                path: path.to_string(),
                reason: format!("expected {data_type:?}, got {:?}", value.data_type()),
            });
        }

        let stalled = self.lock().stalled_paths.contains(path);
        if stalled {
            std::future::pending::<()>().await;
        }

        let mut inner = self.lock();
        if inner.failing_paths.contains(path) {
            return Err(StoreError::Unavailable(format!("write to '{path}' failed")));
        }
        let update = StoreUpdate {
            path: path.to_string(),
            value,
        };
        inner.write_log.push(update.clone());
        inner.publish(&update);
        Ok(())
    }

    async fn subscribe(&self, paths: &[String]) -> Result<SignalStream, StoreError> {
        self.ensure_available()?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(Subscriber {
            paths: paths.iter().cloned().collect(),
            tx,
        });
        Ok(rx)
    }
}
