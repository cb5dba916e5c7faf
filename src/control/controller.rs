//! Vehicle controller: applies transition plans to the cache and the store.

use crate::config::{Config, WritePolicy};
use crate::control::cache::VehicleStateCache;
use crate::control::echo::EchoTracker;
use crate::control::outcome::{CommandOutcome, OutcomeStatus, WriteFailure};
use crate::core::rules::{self, EngineStopHook, HoldSpeed, RuleContext};
use crate::core::{
    Command, GearChange, GearHistory, SignalPath, SignalWrite, TripEvent, TripTimer,
    VehicleState,
};
use crate::store::{SignalStore, StoreError, StoreUpdate};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Result of committing a plan's writes.
struct CommitReport {
    committed: Vec<SignalWrite>,
    failures: Vec<WriteFailure>,
    skipped: usize,
}

/// Owner of the vehicle state cache.
///
/// Every method takes `&mut self`; callers serialize access, normally by
/// running the controller inside the actor from [`crate::control::spawn`].
pub struct VehicleController {
    store: Arc<dyn SignalStore>,
    config: Config,
    cache: VehicleStateCache,
    trip: TripTimer,
    history: GearHistory,
    echoes: EchoTracker,
    engine_stop_hook: Box<dyn EngineStopHook>,
}

impl VehicleController {
    /// Create a controller over an already provisioned cache.
    pub fn new(store: Arc<dyn SignalStore>, config: Config, cache: VehicleStateCache) -> Self {
        let state = cache.snapshot();
        let trip = if state.engine_running {
            TripTimer::resumed(state.trip_start_time)
        } else {
            TripTimer::new()
        };
        Self {
            store,
            config,
            cache,
            trip,
            history: GearHistory::new(),
            echoes: EchoTracker::new(),
            engine_stop_hook: Box::new(HoldSpeed),
        }
    }

    /// Pull the current value of every catalog path from the store.
    ///
    /// An unreachable store is not fatal: the cache starts from catalog
    /// defaults and the live feed corrects it later.
    pub async fn provision(store: Arc<dyn SignalStore>, config: Config) -> Self {
        info!("Initializing values from signal store");
        let paths = SignalPath::vss_paths();
        let fetched = match timeout(config.write_timeout(), store.fetch_all(&paths)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                path: "<catalog>".to_string(),
                timeout_ms: config.write_timeout_ms,
            }),
        };

        let cache = match fetched {
            Ok(values) => VehicleStateCache::provisioned(&values, &config.limits),
            Err(err) => {
                warn!(error = %err, "Provisioning failed, starting from catalog defaults");
                VehicleStateCache::with_defaults()
            }
        };
        for (path, value) in cache.iter() {
            info!("{path} : {value}");
        }
        Self::new(store, config, cache)
    }

    /// Replace the hook consulted when the engine is switched off.
    pub fn with_engine_stop_hook(mut self, hook: impl EngineStopHook + 'static) -> Self {
        self.engine_stop_hook = Box::new(hook);
        self
    }

    /// Read-only view of the local mirror.
    pub fn cache(&self) -> &VehicleStateCache {
        &self.cache
    }

    /// Current state as the next command would see it.
    pub fn snapshot(&self) -> VehicleState {
        self.cache.snapshot()
    }

    /// Gear changes this controller has written, oldest first.
    pub fn gear_history(&self) -> &GearHistory {
        &self.history
    }

    /// Start of the running trip, if the engine is on.
    pub fn trip(&self) -> &TripTimer {
        &self.trip
    }

    /// Run one command to completion.
    pub async fn execute(&mut self, command: Command) -> CommandOutcome {
        self.execute_at(command, Utc::now()).await
    }

    /// Run one command with an explicit clock reading.
    pub async fn execute_at(&mut self, command: Command, now: DateTime<Utc>) -> CommandOutcome {
        let id = Uuid::new_v4();
        let before = self.cache.snapshot();

        let ctx = RuleContext {
            limits: &self.config.limits,
            now,
            trip_started_at: self.trip.started_at(),
            engine_stop_hook: self.engine_stop_hook.as_ref(),
        };
        let plan = match rules::plan(&command, &before, &ctx) {
            Ok(plan) => plan,
            Err(rejection) => {
                warn!(%id, %command, "{rejection}");
                return CommandOutcome {
                    id,
                    command,
                    status: OutcomeStatus::Rejected(rejection),
                };
            }
        };

        if plan.is_noop() {
            info!(%id, %command, "Nothing to change");
        }

        let report = self.commit(id, command, &plan.writes).await;
        let after = self.cache.snapshot();

        if let Some(event) = plan.trip {
            if after.engine_running != before.engine_running {
                self.trip.apply(event);
                if matches!(event, TripEvent::Stopped) {
                    info!(%id, seconds = after.trip_duration, "Trip finished");
                }
            }
        }
        if let Some(shift) = plan.shift {
            if after.gear == shift.to && before.gear != shift.to {
                self.history = self.history.record(GearChange {
                    from: before.gear,
                    to: shift.to,
                    cause: shift.cause,
                    timestamp: now,
                });
                info!(%id, cause = ?shift.cause, "Gear shifted to {}", shift.to);
            }
        }

        let status = if report.failures.is_empty() {
            OutcomeStatus::Applied {
                writes: report.committed,
            }
        } else {
            OutcomeStatus::StoreUnavailable {
                committed: report.committed,
                failures: report.failures,
                skipped: report.skipped,
            }
        };
        CommandOutcome {
            id,
            command,
            status,
        }
    }

    /// Apply writes in order: cache first, then the store.
    async fn commit(
        &mut self,
        id: Uuid,
        command: Command,
        writes: &[SignalWrite],
    ) -> CommitReport {
        let mut report = CommitReport {
            committed: Vec::with_capacity(writes.len()),
            failures: Vec::new(),
            skipped: 0,
        };

        for (idx, write) in writes.iter().enumerate() {
            if let Err(err) = self.cache.set_local(write.path, write.value.clone()) {
                error!(%id, %command, error = %err, "Rejected local write");
                continue;
            }

            match self.send(write).await {
                Ok(()) => {
                    self.echoes.expect(write.path, write.value.clone());
                    info!(%id, "[{command}] Set {} to {}", write.path, write.value);
                    report.committed.push(write.clone());
                }
                Err(err) => {
                    warn!(%id, %command, path = %write.path, error = %err, "Store write failed");
                    report.failures.push(WriteFailure {
                        write: write.clone(),
                        error: err,
                    });
                    if self.config.write_policy == WritePolicy::AbortOnFailure {
                        report.skipped = writes.len() - idx - 1;
                        break;
                    }
                }
            }
        }
        report
    }

    async fn send(&self, write: &SignalWrite) -> Result<(), StoreError> {
        let path = write.path.vss_path();
        let pending = self
            .store
            .write(path, write.value.to_datapoint(), write.path.data_type());
        match timeout(self.config.write_timeout(), pending).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                path: path.to_string(),
                timeout_ms: self.config.write_timeout_ms,
            }),
        }
    }

    /// Mirror a live feed update into the cache.
    ///
    /// Returns whether the update reached the cache. Unmonitored paths,
    /// undecodable or non-finite values and superseded echoes are dropped.
    /// Speed and steering angle are clamped to the configured limits.
    pub fn apply_remote(&mut self, update: &StoreUpdate) -> bool {
        let Some(path) = SignalPath::from_vss_path(&update.path) else {
            debug!(path = %update.path, "Ignoring unmonitored path");
            return false;
        };
        let Some(decoded) = update.value.decode(path.kind()) else {
            warn!(%path, value = %update.value, "Ignoring undecodable update");
            return false;
        };
        let value = rules::clamp_reported(path, decoded, &self.config.limits);
        if !self.echoes.should_apply(path, &value) {
            debug!(%path, %value, "Skipping superseded echo");
            return false;
        }

        match self.cache.apply_remote(path, value) {
            Ok(()) => {
                debug!("[SUB] {path}: {}", self.cache.value(path));
                true
            }
            Err(err) => {
                warn!(%path, error = %err, "Rejected remote update");
                false
            }
        }
    }
}
