//! Single-writer actor around the [`VehicleController`].
//!
//! Commands, live feed updates and snapshot queries all travel through one
//! FIFO mailbox. The actor handles one message at a time, so a command's
//! read-compute-write sequence never interleaves with a feed update or with
//! another command.

use crate::config::Config;
use crate::control::controller::VehicleController;
use crate::control::error::ControlError;
use crate::control::outcome::CommandOutcome;
use crate::core::{Command, Gear, GearHistory, SignalPath, VehicleState};
use crate::store::{SignalStore, StoreError, StoreUpdate};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

enum Envelope {
    Command {
        command: Command,
        reply: oneshot::Sender<CommandOutcome>,
    },
    Remote(StoreUpdate),
    Snapshot(oneshot::Sender<VehicleState>),
    History(oneshot::Sender<GearHistory>),
}

/// Cloneable entry point for submitting work to the actor.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Envelope>,
}

impl ControllerHandle {
    /// Queue a command and wait for its outcome.
    pub async fn execute(&self, command: Command) -> Result<CommandOutcome, ControlError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Command { command, reply })
            .await
            .map_err(|_| ControlError::ControllerClosed)?;
        rx.await.map_err(|_| ControlError::ControllerClosed)
    }

    pub async fn accelerate_once(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::Accelerate).await
    }

    pub async fn decelerate_once(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::Decelerate).await
    }

    pub async fn steer_left_once(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::SteerLeft).await
    }

    pub async fn steer_right_once(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::SteerRight).await
    }

    pub async fn toggle_left_signal(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::ToggleLeftSignal).await
    }

    pub async fn toggle_right_signal(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::ToggleRightSignal).await
    }

    pub async fn toggle_low_beam(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::ToggleLowBeam).await
    }

    pub async fn toggle_high_beam(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::ToggleHighBeam).await
    }

    pub async fn toggle_engine_power(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::ToggleEnginePower).await
    }

    pub async fn shift_gear(&self, target: Gear) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::ShiftGear(target)).await
    }

    /// Shift to the gear after the current one, decided inside the actor.
    pub async fn shift_up(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::ShiftUp).await
    }

    pub async fn shift_down(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::ShiftDown).await
    }

    pub async fn toggle_parking_brake(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::ToggleParkingBrake).await
    }

    pub async fn emergency_brake(&self) -> Result<CommandOutcome, ControlError> {
        self.execute(Command::EmergencyBrake).await
    }

    /// Queue a feed update behind any pending commands.
    pub async fn push_remote(&self, update: StoreUpdate) -> Result<(), ControlError> {
        self.tx
            .send(Envelope::Remote(update))
            .await
            .map_err(|_| ControlError::ControllerClosed)
    }

    pub async fn snapshot(&self) -> Result<VehicleState, ControlError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Snapshot(reply))
            .await
            .map_err(|_| ControlError::ControllerClosed)?;
        rx.await.map_err(|_| ControlError::ControllerClosed)
    }

    pub async fn gear_history(&self) -> Result<GearHistory, ControlError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::History(reply))
            .await
            .map_err(|_| ControlError::ControllerClosed)?;
        rx.await.map_err(|_| ControlError::ControllerClosed)
    }
}

/// Start the actor task. It stops once every handle has been dropped and
/// hands the controller back.
pub fn spawn(
    controller: VehicleController,
    capacity: usize,
) -> (ControllerHandle, JoinHandle<VehicleController>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let task = tokio::spawn(run(controller, rx));
    (ControllerHandle { tx }, task)
}

async fn run(
    mut controller: VehicleController,
    mut mailbox: mpsc::Receiver<Envelope>,
) -> VehicleController {
    while let Some(envelope) = mailbox.recv().await {
        match envelope {
            Envelope::Command { command, reply } => {
                let outcome = controller.execute(command).await;
                if reply.send(outcome).is_err() {
                    debug!(%command, "Caller went away before the outcome arrived");
                }
            }
            Envelope::Remote(update) => {
                controller.apply_remote(&update);
            }
            Envelope::Snapshot(reply) => {
                let _ = reply.send(controller.snapshot());
            }
            Envelope::History(reply) => {
                let _ = reply.send(controller.gear_history().clone());
            }
        }
    }
    debug!("Controller mailbox closed");
    controller
}

/// Forward the store's subscription into the actor's mailbox.
///
/// The forwarder only holds a weak sender, so it does not keep the actor
/// alive on its own.
pub async fn spawn_feed(
    store: &dyn SignalStore,
    handle: &ControllerHandle,
) -> Result<JoinHandle<()>, StoreError> {
    let mut stream = store.subscribe(&SignalPath::vss_paths()).await?;
    let weak = handle.tx.downgrade();

    Ok(tokio::spawn(async move {
        while let Some(update) = stream.recv().await {
            let Some(tx) = weak.upgrade() else {
                break;
            };
            if tx.send(Envelope::Remote(update)).await.is_err() {
                break;
            }
        }
        warn!("{}", StoreError::SubscriptionClosed);
    }))
}

/// A provisioned controller running with its live feed attached.
pub struct Companion {
    handle: ControllerHandle,
    actor: JoinHandle<VehicleController>,
    feed: Option<JoinHandle<()>>,
}

impl Companion {
    /// Provision from `store`, start the actor and subscribe to the feed.
    ///
    /// A failed subscription is logged and the companion runs without a
    /// live feed.
    pub async fn start(store: Arc<dyn SignalStore>, config: Config) -> Self {
        let capacity = config.mailbox_capacity;
        let controller = VehicleController::provision(store.clone(), config).await;
        let (handle, actor) = spawn(controller, capacity);

        let feed = match spawn_feed(store.as_ref(), &handle).await {
            Ok(task) => Some(task),
            Err(err) => {
                warn!(error = %err, "Live feed unavailable, continuing without it");
                None
            }
        };
        info!("Vehicle controller ready");
        Self {
            handle,
            actor,
            feed,
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    pub fn has_live_feed(&self) -> bool {
        self.feed.is_some()
    }

    /// Stop the feed and wait for the actor to drain its mailbox.
    ///
    /// Handles cloned from [`Companion::handle`] must be dropped first.
    pub async fn shutdown(self) -> Option<VehicleController> {
        if let Some(feed) = self.feed {
            feed.abort();
        }
        drop(self.handle);
        self.actor.await.ok()
    }
}
