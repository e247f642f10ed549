use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use yawns_core::YawnsConfig;

use super::errors::NotificationError;
use super::expiry::ExpiryScheduler;
use super::lanes::{ActiveRecord, Arena, Lane, Visibility};
use super::router::LaneRouter;
use super::surface::SurfaceFactory;
use super::types::{CloseReason, LaneKind, NotificationId, NotificationRecord};

const COMMAND_QUEUE_DEPTH: usize = 64;
const EVENT_QUEUE_DEPTH: usize = 64;

/// Mutations funneled through the engine worker.
///
/// Protocol calls, timer fires, and user interactions all arrive here, so
/// lane state is only touched from one task and structural mutations are
/// mutually exclusive by construction.
#[derive(Debug)]
pub enum EngineCommand {
    /// Insert or replace a record. The reply fires once the record is in a
    /// lane and its timer is armed; presentation work is not awaited.
    Notify {
        record: NotificationRecord,
        reply: oneshot::Sender<NotificationId>,
    },
    /// Close with the given reason. Unknown ids are a no-op (the record may
    /// have expired concurrently).
    Close {
        id: NotificationId,
        reason: CloseReason,
    },
    /// The user selected an action; relays it and then closes as dismissed.
    InvokeAction {
        id: NotificationId,
        action_key: String,
    },
    /// A timer fired. `epoch` identifies the arming; stale fires are
    /// dropped.
    Expired { id: NotificationId, epoch: u64 },
    /// Close everything and stop the worker.
    Shutdown,
}

/// Outbound lifecycle events, consumed by the bus frontend for signal
/// relay and by the post-display command hook.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A brand-new record was inserted and handed to presentation.
    Shown { id: NotificationId, lane: LaneKind },
    /// A record was destroyed. Emitted exactly once, after the record has
    /// left its lane.
    Closed {
        id: NotificationId,
        reason: CloseReason,
        sender: Option<String>,
    },
    /// The user invoked an action. A matching `Closed` (dismissed) event
    /// follows immediately.
    ActionInvoked {
        id: NotificationId,
        action_key: String,
        sender: Option<String>,
    },
}

/// Clonable front door to the engine worker.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    events: broadcast::Sender<EngineEvent>,
}

impl EngineHandle {
    /// Inserts or replaces a notification, returning once it is a lane
    /// member with an armed timer. A `Close` sent right after this returns
    /// is guaranteed to find the record.
    pub async fn notify(
        &self,
        record: NotificationRecord,
    ) -> Result<NotificationId, NotificationError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(EngineCommand::Notify {
                record,
                reply: reply_tx,
            })
            .await
            .map_err(|_| NotificationError::EngineUnavailable)?;
        reply_rx.await.map_err(|_| NotificationError::ReplyDropped)
    }

    pub async fn close(
        &self,
        id: NotificationId,
        reason: CloseReason,
    ) -> Result<(), NotificationError> {
        self.commands
            .send(EngineCommand::Close { id, reason })
            .await
            .map_err(|_| NotificationError::EngineUnavailable)
    }

    pub async fn invoke_action(
        &self,
        id: NotificationId,
        action_key: impl Into<String>,
    ) -> Result<(), NotificationError> {
        self.commands
            .send(EngineCommand::InvokeAction {
                id,
                action_key: action_key.into(),
            })
            .await
            .map_err(|_| NotificationError::EngineUnavailable)
    }

    /// Asks the worker to close all records and stop. All outstanding
    /// timers are cancelled without waiting for them.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(EngineCommand::Shutdown).await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

/// The lifecycle and placement engine.
pub struct NotificationEngine;

impl NotificationEngine {
    /// Spawns the worker task and returns its handle.
    ///
    /// `fullscreen` carries the desktop's fullscreen state; every change
    /// triggers a suppression pass over all lanes.
    pub fn spawn(
        config: &YawnsConfig,
        factory: Box<dyn SurfaceFactory>,
        fullscreen: watch::Receiver<bool>,
    ) -> (EngineHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (event_tx, _) = broadcast::channel(EVENT_QUEUE_DEPTH);
        let handle = EngineHandle {
            commands: command_tx.clone(),
            events: event_tx.clone(),
        };
        let state = EngineState {
            records: Arena::new(),
            lanes: [
                Lane::new(LaneKind::Corner, config.corner.clone()),
                Lane::new(LaneKind::Center, config.center.clone()),
                Lane::new(LaneKind::Media, config.media.clone()),
            ],
            router: LaneRouter::from_config(&config.corner, &config.center, &config.media),
            scheduler: ExpiryScheduler::new(command_tx),
            factory,
            fullscreen: *fullscreen.borrow(),
            events: event_tx,
        };
        let worker = tokio::spawn(run_worker(state, command_rx, fullscreen));
        (handle, worker)
    }
}

async fn run_worker(
    mut state: EngineState,
    mut commands: mpsc::Receiver<EngineCommand>,
    fullscreen: watch::Receiver<bool>,
) {
    let mut fullscreen = Some(fullscreen);
    loop {
        tokio::select! {
            maybe_cmd = commands.recv() => match maybe_cmd {
                None | Some(EngineCommand::Shutdown) => break,
                Some(cmd) => state.handle(cmd),
            },
            change = fullscreen_changed(&mut fullscreen) => match change {
                Some(active) => state.set_fullscreen(active),
                None => fullscreen = None,
            },
        }
    }
    state.shutdown();
}

/// Resolves on the next fullscreen transition; never resolves once the
/// watcher side is gone (`None` tells the caller to stop polling).
async fn fullscreen_changed(rx: &mut Option<watch::Receiver<bool>>) -> Option<bool> {
    match rx {
        Some(receiver) => match receiver.changed().await {
            Ok(()) => Some(*receiver.borrow()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}

struct EngineState {
    records: Arena,
    /// Indexed via [`lane_index`]; iteration order matches `LaneKind::ALL`.
    lanes: [Lane; 3],
    router: LaneRouter,
    scheduler: ExpiryScheduler,
    factory: Box<dyn SurfaceFactory>,
    fullscreen: bool,
    events: broadcast::Sender<EngineEvent>,
}

fn lane_index(kind: LaneKind) -> usize {
    match kind {
        LaneKind::Corner => 0,
        LaneKind::Center => 1,
        LaneKind::Media => 2,
    }
}

impl EngineState {
    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Notify { record, reply } => {
                let id = self.upsert(record);
                let _ = reply.send(id);
            }
            EngineCommand::Close { id, reason } => self.remove(id, reason),
            EngineCommand::InvokeAction { id, action_key } => self.invoke_action(id, &action_key),
            EngineCommand::Expired { id, epoch } => {
                if self.scheduler.is_current(id, epoch) {
                    self.remove(id, CloseReason::Expired);
                } else {
                    debug!(id, "dropping stale expiry fire");
                }
            }
            // Handled by the worker loop before reaching here.
            EngineCommand::Shutdown => {}
        }
    }

    fn lane(&self, kind: LaneKind) -> &Lane {
        &self.lanes[lane_index(kind)]
    }

    fn lane_mut(&mut self, kind: LaneKind) -> &mut Lane {
        &mut self.lanes[lane_index(kind)]
    }

    fn refresh_lane(&mut self, kind: LaneKind) {
        let screen = self.factory.screen_size();
        let fullscreen = self.fullscreen;
        let lane = &self.lanes[lane_index(kind)];
        lane.refresh(&mut self.records, fullscreen, screen);
    }

    fn publish(&self, event: EngineEvent) {
        if self.events.send(event).is_err() {
            debug!("no engine event subscribers");
        }
    }

    /// Inserts a new record or replaces the active one carrying the same
    /// id, moving it between lanes when routing says so.
    fn upsert(&mut self, record: NotificationRecord) -> NotificationId {
        let id = record.id;
        let target = self.router.route(&record);

        if self.records.contains_key(&id) {
            self.replace_existing(record, target);
        } else if self.lane(target).singleton() && !self.lane(target).members.is_empty() {
            self.replace_singleton_occupant(record, target);
        } else {
            self.insert_new(record, target);
        }
        id
    }

    fn insert_new(&mut self, record: NotificationRecord, target: LaneKind) {
        let id = record.id;
        let timeout = record.expiry_duration(self.lane(target).config.timeout);
        let surface = self.factory.create(&record, target);
        self.records.insert(
            id,
            ActiveRecord {
                record,
                lane: target,
                visibility: Visibility::Pending,
                surface,
            },
        );
        self.lane_mut(target).members.push(id);
        self.scheduler.start(id, timeout);
        info!(id, lane = target.name(), "notification inserted");
        self.publish(EngineEvent::Shown { id, lane: target });
        self.refresh_lane(target);
    }

    /// Replace path: content swaps in place, the timer restarts, and the
    /// record keeps its lane position unless routing moved it.
    fn replace_existing(&mut self, record: NotificationRecord, target: LaneKind) {
        let id = record.id;
        let timeout = record.expiry_duration(self.lane(target).config.timeout);
        let previous_lane = match self.records.get_mut(&id) {
            Some(entry) => {
                entry.surface.update_content(&record);
                entry.record = record;
                entry.lane
            }
            None => return,
        };

        if previous_lane != target {
            // Internal move, not a destroy: no close signal for this id.
            self.lane_mut(previous_lane).remove_member(id);
            if self.lane(target).singleton() {
                self.displace_singleton(target);
            }
            self.lane_mut(target).members.push(id);
            if let Some(entry) = self.records.get_mut(&id) {
                entry.lane = target;
            }
            debug!(
                id,
                from = previous_lane.name(),
                to = target.name(),
                "replace moved notification between lanes"
            );
        } else {
            debug!(id, lane = target.name(), "notification replaced in place");
        }

        self.scheduler.start(id, timeout);
        if previous_lane != target {
            self.refresh_lane(previous_lane);
        }
        self.refresh_lane(target);
    }

    /// Media-style lanes keep one widget: a second notification routed
    /// there re-keys the occupied slot to the new id and swaps content,
    /// instead of appending. The displaced id just ceases to exist; this
    /// is an internal update, so no close signal is emitted for it.
    fn replace_singleton_occupant(&mut self, record: NotificationRecord, target: LaneKind) {
        let id = record.id;
        let occupant_id = self.lane(target).members[0];
        let timeout = record.expiry_duration(self.lane(target).config.timeout);

        let Some(mut entry) = self.records.remove(&occupant_id) else {
            // Stale member key; fall back to a clean insert.
            warn!(occupant_id, "singleton member missing from arena");
            self.lane_mut(target).members.clear();
            self.insert_new(record, target);
            return;
        };
        self.scheduler.cancel(occupant_id);
        entry.surface.update_content(&record);
        entry.record = record;
        entry.lane = target;
        self.records.insert(id, entry);
        self.lane_mut(target).members.clear();
        self.lane_mut(target).members.push(id);
        self.scheduler.start(id, timeout);
        info!(
            id,
            displaced = occupant_id,
            lane = target.name(),
            "singleton lane updated in place"
        );
        self.refresh_lane(target);
    }

    /// Silently drops whatever currently occupies a singleton lane, making
    /// room for a record that is moving in from another lane.
    fn displace_singleton(&mut self, target: LaneKind) {
        let occupants: Vec<NotificationId> = self.lane(target).members.clone();
        for occupant in occupants {
            self.scheduler.cancel(occupant);
            if let Some(mut entry) = self.records.remove(&occupant) {
                entry.surface.close();
            }
        }
        self.lane_mut(target).members.clear();
    }

    /// Destroys a record: timer cancelled, lane renumbered, survivors
    /// repositioned, close event emitted exactly once. Unknown ids are a
    /// no-op so a user close racing an expiry fire stays harmless.
    fn remove(&mut self, id: NotificationId, reason: CloseReason) {
        let Some(mut entry) = self.records.remove(&id) else {
            debug!(id, "close for unknown id, ignoring");
            return;
        };
        self.scheduler.cancel(id);
        let lane = entry.lane;
        self.lane_mut(lane).remove_member(id);
        entry.surface.close();
        self.refresh_lane(lane);
        info!(id, reason = reason.code(), "notification closed");
        self.publish(EngineEvent::Closed {
            id,
            reason,
            sender: entry.record.sender.clone(),
        });
    }

    /// Relays a user-selected action and closes the notification as
    /// dismissed.
    fn invoke_action(&mut self, id: NotificationId, action_key: &str) {
        let Some(entry) = self.records.get(&id) else {
            debug!(id, "action for unknown id, ignoring");
            return;
        };
        if !entry.record.actions.iter().any(|a| a.key == action_key) {
            warn!(id, action_key, "ignoring unknown action key");
            return;
        }
        self.publish(EngineEvent::ActionInvoked {
            id,
            action_key: action_key.to_string(),
            sender: entry.record.sender.clone(),
        });
        self.remove(id, CloseReason::Dismissed);
    }

    fn set_fullscreen(&mut self, active: bool) {
        if self.fullscreen == active {
            return;
        }
        info!(active, "fullscreen state changed");
        self.fullscreen = active;
        for kind in LaneKind::ALL {
            self.refresh_lane(kind);
        }
    }

    fn shutdown(&mut self) {
        let ids: Vec<NotificationId> = self.records.keys().copied().collect();
        for id in ids {
            self.remove(id, CloseReason::Undefined);
        }
        self.scheduler.cancel_all();
        info!("notification engine stopped");
    }
}
