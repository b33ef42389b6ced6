//! Counter bridge: pollers in, actions out.
//!
//! Owns one poller per dashboard slot and forwards every `CounterUpdate`
//! into the app's action channel. Rebinding a slot stops its poller before
//! the replacement starts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use linetrack_core::{CounterUpdate, Direction, LineBackend, PollerHandle, RecordId, spawn_poller};

use crate::action::Action;

pub struct CounterBridge<B: LineBackend> {
    backend: Arc<B>,
    period: Duration,
    updates_tx: mpsc::UnboundedSender<CounterUpdate>,
    slots: Vec<PollerHandle>,
    cancel: CancellationToken,
}

impl<B: LineBackend> CounterBridge<B> {
    /// Start one poller per `(station, direction)` and the forwarding task.
    pub fn start(
        backend: Arc<B>,
        counters: &[(RecordId, Direction)],
        period: Duration,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(forward(updates_rx, action_tx, cancel.clone()));

        let slots = counters
            .iter()
            .map(|(station, direction)| {
                spawn_poller(
                    Arc::clone(&backend),
                    station.clone(),
                    *direction,
                    period,
                    updates_tx.clone(),
                )
            })
            .collect::<Vec<_>>();
        info!(count = slots.len(), ?period, "counter pollers started");

        Self {
            backend,
            period,
            updates_tx,
            slots,
            cancel,
        }
    }

    /// Point `slot` at a new station/direction.
    pub fn rebind(&mut self, slot: usize, station: RecordId, direction: Direction) {
        let Some(handle) = self.slots.get_mut(slot) else {
            debug!(slot, "rebind for unknown slot");
            return;
        };
        debug!(
            slot,
            from = %handle.station(),
            from_direction = %handle.direction(),
            to = %station,
            to_direction = %direction,
            "rebinding counter poller"
        );
        handle.stop();
        *handle = spawn_poller(
            Arc::clone(&self.backend),
            station,
            direction,
            self.period,
            self.updates_tx.clone(),
        );
    }

    pub fn shutdown(&self) {
        for handle in &self.slots {
            handle.stop();
        }
        self.cancel.cancel();
    }
}

impl<B: LineBackend> Drop for CounterBridge<B> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn forward(
    mut updates: mpsc::UnboundedReceiver<CounterUpdate>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            update = updates.recv() => {
                let Some(update) = update else { break };
                if action_tx.send(Action::CounterUpdated(update)).is_err() {
                    break;
                }
            }
        }
    }
    debug!("counter bridge stopped");
}
