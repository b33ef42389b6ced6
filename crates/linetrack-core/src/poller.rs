// ── Counter poller ──
//
// One background task per mounted counter box. Fetches immediately, then
// every `period`. Each tick spawns its own fetch, so a slow response can
// overlap the next tick; every fetch carries a sequence number and a response
// older than one already delivered is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use linetrack_api::{Direction, RecordId};

use crate::backend::LineBackend;
use crate::counter::CounterUpdate;

/// Handle to a running poller. Dropping it stops the poller.
///
/// Stopping disarms the timer; a fetch already in flight still completes
/// but its result is discarded.
#[derive(Debug)]
pub struct PollerHandle {
    station: RecordId,
    direction: Direction,
    cancel: CancellationToken,
}

impl PollerHandle {
    pub fn station(&self) -> &RecordId {
        &self.station
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Disarm the timer. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a poller for one station/direction pair.
///
/// Updates are sent on `tx`. A closed channel stops the poller.
pub fn spawn_poller<B: LineBackend>(
    backend: Arc<B>,
    station: RecordId,
    direction: Direction,
    period: Duration,
    tx: mpsc::UnboundedSender<CounterUpdate>,
) -> PollerHandle {
    let cancel = CancellationToken::new();
    tokio::spawn(poll_task(
        backend,
        station.clone(),
        direction,
        period,
        tx,
        cancel.clone(),
    ));

    PollerHandle {
        station,
        direction,
        cancel,
    }
}

async fn poll_task<B: LineBackend>(
    backend: Arc<B>,
    station: RecordId,
    direction: Direction,
    period: Duration,
    tx: mpsc::UnboundedSender<CounterUpdate>,
    cancel: CancellationToken,
) {
    let mut issued = 0u64;
    let delivered = Arc::new(AtomicU64::new(0));
    // The first tick completes immediately: that is the fetch on mount.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    debug!(%station, %direction, ?period, "counter poller started");

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,
            () = tx.closed() => break,

            _ = interval.tick() => {
                issued += 1;
                tokio::spawn(fetch_once(
                    Arc::clone(&backend),
                    station.clone(),
                    direction,
                    issued,
                    Arc::clone(&delivered),
                    tx.clone(),
                    cancel.clone(),
                ));
            }
        }
    }

    debug!(%station, %direction, "counter poller stopped");
}

async fn fetch_once<B: LineBackend>(
    backend: Arc<B>,
    station: RecordId,
    direction: Direction,
    seq: u64,
    delivered: Arc<AtomicU64>,
    tx: mpsc::UnboundedSender<CounterUpdate>,
    cancel: CancellationToken,
) {
    trace!(%station, %direction, seq, "fetching counter");
    let result = backend.counter_record(&station, direction).await;

    if cancel.is_cancelled() {
        trace!(%station, %direction, seq, "poller stopped, dropping response");
        return;
    }

    // A newer response already went out; this one would roll it back.
    let newest = delivered.fetch_max(seq, Ordering::AcqRel);
    if newest > seq {
        debug!(%station, %direction, seq, newest, "discarding stale counter response");
        return;
    }

    let _ = tx.send(CounterUpdate {
        station,
        direction,
        seq,
        result,
    });
}
