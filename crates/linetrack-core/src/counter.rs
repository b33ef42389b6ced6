// ── Counter box state ──
//
// One box per (station, direction) pair. Holds the last good reading and
// decides what the box shows; the poller feeds it `CounterUpdate`s.

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use linetrack_api::{CounterRecord, Direction, RecordId};

use crate::error::CoreError;

/// Shown in place of the two fields until a reading arrives.
pub const PLACEHOLDER: &str = "-";

/// Heading shown above a reading: "Before" for `in`, "After" for `out`.
pub fn heading_for(direction: Direction) -> &'static str {
    match direction {
        Direction::In => "Before",
        Direction::Out => "After",
    }
}

/// Result of one counter fetch, as delivered by the poller.
#[derive(Debug, Clone)]
pub struct CounterUpdate {
    pub station: RecordId,
    pub direction: Direction,
    /// Sequence number of the fetch within its poller.
    pub seq: u64,
    pub result: Result<Option<CounterRecord>, CoreError>,
}

/// Display state of a single counter box.
#[derive(Debug, Clone)]
pub struct CounterWidget {
    station: RecordId,
    direction: Direction,
    boundary: bool,
    record: Option<CounterRecord>,
    updated_at: Option<DateTime<Local>>,
    failures: u32,
}

impl CounterWidget {
    /// Create a widget for `station`/`direction`. Boundary stations show no
    /// heading.
    pub fn new(station: RecordId, direction: Direction, boundary_stations: &[RecordId]) -> Self {
        let boundary = boundary_stations.contains(&station);
        Self {
            station,
            direction,
            boundary,
            record: None,
            updated_at: None,
            failures: 0,
        }
    }

    pub fn station(&self) -> &RecordId {
        &self.station
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Last reading received, if any.
    pub fn record(&self) -> Option<&CounterRecord> {
        self.record.as_ref()
    }

    /// Local time the current reading was applied.
    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    /// Number of failed fetches since the last good one.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// "Before" / "After", or `None` for a boundary station.
    pub fn heading(&self) -> Option<&'static str> {
        if self.boundary {
            None
        } else {
            Some(heading_for(self.direction))
        }
    }

    /// Body lines: TTL and lot id, or the placeholder when no reading exists.
    pub fn lines(&self) -> Vec<String> {
        match &self.record {
            Some(record) => vec![record.ttl.to_string(), record.lot_id.to_string()],
            None => vec![PLACEHOLDER.to_owned()],
        }
    }

    /// Whether `update` targets this widget's current binding.
    pub fn accepts(&self, update: &CounterUpdate) -> bool {
        update.station == self.station && update.direction == self.direction
    }

    /// Point the widget at a different station or direction.
    ///
    /// The old reading belongs to the old binding and is dropped. Returns
    /// `false` when nothing changed.
    pub fn rebind(
        &mut self,
        station: RecordId,
        direction: Direction,
        boundary_stations: &[RecordId],
    ) -> bool {
        if station == self.station && direction == self.direction {
            return false;
        }
        *self = Self::new(station, direction, boundary_stations);
        true
    }

    /// Apply a fetch result. Returns `true` if the displayed record changed.
    ///
    /// Failures leave the previous reading (or placeholder) in place.
    pub fn apply(&mut self, update: CounterUpdate) -> bool {
        if !self.accepts(&update) {
            debug!(
                station = %update.station,
                direction = %update.direction,
                "ignoring counter update for a previous binding"
            );
            return false;
        }

        match update.result {
            Ok(record) => {
                self.record = record;
                self.updated_at = Some(Local::now());
                self.failures = 0;
                true
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                warn!(
                    station = %self.station,
                    direction = %self.direction,
                    error = %e,
                    "error fetching counter record"
                );
                false
            }
        }
    }
}
