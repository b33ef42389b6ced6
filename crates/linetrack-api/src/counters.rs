// Counter endpoint
//
// One reading per station and direction, served from the counter host.
// The backend answers `null` when no tray has been counted yet.

use tracing::debug;

use crate::client::LineClient;
use crate::error::Error;
use crate::models::{CounterRecord, Direction, RecordId};

impl LineClient {
    /// Fetch the current counter record for a station.
    ///
    /// `GET /api/countrecords_counttray/Position/{Machine_ID}/{Direction}/`
    ///
    /// Returns `Ok(None)` when the backend replies with a JSON `null`.
    pub async fn counter_record(
        &self,
        station: &RecordId,
        direction: Direction,
    ) -> Result<Option<CounterRecord>, Error> {
        let station = station.to_string();
        let url = self.counter_url(&[
            "api",
            "countrecords_counttray",
            "Position",
            &station,
            direction.as_str(),
            "",
        ])?;
        debug!(%station, %direction, "fetching counter record");
        self.get(url).await
    }
}
