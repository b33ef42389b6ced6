// ── Backend seam ──
//
// Everything the counter poller and the settings editor need from the
// outside world. The HTTP client implements it; tests plug in fakes.

use std::future::Future;

use linetrack_api::{Business, CounterRecord, Direction, LineClient, RecordId, Station};

use crate::error::CoreError;

/// Remote operations against the line-tracking backend.
///
/// Futures are `Send` so implementations can be driven from spawned tasks.
pub trait LineBackend: Send + Sync + 'static {
    /// Current counter reading; `None` when the server has none yet.
    fn counter_record(
        &self,
        station: &RecordId,
        direction: Direction,
    ) -> impl Future<Output = Result<Option<CounterRecord>, CoreError>> + Send;

    fn list_businesses(&self) -> impl Future<Output = Result<Vec<Business>, CoreError>> + Send;

    fn create_business(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Business, CoreError>> + Send;

    fn rename_business(
        &self,
        id: &RecordId,
        name: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn list_stations(
        &self,
        business_id: &RecordId,
    ) -> impl Future<Output = Result<Vec<Station>, CoreError>> + Send;

    /// Create a station and return the id assigned by the server.
    fn create_station(
        &self,
        business_id: &RecordId,
        name: &str,
    ) -> impl Future<Output = Result<RecordId, CoreError>> + Send;

    fn rename_station(
        &self,
        id: &RecordId,
        name: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Delete a station. Implementations must only report success for
    /// an HTTP 200 answer.
    fn delete_station(&self, id: &RecordId) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl LineBackend for LineClient {
    async fn counter_record(
        &self,
        station: &RecordId,
        direction: Direction,
    ) -> Result<Option<CounterRecord>, CoreError> {
        Ok(LineClient::counter_record(self, station, direction).await?)
    }

    async fn list_businesses(&self) -> Result<Vec<Business>, CoreError> {
        Ok(LineClient::list_businesses(self).await?)
    }

    async fn create_business(&self, name: &str) -> Result<Business, CoreError> {
        Ok(LineClient::create_business(self, name).await?)
    }

    async fn rename_business(&self, id: &RecordId, name: &str) -> Result<(), CoreError> {
        Ok(LineClient::rename_business(self, id, name).await?)
    }

    async fn list_stations(&self, business_id: &RecordId) -> Result<Vec<Station>, CoreError> {
        let mut stations = LineClient::list_stations(self, business_id).await?;
        for station in &mut stations {
            if station.business_id.is_none() {
                station.business_id = Some(business_id.clone());
            }
        }
        Ok(stations)
    }

    async fn create_station(&self, business_id: &RecordId, name: &str) -> Result<RecordId, CoreError> {
        let created = LineClient::create_station(self, business_id, name).await?;
        Ok(created.id)
    }

    async fn rename_station(&self, id: &RecordId, name: &str) -> Result<(), CoreError> {
        Ok(LineClient::rename_station(self, id, name).await?)
    }

    async fn delete_station(&self, id: &RecordId) -> Result<(), CoreError> {
        Ok(LineClient::delete_station(self, id).await?)
    }
}
