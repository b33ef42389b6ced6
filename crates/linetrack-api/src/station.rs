// Station endpoints
//
// Stations are scoped to a business through the `business_id` query
// parameter on listing and the `Business_id` field on creation.

use serde_json::json;
use tracing::debug;

use crate::client::LineClient;
use crate::error::Error;
use crate::models::{CreatedStation, RecordId, Station};

impl LineClient {
    /// List the stations of one business, in server order.
    ///
    /// `GET /api/station?business_id={id}`
    pub async fn list_stations(&self, business_id: &RecordId) -> Result<Vec<Station>, Error> {
        let business_id = business_id.to_string();
        let mut url = self.admin_url(&["api", "station"])?;
        url.query_pairs_mut().append_pair("business_id", &business_id);
        debug!(%business_id, "listing stations");
        self.get(url).await
    }

    /// Create a station under a business.
    ///
    /// `POST /api/station` with `{"Machine_name": "...", "Business_id": ...}`
    pub async fn create_station(
        &self,
        business_id: &RecordId,
        name: &str,
    ) -> Result<CreatedStation, Error> {
        let url = self.admin_url(&["api", "station"])?;
        debug!(%business_id, name, "creating station");
        self.post(
            url,
            &json!({
                "Machine_name": name,
                "Business_id": business_id,
            }),
        )
        .await
    }

    /// Rename a station.
    ///
    /// `PUT /api/station/{id}` with `{"Machine_name": "..."}`
    pub async fn rename_station(&self, id: &RecordId, name: &str) -> Result<(), Error> {
        let id = id.to_string();
        let url = self.admin_url(&["api", "station", &id])?;
        debug!(%id, name, "renaming station");
        self.put(url, &json!({ "Machine_name": name })).await
    }

    /// Delete a station. Succeeds only on `200 OK`.
    ///
    /// `DELETE /api/station/{id}`
    pub async fn delete_station(&self, id: &RecordId) -> Result<(), Error> {
        let id = id.to_string();
        let url = self.admin_url(&["api", "station", &id])?;
        debug!(%id, "deleting station");
        self.delete(url).await
    }
}
