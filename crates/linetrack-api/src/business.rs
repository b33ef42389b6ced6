// Business endpoints
//
// Businesses are listed, created, and renamed; there is no delete.

use serde_json::json;
use tracing::debug;

use crate::client::LineClient;
use crate::error::Error;
use crate::models::{Business, RecordId};

impl LineClient {
    /// List all businesses, in server order.
    ///
    /// `GET /api/business`
    pub async fn list_businesses(&self) -> Result<Vec<Business>, Error> {
        let url = self.admin_url(&["api", "business"])?;
        debug!("listing businesses");
        self.get(url).await
    }

    /// Create a business and return the stored object.
    ///
    /// `POST /api/business` with `{"Business_name": "..."}`
    pub async fn create_business(&self, name: &str) -> Result<Business, Error> {
        let url = self.admin_url(&["api", "business"])?;
        debug!(name, "creating business");
        self.post(url, &json!({ "Business_name": name })).await
    }

    /// Rename a business.
    ///
    /// `PUT /api/business/{id}` with `{"Business_name": "..."}`
    pub async fn rename_business(&self, id: &RecordId, name: &str) -> Result<(), Error> {
        let id = id.to_string();
        let url = self.admin_url(&["api", "business", &id])?;
        debug!(%id, name, "renaming business");
        self.put(url, &json!({ "Business_name": name })).await
    }
}
