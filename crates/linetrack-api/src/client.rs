// Line-tracking API HTTP client
//
// Wraps `reqwest::Client` with URL construction for the two backend
// surfaces (counter host and admin host), status checking, and JSON
// decoding. Endpoint groups (counters, businesses, stations) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the line-tracking backend.
///
/// Counter readings and the business/station admin API are served from
/// separate base URLs in some deployments; both are carried here. All
/// methods return decoded payloads.
#[derive(Debug, Clone)]
pub struct LineClient {
    http: reqwest::Client,
    counter_base: Url,
    admin_base: Url,
}

impl LineClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `counter_base` serves `/api/countrecords_counttray/...`; `admin_base`
    /// serves `/api/business` and `/api/station`. They may be the same URL.
    pub fn new(
        counter_base: Url,
        admin_base: Url,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, counter_base, admin_base))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, counter_base: Url, admin_base: Url) -> Self {
        Self {
            http,
            counter_base,
            admin_base,
        }
    }

    /// Base URL of the counter endpoint.
    pub fn counter_base(&self) -> &Url {
        &self.counter_base
    }

    /// Base URL of the business/station endpoints.
    pub fn admin_base(&self) -> &Url {
        &self.admin_base
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append path segments to the counter base URL.
    pub(crate) fn counter_url(&self, segments: &[&str]) -> Result<Url, Error> {
        join_segments(&self.counter_base, segments)
    }

    /// Append path segments to the admin base URL.
    pub(crate) fn admin_url(&self, segments: &[&str]) -> Result<Url, Error> {
        join_segments(&self.admin_base, segments)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        Self::decode(resp).await
    }

    /// Send a POST request with JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::decode(resp).await
    }

    /// Send a PUT request with JSON body. The response body is ignored.
    pub(crate) async fn put(&self, url: Url, body: &(impl Serialize + Sync)) -> Result<(), Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::check_status(resp).await.map(|_| ())
    }

    /// Send a DELETE request. Only `200 OK` counts as success; any other
    /// status, including other 2xx codes, is reported as `Error::Status`.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);

        let resp = self.http.delete(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();

        if status == StatusCode::OK {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::Status {
            status: status.as_u16(),
            body: preview(&body).to_owned(),
        })
    }

    /// Reject non-success statuses, keeping a short body preview.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::Status {
            status: status.as_u16(),
            body: preview(&body).to_owned(),
        })
    }

    /// Check the status, then decode the body as JSON.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let resp = Self::check_status(resp).await?;
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(len = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }
}

/// Append `segments` to `base`, percent-encoding each one. An empty final
/// segment yields a trailing slash.
fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::CannotBeABase(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// First 200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn join_segments_keeps_base_prefix() {
        let base = Url::parse("http://line.local/tracker/").unwrap();
        let url = join_segments(&base, &["api", "business"]).unwrap();
        assert_eq!(url.as_str(), "http://line.local/tracker/api/business");
    }

    #[test]
    fn join_segments_trailing_empty_segment_adds_slash() {
        let base = Url::parse("http://localhost:3334").unwrap();
        let url = join_segments(&base, &["api", "x", "3", "in", ""]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3334/api/x/3/in/");
    }

    #[test]
    fn join_segments_encodes_ids() {
        let base = Url::parse("http://localhost:3334/").unwrap();
        let url = join_segments(&base, &["api", "station", "a/b c"]).unwrap();
        assert_eq!(url.path(), "/api/station/a%2Fb%20c");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = preview(&body);
        assert!(cut.len() <= 200);
        assert!(body.starts_with(cut));
    }
}
