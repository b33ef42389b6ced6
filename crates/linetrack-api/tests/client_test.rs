#![allow(clippy::unwrap_used)]
// Integration tests for `LineClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linetrack_api::{Direction, Error, FieldValue, LineClient, RecordId};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LineClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = LineClient::with_client(reqwest::Client::new(), base_url.clone(), base_url);
    (server, client)
}

// ── Counter tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_counter_record() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/countrecords_counttray/Position/3/in/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "TTL": "00:45", "Lot_id": "LOT123" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let record = client
        .counter_record(&RecordId::from(3), Direction::In)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.ttl, FieldValue::Text("00:45".into()));
    assert_eq!(record.lot_id.to_string(), "LOT123");
}

#[tokio::test]
async fn test_counter_record_null_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/countrecords_counttray/Position/7/out/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let record = client
        .counter_record(&RecordId::from(7), Direction::Out)
        .await
        .unwrap();

    assert!(record.is_none());
}

#[tokio::test]
async fn test_counter_record_zero_padded_station() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/countrecords_counttray/Position/007/in/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;

    let record = client
        .counter_record(&RecordId::from("007"), Direction::In)
        .await
        .unwrap();

    assert!(record.is_none());
}

#[tokio::test]
async fn test_counter_record_garbage_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/countrecords_counttray/Position/3/in/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.counter_record(&RecordId::from(3), Direction::In).await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Business tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_businesses() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/business"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Business_id": 2, "Business_name": "Line B" },
            { "Business_id": 1, "Business_name": "Line A" }
        ])))
        .mount(&server)
        .await;

    let businesses = client.list_businesses().await.unwrap();

    assert_eq!(businesses.len(), 2);
    // Server order is preserved.
    assert_eq!(businesses[0].name, "Line B");
    assert_eq!(businesses[1].id, RecordId::from(1));
}

#[tokio::test]
async fn test_create_business() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/business"))
        .and(body_json(json!({ "Business_name": "Line C" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "Business_id": 9, "Business_name": "Line C" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let business = client.create_business("Line C").await.unwrap();

    assert_eq!(business.id, RecordId::from(9));
    assert_eq!(business.name, "Line C");
}

#[tokio::test]
async fn test_rename_business() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/business/1"))
        .and(body_json(json!({ "Business_name": "Line A2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .rename_business(&RecordId::from(1), "Line A2")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rename_business_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/business/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let result = client.rename_business(&RecordId::from(1), "x").await;

    match result {
        Err(Error::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "db down");
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

// ── Station tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_stations() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/station"))
        .and(query_param("business_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Machine_ID": 5, "Machine_name": "Zeta" },
            { "Machine_ID": 6, "Machine_name": "Alpha", "Business_id": 1 }
        ])))
        .mount(&server)
        .await;

    let stations = client.list_stations(&RecordId::from(1)).await.unwrap();

    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].name, "Zeta");
    assert_eq!(stations[0].business_id, None);
    assert_eq!(stations[1].business_id, Some(RecordId::from(1)));
}

#[tokio::test]
async fn test_create_station() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/station"))
        .and(body_json(json!({ "Machine_name": "Press", "Business_id": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Machine_ID": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_station(&RecordId::from(1), "Press")
        .await
        .unwrap();

    assert_eq!(created.id, RecordId::from(42));
}

#[tokio::test]
async fn test_rename_station() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/station/6"))
        .and(body_json(json!({ "Machine_name": "Alpha 2" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .rename_station(&RecordId::from(6), "Alpha 2")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_station_ok() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/station/6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_station(&RecordId::from(6)).await.unwrap();
}

#[tokio::test]
async fn test_delete_station_requires_exact_200() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/station/6"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let result = client.delete_station(&RecordId::from(6)).await;

    assert!(
        matches!(result, Err(Error::Status { status: 204, .. })),
        "expected Status 204 error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Port 9 (discard) is almost never listening on test hosts.
    let base = Url::parse("http://127.0.0.1:9").unwrap();
    let client = LineClient::with_client(reqwest::Client::new(), base.clone(), base);

    let result = client.list_businesses().await;

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
}
