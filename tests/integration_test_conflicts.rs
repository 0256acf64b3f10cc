mod common;

use axum::http::StatusCode;
use common::{weekday_hours, TestApp};
use chrono::NaiveDate;
use serde_json::{json, Value};
use venue_booking::domain::models::venue_availability::VenueAvailability;

const MONDAY: &str = "2030-01-07";

async fn setup(app: &TestApp, tz: &str) -> String {
    let vendor = app.seed_vendor("Arena Group").await;
    app.seed_venue(&vendor, "Court A", Some(&weekday_hours(&[("09:00", "21:00")])), tz).await.id
}

fn slot<'a>(body: &'a Value, start: &str) -> &'a Value {
    body["slots"].as_array().unwrap().iter().find(|s| s["start_time"] == start).unwrap()
}

#[tokio::test]
async fn test_conflict_blocks_slots_and_bookings() {
    let app = TestApp::new().await;
    let venue_id = setup(&app, "UTC").await;

    let (status, conflict) = app.send_json(
        "POST",
        &format!("/api/v1/venues/{}/conflicts", venue_id),
        json!({"date": MONDAY, "start_time": "10:00", "end_time": "12:00", "reason": "Resurfacing"}),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conflict["is_active"], true);
    assert_eq!(conflict["start_time"], "2030-01-07T10:00:00Z");

    let (_, body) = app.get(&format!("/api/v1/venues/{}/availability?date={}&duration=1", venue_id, MONDAY)).await;
    assert_eq!(slot(&body, "10:00")["is_available"], false);
    assert_eq!(slot(&body, "10:00")["has_conflict"], true);
    assert_eq!(slot(&body, "10:00")["conflicting"]["kind"], "conflict");
    assert_eq!(slot(&body, "10:00")["conflicting"]["reason"], "Resurfacing");
    assert_eq!(slot(&body, "11:00")["is_available"], false);
    assert_eq!(slot(&body, "12:00")["is_available"], true);
    assert_eq!(slot(&body, "09:00")["is_available"], true);

    let (status, body) = app.send_json(
        "POST",
        &format!("/api/v1/venues/{}/bookings", venue_id),
        json!({"date": MONDAY, "start_time": "11:00", "duration": 2}),
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Venue is not available for the selected time slot: Slot is blocked: Resurfacing");

    // Deactivated blocks no longer count.
    let (status, body) = app.delete(&format!("/api/v1/conflicts/{}", conflict["id"].as_str().unwrap())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, _) = app.send_json(
        "POST",
        &format!("/api/v1/venues/{}/bookings", venue_id),
        json!({"date": MONDAY, "start_time": "11:00", "duration": 2}),
    ).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = app.get(&format!("/api/v1/venues/{}/conflicts?date={}", venue_id, MONDAY)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["is_active"], false);
}

#[tokio::test]
async fn test_conflict_with_utc_instants_and_local_times() {
    let app = TestApp::new().await;
    let venue_id = setup(&app, "Asia/Kolkata").await;

    let (status, instant) = app.send_json(
        "POST",
        &format!("/api/v1/venues/{}/conflicts", venue_id),
        json!({"start_time": "2030-01-07T04:30:00Z", "end_time": "2030-01-07T05:30:00Z"}),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(instant["reason"], "Blocked");

    let (status, local) = app.send_json(
        "POST",
        &format!("/api/v1/venues/{}/conflicts", venue_id),
        json!({"date": MONDAY, "start_time": "18:00", "end_time": "19:00", "reason": "League night"}),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(local["start_time"], "2030-01-07T12:30:00Z");

    let (_, body) = app.get(&format!("/api/v1/venues/{}/availability?date={}&duration=1", venue_id, MONDAY)).await;
    // 04:30Z is 10:00 in Kolkata.
    assert_eq!(slot(&body, "10:00")["has_conflict"], true);
    assert_eq!(slot(&body, "18:00")["has_conflict"], true);
    assert_eq!(slot(&body, "11:00")["is_available"], true);
}

#[tokio::test]
async fn test_conflict_validation() {
    let app = TestApp::new().await;
    let venue_id = setup(&app, "UTC").await;
    let uri = format!("/api/v1/venues/{}/conflicts", venue_id);

    let (status, _) = app.send_json("POST", &uri, json!({"start_time": "10:00", "end_time": "12:00"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send_json("POST", &uri, json!({"date": MONDAY, "start_time": "12:00", "end_time": "10:00"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send_json("POST", &uri, json!({
        "start_time": "2030-01-07T12:00:00Z", "end_time": "2030-01-07T10:00:00Z"
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send_json(
        "POST",
        "/api/v1/venues/missing/conflicts",
        json!({"date": MONDAY, "start_time": "10:00", "end_time": "12:00"}),
    ).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/v1/conflicts/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_markers_restrict_day_to_listed_hours() {
    let app = TestApp::new().await;
    let venue_id = setup(&app, "UTC").await;
    let markers_uri = format!("/api/v1/venues/{}/availability-markers", venue_id);

    let (status, markers) = app.send_json("PUT", &markers_uri, json!({
        "date": MONDAY,
        "slots": [
            {"start_hour": 10, "is_available": true},
            {"start_hour": 11, "is_available": false},
            {"start_hour": 14, "is_available": true}
        ]
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(markers.as_array().unwrap().len(), 3);

    let (_, body) = app.get(&format!("/api/v1/venues/{}/availability?date={}&duration=1", venue_id, MONDAY)).await;
    let open: Vec<&str> = body["slots"].as_array().unwrap().iter()
        .filter(|s| s["is_available"] == true)
        .map(|s| s["start_time"].as_str().unwrap())
        .collect();
    assert_eq!(open, vec!["10:00", "14:00"]);
    assert_eq!(slot(&body, "11:00")["reason"], "Slot is not marked available for this date");

    let (status, _) = app.send_json(
        "POST",
        &format!("/api/v1/venues/{}/bookings", venue_id),
        json!({"date": MONDAY, "start_time": "12:00", "duration": 1}),
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Re-marking an hour updates in place.
    let (_, markers) = app.send_json("PUT", &markers_uri, json!({
        "date": MONDAY,
        "slots": [{"start_hour": 11, "is_available": true}]
    })).await;
    assert_eq!(markers.as_array().unwrap().len(), 3);

    let (_, listed) = app.get(&format!("{}?date={}", markers_uri, MONDAY)).await;
    let eleven = listed.as_array().unwrap().iter().find(|m| m["start_hour"] == 11).unwrap();
    assert_eq!(eleven["is_available"], true);

    let (status, body) = app.delete(&format!("{}/{}", markers_uri, MONDAY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 3);

    let (_, body) = app.get(&format!("/api/v1/venues/{}/availability?date={}&duration=1", venue_id, MONDAY)).await;
    assert!(body["slots"].as_array().unwrap().iter().all(|s| s["is_available"] == true));
}

#[tokio::test]
async fn test_marker_hour_out_of_range() {
    let app = TestApp::new().await;
    let venue_id = setup(&app, "UTC").await;

    let (status, body) = app.send_json(
        "PUT",
        &format!("/api/v1/venues/{}/availability-markers", venue_id),
        json!({"date": MONDAY, "slots": [{"start_hour": 24, "is_available": true}]}),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid start hour 24 (0-23)");
}

#[tokio::test]
async fn test_marker_batch_is_all_or_nothing() {
    let app = TestApp::new().await;
    let venue_id = setup(&app, "UTC").await;
    let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();

    // The second marker points at a venue that does not exist.
    let batch = vec![
        VenueAvailability::new(venue_id.clone(), date, 10, true),
        VenueAvailability::new("missing-venue".to_string(), date, 11, true),
    ];
    let result = app.state.marker_repo.upsert_many(&batch).await;
    assert!(result.is_err());

    let kept = app.state.marker_repo.list_by_date(&venue_id, date).await.unwrap();
    assert!(kept.is_empty());

    let saved = app.state.marker_repo.upsert_many(&batch[..1]).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].start_hour, 10);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
