use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use availability_service::{
    api::{handler::calendar, state::AvailabilityAppState},
    domain::{
        availability::MockCalendarStore,
        service::{AvailabilityConfig, AvailabilityService},
    },
    error::AvailabilityServiceError,
};
use shared::types::{AvailabilityStatus, CalendarEntry, VersionedCalendar};

fn build_test_app(mock_store: MockCalendarStore) -> Router {
    let state = Arc::new(AvailabilityAppState {
        availability_service: Arc::new(AvailabilityService::new(
            Arc::new(mock_store),
            AvailabilityConfig::default(),
        )),
    });

    Router::new()
        .route(
            "/api/v1/workers/{id}/calendar",
            post(calendar::provision)
                .get(calendar::query)
                .delete(calendar::destroy),
        )
        .route(
            "/api/v1/workers/{id}/calendar/range",
            put(calendar::assign_range).delete(calendar::delete_range),
        )
        .route(
            "/api/v1/workers/{id}/calendar/dates",
            put(calendar::assign_dates),
        )
        .route(
            "/api/v1/workers/{id}/calendar/conflicts",
            get(calendar::check_conflicts),
        )
        .route(
            "/api/v1/workers/{id}/calendar/reservations",
            post(calendar::reserve),
        )
        .with_state(state)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn make_entry(d: NaiveDate, status: AvailabilityStatus) -> CalendarEntry {
    CalendarEntry {
        date: d,
        status,
        booking_ref: None,
        note: None,
    }
}

fn empty_calendar() -> VersionedCalendar {
    VersionedCalendar {
        version: 0,
        entries: vec![],
    }
}

fn not_found(worker_id: Uuid) -> AvailabilityServiceError {
    AvailabilityServiceError::NotFound(format!("No calendar provisioned for worker {worker_id}"))
}

#[tokio::test]
async fn provision_calendar_returns_ok() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_provision().returning(|_| Ok(()));

    let app = build_test_app(mock_store);

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/workers/{}/calendar", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["success"].as_bool().unwrap());
}

#[tokio::test]
async fn destroy_missing_calendar_returns_404() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_destroy().returning(|id| Err(not_found(id)));

    let app = build_test_app(mock_store);

    let res = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/workers/{}/calendar", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn query_returns_entries_ascending() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| {
        Ok(VersionedCalendar {
            version: 1,
            entries: vec![
                make_entry(date(2024, 6, 1), AvailabilityStatus::Available),
                make_entry(date(2024, 6, 2), AvailabilityStatus::Leave),
            ],
        })
    });

    let app = build_test_app(mock_store);

    let res = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/workers/{}/calendar", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["success"].as_bool().unwrap());
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["date"], "2024-06-01");
    assert_eq!(data[0]["status"], "AVAILABLE");
    assert_eq!(data[1]["status"], "LEAVE");
}

#[tokio::test]
async fn query_with_status_filter_narrows_result() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| {
        Ok(VersionedCalendar {
            version: 1,
            entries: vec![
                make_entry(date(2024, 6, 1), AvailabilityStatus::Available),
                make_entry(date(2024, 6, 2), AvailabilityStatus::Leave),
            ],
        })
    });

    let app = build_test_app(mock_store);

    let res = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/api/v1/workers/{}/calendar?status=LEAVE",
                    Uuid::new_v4()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["date"], "2024-06-02");
}

#[tokio::test]
async fn query_unknown_worker_returns_404() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|id| Err(not_found(id)));

    let app = build_test_app(mock_store);

    let res = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/workers/{}/calendar", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assign_range_reports_days_written() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| Ok(empty_calendar()));
    mock_store.expect_save().returning(|_, _, _| Ok(()));

    let app = build_test_app(mock_store);

    let body = json!({
        "start_date": "2024-01-01",
        "end_date": "2024-01-03",
        "status": "AVAILABLE"
    });

    let res = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/workers/{}/calendar/range", Uuid::new_v4()))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["success"].as_bool().unwrap());
    assert_eq!(json["data"]["days_written"], 3);
}

#[tokio::test]
async fn assign_range_inverted_returns_400() {
    let mock_store = MockCalendarStore::new();
    let app = build_test_app(mock_store);

    let body = json!({
        "start_date": "2024-07-10",
        "end_date": "2024-07-01",
        "status": "AVAILABLE"
    });

    let res = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/workers/{}/calendar/range", Uuid::new_v4()))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assign_dates_reports_deduped_count() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| Ok(empty_calendar()));
    mock_store.expect_save().returning(|_, _, _| Ok(()));

    let app = build_test_app(mock_store);

    let body = json!({
        "dates": ["2024-05-01", "2024-05-03", "2024-05-01"],
        "status": "LEAVE"
    });

    let res = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/workers/{}/calendar/dates", Uuid::new_v4()))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["days_written"], 2);
}

#[tokio::test]
async fn assign_dates_empty_list_returns_400() {
    let mock_store = MockCalendarStore::new();
    let app = build_test_app(mock_store);

    let body = json!({
        "dates": [],
        "status": "LEAVE"
    });

    let res = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/workers/{}/calendar/dates", Uuid::new_v4()))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_range_reports_removed_entries() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| {
        Ok(VersionedCalendar {
            version: 3,
            entries: (1..=10)
                .map(|d| make_entry(date(2024, 6, d), AvailabilityStatus::Available))
                .collect(),
        })
    });
    mock_store.expect_save().returning(|_, _, _| Ok(()));

    let app = build_test_app(mock_store);

    let res = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!(
                    "/api/v1/workers/{}/calendar/range?start_date=2024-06-03&end_date=2024-06-05",
                    Uuid::new_v4()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["entries_removed"], 3);
}

#[tokio::test]
async fn check_conflicts_blocked_by_occupied_day() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| {
        Ok(VersionedCalendar {
            version: 1,
            entries: vec![CalendarEntry {
                date: date(2024, 3, 5),
                status: AvailabilityStatus::Occupied,
                booking_ref: Some(Uuid::new_v4()),
                note: None,
            }],
        })
    });

    let app = build_test_app(mock_store);

    let res = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/api/v1/workers/{}/calendar/conflicts?start_date=2024-03-01&end_date=2024-03-10",
                    Uuid::new_v4()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(!json["data"]["is_available"].as_bool().unwrap());
}

#[tokio::test]
async fn check_conflicts_free_range_is_available() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| Ok(empty_calendar()));

    let app = build_test_app(mock_store);

    let res = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/api/v1/workers/{}/calendar/conflicts?start_date=2024-04-01&end_date=2024-04-10",
                    Uuid::new_v4()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["data"]["is_available"].as_bool().unwrap());
}

#[tokio::test]
async fn reserve_returns_201_and_days_written() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| Ok(empty_calendar()));
    mock_store.expect_save().returning(|_, _, _| Ok(()));

    let app = build_test_app(mock_store);

    let body = json!({
        "start_date": "2024-09-01",
        "end_date": "2024-09-03",
        "booking_ref": Uuid::new_v4()
    });

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/api/v1/workers/{}/calendar/reservations",
                    Uuid::new_v4()
                ))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["success"].as_bool().unwrap());
    assert_eq!(json["data"]["days_written"], 3);
}

#[tokio::test]
async fn reserve_occupied_range_returns_409() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| {
        Ok(VersionedCalendar {
            version: 2,
            entries: vec![CalendarEntry {
                date: date(2024, 9, 2),
                status: AvailabilityStatus::Occupied,
                booking_ref: Some(Uuid::new_v4()),
                note: None,
            }],
        })
    });

    let app = build_test_app(mock_store);

    let body = json!({
        "start_date": "2024-09-01",
        "end_date": "2024-09-03",
        "booking_ref": Uuid::new_v4()
    });

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/api/v1/workers/{}/calendar/reservations",
                    Uuid::new_v4()
                ))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn reserve_lost_to_concurrent_writer_returns_409() {
    let mut mock_store = MockCalendarStore::new();
    mock_store.expect_load().returning(|_| Ok(empty_calendar()));
    mock_store.expect_save().returning(|worker_id, _, _| {
        Err(AvailabilityServiceError::Conflict(format!(
            "calendar for worker {worker_id} moved from version 0 to 1"
        )))
    });

    let app = build_test_app(mock_store);

    let body = json!({
        "start_date": "2024-09-01",
        "end_date": "2024-09-03",
        "booking_ref": Uuid::new_v4()
    });

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/api/v1/workers/{}/calendar/reservations",
                    Uuid::new_v4()
                ))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
}
