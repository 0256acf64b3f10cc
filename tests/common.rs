use venue_booking::{
    api::router::create_router,
    state::AppState,
    domain::models::{
        operating_hours::{DayHours, OpenPeriod, OperatingHours, WeeklySchedule},
        venue::Venue,
    },
    infra::repositories::{
        sqlite_venue_repo::SqliteVenueRepo,
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_conflict_repo::SqliteConflictRepo,
        sqlite_venue_availability_repo::SqliteVenueAvailabilityRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::Value;

#[allow(dead_code)]
pub fn open_day(periods: &[(&str, &str)]) -> Option<DayHours> {
    Some(DayHours {
        closed: false,
        periods: periods.iter().map(|(o, c)| OpenPeriod::new(o, c)).collect(),
    })
}

/// Monday to Saturday open with `periods`, Sunday closed.
#[allow(dead_code)]
pub fn weekday_hours(periods: &[(&str, &str)]) -> OperatingHours {
    OperatingHours {
        regular: WeeklySchedule {
            monday: open_day(periods),
            tuesday: open_day(periods),
            wednesday: open_day(periods),
            thursday: open_day(periods),
            friday: open_day(periods),
            saturday: open_day(periods),
            sunday: Some(DayHours { closed: true, periods: vec![] }),
        },
        ..Default::default()
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let state = Arc::new(AppState::new(
            Arc::new(SqliteVenueRepo::new(pool.clone())),
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteConflictRepo::new(pool.clone())),
            Arc::new(SqliteVenueAvailabilityRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn seed_vendor(&self, name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO vendors (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await
            .expect("Failed to seed vendor");
        id
    }

    /// Inserts an active venue. `hours: None` leaves the venue on default hours.
    pub async fn seed_venue(
        &self,
        vendor_id: &str,
        name: &str,
        hours: Option<&OperatingHours>,
        timezone: &str,
    ) -> Venue {
        let mut venue = Venue::new(vendor_id.to_string(), name.to_string(), 1200);
        if let Some(hours) = hours {
            venue = venue.with_operating_hours(hours);
        }
        venue.timezone = timezone.to_string();
        self.state.venue_repo.create(&venue).await.expect("Failed to seed venue")
    }

    pub async fn set_venue_active(&self, venue_id: &str, active: bool) {
        sqlx::query("UPDATE venues SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(venue_id)
            .execute(&self.pool)
            .await
            .expect("Failed to update venue");
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        ).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
