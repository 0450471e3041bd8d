use std::sync::Arc;

use axum_test::TestServer;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use fake::{Fake, faker::lorem::en::Sentence};
use mentorhub_api::{ApiState, SchedulingSettings, build_router};
use mentorhub_core::models::{
    availability::AvailabilitySlot,
    mentoring::{MentoringRequest, MentoringSession, RequestStatus, SessionStatus},
    role::Role,
};
use mentorhub_db::mock::repositories::{MockAvailabilityRepo, MockBookingRepo, MockSessionRepo};
use uuid::Uuid;

pub struct TestContext {
    // Add mocks for each repository
    pub availability: MockAvailabilityRepo,
    pub sessions: MockSessionRepo,
    pub bookings: MockBookingRepo,
    pub settings: SchedulingSettings,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            availability: MockAvailabilityRepo::new(),
            sessions: MockSessionRepo::new(),
            bookings: MockBookingRepo::new(),
            settings: SchedulingSettings::default(),
        }
    }

    // Build a server over the mock repositories
    pub fn server(self) -> TestServer {
        let state = ApiState::from_repositories(
            Arc::new(self.availability),
            Arc::new(self.sessions),
            Arc::new(self.bookings),
            self.settings,
        );
        TestServer::new(build_router(Arc::new(state))).expect("Failed to start test server")
    }
}

pub fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").expect("valid HH:MM")
}

pub fn at(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

pub fn slot(owner_id: Uuid, role: Role, day: u8, start: &str, end: &str) -> AvailabilitySlot {
    AvailabilitySlot {
        id: Uuid::new_v4(),
        owner_id,
        role,
        day_of_week: day,
        start_time: time(start),
        end_time: time(end),
        is_active: true,
        max_occupants: 1,
        created_at: at("2024-01-01T00:00:00Z"),
    }
}

pub fn pending_request(mentor_id: Uuid, preferred_start: Option<DateTime<Utc>>) -> MentoringRequest {
    MentoringRequest {
        id: Uuid::new_v4(),
        mentor_id,
        student_id: Uuid::new_v4(),
        topic: "Career planning".to_string(),
        description: Sentence(4..10).fake(),
        preferred_start,
        status: RequestStatus::Pending,
        created_at: at("2024-02-01T09:00:00Z"),
    }
}

pub fn scheduled_session(mentor_id: Uuid, start: DateTime<Utc>) -> MentoringSession {
    MentoringSession {
        id: Uuid::new_v4(),
        mentor_id,
        student_id: Uuid::new_v4(),
        request_id: None,
        topic: "Code review".to_string(),
        start,
        end: start + Duration::hours(1),
        status: SessionStatus::Scheduled,
        created_at: at("2024-02-01T09:00:00Z"),
    }
}
