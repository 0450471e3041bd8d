//! Storage access for the API.
//!
//! Each table group has a module of free functions over a `Pool<Postgres>`.
//! The traits below bundle them so handlers can run against [`PgStore`] in
//! production and the `mockall` doubles in [`crate::mock`] under test.

pub mod availability;
pub mod booking;
pub mod mentoring;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use mentorhub_core::models::{
    availability::AvailabilitySlot,
    booking::TutoringBooking,
    mentoring::{MentoringRequest, MentoringSession, RequestStatus, SessionStatus},
    role::Role,
};
use uuid::Uuid;

use crate::DbPool;

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn list_slots(&self, owner_id: Uuid, role: Role) -> Result<Vec<AvailabilitySlot>>;

    async fn get_slot(&self, id: Uuid) -> Result<Option<AvailabilitySlot>>;

    /// `None` when the id belongs to another owner's slot.
    async fn upsert_slot(&self, slot: AvailabilitySlot) -> Result<Option<AvailabilitySlot>>;

    async fn delete_slot(&self, owner_id: Uuid, role: Role, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_request(&self, request: MentoringRequest) -> Result<MentoringRequest>;

    async fn get_request(&self, id: Uuid) -> Result<Option<MentoringRequest>>;

    // The writes below only apply to a pending request or a scheduled
    // session and return `None` otherwise.

    async fn set_request_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<MentoringRequest>>;

    async fn accept_request(
        &self,
        request_id: Uuid,
        session: MentoringSession,
    ) -> Result<Option<(MentoringRequest, MentoringSession)>>;

    async fn get_session(&self, id: Uuid) -> Result<Option<MentoringSession>>;

    async fn list_sessions(&self, mentor_id: Uuid) -> Result<Vec<MentoringSession>>;

    async fn set_session_status(
        &self,
        id: Uuid,
        status: SessionStatus,
    ) -> Result<Option<MentoringSession>>;

    async fn reschedule_session(
        &self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<MentoringSession>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: TutoringBooking) -> Result<TutoringBooking>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<TutoringBooking>>;

    async fn active_bookings_for_tutor(&self, tutor_id: Uuid) -> Result<Vec<TutoringBooking>>;

    /// `None` when the booking is no longer pending payment.
    async fn confirm_payment(
        &self,
        id: Uuid,
        payment_reference: String,
    ) -> Result<Option<TutoringBooking>>;

    async fn cancel_booking(&self, id: Uuid) -> Result<Option<TutoringBooking>>;
}

/// PostgreSQL-backed implementation of every repository trait.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl AvailabilityRepository for PgStore {
    async fn list_slots(&self, owner_id: Uuid, role: Role) -> Result<Vec<AvailabilitySlot>> {
        availability::list_slots(&self.pool, owner_id, role).await
    }

    async fn get_slot(&self, id: Uuid) -> Result<Option<AvailabilitySlot>> {
        availability::get_slot(&self.pool, id).await
    }

    async fn upsert_slot(&self, slot: AvailabilitySlot) -> Result<Option<AvailabilitySlot>> {
        availability::upsert_slot(&self.pool, &slot).await
    }

    async fn delete_slot(&self, owner_id: Uuid, role: Role, id: Uuid) -> Result<bool> {
        availability::delete_slot(&self.pool, owner_id, role, id).await
    }
}

#[async_trait]
impl SessionRepository for PgStore {
    async fn create_request(&self, request: MentoringRequest) -> Result<MentoringRequest> {
        mentoring::create_request(&self.pool, &request).await
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<MentoringRequest>> {
        mentoring::get_request(&self.pool, id).await
    }

    async fn set_request_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<MentoringRequest>> {
        mentoring::set_request_status(&self.pool, id, status).await
    }

    async fn accept_request(
        &self,
        request_id: Uuid,
        session: MentoringSession,
    ) -> Result<Option<(MentoringRequest, MentoringSession)>> {
        mentoring::accept_request(&self.pool, request_id, &session).await
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<MentoringSession>> {
        mentoring::get_session(&self.pool, id).await
    }

    async fn list_sessions(&self, mentor_id: Uuid) -> Result<Vec<MentoringSession>> {
        mentoring::list_sessions(&self.pool, mentor_id).await
    }

    async fn set_session_status(
        &self,
        id: Uuid,
        status: SessionStatus,
    ) -> Result<Option<MentoringSession>> {
        mentoring::set_session_status(&self.pool, id, status).await
    }

    async fn reschedule_session(
        &self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<MentoringSession>> {
        mentoring::reschedule_session(&self.pool, id, start, end).await
    }
}

#[async_trait]
impl BookingRepository for PgStore {
    async fn create_booking(&self, booking: TutoringBooking) -> Result<TutoringBooking> {
        booking::create_booking(&self.pool, &booking).await
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<TutoringBooking>> {
        booking::get_booking(&self.pool, id).await
    }

    async fn active_bookings_for_tutor(&self, tutor_id: Uuid) -> Result<Vec<TutoringBooking>> {
        booking::active_bookings_for_tutor(&self.pool, tutor_id).await
    }

    async fn confirm_payment(
        &self,
        id: Uuid,
        payment_reference: String,
    ) -> Result<Option<TutoringBooking>> {
        booking::confirm_payment(&self.pool, id, &payment_reference).await
    }

    async fn cancel_booking(&self, id: Uuid) -> Result<Option<TutoringBooking>> {
        booking::cancel_booking(&self.pool, id).await
    }
}
