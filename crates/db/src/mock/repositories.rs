use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use mentorhub_core::models::{
    availability::AvailabilitySlot,
    booking::TutoringBooking,
    mentoring::{MentoringRequest, MentoringSession, RequestStatus, SessionStatus},
    role::Role,
};
use uuid::Uuid;

use crate::repositories::{AvailabilityRepository, BookingRepository, SessionRepository};

// Mock repositories for testing
mock! {
    pub AvailabilityRepo {}

    #[async_trait]
    impl AvailabilityRepository for AvailabilityRepo {
        async fn list_slots(&self, owner_id: Uuid, role: Role) -> eyre::Result<Vec<AvailabilitySlot>>;

        async fn get_slot(&self, id: Uuid) -> eyre::Result<Option<AvailabilitySlot>>;

        async fn upsert_slot(&self, slot: AvailabilitySlot) -> eyre::Result<Option<AvailabilitySlot>>;

        async fn delete_slot(&self, owner_id: Uuid, role: Role, id: Uuid) -> eyre::Result<bool>;
    }
}

mock! {
    pub SessionRepo {}

    #[async_trait]
    impl SessionRepository for SessionRepo {
        async fn create_request(&self, request: MentoringRequest) -> eyre::Result<MentoringRequest>;

        async fn get_request(&self, id: Uuid) -> eyre::Result<Option<MentoringRequest>>;

        async fn set_request_status(
            &self,
            id: Uuid,
            status: RequestStatus,
        ) -> eyre::Result<Option<MentoringRequest>>;

        async fn accept_request(
            &self,
            request_id: Uuid,
            session: MentoringSession,
        ) -> eyre::Result<Option<(MentoringRequest, MentoringSession)>>;

        async fn get_session(&self, id: Uuid) -> eyre::Result<Option<MentoringSession>>;

        async fn list_sessions(&self, mentor_id: Uuid) -> eyre::Result<Vec<MentoringSession>>;

        async fn set_session_status(
            &self,
            id: Uuid,
            status: SessionStatus,
        ) -> eyre::Result<Option<MentoringSession>>;

        async fn reschedule_session(
            &self,
            id: Uuid,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> eyre::Result<Option<MentoringSession>>;
    }
}

mock! {
    pub BookingRepo {}

    #[async_trait]
    impl BookingRepository for BookingRepo {
        async fn create_booking(&self, booking: TutoringBooking) -> eyre::Result<TutoringBooking>;

        async fn get_booking(&self, id: Uuid) -> eyre::Result<Option<TutoringBooking>>;

        async fn active_bookings_for_tutor(
            &self,
            tutor_id: Uuid,
        ) -> eyre::Result<Vec<TutoringBooking>>;

        async fn confirm_payment(
            &self,
            id: Uuid,
            payment_reference: String,
        ) -> eyre::Result<Option<TutoringBooking>>;

        async fn cancel_booking(&self, id: Uuid) -> eyre::Result<Option<TutoringBooking>>;
    }
}
