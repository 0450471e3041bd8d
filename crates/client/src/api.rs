//! Typed calls against the MentorHub REST API.
//!
//! Every call is raced against the caller's cancellation token, except the
//! ones that take or release a seat: once sent, those run to completion so
//! the caller always learns which booking exists. Responses may use either
//! envelope convention; both are normalized by [`read_envelope`] before the
//! payload reaches the caller.

use chrono::{DateTime, Duration, Utc};
use mentorhub_core::{
    booking_flow::{BookingStep, BookingWizard},
    models::{
        availability::{
            AvailabilityInput, AvailabilityListResponse, AvailabilityResponse, AvailabilitySlot,
            DeleteAvailabilityRequest, DeleteAvailabilityResponse, ProjectionResponse,
        },
        booking::{BookingResponse, ConfirmPaymentRequest, CreateBookingRequest, TutoringBooking},
        envelope::{EnvelopeError, read_envelope},
        mentoring::{
            AcceptRequestResponse, CreateMentoringRequest, MentoringRequest, MentoringRequestResponse,
            MentoringSession, ScheduleTimeRequest, SessionListResponse, SessionResponse,
            SessionStatus,
        },
        role::Role,
    },
    scheduling::{
        conflict::check_reschedule,
        interval::{BookedInterval, CandidateInterval, default_session_length},
        projector::Horizon,
    },
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{ClientError, config::ClientConfig, context::SessionContext};

pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    context: SessionContext,
    session_length: Duration,
}

impl ApiClient {
    pub fn new(config: ClientConfig, context: SessionContext) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;
        Ok(Self {
            http,
            config,
            context,
            session_length: default_session_length(),
        })
    }

    /// Length assumed for sessions whose end time is left out.
    pub fn with_session_length(mut self, session_length: Duration) -> Self {
        self.session_length = session_length;
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    // Availability

    pub async fn list_availability(
        &self,
        role: Role,
        owner_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Vec<AvailabilitySlot>, ClientError> {
        let response: AvailabilityListResponse = self
            .send(self.http.get(self.availability_url(role, owner_id)), cancel)
            .await?;
        Ok(response.availability)
    }

    /// Creates a slot, or updates it when `input` carries an `availability_id`.
    pub async fn save_availability(
        &self,
        role: Role,
        owner_id: Uuid,
        input: &AvailabilityInput,
        cancel: &CancellationToken,
    ) -> Result<AvailabilitySlot, ClientError> {
        input.validate()?;
        let response: AvailabilityResponse = self
            .send(self.http.post(self.availability_url(role, owner_id)).json(input), cancel)
            .await?;
        Ok(response.availability)
    }

    pub async fn update_availability(
        &self,
        role: Role,
        owner_id: Uuid,
        input: &AvailabilityInput,
        cancel: &CancellationToken,
    ) -> Result<AvailabilitySlot, ClientError> {
        if input.availability_id.is_none() {
            return Err(ClientError::Validation(
                "Choose an availability slot to update".to_string(),
            ));
        }
        input.validate()?;
        let response: AvailabilityResponse = self
            .send(self.http.put(self.availability_url(role, owner_id)).json(input), cancel)
            .await?;
        Ok(response.availability)
    }

    pub async fn delete_availability(
        &self,
        role: Role,
        owner_id: Uuid,
        availability_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Uuid, ClientError> {
        let body = DeleteAvailabilityRequest { availability_id };
        let response: DeleteAvailabilityResponse = self
            .send(self.http.delete(self.availability_url(role, owner_id)).json(&body), cancel)
            .await?;
        Ok(response.availability_id)
    }

    pub async fn project_availability(
        &self,
        role: Role,
        owner_id: Uuid,
        horizon: Option<Horizon>,
        timezone: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ProjectionResponse, ClientError> {
        let mut query = Vec::new();
        if let Some(horizon) = horizon {
            query.push(("horizon", horizon.days().to_string()));
        }
        if let Some(timezone) = timezone {
            query.push(("timezone", timezone.to_string()));
        }
        let url = format!("{}projection/", self.availability_url(role, owner_id));
        self.send(self.http.get(url).query(&query), cancel).await
    }

    // Mentoring

    pub async fn list_sessions(
        &self,
        mentor_id: Uuid,
        status: Option<SessionStatus>,
        cancel: &CancellationToken,
    ) -> Result<Vec<MentoringSession>, ClientError> {
        let mut request = self
            .http
            .get(self.config.url(&format!("/api/mentoring/sessions/{}/", mentor_id)));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        let response: SessionListResponse = self.send(request, cancel).await?;
        Ok(response.sessions)
    }

    /// Sends a mentoring request on behalf of the logged-in user.
    pub async fn request_mentoring(
        &self,
        mentor_id: Uuid,
        topic: &str,
        description: &str,
        preferred_start: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> Result<MentoringRequest, ClientError> {
        let student = self.context.require()?;
        let body = CreateMentoringRequest {
            mentor_id,
            student_id: student.id,
            topic: required(topic, "Please enter a topic")?,
            description: required(description, "Please enter a description")?,
            preferred_start,
        };
        let response: MentoringRequestResponse = self
            .send(self.http.post(self.config.url("/api/mentoring/requests/")).json(&body), cancel)
            .await?;
        Ok(response.request)
    }

    /// Accepts `request` at `time`, falling back to the request's preferred
    /// start. Without any start time nothing is sent.
    pub async fn accept_request(
        &self,
        request: &MentoringRequest,
        time: ScheduleTimeRequest,
        cancel: &CancellationToken,
    ) -> Result<AcceptRequestResponse, ClientError> {
        let interval = CandidateInterval::new(time.start.or(request.preferred_start), time.end)
            .resolve(self.session_length)?;
        let url = self
            .config
            .url(&format!("/api/mentoring/requests/{}/accept/", request.id));
        self.send(self.http.post(url).json(&resolved(interval)), cancel).await
    }

    pub async fn decline_request(
        &self,
        request_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<MentoringRequest, ClientError> {
        let url = self
            .config
            .url(&format!("/api/mentoring/requests/{}/decline/", request_id));
        let response: MentoringRequestResponse = self.send(self.http.post(url), cancel).await?;
        Ok(response.request)
    }

    pub async fn cancel_session(
        &self,
        session_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<MentoringSession, ClientError> {
        self.session_action(session_id, "cancel", cancel).await
    }

    pub async fn complete_session(
        &self,
        session_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<MentoringSession, ClientError> {
        self.session_action(session_id, "complete", cancel).await
    }

    /// Moves `session` to `time`. Unchanged times are refused locally.
    pub async fn reschedule_session(
        &self,
        session: &MentoringSession,
        time: ScheduleTimeRequest,
        cancel: &CancellationToken,
    ) -> Result<MentoringSession, ClientError> {
        let interval = CandidateInterval::new(time.start, time.end).resolve(self.session_length)?;
        check_reschedule(&session.interval(), &interval, &[])?;
        let url = self
            .config
            .url(&format!("/api/mentoring/sessions/{}/reschedule/", session.id));
        let response: SessionResponse = self
            .send(self.http.post(url).json(&resolved(interval)), cancel)
            .await?;
        Ok(response.session)
    }

    async fn session_action(
        &self,
        session_id: Uuid,
        action: &str,
        cancel: &CancellationToken,
    ) -> Result<MentoringSession, ClientError> {
        let url = self
            .config
            .url(&format!("/api/mentoring/sessions/{}/{}/", session_id, action));
        let response: SessionResponse = self.send(self.http.post(url), cancel).await?;
        Ok(response.session)
    }

    // Tutoring

    /// Books a seat. A cancelled token stops the call only before it is sent.
    pub async fn create_booking(
        &self,
        request: &CreateBookingRequest,
        cancel: &CancellationToken,
    ) -> Result<TutoringBooking, ClientError> {
        let response: BookingResponse = self
            .send_to_completion(
                self.http
                    .post(self.config.url("/api/tutoring/bookings/create/"))
                    .json(request),
                cancel,
            )
            .await?;
        Ok(response.booking)
    }

    /// Releases a booking's seat. A cancelled token stops the call only before
    /// it is sent.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<TutoringBooking, ClientError> {
        let url = self
            .config
            .url(&format!("/api/tutoring/bookings/{}/cancel/", booking_id));
        let response: BookingResponse = self.send_to_completion(self.http.post(url), cancel).await?;
        Ok(response.booking)
    }

    pub async fn confirm_payment(
        &self,
        booking_id: Uuid,
        payment_reference: &str,
        cancel: &CancellationToken,
    ) -> Result<TutoringBooking, ClientError> {
        let body = ConfirmPaymentRequest {
            payment_reference: required(payment_reference, "Payment reference is required")?,
        };
        let url = self
            .config
            .url(&format!("/api/tutoring/bookings/{}/confirm-payment/", booking_id));
        let response: BookingResponse = self.send(self.http.post(url).json(&body), cancel).await?;
        Ok(response.booking)
    }

    /// Runs the wizard's details step: validates, books, and records the
    /// outcome on the wizard so a failure shows as its banner.
    ///
    /// When `cancel` fires while the booking is in flight, the booking that
    /// comes back is released again and the call ends as cancelled.
    pub async fn submit_booking_details(
        &self,
        wizard: &mut BookingWizard,
        owner_id: Uuid,
        topic: &str,
        description: &str,
        timezone: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<TutoringBooking, ClientError> {
        if !wizard.role().descriptor().requires_payment() {
            return Err(ClientError::Validation(format!(
                "A {} is requested, not booked",
                wizard.role().descriptor().session_label
            )));
        }
        let student = self.context.require()?;
        let draft = wizard.submit_details(topic, description)?;
        let request = draft.into_request(owner_id, student.id, timezone);

        let outcome = self.create_booking(&request, cancel).await;
        wizard.details_submitted(
            outcome
                .as_ref()
                .map(|booking| booking.id)
                .map_err(ToString::to_string),
        )?;
        let booking = outcome?;

        if cancel.is_cancelled() {
            debug!(booking_id = %booking.id, "View closed during booking, releasing it");
            self.abandon_booking(wizard, &CancellationToken::new()).await?;
            return Err(ClientError::Cancelled);
        }
        Ok(booking)
    }

    /// Leaves the wizard. A booking it created and has not paid for is
    /// cancelled on the server first, and the wizard is reset only once that
    /// succeeded. Returns the released booking.
    pub async fn abandon_booking(
        &self,
        wizard: &mut BookingWizard,
        cancel: &CancellationToken,
    ) -> Result<Option<TutoringBooking>, ClientError> {
        let released = match wizard.booking_id() {
            Some(booking_id) if wizard.step() == BookingStep::AwaitingPayment => {
                Some(self.cancel_booking(booking_id, cancel).await?)
            }
            _ => None,
        };
        wizard.cancel()?;
        Ok(released)
    }

    /// Runs the wizard's payment step for the booking it created.
    pub async fn submit_booking_payment(
        &self,
        wizard: &mut BookingWizard,
        payment_reference: &str,
        cancel: &CancellationToken,
    ) -> Result<TutoringBooking, ClientError> {
        let reference = wizard.submit_payment(payment_reference)?;
        let outcome = match wizard.booking_id() {
            Some(booking_id) => self.confirm_payment(booking_id, &reference, cancel).await,
            None => Err(ClientError::Validation("There is no booking to pay for".to_string())),
        };
        wizard.payment_submitted(outcome.as_ref().map(|_| ()).map_err(ToString::to_string))?;
        outcome
    }

    fn availability_url(&self, role: Role, owner_id: Uuid) -> String {
        self.config
            .url(&format!("/api/{}/availability/{}/", role.as_str(), owner_id))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let (status, body) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Request cancelled");
                return Err(ClientError::Cancelled);
            }
            result = exchange(request) => result?,
        };

        decode(status, &body)
    }

    async fn send_to_completion<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let (status, body) = exchange(request).await?;
        decode(status, &body)
    }
}

async fn exchange(request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ClientError> {
    let result = async {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, body.to_vec()))
    }
    .await;

    result.map_err(|err| {
        warn!("Request failed: {}", err);
        ClientError::Network(err)
    })
}

/// Turns a response into its payload or the error the user should see.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ClientError> {
    match read_envelope::<T>(body) {
        Err(EnvelopeError::Rejected(message)) => Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        }),
        // Error statuses without a readable message still reach the user as a refusal
        _ if !status.is_success() => Err(ClientError::Rejected {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        }),
        Ok(payload) => Ok(payload),
        Err(err) => {
            warn!(status = status.as_u16(), "Unreadable response: {}", err);
            Err(ClientError::Response(err))
        }
    }
}

fn resolved(interval: BookedInterval) -> ScheduleTimeRequest {
    ScheduleTimeRequest {
        start: Some(interval.start),
        end: Some(interval.end),
    }
}

fn required(value: &str, message: &str) -> Result<String, ClientError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::Validation(message.to_string()));
    }
    Ok(value.to_string())
}
