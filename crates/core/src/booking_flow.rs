//! The booking wizard: select a slot, fill in details, pay, confirmed.
//!
//! Transitions only move forward, except [`BookingWizard::cancel`] which
//! returns to slot selection. Each forward step is gated by local
//! validation. The gates exist to give quick feedback; the server validates
//! the same things again.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::{availability::AvailabilitySlot, booking::CreateBookingRequest, role::Role},
    scheduling::{
        interval::default_session_length,
        projector::{LocalWindow, ProjectionError, session_window},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    SelectSlot,
    FillDetails,
    AwaitingPayment,
    Confirmed,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStep::SelectSlot => "selecting a slot",
            BookingStep::FillDetails => "filling in details",
            BookingStep::AwaitingPayment => "awaiting payment",
            BookingStep::Confirmed => "confirmed",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingFlowError {
    #[error("Cannot do that while {actual}")]
    WrongStep { actual: BookingStep },

    #[error(transparent)]
    Slot(#[from] ProjectionError),

    #[error("Please choose a date in the future")]
    PastDate,

    #[error("Please enter a topic")]
    MissingTopic,

    #[error("Please enter a description")]
    MissingDescription,

    #[error("Payment reference is required")]
    MissingPaymentReference,

    #[error("A submission is already in progress")]
    SubmitInFlight,

    #[error("No submission is in progress")]
    NothingInFlight,

    #[error("This booking is already confirmed")]
    AlreadyConfirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSlot {
    pub availability_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub window: LocalWindow,
}

/// What the details step submits to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub availability_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub topic: String,
    pub description: String,
}

impl BookingDraft {
    pub fn into_request(
        self,
        tutor_id: Uuid,
        student_id: Uuid,
        timezone: Option<String>,
    ) -> CreateBookingRequest {
        CreateBookingRequest {
            tutor_id,
            student_id,
            availability_id: self.availability_id,
            date: self.date,
            start_time: self.start_time,
            topic: self.topic,
            description: self.description,
            timezone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingWizard {
    role: Role,
    step: BookingStep,
    session_length: Duration,
    selection: Option<SelectedSlot>,
    booking_id: Option<Uuid>,
    submitting: bool,
    last_error: Option<String>,
}

impl BookingWizard {
    pub fn new(role: Role) -> Self {
        Self::with_session_length(role, default_session_length())
    }

    pub fn with_session_length(role: Role, session_length: Duration) -> Self {
        Self {
            role,
            step: BookingStep::SelectSlot,
            session_length,
            selection: None,
            booking_id: None,
            submitting: false,
            last_error: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn selection(&self) -> Option<&SelectedSlot> {
        self.selection.as_ref()
    }

    pub fn booking_id(&self) -> Option<Uuid> {
        self.booking_id
    }

    /// Message from the last failed submission, for an inline banner.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn expect_step(&self, step: BookingStep) -> Result<(), BookingFlowError> {
        if self.step != step {
            return Err(BookingFlowError::WrongStep { actual: self.step });
        }
        if self.submitting {
            return Err(BookingFlowError::SubmitInFlight);
        }
        Ok(())
    }

    pub fn select_slot(
        &mut self,
        slot: &AvailabilitySlot,
        date: NaiveDate,
        start_time: NaiveTime,
        now: NaiveDateTime,
    ) -> Result<(), BookingFlowError> {
        self.expect_step(BookingStep::SelectSlot)?;
        let window = session_window(slot, date, start_time, self.session_length)?;
        if window.start <= now {
            return Err(BookingFlowError::PastDate);
        }

        self.selection = Some(SelectedSlot {
            availability_id: slot.id,
            date,
            start_time,
            window,
        });
        self.step = BookingStep::FillDetails;
        Ok(())
    }

    /// Validates the details and starts their submission.
    ///
    /// The returned draft is what the caller sends; report the outcome with
    /// [`BookingWizard::details_submitted`].
    pub fn submit_details(
        &mut self,
        topic: &str,
        description: &str,
    ) -> Result<BookingDraft, BookingFlowError> {
        self.expect_step(BookingStep::FillDetails)?;
        let topic = topic.trim();
        let description = description.trim();
        if topic.is_empty() {
            return Err(BookingFlowError::MissingTopic);
        }
        if description.is_empty() {
            return Err(BookingFlowError::MissingDescription);
        }
        let selection = self
            .selection
            .as_ref()
            .ok_or(BookingFlowError::WrongStep { actual: self.step })?;

        let draft = BookingDraft {
            availability_id: selection.availability_id,
            date: selection.date,
            start_time: selection.start_time,
            topic: topic.to_string(),
            description: description.to_string(),
        };
        self.submitting = true;
        self.last_error = None;
        Ok(draft)
    }

    pub fn details_submitted(&mut self, outcome: Result<Uuid, String>) -> Result<(), BookingFlowError> {
        self.finish_submit(BookingStep::FillDetails)?;
        match outcome {
            Ok(booking_id) => {
                self.booking_id = Some(booking_id);
                self.step = if self.role.descriptor().requires_payment() {
                    BookingStep::AwaitingPayment
                } else {
                    BookingStep::Confirmed
                };
                debug!(%booking_id, step = %self.step, "booking details accepted");
            }
            Err(message) => self.last_error = Some(message),
        }
        Ok(())
    }

    pub fn submit_payment(&mut self, payment_reference: &str) -> Result<String, BookingFlowError> {
        self.expect_step(BookingStep::AwaitingPayment)?;
        let reference = payment_reference.trim();
        if reference.is_empty() {
            return Err(BookingFlowError::MissingPaymentReference);
        }
        self.submitting = true;
        self.last_error = None;
        Ok(reference.to_string())
    }

    pub fn payment_submitted(&mut self, outcome: Result<(), String>) -> Result<(), BookingFlowError> {
        self.finish_submit(BookingStep::AwaitingPayment)?;
        match outcome {
            Ok(()) => self.step = BookingStep::Confirmed,
            Err(message) => self.last_error = Some(message),
        }
        Ok(())
    }

    fn finish_submit(&mut self, step: BookingStep) -> Result<(), BookingFlowError> {
        if self.step != step {
            return Err(BookingFlowError::WrongStep { actual: self.step });
        }
        if !self.submitting {
            return Err(BookingFlowError::NothingInFlight);
        }
        self.submitting = false;
        Ok(())
    }

    /// Abandons the booking and returns to slot selection.
    ///
    /// Returns the id of the booking the details step created, if any. That
    /// booking still holds its seat on the server until it is cancelled there.
    pub fn cancel(&mut self) -> Result<Option<Uuid>, BookingFlowError> {
        if self.step == BookingStep::Confirmed {
            return Err(BookingFlowError::AlreadyConfirmed);
        }
        let created = self.booking_id;
        *self = Self::with_session_length(self.role, self.session_length);
        Ok(created)
    }
}
