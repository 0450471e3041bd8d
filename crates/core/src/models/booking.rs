use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{models::availability::hhmm, scheduling::interval::BookedInterval};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingPayment,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending_payment" => Some(BookingStatus::PendingPayment),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// A student's booking of one occurrence of a tutor's availability slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutoringBooking {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub student_id: Uuid,
    pub availability_id: Uuid,
    pub topic: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TutoringBooking {
    pub fn interval(&self) -> BookedInterval {
        BookedInterval::new(self.start, self.end)
    }

    /// Pending bookings hold their seat until cancelled, as do confirmed ones.
    pub fn is_blocking(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub tutor_id: Uuid,
    pub student_id: Uuid,
    pub availability_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub topic: String,
    pub description: String,
    /// IANA timezone the date and time are expressed in. Defaults to UTC.
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub booking: TutoringBooking,
}
