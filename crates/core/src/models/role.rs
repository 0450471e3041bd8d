//! Role descriptors for the scheduling surfaces.
//!
//! Mentors, tutors and counsellors share the same availability and calendar
//! machinery. What differs between them is captured here once, instead of
//! in per-role copies of the scheduling code.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The kind of service an availability owner offers.
///
/// Serialized as the URL path segment used by the REST API
/// (`/api/{role}/availability/...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "mentoring")]
    Mentor,
    #[serde(rename = "tutoring")]
    Tutor,
    #[serde(rename = "counselling")]
    Counsellor,
}

/// How a student obtains a session from an owner of this role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingMode {
    /// Student sends a request, the owner accepts it at a concrete time.
    Request,
    /// Student books a projected slot directly and pays to confirm it.
    PaidBooking,
}

/// Static description of how a role behaves in the scheduling UI and API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDescriptor {
    pub role: Role,
    pub path_segment: &'static str,
    pub owner_label: &'static str,
    pub session_label: &'static str,
    pub default_horizon_days: u32,
    pub booking_mode: BookingMode,
}

impl RoleDescriptor {
    pub fn requires_payment(&self) -> bool {
        self.booking_mode == BookingMode::PaidBooking
    }
}

const MENTOR: RoleDescriptor = RoleDescriptor {
    role: Role::Mentor,
    path_segment: "mentoring",
    owner_label: "mentor",
    session_label: "mentoring session",
    default_horizon_days: 14,
    booking_mode: BookingMode::Request,
};

const TUTOR: RoleDescriptor = RoleDescriptor {
    role: Role::Tutor,
    path_segment: "tutoring",
    owner_label: "tutor",
    session_label: "tutoring session",
    default_horizon_days: 30,
    booking_mode: BookingMode::PaidBooking,
};

const COUNSELLOR: RoleDescriptor = RoleDescriptor {
    role: Role::Counsellor,
    path_segment: "counselling",
    owner_label: "counsellor",
    session_label: "counselling session",
    default_horizon_days: 14,
    booking_mode: BookingMode::Request,
};

impl Role {
    pub const ALL: [Role; 3] = [Role::Mentor, Role::Tutor, Role::Counsellor];

    pub fn descriptor(self) -> &'static RoleDescriptor {
        match self {
            Role::Mentor => &MENTOR,
            Role::Tutor => &TUTOR,
            Role::Counsellor => &COUNSELLOR,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.descriptor().path_segment
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
