use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "COMPLETED" => Some(BookingStatus::Completed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Operator-driven transition table. COMPLETED and CANCELLED are
    /// terminal; re-entering the current status is an idempotent no-op.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        match (self, next) {
            (a, b) if a == b => true,
            (BookingStatus::Confirmed, BookingStatus::Completed) => true,
            (BookingStatus::Confirmed, BookingStatus::Cancelled) => true,
            _ => false,
        }
    }

    /// Whether the booking counts against trip capacity.
    pub fn holds_seat(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One seat on one trip, sold to one rider. `total_amount` is the route
/// fare snapshotted at creation time and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub rider_name: String,
    pub rider_phone: String,
    pub trip_id: Uuid,
    pub seat_no: i64,
    pub status: BookingStatus,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

/// A booking joined with its route and departure, for operator listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDetail {
    pub booking: Booking,
    pub origin: String,
    pub destination: String,
    pub travel_date: NaiveDate,
    pub departure_time: NaiveTime,
}
