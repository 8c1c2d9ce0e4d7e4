use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rider-facing trip search. Origin and destination are matched as
/// case-insensitive substrings; the date, when present, must match exactly.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TripSearchQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub travel_date: Option<NaiveDate>,
}

impl TripSearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.travel_date = Some(date);
        self
    }
}

/// One search result row. `available` is derived from the ledger at query
/// time and may be stale by the time the rider reserves (the reservation
/// path re-checks atomically).
#[derive(Debug, Clone, Serialize)]
pub struct TripSummary {
    pub trip_id: Uuid,
    pub bus_name: String,
    pub bus_category: String,
    pub origin: String,
    pub destination: String,
    pub travel_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub fare_amount: i64,
    pub available: i64,
}
