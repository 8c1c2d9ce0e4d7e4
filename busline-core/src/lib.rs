pub mod booking;
pub mod catalog;
pub mod repository;
pub mod search;

pub use booking::{Booking, BookingDetail, BookingStatus};
pub use catalog::{Bus, Route, Trip, TripContext};
pub use search::{TripSearchQuery, TripSummary};

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Trip not found: {0}")]
    TripNotFound(Uuid),

    #[error("Seat {seat_no} out of range for capacity {capacity}")]
    SeatOutOfRange { seat_no: i64, capacity: i64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Seat {seat_no} already taken on trip {trip_id}")]
    SeatAlreadyTaken { trip_id: Uuid, seat_no: i64 },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid capacity: {0}")]
    InvalidCapacity(i64),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: booking::BookingStatus,
        to: booking::BookingStatus,
    },

    #[error("Storage failure: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// Wrap an underlying persistence error. The core never retries;
    /// retry policy belongs to the caller.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CoreError::Storage(Box::new(err))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
