use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingDetail, BookingStatus};
use crate::catalog::{Bus, Route, Trip, TripContext};
use crate::search::{TripSearchQuery, TripSummary};
use crate::CoreResult;

/// Repository trait for bus/route/trip data access.
///
/// Deleting a bus or route cascades to its trips and, transitively, their
/// bookings. Delete methods return whether a row existed.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn insert_bus(&self, bus: &Bus) -> CoreResult<()>;
    async fn get_bus(&self, id: Uuid) -> CoreResult<Option<Bus>>;
    async fn list_buses(&self) -> CoreResult<Vec<Bus>>;
    async fn delete_bus(&self, id: Uuid) -> CoreResult<bool>;

    async fn insert_route(&self, route: &Route) -> CoreResult<()>;
    async fn get_route(&self, id: Uuid) -> CoreResult<Option<Route>>;
    async fn list_routes(&self) -> CoreResult<Vec<Route>>;
    async fn delete_route(&self, id: Uuid) -> CoreResult<bool>;
    async fn update_route_fare(&self, id: Uuid, fare_amount: i64) -> CoreResult<bool>;

    async fn insert_trip(&self, trip: &Trip) -> CoreResult<()>;
    async fn get_trip(&self, id: Uuid) -> CoreResult<Option<Trip>>;
    async fn list_trips(&self) -> CoreResult<Vec<Trip>>;
    async fn delete_trip(&self, id: Uuid) -> CoreResult<bool>;

    /// Trip joined with bus capacity and route fare, the inputs every
    /// reservation attempt is validated against.
    async fn get_trip_context(&self, id: Uuid) -> CoreResult<Option<TripContext>>;

    /// Filtered trip listing with per-row availability, ordered by
    /// (date, time) ascending, ties broken by trip id ascending.
    async fn search_trips(&self, query: &TripSearchQuery) -> CoreResult<Vec<TripSummary>>;
}

/// Repository trait for booking data access. The ledger owns all booking
/// rows; nothing outside `create_booking` ever inserts one.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Atomically insert a CONFIRMED booking for (trip, seat), snapshotting
    /// the route fare in the same statement. The storage layer must reject
    /// the insert if a non-CANCELLED booking already holds the seat, and
    /// that rejection surfaces as `CoreError::SeatAlreadyTaken`. A missing
    /// trip surfaces as `CoreError::TripNotFound`.
    async fn create_booking(
        &self,
        trip_id: Uuid,
        seat_no: i64,
        rider_name: &str,
        rider_phone: &str,
    ) -> CoreResult<Booking>;

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>>;
    async fn list_bookings(&self) -> CoreResult<Vec<Booking>>;
    async fn list_bookings_for_trip(&self, trip_id: Uuid) -> CoreResult<Vec<Booking>>;

    /// Bookings joined with route and departure, newest first.
    async fn list_bookings_detailed(&self) -> CoreResult<Vec<BookingDetail>>;

    /// Seat numbers currently held (non-CANCELLED) on a trip, ascending.
    async fn occupied_seats(&self, trip_id: Uuid) -> CoreResult<Vec<i64>>;

    /// Overwrite the status column. Transition legality is enforced by the
    /// ledger before this is called. Returns whether a row existed.
    async fn update_status(&self, id: Uuid, status: BookingStatus) -> CoreResult<bool>;

    async fn delete_booking(&self, id: Uuid) -> CoreResult<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    User,
}

/// Repository trait for the fixed two-account login table. The surrounding
/// presentation layer owns sessions; the core only answers credential checks.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn verify_login(&self, username: &str, password: &str) -> CoreResult<Option<UserRole>>;
}
