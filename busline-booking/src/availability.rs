use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use busline_core::repository::{BookingRepository, CatalogRepository};
use busline_core::search::{TripSearchQuery, TripSummary};
use busline_core::{CoreError, CoreResult};

/// Derives free-seat information from ledger state. Reads are snapshots:
/// a seat reported free can be gone by the time the rider reserves it, and
/// that race resolves as `SeatAlreadyTaken` on the reservation path, never
/// here.
pub struct AvailabilityCalculator {
    catalog: Arc<dyn CatalogRepository>,
    ledger: Arc<dyn BookingRepository>,
}

impl AvailabilityCalculator {
    pub fn new(catalog: Arc<dyn CatalogRepository>, ledger: Arc<dyn BookingRepository>) -> Self {
        Self { catalog, ledger }
    }

    /// `capacity − count(non-CANCELLED bookings)` for the trip. Never
    /// negative: the storage constraint caps live bookings at capacity.
    pub async fn available(&self, trip_id: Uuid) -> CoreResult<i64> {
        let ctx = self
            .catalog
            .get_trip_context(trip_id)
            .await?
            .ok_or(CoreError::TripNotFound(trip_id))?;
        let occupied = self.ledger.occupied_seats(trip_id).await?;
        Ok((ctx.capacity - occupied.len() as i64).max(0))
    }

    /// The explicit free seat numbers for the trip, ascending.
    pub async fn free_seats(&self, trip_id: Uuid) -> CoreResult<Vec<i64>> {
        let ctx = self
            .catalog
            .get_trip_context(trip_id)
            .await?
            .ok_or(CoreError::TripNotFound(trip_id))?;
        let occupied: HashSet<i64> = self.ledger.occupied_seats(trip_id).await?.into_iter().collect();
        Ok((1..=ctx.capacity).filter(|s| !occupied.contains(s)).collect())
    }

    /// Trip search with per-row availability, filtered and ordered as the
    /// catalog defines it.
    pub async fn search(&self, query: &TripSearchQuery) -> CoreResult<Vec<TripSummary>> {
        self.catalog.search_trips(query).await
    }
}
