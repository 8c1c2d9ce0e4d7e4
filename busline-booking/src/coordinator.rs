use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use busline_core::booking::Booking;
use busline_core::repository::{BookingRepository, CatalogRepository};
use busline_core::{CoreError, CoreResult};

/// The transactional core of the system. Validates a reservation request
/// against the current trip context, then commits it through the ledger in
/// one atomic storage operation.
///
/// Holds no booking state across calls; every attempt stands alone.
pub struct ReservationCoordinator {
    catalog: Arc<dyn CatalogRepository>,
    ledger: Arc<dyn BookingRepository>,
}

impl ReservationCoordinator {
    pub fn new(catalog: Arc<dyn CatalogRepository>, ledger: Arc<dyn BookingRepository>) -> Self {
        Self { catalog, ledger }
    }

    /// Reserve `seat_no` on `trip_id` for a rider.
    ///
    /// Preconditions are checked in order, each with its own error: the
    /// trip must exist, the seat must lie in [1, capacity], and the rider
    /// name and phone must be non-empty. The commit itself re-checks the
    /// seat under the storage uniqueness constraint; losing a race to a
    /// concurrent rider surfaces as `SeatAlreadyTaken` with zero writes.
    pub async fn reserve(
        &self,
        trip_id: Uuid,
        seat_no: i64,
        rider_name: &str,
        rider_phone: &str,
    ) -> CoreResult<Booking> {
        let ctx = self
            .catalog
            .get_trip_context(trip_id)
            .await?
            .ok_or(CoreError::TripNotFound(trip_id))?;

        if seat_no < 1 || seat_no > ctx.capacity {
            return Err(CoreError::SeatOutOfRange {
                seat_no,
                capacity: ctx.capacity,
            });
        }

        let rider_name = rider_name.trim();
        let rider_phone = rider_phone.trim();
        if rider_name.is_empty() || rider_phone.is_empty() {
            return Err(CoreError::InvalidInput(
                "rider name and phone are required".into(),
            ));
        }

        let booking = self
            .ledger
            .create_booking(trip_id, seat_no, rider_name, rider_phone)
            .await?;

        info!(
            booking_id = %booking.id,
            trip_id = %trip_id,
            seat_no,
            total_amount = booking.total_amount,
            "seat reserved"
        );
        Ok(booking)
    }
}
