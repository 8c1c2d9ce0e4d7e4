use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use busline_core::booking::{Booking, BookingDetail, BookingStatus};
use busline_core::repository::BookingRepository;
use busline_core::{CoreError, CoreResult};

/// Operator-facing view of the booking ledger: status transitions, lookups
/// and administrative deletion. Creation goes through the coordinator only.
pub struct BookingLedger {
    repo: Arc<dyn BookingRepository>,
}

impl BookingLedger {
    pub fn new(repo: Arc<dyn BookingRepository>) -> Self {
        Self { repo }
    }

    /// Transition a booking: CONFIRMED may move to COMPLETED or CANCELLED;
    /// any status may re-enter itself as a no-op. Moving into CANCELLED
    /// permanently frees the seat for new reservations on the trip.
    pub async fn set_status(&self, id: Uuid, next: BookingStatus) -> CoreResult<Booking> {
        let booking = self.repo.get_booking(id).await?.ok_or(CoreError::NotFound {
            entity: "booking",
            id,
        })?;

        if !booking.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: booking.status,
                to: next,
            });
        }
        if booking.status == next {
            // Idempotent re-entry; in particular a second CANCELLED never
            // frees the seat twice.
            return Ok(booking);
        }

        self.repo.update_status(id, next).await?;
        info!(booking_id = %id, prev = %booking.status, next = %next, "booking status changed");
        Ok(Booking {
            status: next,
            ..booking
        })
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Booking> {
        self.repo.get_booking(id).await?.ok_or(CoreError::NotFound {
            entity: "booking",
            id,
        })
    }

    pub async fn list(&self) -> CoreResult<Vec<Booking>> {
        self.repo.list_bookings().await
    }

    pub async fn list_for_trip(&self, trip_id: Uuid) -> CoreResult<Vec<Booking>> {
        self.repo.list_bookings_for_trip(trip_id).await
    }

    /// Bookings joined with their route and departure, for the operator's
    /// overview table.
    pub async fn list_detailed(&self) -> CoreResult<Vec<BookingDetail>> {
        self.repo.list_bookings_detailed().await
    }

    /// Administrative purge. Cancellation is the normal path; deletion
    /// erases the row outright.
    pub async fn delete(&self, id: Uuid) -> CoreResult<()> {
        if !self.repo.delete_booking(id).await? {
            return Err(CoreError::NotFound {
                entity: "booking",
                id,
            });
        }
        info!(booking_id = %id, "booking deleted");
        Ok(())
    }
}
