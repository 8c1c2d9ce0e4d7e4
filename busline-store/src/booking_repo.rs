use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use busline_core::booking::{Booking, BookingDetail, BookingStatus};
use busline_core::repository::BookingRepository;
use busline_core::{CoreError, CoreResult};

use crate::storage_err;

pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn decode_status(s: &str) -> CoreResult<BookingStatus> {
    BookingStatus::parse(s)
        .ok_or_else(|| CoreError::Storage(format!("unknown booking status: {s}").into()))
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    rider_name: String,
    rider_phone: String,
    trip_id: Uuid,
    seat_no: i64,
    status: String,
    total_amount: i64,
    created_at: chrono::DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> CoreResult<Booking> {
        Ok(Booking {
            id: self.id,
            rider_name: self.rider_name,
            rider_phone: self.rider_phone,
            trip_id: self.trip_id,
            seat_no: self.seat_no,
            status: decode_status(&self.status)?,
            total_amount: self.total_amount,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingDetailRow {
    id: Uuid,
    rider_name: String,
    rider_phone: String,
    trip_id: Uuid,
    seat_no: i64,
    status: String,
    total_amount: i64,
    created_at: chrono::DateTime<Utc>,
    origin: String,
    destination: String,
    travel_date: chrono::NaiveDate,
    departure_time: chrono::NaiveTime,
}

impl BookingDetailRow {
    fn into_detail(self) -> CoreResult<BookingDetail> {
        Ok(BookingDetail {
            booking: Booking {
                id: self.id,
                rider_name: self.rider_name,
                rider_phone: self.rider_phone,
                trip_id: self.trip_id,
                seat_no: self.seat_no,
                status: decode_status(&self.status)?,
                total_amount: self.total_amount,
                created_at: self.created_at,
            },
            origin: self.origin,
            destination: self.destination,
            travel_date: self.travel_date,
            departure_time: self.departure_time,
        })
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn create_booking(
        &self,
        trip_id: Uuid,
        seat_no: i64,
        rider_name: &str,
        rider_phone: &str,
    ) -> CoreResult<Booking> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        // Single atomic statement: the fare snapshot comes from the joined
        // route row, and the partial unique index on (trip_id, seat_no)
        // rejects the insert if a non-CANCELLED booking already holds the
        // seat. There is no separate check visible to concurrent inserts.
        let row = sqlx::query_as::<_, BookingRow>(
            "INSERT INTO bookings \
                 (id, rider_name, rider_phone, trip_id, seat_no, status, total_amount, created_at) \
             SELECT ?1, ?2, ?3, t.id, ?4, 'CONFIRMED', r.fare_amount, ?5 \
             FROM trips t \
             JOIN routes r ON r.id = t.route_id \
             WHERE t.id = ?6 \
             RETURNING id, rider_name, rider_phone, trip_id, seat_no, status, total_amount, created_at",
        )
        .bind(id)
        .bind(rider_name)
        .bind(rider_phone)
        .bind(seat_no)
        .bind(created_at)
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .map_or(false, |db| db.is_unique_violation())
            {
                CoreError::SeatAlreadyTaken { trip_id, seat_no }
            } else {
                storage_err(e)
            }
        })?;

        match row {
            Some(row) => {
                let booking = row.into_booking()?;
                info!(booking_id = %booking.id, trip_id = %trip_id, seat_no, "booking created");
                Ok(booking)
            }
            // Zero rows inserted: the trip vanished between validation and
            // commit (e.g. a concurrent cascade delete).
            None => Err(CoreError::TripNotFound(trip_id)),
        }
    }

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT id, rider_name, rider_phone, trip_id, seat_no, status, total_amount, created_at \
             FROM bookings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT id, rider_name, rider_phone, trip_id, seat_no, status, total_amount, created_at \
             FROM bookings ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn list_bookings_for_trip(&self, trip_id: Uuid) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT id, rider_name, rider_phone, trip_id, seat_no, status, total_amount, created_at \
             FROM bookings WHERE trip_id = ? ORDER BY seat_no, created_at",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn list_bookings_detailed(&self) -> CoreResult<Vec<BookingDetail>> {
        let rows = sqlx::query_as::<_, BookingDetailRow>(
            "SELECT bk.id, bk.rider_name, bk.rider_phone, bk.trip_id, bk.seat_no, bk.status, \
                    bk.total_amount, bk.created_at, \
                    r.origin, r.destination, t.travel_date, t.departure_time \
             FROM bookings bk \
             JOIN trips t ON t.id = bk.trip_id \
             JOIN routes r ON r.id = t.route_id \
             ORDER BY bk.created_at DESC, bk.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        rows.into_iter().map(BookingDetailRow::into_detail).collect()
    }

    async fn occupied_seats(&self, trip_id: Uuid) -> CoreResult<Vec<i64>> {
        let seats = sqlx::query_scalar::<_, i64>(
            "SELECT seat_no FROM bookings \
             WHERE trip_id = ? AND status != 'CANCELLED' ORDER BY seat_no",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(seats)
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> CoreResult<bool> {
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_booking(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }
}
