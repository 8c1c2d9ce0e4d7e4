use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use busline_core::catalog::{Bus, Route, Trip, TripContext};
use busline_core::repository::CatalogRepository;
use busline_core::search::{TripSearchQuery, TripSummary};
use busline_core::CoreResult;

use crate::storage_err;

pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct BusRow {
    id: Uuid,
    name: String,
    category: String,
    capacity: i64,
}

impl From<BusRow> for Bus {
    fn from(row: BusRow) -> Self {
        Bus {
            id: row.id,
            name: row.name,
            category: row.category,
            capacity: row.capacity,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RouteRow {
    id: Uuid,
    origin: String,
    destination: String,
    fare_amount: i64,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Route {
            id: row.id,
            origin: row.origin,
            destination: row.destination,
            fare_amount: row.fare_amount,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    bus_id: Uuid,
    route_id: Uuid,
    travel_date: chrono::NaiveDate,
    departure_time: chrono::NaiveTime,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Trip {
            id: row.id,
            bus_id: row.bus_id,
            route_id: row.route_id,
            travel_date: row.travel_date,
            departure_time: row.departure_time,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TripContextRow {
    id: Uuid,
    bus_id: Uuid,
    route_id: Uuid,
    travel_date: chrono::NaiveDate,
    departure_time: chrono::NaiveTime,
    capacity: i64,
    fare_amount: i64,
}

impl From<TripContextRow> for TripContext {
    fn from(row: TripContextRow) -> Self {
        TripContext {
            trip: Trip {
                id: row.id,
                bus_id: row.bus_id,
                route_id: row.route_id,
                travel_date: row.travel_date,
                departure_time: row.departure_time,
            },
            capacity: row.capacity,
            fare_amount: row.fare_amount,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TripSummaryRow {
    trip_id: Uuid,
    bus_name: String,
    bus_category: String,
    origin: String,
    destination: String,
    travel_date: chrono::NaiveDate,
    departure_time: chrono::NaiveTime,
    fare_amount: i64,
    available: i64,
}

impl From<TripSummaryRow> for TripSummary {
    fn from(row: TripSummaryRow) -> Self {
        TripSummary {
            trip_id: row.trip_id,
            bus_name: row.bus_name,
            bus_category: row.bus_category,
            origin: row.origin,
            destination: row.destination,
            travel_date: row.travel_date,
            departure_time: row.departure_time,
            fare_amount: row.fare_amount,
            available: row.available,
        }
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn insert_bus(&self, bus: &Bus) -> CoreResult<()> {
        sqlx::query("INSERT INTO buses (id, name, category, capacity) VALUES (?, ?, ?, ?)")
            .bind(bus.id)
            .bind(&bus.name)
            .bind(&bus.category)
            .bind(bus.capacity)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn get_bus(&self, id: Uuid) -> CoreResult<Option<Bus>> {
        let row = sqlx::query_as::<_, BusRow>(
            "SELECT id, name, category, capacity FROM buses WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.map(Bus::from))
    }

    async fn list_buses(&self) -> CoreResult<Vec<Bus>> {
        let rows = sqlx::query_as::<_, BusRow>(
            "SELECT id, name, category, capacity FROM buses ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(rows.into_iter().map(Bus::from).collect())
    }

    async fn delete_bus(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM buses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_route(&self, route: &Route) -> CoreResult<()> {
        sqlx::query("INSERT INTO routes (id, origin, destination, fare_amount) VALUES (?, ?, ?, ?)")
            .bind(route.id)
            .bind(&route.origin)
            .bind(&route.destination)
            .bind(route.fare_amount)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn get_route(&self, id: Uuid) -> CoreResult<Option<Route>> {
        let row = sqlx::query_as::<_, RouteRow>(
            "SELECT id, origin, destination, fare_amount FROM routes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.map(Route::from))
    }

    async fn list_routes(&self) -> CoreResult<Vec<Route>> {
        let rows = sqlx::query_as::<_, RouteRow>(
            "SELECT id, origin, destination, fare_amount FROM routes ORDER BY origin, destination, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(rows.into_iter().map(Route::from).collect())
    }

    async fn delete_route(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM routes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_route_fare(&self, id: Uuid, fare_amount: i64) -> CoreResult<bool> {
        let result = sqlx::query("UPDATE routes SET fare_amount = ? WHERE id = ?")
            .bind(fare_amount)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_trip(&self, trip: &Trip) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO trips (id, bus_id, route_id, travel_date, departure_time) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(trip.id)
        .bind(trip.bus_id)
        .bind(trip.route_id)
        .bind(trip.travel_date)
        .bind(trip.departure_time)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn get_trip(&self, id: Uuid) -> CoreResult<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>(
            "SELECT id, bus_id, route_id, travel_date, departure_time FROM trips WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.map(Trip::from))
    }

    async fn list_trips(&self) -> CoreResult<Vec<Trip>> {
        let rows = sqlx::query_as::<_, TripRow>(
            "SELECT id, bus_id, route_id, travel_date, departure_time FROM trips \
             ORDER BY travel_date, departure_time, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(rows.into_iter().map(Trip::from).collect())
    }

    async fn delete_trip(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_trip_context(&self, id: Uuid) -> CoreResult<Option<TripContext>> {
        let row = sqlx::query_as::<_, TripContextRow>(
            "SELECT t.id, t.bus_id, t.route_id, t.travel_date, t.departure_time, \
                    b.capacity, r.fare_amount \
             FROM trips t \
             JOIN buses b ON b.id = t.bus_id \
             JOIN routes r ON r.id = t.route_id \
             WHERE t.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.map(TripContext::from))
    }

    async fn search_trips(&self, query: &TripSearchQuery) -> CoreResult<Vec<TripSummary>> {
        // Availability is derived per row, exactly as shown to searchers:
        // capacity minus the live booking count. It may go stale the moment
        // it is read; the reservation path re-checks under the index.
        let rows = sqlx::query_as::<_, TripSummaryRow>(
            "SELECT t.id AS trip_id, b.name AS bus_name, b.category AS bus_category, \
                    r.origin, r.destination, t.travel_date, t.departure_time, r.fare_amount, \
                    b.capacity - ( \
                        SELECT COUNT(*) FROM bookings bk \
                        WHERE bk.trip_id = t.id AND bk.status != 'CANCELLED' \
                    ) AS available \
             FROM trips t \
             JOIN buses b ON b.id = t.bus_id \
             JOIN routes r ON r.id = t.route_id \
             WHERE (?1 IS NULL OR r.origin LIKE '%' || ?1 || '%') \
               AND (?2 IS NULL OR r.destination LIKE '%' || ?2 || '%') \
               AND (?3 IS NULL OR t.travel_date = ?3) \
             ORDER BY t.travel_date, t.departure_time, t.id",
        )
        .bind(query.origin.as_deref())
        .bind(query.destination.as_deref())
        .bind(query.travel_date)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(rows.into_iter().map(TripSummary::from).collect())
    }
}
