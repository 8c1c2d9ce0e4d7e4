use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::info;
use uuid::Uuid;

use busline_core::catalog::{Bus, Route, Trip};
use busline_core::repository::CatalogRepository;
use busline_core::search::{TripSearchQuery, TripSummary};
use busline_core::{CoreError, CoreResult};

/// Administrative CRUD over buses, routes and trips. No seat logic lives
/// here; the reservation path owns that.
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_bus(&self, name: &str, category: &str, capacity: i64) -> CoreResult<Bus> {
        if capacity < 1 {
            return Err(CoreError::InvalidCapacity(capacity));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("bus name is required".into()));
        }

        let bus = Bus {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.trim().to_string(),
            capacity,
        };
        self.repo.insert_bus(&bus).await?;
        info!(bus_id = %bus.id, capacity, "bus created");
        Ok(bus)
    }

    pub async fn get_bus(&self, id: Uuid) -> CoreResult<Bus> {
        self.repo
            .get_bus(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "bus", id })
    }

    pub async fn list_buses(&self) -> CoreResult<Vec<Bus>> {
        self.repo.list_buses().await
    }

    /// Deletes the bus and, through the storage cascade, every trip it
    /// operates and every booking on those trips.
    pub async fn delete_bus(&self, id: Uuid) -> CoreResult<()> {
        if !self.repo.delete_bus(id).await? {
            return Err(CoreError::NotFound { entity: "bus", id });
        }
        info!(bus_id = %id, "bus deleted (trips and bookings cascade)");
        Ok(())
    }

    pub async fn create_route(
        &self,
        origin: &str,
        destination: &str,
        fare_amount: i64,
    ) -> CoreResult<Route> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err(CoreError::InvalidInput(
                "route origin and destination are required".into(),
            ));
        }
        if fare_amount < 0 {
            return Err(CoreError::InvalidInput(format!(
                "route fare must be non-negative, got {fare_amount}"
            )));
        }

        let route = Route {
            id: Uuid::new_v4(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            fare_amount,
        };
        self.repo.insert_route(&route).await?;
        info!(route_id = %route.id, "route created");
        Ok(route)
    }

    pub async fn get_route(&self, id: Uuid) -> CoreResult<Route> {
        self.repo.get_route(id).await?.ok_or(CoreError::NotFound {
            entity: "route",
            id,
        })
    }

    pub async fn list_routes(&self) -> CoreResult<Vec<Route>> {
        self.repo.list_routes().await
    }

    pub async fn delete_route(&self, id: Uuid) -> CoreResult<()> {
        if !self.repo.delete_route(id).await? {
            return Err(CoreError::NotFound {
                entity: "route",
                id,
            });
        }
        info!(route_id = %id, "route deleted (trips and bookings cascade)");
        Ok(())
    }

    /// Fare edits apply to future bookings only; existing bookings keep the
    /// total snapshotted when they were created.
    pub async fn update_route_fare(&self, id: Uuid, fare_amount: i64) -> CoreResult<()> {
        if fare_amount < 0 {
            return Err(CoreError::InvalidInput(format!(
                "route fare must be non-negative, got {fare_amount}"
            )));
        }
        if !self.repo.update_route_fare(id, fare_amount).await? {
            return Err(CoreError::NotFound {
                entity: "route",
                id,
            });
        }
        Ok(())
    }

    pub async fn create_trip(
        &self,
        bus_id: Uuid,
        route_id: Uuid,
        travel_date: NaiveDate,
        departure_time: NaiveTime,
    ) -> CoreResult<Trip> {
        if self.repo.get_bus(bus_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "bus",
                id: bus_id,
            });
        }
        if self.repo.get_route(route_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "route",
                id: route_id,
            });
        }

        let trip = Trip {
            id: Uuid::new_v4(),
            bus_id,
            route_id,
            travel_date,
            departure_time,
        };
        self.repo.insert_trip(&trip).await?;
        info!(trip_id = %trip.id, %bus_id, %route_id, "trip created");
        Ok(trip)
    }

    pub async fn get_trip(&self, id: Uuid) -> CoreResult<Trip> {
        self.repo
            .get_trip(id)
            .await?
            .ok_or(CoreError::TripNotFound(id))
    }

    pub async fn list_trips(&self) -> CoreResult<Vec<Trip>> {
        self.repo.list_trips().await
    }

    pub async fn delete_trip(&self, id: Uuid) -> CoreResult<()> {
        if !self.repo.delete_trip(id).await? {
            return Err(CoreError::TripNotFound(id));
        }
        info!(trip_id = %id, "trip deleted (bookings cascade)");
        Ok(())
    }

    pub async fn search_trips(&self, query: &TripSearchQuery) -> CoreResult<Vec<TripSummary>> {
        self.repo.search_trips(query).await
    }
}
