use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical vehicle. Capacity defines the seat universe [1, capacity]
/// for every trip operated by this bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub capacity: i64,
}

/// An origin/destination pair with a fixed fare in minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub fare_amount: i64,
}

/// A scheduled departure of one bus on one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub bus_id: Uuid,
    pub route_id: Uuid,
    pub travel_date: NaiveDate,
    pub departure_time: NaiveTime,
}

/// A trip joined with the bus capacity and route fare it resolves to.
/// This is the context the reservation path validates against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripContext {
    pub trip: Trip,
    pub capacity: i64,
    pub fare_amount: i64,
}
