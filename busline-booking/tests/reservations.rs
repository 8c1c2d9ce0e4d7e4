use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use busline_booking::{AvailabilityCalculator, BookingLedger, ReservationCoordinator};
use busline_catalog::CatalogService;
use busline_core::booking::BookingStatus;
use busline_core::repository::{BookingRepository, CatalogRepository};
use busline_core::CoreError;
use busline_store::{DbClient, SqliteBookingRepository, SqliteCatalogRepository};

struct Harness {
    catalog: CatalogService,
    coordinator: Arc<ReservationCoordinator>,
    ledger: BookingLedger,
    availability: AvailabilityCalculator,
}

async fn harness() -> Harness {
    let db = DbClient::in_memory().await.unwrap();
    db.migrate().await.unwrap();

    let catalog_repo: Arc<dyn CatalogRepository> =
        Arc::new(SqliteCatalogRepository::new(db.pool.clone()));
    let booking_repo: Arc<dyn BookingRepository> =
        Arc::new(SqliteBookingRepository::new(db.pool.clone()));

    Harness {
        catalog: CatalogService::new(catalog_repo.clone()),
        coordinator: Arc::new(ReservationCoordinator::new(
            catalog_repo.clone(),
            booking_repo.clone(),
        )),
        ledger: BookingLedger::new(booking_repo.clone()),
        availability: AvailabilityCalculator::new(catalog_repo, booking_repo),
    }
}

async fn seeded_trip(h: &Harness, capacity: i64, fare_amount: i64) -> Uuid {
    let bus = h
        .catalog
        .create_bus("Green Line 01", "AC", capacity)
        .await
        .unwrap();
    let route = h
        .catalog
        .create_route("Dhaka", "Chittagong", fare_amount)
        .await
        .unwrap();
    let trip = h
        .catalog
        .create_trip(
            bus.id,
            route.id,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .await
        .unwrap();
    trip.id
}

#[tokio::test]
async fn test_reserve_cancel_rebook_scenario() {
    let h = harness().await;
    let trip = seeded_trip(&h, 2, 70_000).await;

    // Alice takes seat 1.
    let alice = h
        .coordinator
        .reserve(trip, 1, "Alice", "0170000001")
        .await
        .unwrap();
    assert_eq!(alice.status, BookingStatus::Confirmed);
    assert_eq!(alice.total_amount, 70_000);
    assert_eq!(h.availability.available(trip).await.unwrap(), 1);

    // Bob loses the race for seat 1; availability is untouched.
    let err = h
        .coordinator
        .reserve(trip, 1, "Bob", "0170000002")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::SeatAlreadyTaken { seat_no: 1, .. }));
    assert_eq!(h.availability.available(trip).await.unwrap(), 1);

    // Bob takes seat 2; the bus is full.
    h.coordinator
        .reserve(trip, 2, "Bob", "0170000002")
        .await
        .unwrap();
    assert_eq!(h.availability.available(trip).await.unwrap(), 0);
    assert!(h.availability.free_seats(trip).await.unwrap().is_empty());

    // Cancelling Alice frees her seat.
    h.ledger
        .set_status(alice.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(h.availability.available(trip).await.unwrap(), 1);
    assert_eq!(h.availability.free_seats(trip).await.unwrap(), vec![1]);

    // Carol rebooks it under a fresh identity.
    let carol = h
        .coordinator
        .reserve(trip, 1, "Carol", "0170000003")
        .await
        .unwrap();
    assert_ne!(carol.id, alice.id);
    assert_eq!(h.availability.available(trip).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_same_seat_has_one_winner() {
    let h = harness().await;
    let trip = seeded_trip(&h, 40, 70_000).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let coordinator = h.coordinator.clone();
        handles.push(tokio::spawn(async move {
            coordinator
                .reserve(trip, 7, &format!("Rider {i}"), "0170000000")
                .await
        }));
    }

    let mut won = 0;
    let mut lost = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(CoreError::SeatAlreadyTaken { seat_no: 7, .. }) => lost += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(won, 1);
    assert_eq!(lost, 7);
    assert_eq!(h.availability.available(trip).await.unwrap(), 39);
}

#[tokio::test]
async fn test_seat_out_of_range_never_mutates() {
    let h = harness().await;
    let trip = seeded_trip(&h, 2, 70_000).await;

    for seat in [0, -3, 3, 99] {
        let err = h
            .coordinator
            .reserve(trip, seat, "Alice", "0170000001")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::SeatOutOfRange { capacity: 2, .. }
        ));
    }

    assert_eq!(h.availability.available(trip).await.unwrap(), 2);
    assert!(h.ledger.list_for_trip(trip).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_precondition_order() {
    let h = harness().await;
    let trip = seeded_trip(&h, 2, 70_000).await;

    // A missing trip wins over every later check.
    let ghost = Uuid::new_v4();
    let err = h.coordinator.reserve(ghost, 0, "", "").await.unwrap_err();
    assert!(matches!(err, CoreError::TripNotFound(id) if id == ghost));

    // Seat range is checked before rider input.
    let err = h.coordinator.reserve(trip, 0, "", "").await.unwrap_err();
    assert!(matches!(err, CoreError::SeatOutOfRange { .. }));

    // Whitespace-only rider details are rejected.
    let err = h
        .coordinator
        .reserve(trip, 1, "  ", "0170000001")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
    let err = h
        .coordinator
        .reserve(trip, 1, "Alice", "")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));

    assert_eq!(h.availability.available(trip).await.unwrap(), 2);
}

#[tokio::test]
async fn test_fare_is_snapshotted_at_booking_time() {
    let h = harness().await;
    let bus = h.catalog.create_bus("Green Line 01", "AC", 10).await.unwrap();
    let route = h
        .catalog
        .create_route("Dhaka", "Sylhet", 55_000)
        .await
        .unwrap();
    let trip = h
        .catalog
        .create_trip(
            bus.id,
            route.id,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    let early = h
        .coordinator
        .reserve(trip.id, 1, "Alice", "0170000001")
        .await
        .unwrap();
    assert_eq!(early.total_amount, 55_000);

    h.catalog.update_route_fare(route.id, 60_000).await.unwrap();

    // The old booking keeps its total; a new one gets the new fare.
    assert_eq!(h.ledger.get(early.id).await.unwrap().total_amount, 55_000);
    let late = h
        .coordinator
        .reserve(trip.id, 2, "Bob", "0170000002")
        .await
        .unwrap();
    assert_eq!(late.total_amount, 60_000);
}

#[tokio::test]
async fn test_status_state_machine() {
    let h = harness().await;
    let trip = seeded_trip(&h, 4, 70_000).await;

    let booking = h
        .coordinator
        .reserve(trip, 1, "Alice", "0170000001")
        .await
        .unwrap();

    // CONFIRMED -> CONFIRMED is a no-op.
    let same = h
        .ledger
        .set_status(booking.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(same.status, BookingStatus::Confirmed);

    // CONFIRMED -> COMPLETED, then COMPLETED is terminal.
    h.ledger
        .set_status(booking.id, BookingStatus::Completed)
        .await
        .unwrap();
    let err = h
        .ledger
        .set_status(booking.id, BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Cancelled,
        }
    ));

    // A COMPLETED booking still holds its seat.
    assert_eq!(h.availability.available(trip).await.unwrap(), 3);

    // Double cancellation is an accepted no-op and frees the seat once.
    let other = h
        .coordinator
        .reserve(trip, 2, "Bob", "0170000002")
        .await
        .unwrap();
    h.ledger
        .set_status(other.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    h.ledger
        .set_status(other.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(h.availability.available(trip).await.unwrap(), 3);

    let err = h
        .ledger
        .set_status(Uuid::new_v4(), BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "booking", .. }));
}

#[tokio::test]
async fn test_deleting_bus_cascades_to_trips_and_bookings() {
    let h = harness().await;
    let bus = h.catalog.create_bus("Green Line 01", "AC", 4).await.unwrap();
    let route = h
        .catalog
        .create_route("Dhaka", "Chittagong", 70_000)
        .await
        .unwrap();
    let trip = h
        .catalog
        .create_trip(
            bus.id,
            route.id,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    h.coordinator
        .reserve(trip.id, 1, "Alice", "0170000001")
        .await
        .unwrap();

    h.catalog.delete_bus(bus.id).await.unwrap();

    let err = h.catalog.get_trip(trip.id).await.unwrap_err();
    assert!(matches!(err, CoreError::TripNotFound(_)));
    let err = h.availability.available(trip.id).await.unwrap_err();
    assert!(matches!(err, CoreError::TripNotFound(_)));
    let err = h
        .coordinator
        .reserve(trip.id, 2, "Bob", "0170000002")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::TripNotFound(_)));

    // The bookings went with the trip.
    assert!(h.ledger.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_free_seats_and_detailed_listing() {
    let h = harness().await;
    let trip = seeded_trip(&h, 4, 70_000).await;

    h.coordinator
        .reserve(trip, 2, "Alice", "0170000001")
        .await
        .unwrap();
    h.coordinator
        .reserve(trip, 4, "Bob", "0170000002")
        .await
        .unwrap();

    assert_eq!(h.availability.free_seats(trip).await.unwrap(), vec![1, 3]);

    let detailed = h.ledger.list_detailed().await.unwrap();
    assert_eq!(detailed.len(), 2);
    assert!(detailed
        .iter()
        .all(|d| d.origin == "Dhaka" && d.destination == "Chittagong"));

    // Search sees the two seats gone.
    let hits = h
        .availability
        .search(&busline_core::TripSearchQuery::new().origin("dha"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].available, 2);
}

#[tokio::test]
async fn test_admin_delete_booking_frees_seat() {
    let h = harness().await;
    let trip = seeded_trip(&h, 2, 70_000).await;

    let booking = h
        .coordinator
        .reserve(trip, 1, "Alice", "0170000001")
        .await
        .unwrap();
    h.ledger.delete(booking.id).await.unwrap();

    assert_eq!(h.availability.available(trip).await.unwrap(), 2);
    let err = h.ledger.delete(booking.id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "booking", .. }));
}
