use chrono::{Duration, NaiveTime, Utc};
use tracing::info;
use uuid::Uuid;

use busline_core::catalog::{Bus, Route, Trip};
use busline_core::repository::CatalogRepository;
use busline_core::CoreResult;

use crate::catalog_repo::SqliteCatalogRepository;
use crate::database::DbClient;
use crate::storage_err;

/// Insert the demo catalog (two buses, two routes, a trip on each) when the
/// catalog is empty. No-op otherwise, so restarts don't duplicate rows.
pub async fn seed_demo_data(db: &DbClient) -> CoreResult<()> {
    let bus_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM buses")
        .fetch_one(&db.pool)
        .await
        .map_err(storage_err)?;
    if bus_count > 0 {
        return Ok(());
    }

    let catalog = SqliteCatalogRepository::new(db.pool.clone());

    let bus_1 = Bus {
        id: Uuid::new_v4(),
        name: "Dhaka-Ctg 01".into(),
        category: "Non-AC".into(),
        capacity: 40,
    };
    let bus_2 = Bus {
        id: Uuid::new_v4(),
        name: "Dhaka-Sylhet 02".into(),
        category: "AC".into(),
        capacity: 30,
    };
    catalog.insert_bus(&bus_1).await?;
    catalog.insert_bus(&bus_2).await?;

    let route_1 = Route {
        id: Uuid::new_v4(),
        origin: "Dhaka".into(),
        destination: "Chittagong".into(),
        fare_amount: 70_000,
    };
    let route_2 = Route {
        id: Uuid::new_v4(),
        origin: "Dhaka".into(),
        destination: "Sylhet".into(),
        fare_amount: 55_000,
    };
    catalog.insert_route(&route_1).await?;
    catalog.insert_route(&route_2).await?;

    let today = Utc::now().date_naive();
    catalog
        .insert_trip(&Trip {
            id: Uuid::new_v4(),
            bus_id: bus_1.id,
            route_id: route_1.id,
            travel_date: today + Duration::days(1),
            departure_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        })
        .await?;
    catalog
        .insert_trip(&Trip {
            id: Uuid::new_v4(),
            bus_id: bus_2.id,
            route_id: route_2.id,
            travel_date: today + Duration::days(2),
            departure_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        })
        .await?;

    info!("Demo catalog seeded");
    Ok(())
}
