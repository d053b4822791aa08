use std::sync::Arc;

use altis_core::repository::FlightService;
use altis_core::{FlightSegment, Money, NewFlight, UuidKeyGenerator};
use altis_grid::app_config::Config;
use altis_grid::{GridFlightService, MemoryGrid};
use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "altis_grid=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting flight lookup against grid {}", config.grid.name);

    let grid = Arc::new(MemoryGrid::new());
    let service =
        GridFlightService::from_config(grid.clone(), Arc::new(UuidKeyGenerator), &config.lookup)?;

    // Seed one route with a flight today and one tomorrow
    let segment = FlightSegment::new("AA101", "JFK", "LAX", 2475);
    service.store_flight_segment(&segment).await?;

    let today = Utc::now();
    let mut created = Vec::new();
    for offset in [0, 1] {
        let departure = today + Duration::days(offset);
        let flight = service
            .create_new_flight(NewFlight {
                flight_segment_id: segment.flight_name.clone(),
                scheduled_departure_time: departure,
                scheduled_arrival_time: departure + Duration::hours(6),
                first_class_base_cost: Money::usd(50_000),
                economy_class_base_cost: Money::usd(20_000),
                num_first_class_seats: 10,
                num_economy_class_seats: 200,
                airplane_type_id: "B747".to_string(),
            })
            .await?;
        created.push(flight);
    }

    let on_date = service
        .get_flights_by_airports_and_date("JFK", "LAX", today)
        .await?;
    tracing::info!("JFK -> LAX today: {} flight(s)", on_date.len());

    let all = service.get_flights_by_airports("JFK", "LAX").await?;
    tracing::info!("JFK -> LAX any date: {} flight(s)", all.len());

    if let Some(first) = created.first() {
        let by_key = service.get_flight_by_key(&first.pkey).await?;
        tracing::info!(
            "Resolved flight {} departing {}",
            by_key.pkey,
            by_key.scheduled_departure_time
        );
    }

    let missing = service.get_flights_by_airports("BOS", "SFO").await?;
    tracing::info!("BOS -> SFO: {} flight(s)", missing.len());

    tracing::info!("Cache: {:?}, grid: {:?}", service.caches().stats(), grid.stats());
    Ok(())
}
