use altis_core::grid::ObjectGrid;
use altis_core::{Flight, FlightResult, FlightSegment, KeyGenerator, NewFlight};
use std::sync::Arc;
use tracing::{debug, info};

use crate::typed::{flight_map, segment_map};

/// Writes flights and segments into their secondary index sets.
///
/// Each write reads the set for the index key, adds the record only if no
/// equal member exists, and upserts the set back. Read caches are left alone.
pub struct WriteIndexer {
    grid: Arc<dyn ObjectGrid>,
    keys: Arc<dyn KeyGenerator>,
}

impl WriteIndexer {
    pub fn new(grid: Arc<dyn ObjectGrid>, keys: Arc<dyn KeyGenerator>) -> Self {
        Self { grid, keys }
    }

    /// Returns the flight held by the index for these field values: the new
    /// one, or an equal member that was already there. Either way every
    /// caller-supplied field matches `details`.
    pub async fn create_flight(&self, details: NewFlight) -> FlightResult<Flight> {
        let flight = Flight::new(self.keys.generate(), details);
        let segment_id = flight.flight_segment_id().to_string();

        let session = self.grid.session()?;
        let flights = flight_map(session.as_ref())?;
        let mut by_segment = flights.get(&segment_id).await?.unwrap_or_default();

        if let Some(existing) = by_segment.find(&flight) {
            debug!(segment = %segment_id, flight = %existing.pkey, "flight already indexed");
            return Ok(existing.clone());
        }

        by_segment.insert(flight.clone());
        flights.upsert(&segment_id, &by_segment).await?;
        info!(segment = %segment_id, flight = %flight.pkey, "indexed new flight");
        Ok(flight)
    }

    pub async fn store_segment(&self, segment: &FlightSegment) -> FlightResult<()> {
        let session = self.grid.session()?;
        let segments = segment_map(session.as_ref())?;
        let mut by_origin = segments.get(&segment.origin_port).await?.unwrap_or_default();

        if by_origin.insert(segment.clone()) {
            segments.upsert(&segment.origin_port, &by_origin).await?;
            info!(
                "Indexed segment {} ({} -> {})",
                segment.flight_name, segment.origin_port, segment.dest_port
            );
        } else {
            debug!(segment = %segment.flight_name, "segment already indexed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGrid;
    use altis_core::{IndexSet, Money};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Sequence(AtomicU64);

    impl KeyGenerator for Sequence {
        fn generate(&self) -> String {
            format!("f{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn details(day: u32) -> NewFlight {
        NewFlight {
            flight_segment_id: "AA101".to_string(),
            scheduled_departure_time: Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap(),
            scheduled_arrival_time: Utc.with_ymd_and_hms(2024, 3, day, 14, 0, 0).unwrap(),
            first_class_base_cost: Money::usd(50_000),
            economy_class_base_cost: Money::usd(20_000),
            num_first_class_seats: 10,
            num_economy_class_seats: 200,
            airplane_type_id: "B747".to_string(),
        }
    }

    async fn flights_in(grid: &MemoryGrid, segment_id: &str) -> IndexSet<Flight> {
        let session = grid.session().unwrap();
        flight_map(session.as_ref())
            .unwrap()
            .get(segment_id)
            .await
            .unwrap()
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_create_flight_is_idempotent() {
        let grid = Arc::new(MemoryGrid::new());
        let indexer = WriteIndexer::new(grid.clone(), Arc::new(Sequence::default()));

        let first = indexer.create_flight(details(1)).await.unwrap();
        let second = indexer.create_flight(details(1)).await.unwrap();

        assert_eq!(first.id(), "f1");
        assert_eq!(second, first);
        assert_eq!(flights_in(&grid, "AA101").await.len(), 1);
        assert_eq!(grid.stats().upserts, 1);

        let other_day = indexer.create_flight(details(2)).await.unwrap();
        assert_eq!(other_day.id(), "f3");
        assert_eq!(flights_in(&grid, "AA101").await.len(), 2);
    }

    #[tokio::test]
    async fn test_differing_fares_are_separate_flights() {
        let grid = Arc::new(MemoryGrid::new());
        let indexer = WriteIndexer::new(grid.clone(), Arc::new(Sequence::default()));

        let first = indexer.create_flight(details(1)).await.unwrap();
        let mut repriced = details(1);
        repriced.economy_class_base_cost = Money::usd(35_000);
        repriced.num_economy_class_seats = 150;
        let second = indexer.create_flight(repriced).await.unwrap();

        assert_ne!(second.id(), first.id());
        assert_eq!(second.economy_class_base_cost, Money::usd(35_000));
        assert_eq!(second.num_economy_class_seats, 150);

        let stored = flights_in(&grid, "AA101").await;
        assert_eq!(stored.len(), 2);
        assert!(stored.contains(&second));
    }

    #[tokio::test]
    async fn test_store_segment_does_not_duplicate() {
        let grid = Arc::new(MemoryGrid::new());
        let indexer = WriteIndexer::new(grid.clone(), Arc::new(Sequence::default()));
        let segment = FlightSegment::new("AA101", "JFK", "LAX", 2475);

        indexer.store_segment(&segment).await.unwrap();
        indexer.store_segment(&segment).await.unwrap();
        indexer
            .store_segment(&FlightSegment::new("AA102", "JFK", "SFO", 2586))
            .await
            .unwrap();

        let session = grid.session().unwrap();
        let by_origin = segment_map(session.as_ref())
            .unwrap()
            .get("JFK")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_origin.len(), 2);
        assert_eq!(grid.stats().upserts, 2);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let grid = Arc::new(MemoryGrid::new());
        let indexer = WriteIndexer::new(grid.clone(), Arc::new(Sequence::default()));

        grid.fail_next_get();
        let err = indexer.create_flight(details(1)).await.unwrap_err();
        assert!(matches!(err, altis_core::FlightError::Store(_)));
        assert_eq!(grid.stats().upserts, 0);
    }
}
