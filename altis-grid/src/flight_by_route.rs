use altis_core::grid::ObjectGrid;
use altis_core::{Flight, FlightResult, FlightSegment, SegmentLookup};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::cache::FlightCaches;
use crate::keys::{date_key, DateNormalizer};
use crate::segment::SegmentResolver;
use crate::tx::LazyTx;
use crate::typed::flight_map;

/// Flight listings for an origin/destination pair.
///
/// Segment resolution and the flight read share one transaction scope. The
/// dated listing is cached per segment and day; the undated listing is read
/// from the grid on every call.
pub struct FlightByRouteResolver {
    grid: Arc<dyn ObjectGrid>,
    caches: Arc<FlightCaches>,
    segments: Arc<SegmentResolver>,
    dates: DateNormalizer,
}

impl FlightByRouteResolver {
    pub fn new(
        grid: Arc<dyn ObjectGrid>,
        caches: Arc<FlightCaches>,
        segments: Arc<SegmentResolver>,
        dates: DateNormalizer,
    ) -> Self {
        Self {
            grid,
            caches,
            segments,
            dates,
        }
    }

    pub async fn by_airports_and_date(
        &self,
        from_airport: &str,
        to_airport: &str,
        departure: DateTime<Utc>,
    ) -> FlightResult<Vec<Flight>> {
        let mut tx = LazyTx::new(self.grid.clone());
        let outcome = self
            .dated_flights(&mut tx, from_airport, to_airport, departure)
            .await;
        tx.close(outcome).await
    }

    pub async fn by_airports(
        &self,
        from_airport: &str,
        to_airport: &str,
    ) -> FlightResult<Vec<Flight>> {
        let mut tx = LazyTx::new(self.grid.clone());
        let outcome = self.all_flights(&mut tx, from_airport, to_airport).await;
        tx.close(outcome).await
    }

    async fn dated_flights(
        &self,
        tx: &mut LazyTx,
        from_airport: &str,
        to_airport: &str,
        departure: DateTime<Utc>,
    ) -> FlightResult<Vec<Flight>> {
        let segment = match self.segments.resolve_with(tx, from_airport, to_airport).await? {
            SegmentLookup::Found(segment) => segment,
            SegmentLookup::NotFound => return Ok(Vec::new()),
        };

        let day = self.dates.normalize(departure);
        let key = date_key(&segment.flight_name, day);
        if let Some(hit) = self.caches.flights_on_date(&key) {
            debug!(segment = %segment.flight_name, %day, "flight list cache hit");
            return Ok(hit);
        }

        let flights: Vec<Flight> = self
            .load(tx, &segment)
            .await?
            .into_iter()
            .filter(|flight| self.dates.normalize(flight.scheduled_departure_time) == day)
            .collect();
        debug!(
            segment = %segment.flight_name,
            %day,
            count = flights.len(),
            "flight list cache miss"
        );

        Ok(self.caches.insert_flights_if_absent(key, flights))
    }

    async fn all_flights(
        &self,
        tx: &mut LazyTx,
        from_airport: &str,
        to_airport: &str,
    ) -> FlightResult<Vec<Flight>> {
        match self.segments.resolve_with(tx, from_airport, to_airport).await? {
            SegmentLookup::Found(segment) => self.load(tx, &segment).await,
            SegmentLookup::NotFound => Ok(Vec::new()),
        }
    }

    /// Every flight on `segment`, stamped with it, in departure order
    async fn load(&self, tx: &mut LazyTx, segment: &FlightSegment) -> FlightResult<Vec<Flight>> {
        let session = tx.session().await?;
        let by_segment = flight_map(session.as_ref())?
            .get(&segment.flight_name)
            .await?
            .unwrap_or_default();

        let mut flights: Vec<Flight> = by_segment
            .into_iter()
            .map(|mut flight| {
                flight.stamp_segment(segment);
                flight
            })
            .collect();
        sort_flights(&mut flights);
        Ok(flights)
    }
}

fn sort_flights(flights: &mut [Flight]) {
    flights.sort_by(|a, b| {
        a.scheduled_departure_time
            .cmp(&b.scheduled_departure_time)
            .then_with(|| a.id().cmp(b.id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGrid;
    use crate::typed::segment_map;
    use altis_core::grid::GridSession;
    use altis_core::{FlightError, IndexSet, Money, NewFlight};
    use chrono::TimeZone;

    fn at(d: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, m, s).unwrap()
    }

    fn flight(id: &str, departure: DateTime<Utc>) -> Flight {
        Flight::new(
            id,
            NewFlight {
                flight_segment_id: "AA101".to_string(),
                scheduled_departure_time: departure,
                scheduled_arrival_time: departure + chrono::Duration::hours(6),
                first_class_base_cost: Money::usd(50_000),
                economy_class_base_cost: Money::usd(20_000),
                num_first_class_seats: 10,
                num_economy_class_seats: 200,
                airplane_type_id: "B747".to_string(),
            },
        )
    }

    struct Fixture {
        grid: Arc<MemoryGrid>,
        caches: Arc<FlightCaches>,
        resolver: FlightByRouteResolver,
    }

    async fn fixture(flights: Vec<Flight>) -> Fixture {
        let grid = Arc::new(MemoryGrid::new());
        let session = grid.session().unwrap();
        let segments: IndexSet<FlightSegment> =
            vec![FlightSegment::new("AA101", "JFK", "LAX", 2475)].into_iter().collect();
        segment_map(session.as_ref()).unwrap().upsert("JFK", &segments).await.unwrap();
        let set: IndexSet<Flight> = flights.into_iter().collect();
        flight_map(session.as_ref()).unwrap().upsert("AA101", &set).await.unwrap();

        let caches = Arc::new(FlightCaches::new());
        let segments = Arc::new(SegmentResolver::new(grid.clone(), caches.clone()));
        let resolver = FlightByRouteResolver::new(
            grid.clone(),
            caches.clone(),
            segments,
            DateNormalizer::utc(),
        );
        Fixture {
            grid,
            caches,
            resolver,
        }
    }

    #[tokio::test]
    async fn test_date_filter_ignores_time_of_day() {
        let fx = fixture(vec![
            flight("late", at(1, 23, 59, 0)),
            flight("early", at(1, 0, 0, 1)),
            flight("next", at(2, 0, 0, 0)),
        ])
        .await;

        let flights = fx
            .resolver
            .by_airports_and_date("JFK", "LAX", at(1, 12, 0, 0))
            .await
            .unwrap();
        let ids: Vec<&str> = flights.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert!(flights
            .iter()
            .all(|f| f.flight_segment.as_ref().map(|s| s.flight_name.as_str()) == Some("AA101")));
    }

    #[tokio::test]
    async fn test_dated_listing_is_cached_in_one_scope() {
        let fx = fixture(vec![flight("f1", at(1, 8, 0, 0))]).await;
        let before = fx.grid.stats();

        fx.resolver
            .by_airports_and_date("JFK", "LAX", at(1, 9, 0, 0))
            .await
            .unwrap();
        let after_first = fx.grid.stats();
        // segment read + flight read under a single transaction
        assert_eq!(after_first.gets - before.gets, 2);
        assert_eq!(after_first.begins, 1);
        assert_eq!(after_first.commits, 1);

        // Other time on the same day hits the cache
        let again = fx
            .resolver
            .by_airports_and_date("JFK", "LAX", at(1, 22, 0, 0))
            .await
            .unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(fx.grid.stats(), after_first);
        assert_eq!(fx.caches.stats().flight_lists, 1);
    }

    #[tokio::test]
    async fn test_unknown_route_skips_flight_reads() {
        let fx = fixture(vec![flight("f1", at(1, 8, 0, 0))]).await;

        assert!(fx
            .resolver
            .by_airports_and_date("BOS", "SFO", at(1, 8, 0, 0))
            .await
            .unwrap()
            .is_empty());
        let after_first = fx.grid.stats();

        // Negative entry now cached: no reads, no transaction
        assert!(fx
            .resolver
            .by_airports_and_date("BOS", "SFO", at(1, 8, 0, 0))
            .await
            .unwrap()
            .is_empty());
        assert!(fx.resolver.by_airports("BOS", "SFO").await.unwrap().is_empty());
        assert_eq!(fx.grid.stats(), after_first);
        assert_eq!(fx.caches.stats().flight_lists, 0);
    }

    #[tokio::test]
    async fn test_undated_listing_is_never_cached() {
        let fx = fixture(vec![flight("b", at(2, 8, 0, 0)), flight("a", at(1, 8, 0, 0))]).await;

        let all = fx.resolver.by_airports("JFK", "LAX").await.unwrap();
        let ids: Vec<&str> = all.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let gets = fx.grid.stats().gets;
        fx.resolver.by_airports("JFK", "LAX").await.unwrap();
        // Segment comes from cache, flights are re-read
        assert_eq!(fx.grid.stats().gets, gets + 1);
        assert_eq!(fx.caches.stats().flight_lists, 0);
    }

    #[tokio::test]
    async fn test_flight_read_failure_commits_and_is_not_cached() {
        let fx = fixture(vec![flight("f1", at(1, 8, 0, 0))]).await;
        // Warm the segment so the failing read is the flight read
        fx.resolver.by_airports("JFK", "LAX").await.unwrap();
        let before = fx.grid.stats();

        fx.grid.fail_next_get();
        let err = fx
            .resolver
            .by_airports_and_date("JFK", "LAX", at(1, 8, 0, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, FlightError::Store(_)));
        let after_failure = fx.grid.stats();
        assert_eq!(after_failure.gets, before.gets + 1);
        assert_eq!(after_failure.begins, before.begins + 1);
        assert_eq!(after_failure.commits, before.commits + 1);
        assert_eq!(fx.caches.stats().flight_lists, 0);

        let retried = fx
            .resolver
            .by_airports_and_date("JFK", "LAX", at(1, 8, 0, 0))
            .await
            .unwrap();
        assert_eq!(retried.len(), 1);
        assert_eq!(fx.grid.stats().gets, after_failure.gets + 1);
        assert_eq!(fx.caches.stats().flight_lists, 1);
    }

    #[tokio::test]
    async fn test_caller_transaction_is_not_committed() {
        let grid = Arc::new(MemoryGrid::with_shared_session());
        let caches = Arc::new(FlightCaches::new());
        let segments = Arc::new(SegmentResolver::new(grid.clone(), caches.clone()));
        let resolver =
            FlightByRouteResolver::new(grid.clone(), caches, segments, DateNormalizer::utc());

        let outer = grid.session().unwrap();
        outer.begin().await.unwrap();
        resolver.by_airports("JFK", "LAX").await.unwrap();
        resolver
            .by_airports_and_date("JFK", "LAX", at(1, 8, 0, 0))
            .await
            .unwrap();

        assert!(outer.is_transaction_active());
        assert_eq!(grid.stats().commits, 0);
        outer.commit().await.unwrap();
    }
}
