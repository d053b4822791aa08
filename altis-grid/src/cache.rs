//! Local lookup caches.
//!
//! Entries live for the life of the process: nothing is evicted and writes
//! never invalidate. Callers must tolerate stale reads after new flights
//! are created.

use altis_core::{Flight, FlightPK, SegmentLookup};
use dashmap::DashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub routes: usize,
    pub flight_lists: usize,
    pub flights: usize,
}

#[derive(Default)]
pub struct FlightCaches {
    /// route key -> segment or negative entry
    segment_by_route: DashMap<String, SegmentLookup>,
    /// segment id + departure date -> flights
    flights_by_route_and_date: DashMap<String, Vec<Flight>>,
    flight_by_pk: DashMap<FlightPK, Flight>,
}

impl FlightCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment(&self, route_key: &str) -> Option<SegmentLookup> {
        self.segment_by_route.get(route_key).map(|e| e.value().clone())
    }

    pub fn insert_segment_if_absent(
        &self,
        route_key: String,
        lookup: SegmentLookup,
    ) -> SegmentLookup {
        insert_if_absent(&self.segment_by_route, route_key, lookup)
    }

    pub fn flights_on_date(&self, date_key: &str) -> Option<Vec<Flight>> {
        self.flights_by_route_and_date
            .get(date_key)
            .map(|e| e.value().clone())
    }

    pub fn insert_flights_if_absent(&self, date_key: String, flights: Vec<Flight>) -> Vec<Flight> {
        insert_if_absent(&self.flights_by_route_and_date, date_key, flights)
    }

    pub fn flight(&self, key: &FlightPK) -> Option<Flight> {
        self.flight_by_pk.get(key).map(|e| e.value().clone())
    }

    pub fn insert_flight_if_absent(&self, key: FlightPK, flight: Flight) -> Flight {
        insert_if_absent(&self.flight_by_pk, key, flight)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            routes: self.segment_by_route.len(),
            flight_lists: self.flights_by_route_and_date.len(),
            flights: self.flight_by_pk.len(),
        }
    }
}

/// First writer wins. Returns the value cached once the call completes, which
/// for a losing racer is the winner's value, not its own.
fn insert_if_absent<K, V>(map: &DashMap<K, V>, key: K, value: V) -> V
where
    K: Eq + Hash,
    V: Clone,
{
    map.entry(key).or_insert(value).value().clone()
}
