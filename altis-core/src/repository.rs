use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{AirportCodeMapping, Flight, FlightPK, FlightSegment, NewFlight};
use crate::FlightResult;

/// Repository trait for flight inventory access
#[async_trait]
pub trait FlightService: Send + Sync {
    async fn get_flight_by_key(&self, key: &FlightPK) -> FlightResult<Flight>;

    /// Flights on the route departing on the calendar date of `departure`
    async fn get_flights_by_airports_and_date(
        &self,
        from_airport: &str,
        to_airport: &str,
        departure: DateTime<Utc>,
    ) -> FlightResult<Vec<Flight>>;

    /// Every flight on the route, any date
    async fn get_flights_by_airports(
        &self,
        from_airport: &str,
        to_airport: &str,
    ) -> FlightResult<Vec<Flight>>;

    async fn create_new_flight(&self, details: NewFlight) -> FlightResult<Flight>;

    async fn store_flight_segment(&self, segment: &FlightSegment) -> FlightResult<()>;

    async fn store_airport_mapping(&self, mapping: &AirportCodeMapping) -> FlightResult<()>;

    async fn get_airport_mapping(
        &self,
        airport_code: &str,
    ) -> FlightResult<Option<AirportCodeMapping>>;
}
