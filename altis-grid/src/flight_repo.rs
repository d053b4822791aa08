use altis_core::grid::ObjectGrid;
use altis_core::repository::FlightService;
use altis_core::{
    AirportCodeMapping, Flight, FlightPK, FlightResult, FlightSegment, KeyGenerator, NewFlight,
    SegmentLookup,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::airport::AirportMappingWriter;
use crate::app_config::LookupConfig;
use crate::cache::FlightCaches;
use crate::flight_by_key::FlightByKeyResolver;
use crate::flight_by_route::FlightByRouteResolver;
use crate::indexer::WriteIndexer;
use crate::keys::DateNormalizer;
use crate::segment::SegmentResolver;

/// Grid-backed flight service sharing one set of lookup caches
pub struct GridFlightService {
    caches: Arc<FlightCaches>,
    segments: Arc<SegmentResolver>,
    by_key: FlightByKeyResolver,
    by_route: FlightByRouteResolver,
    indexer: WriteIndexer,
    airports: AirportMappingWriter,
}

impl GridFlightService {
    pub fn new(grid: Arc<dyn ObjectGrid>, keys: Arc<dyn KeyGenerator>) -> Self {
        Self::with_caches(
            grid,
            keys,
            Arc::new(FlightCaches::new()),
            &LookupConfig::default(),
            DateNormalizer::utc(),
        )
    }

    pub fn from_config(
        grid: Arc<dyn ObjectGrid>,
        keys: Arc<dyn KeyGenerator>,
        lookup: &LookupConfig,
    ) -> Result<Self, config::ConfigError> {
        let dates = lookup.date_normalizer()?;
        Ok(Self::with_caches(
            grid,
            keys,
            Arc::new(FlightCaches::new()),
            lookup,
            dates,
        ))
    }

    /// Caches are usually built once at startup and shared process wide
    pub fn with_caches(
        grid: Arc<dyn ObjectGrid>,
        keys: Arc<dyn KeyGenerator>,
        caches: Arc<FlightCaches>,
        lookup: &LookupConfig,
        dates: DateNormalizer,
    ) -> Self {
        let segments = Arc::new(
            SegmentResolver::new(grid.clone(), caches.clone())
                .with_code_validation(lookup.validate_airport_codes),
        );
        Self {
            by_key: FlightByKeyResolver::new(grid.clone(), caches.clone()),
            by_route: FlightByRouteResolver::new(
                grid.clone(),
                caches.clone(),
                segments.clone(),
                dates,
            ),
            indexer: WriteIndexer::new(grid.clone(), keys),
            airports: AirportMappingWriter::new(grid),
            segments,
            caches,
        }
    }

    pub fn caches(&self) -> &Arc<FlightCaches> {
        &self.caches
    }

    pub async fn get_segment(
        &self,
        from_airport: &str,
        to_airport: &str,
    ) -> FlightResult<SegmentLookup> {
        self.segments.resolve(from_airport, to_airport).await
    }
}

#[async_trait]
impl FlightService for GridFlightService {
    async fn get_flight_by_key(&self, key: &FlightPK) -> FlightResult<Flight> {
        self.by_key.resolve(key).await
    }

    async fn get_flights_by_airports_and_date(
        &self,
        from_airport: &str,
        to_airport: &str,
        departure: DateTime<Utc>,
    ) -> FlightResult<Vec<Flight>> {
        self.by_route
            .by_airports_and_date(from_airport, to_airport, departure)
            .await
    }

    async fn get_flights_by_airports(
        &self,
        from_airport: &str,
        to_airport: &str,
    ) -> FlightResult<Vec<Flight>> {
        self.by_route.by_airports(from_airport, to_airport).await
    }

    async fn create_new_flight(&self, details: NewFlight) -> FlightResult<Flight> {
        self.indexer.create_flight(details).await
    }

    async fn store_flight_segment(&self, segment: &FlightSegment) -> FlightResult<()> {
        self.indexer.store_segment(segment).await
    }

    async fn store_airport_mapping(&self, mapping: &AirportCodeMapping) -> FlightResult<()> {
        self.airports.store_airport_mapping(mapping).await
    }

    async fn get_airport_mapping(
        &self,
        airport_code: &str,
    ) -> FlightResult<Option<AirportCodeMapping>> {
        self.airports.get_airport_mapping(airport_code).await
    }
}
