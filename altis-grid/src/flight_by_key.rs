use altis_core::grid::ObjectGrid;
use altis_core::{Flight, FlightError, FlightPK, FlightResult};
use std::sync::Arc;
use tracing::debug;

use crate::cache::FlightCaches;
use crate::typed::flight_map;

/// Point lookup of a flight by primary key.
///
/// Reads run as single operations on a fresh session without an explicit
/// transaction, unlike the route lookups.
pub struct FlightByKeyResolver {
    grid: Arc<dyn ObjectGrid>,
    caches: Arc<FlightCaches>,
}

impl FlightByKeyResolver {
    pub fn new(grid: Arc<dyn ObjectGrid>, caches: Arc<FlightCaches>) -> Self {
        Self { grid, caches }
    }

    pub async fn resolve(&self, key: &FlightPK) -> FlightResult<Flight> {
        if let Some(hit) = self.caches.flight(key) {
            debug!(flight = %key, "flight cache hit");
            return Ok(hit);
        }

        let session = self.grid.session()?;
        let by_segment = flight_map(session.as_ref())?
            .get(key.flight_segment_id())
            .await?;

        let found = by_segment
            .and_then(|flights| flights.into_iter().find(|flight| flight.id() == key.id()));

        match found {
            Some(flight) => {
                debug!(flight = %key, "flight cache miss");
                Ok(self.caches.insert_flight_if_absent(key.clone(), flight))
            }
            None => Err(FlightError::NotFound(key.clone())),
        }
    }
}
