use altis_core::grid::ObjectGrid;
use altis_core::{FlightError, FlightResult, SegmentLookup};
use std::sync::Arc;
use tracing::debug;

use crate::cache::FlightCaches;
use crate::keys::route_key;
use crate::tx::LazyTx;
use crate::typed::segment_map;

/// Resolves an origin/destination pair to its segment, caching misses as
/// `SegmentLookup::NotFound`.
pub struct SegmentResolver {
    grid: Arc<dyn ObjectGrid>,
    caches: Arc<FlightCaches>,
    validate_codes: bool,
}

impl SegmentResolver {
    pub fn new(grid: Arc<dyn ObjectGrid>, caches: Arc<FlightCaches>) -> Self {
        Self {
            grid,
            caches,
            validate_codes: true,
        }
    }

    /// Reject empty airport codes before they reach the cache
    pub fn with_code_validation(mut self, enabled: bool) -> Self {
        self.validate_codes = enabled;
        self
    }

    pub async fn resolve(
        &self,
        from_airport: &str,
        to_airport: &str,
    ) -> FlightResult<SegmentLookup> {
        let mut tx = LazyTx::new(self.grid.clone());
        let outcome = self.resolve_with(&mut tx, from_airport, to_airport).await;
        tx.close(outcome).await
    }

    /// Resolution inside a scope the caller closes. The scope is only
    /// acquired on a cache miss.
    pub async fn resolve_with(
        &self,
        tx: &mut LazyTx,
        from_airport: &str,
        to_airport: &str,
    ) -> FlightResult<SegmentLookup> {
        if self.validate_codes {
            validate_codes(from_airport, to_airport)?;
        }

        let key = route_key(from_airport, to_airport);
        if let Some(hit) = self.caches.segment(&key) {
            debug!(route = %key, found = hit.is_found(), "segment cache hit");
            return Ok(hit);
        }

        let session = tx.session().await?;
        let by_origin = segment_map(session.as_ref())?.get(from_airport).await?;

        // Last match wins if the origin set holds more than one segment to
        // the same destination.
        let found = by_origin.and_then(|segments| {
            segments
                .into_iter()
                .filter(|segment| segment.dest_port == to_airport)
                .last()
        });
        debug!(route = %key, found = found.is_some(), "segment cache miss");

        Ok(self.caches.insert_segment_if_absent(key, found.into()))
    }
}

fn validate_codes(from_airport: &str, to_airport: &str) -> FlightResult<()> {
    if from_airport.trim().is_empty() {
        return Err(FlightError::InvalidQuery("origin airport code is empty".to_string()));
    }
    if to_airport.trim().is_empty() {
        return Err(FlightError::InvalidQuery(
            "destination airport code is empty".to_string(),
        ));
    }
    Ok(())
}
