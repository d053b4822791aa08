use altis_core::grid::ObjectGrid;
use altis_core::{AirportCodeMapping, FlightResult};
use std::sync::Arc;
use tracing::info;

use crate::typed::airport_map;

/// Airport code mappings, stored and read straight through (no cache)
pub struct AirportMappingWriter {
    grid: Arc<dyn ObjectGrid>,
}

impl AirportMappingWriter {
    pub fn new(grid: Arc<dyn ObjectGrid>) -> Self {
        Self { grid }
    }

    /// Registering the same code twice fails with a duplicate key error
    pub async fn store_airport_mapping(&self, mapping: &AirportCodeMapping) -> FlightResult<()> {
        let session = self.grid.session()?;
        airport_map(session.as_ref())?
            .insert(&mapping.airport_code, mapping)
            .await?;
        info!("Stored airport mapping {} -> {}", mapping.airport_code, mapping.airport_name);
        Ok(())
    }

    pub async fn get_airport_mapping(
        &self,
        airport_code: &str,
    ) -> FlightResult<Option<AirportCodeMapping>> {
        let session = self.grid.session()?;
        Ok(airport_map(session.as_ref())?.get(airport_code).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGrid;

    #[tokio::test]
    async fn test_duplicate_mapping_is_rejected() {
        let grid = Arc::new(MemoryGrid::new());
        let writer = AirportMappingWriter::new(grid.clone());

        writer
            .store_airport_mapping(&AirportCodeMapping::new("JFK", "New York"))
            .await
            .unwrap();
        let err = writer
            .store_airport_mapping(&AirportCodeMapping::new("JFK", "Kennedy"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());

        let stored = writer.get_airport_mapping("JFK").await.unwrap().unwrap();
        assert_eq!(stored.airport_name, "New York");
        assert!(writer.get_airport_mapping("LAX").await.unwrap().is_none());
    }
}
