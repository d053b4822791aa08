pub mod airport;
pub mod app_config;
pub mod cache;
pub mod flight_by_key;
pub mod flight_by_route;
pub mod flight_repo;
pub mod indexer;
pub mod keys;
pub mod memory;
pub mod segment;
pub mod tx;
pub mod typed;

pub use cache::{CacheStats, FlightCaches};
pub use flight_repo::GridFlightService;
pub use keys::DateNormalizer;
pub use memory::{GridStats, MemoryGrid};
