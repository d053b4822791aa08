pub mod grid;
pub mod index;
pub mod keygen;
pub mod model;
pub mod repository;

pub use index::{IndexMember, IndexSet};
pub use keygen::{KeyGenerator, UuidKeyGenerator};
pub use model::{
    AirportCodeMapping, Flight, FlightPK, FlightSegment, Money, NewFlight, SegmentLookup,
};
pub use repository::FlightService;

/// Failures raised by the remote store
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Grid connectivity failure: {0}")]
    Connectivity(String),
    #[error("Duplicate key '{key}' in map '{map}'")]
    DuplicateKey { map: String, key: String },
    #[error("Unknown map: {0}")]
    UnknownMap(String),
    #[error("Transaction already active on this session")]
    TransactionAlreadyActive,
    #[error("No active transaction on this session")]
    NoActiveTransaction,
    #[error("Grid value codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type GridResult<T> = Result<T, GridError>;

/// Failures surfaced by the flight lookup layer
#[derive(Debug, thiserror::Error)]
pub enum FlightError {
    #[error("Flight not found: {0}")]
    NotFound(FlightPK),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Flight store failure: {0}")]
    Store(#[from] GridError),
}

impl FlightError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlightError::NotFound(_))
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, FlightError::Store(GridError::DuplicateKey { .. }))
    }
}

pub type FlightResult<T> = Result<T, FlightError>;
