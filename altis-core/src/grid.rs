//! Contract of the remote keyed store (the data grid).
//!
//! Each named map holds JSON-encoded values under string keys. A session is
//! the unit of transaction ownership: a caller that already began a
//! transaction on a session expects every reader sharing that session to
//! leave the commit to it.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::GridResult;

pub const FLIGHT_MAP_NAME: &str = "Flight";
pub const FLIGHT_SEGMENT_MAP_NAME: &str = "FlightSegment";
pub const AIRPORT_CODE_MAPPING_MAP_NAME: &str = "AirportCodeMapping";

/// Entry point to the grid
pub trait ObjectGrid: Send + Sync {
    fn session(&self) -> GridResult<Arc<dyn GridSession>>;
}

#[async_trait]
pub trait GridSession: Send + Sync {
    fn is_transaction_active(&self) -> bool;

    async fn begin(&self) -> GridResult<()>;

    async fn commit(&self) -> GridResult<()>;

    fn map(&self, name: &str) -> GridResult<Arc<dyn ObjectMap>>;
}

/// One named keyed collection inside a session
#[async_trait]
pub trait ObjectMap: Send + Sync {
    async fn get(&self, key: &str) -> GridResult<Option<Value>>;

    /// Fails with `GridError::DuplicateKey` when `key` is already present.
    async fn insert(&self, key: &str, value: Value) -> GridResult<()>;

    /// Overwrites any existing value.
    async fn upsert(&self, key: &str, value: Value) -> GridResult<()>;
}
