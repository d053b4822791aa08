use altis_core::grid::{
    GridSession, ObjectMap, AIRPORT_CODE_MAPPING_MAP_NAME, FLIGHT_MAP_NAME,
    FLIGHT_SEGMENT_MAP_NAME,
};
use altis_core::{AirportCodeMapping, Flight, FlightSegment, GridResult, IndexSet};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// Serde view over an untyped grid map
pub struct TypedMap<T> {
    map: Arc<dyn ObjectMap>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedMap<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn open(session: &dyn GridSession, name: &str) -> GridResult<Self> {
        Ok(Self {
            map: session.map(name)?,
            _marker: PhantomData,
        })
    }

    pub async fn get(&self, key: &str) -> GridResult<Option<T>> {
        match self.map.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn insert(&self, key: &str, value: &T) -> GridResult<()> {
        let encoded = serde_json::to_value(value)?;
        self.map.insert(key, encoded).await
    }

    pub async fn upsert(&self, key: &str, value: &T) -> GridResult<()> {
        let encoded = serde_json::to_value(value)?;
        self.map.upsert(key, encoded).await
    }
}

/// segment id -> flights on that segment
pub fn flight_map(session: &dyn GridSession) -> GridResult<TypedMap<IndexSet<Flight>>> {
    TypedMap::open(session, FLIGHT_MAP_NAME)
}

/// origin port -> segments leaving it
pub fn segment_map(session: &dyn GridSession) -> GridResult<TypedMap<IndexSet<FlightSegment>>> {
    TypedMap::open(session, FLIGHT_SEGMENT_MAP_NAME)
}

pub fn airport_map(session: &dyn GridSession) -> GridResult<TypedMap<AirportCodeMapping>> {
    TypedMap::open(session, AIRPORT_CODE_MAPPING_MAP_NAME)
}
