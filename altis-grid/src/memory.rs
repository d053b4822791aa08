//! Process-local implementation of the grid contract.
//!
//! Values are kept as JSON documents, the way the remote grid keeps them
//! serialized. Every operation is counted so callers can check how many
//! round trips a lookup cost.

use altis_core::grid::{
    GridSession, ObjectGrid, ObjectMap, AIRPORT_CODE_MAPPING_MAP_NAME, FLIGHT_MAP_NAME,
    FLIGHT_SEGMENT_MAP_NAME,
};
use altis_core::{GridError, GridResult};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Snapshot of operation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridStats {
    pub gets: u64,
    pub inserts: u64,
    pub upserts: u64,
    pub begins: u64,
    pub commits: u64,
}

#[derive(Default)]
struct Counters {
    gets: AtomicU64,
    inserts: AtomicU64,
    upserts: AtomicU64,
    begins: AtomicU64,
    commits: AtomicU64,
}

struct GridState {
    maps: HashMap<String, DashMap<String, Value>>,
    counters: Counters,
    fail_next_get: AtomicBool,
    latency: Option<Duration>,
}

impl GridState {
    async fn round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn map(&self, name: &str) -> GridResult<&DashMap<String, Value>> {
        self.maps
            .get(name)
            .ok_or_else(|| GridError::UnknownMap(name.to_string()))
    }
}

#[derive(Clone)]
pub struct MemoryGrid {
    state: Arc<GridState>,
    shared_session: Option<Arc<MemorySession>>,
}

impl MemoryGrid {
    /// Grid with the flight maps registered; each `session()` is a fresh session.
    pub fn new() -> Self {
        Self::build(None, false)
    }

    /// Every `session()` returns the same session, like a session bound to the
    /// calling thread. Lets a caller hold a transaction open around lookups.
    pub fn with_shared_session() -> Self {
        Self::build(None, true)
    }

    /// Fresh grid that sleeps for `latency` on every map operation
    pub fn with_latency(latency: Duration) -> Self {
        Self::build(Some(latency), false)
    }

    fn build(latency: Option<Duration>, shared: bool) -> Self {
        let maps = [
            FLIGHT_MAP_NAME,
            FLIGHT_SEGMENT_MAP_NAME,
            AIRPORT_CODE_MAPPING_MAP_NAME,
        ]
        .into_iter()
        .map(|name| (name.to_string(), DashMap::new()))
        .collect();

        let state = Arc::new(GridState {
            maps,
            counters: Counters::default(),
            fail_next_get: AtomicBool::new(false),
            latency,
        });
        let shared_session = shared.then(|| Arc::new(MemorySession::new(state.clone())));
        Self {
            state,
            shared_session,
        }
    }

    pub fn stats(&self) -> GridStats {
        let c = &self.state.counters;
        GridStats {
            gets: c.gets.load(Ordering::SeqCst),
            inserts: c.inserts.load(Ordering::SeqCst),
            upserts: c.upserts.load(Ordering::SeqCst),
            begins: c.begins.load(Ordering::SeqCst),
            commits: c.commits.load(Ordering::SeqCst),
        }
    }

    /// The next `get` on any map fails with a connectivity error
    pub fn fail_next_get(&self) {
        self.state.fail_next_get.store(true, Ordering::SeqCst);
    }

    /// Raw stored document, bypassing counters
    pub fn peek(&self, map: &str, key: &str) -> Option<Value> {
        self.state
            .maps
            .get(map)
            .and_then(|m| m.get(key).map(|v| v.value().clone()))
    }
}

impl Default for MemoryGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectGrid for MemoryGrid {
    fn session(&self) -> GridResult<Arc<dyn GridSession>> {
        match &self.shared_session {
            Some(session) => Ok(session.clone()),
            None => Ok(Arc::new(MemorySession::new(self.state.clone()))),
        }
    }
}

pub struct MemorySession {
    state: Arc<GridState>,
    transaction_active: AtomicBool,
}

impl MemorySession {
    fn new(state: Arc<GridState>) -> Self {
        Self {
            state,
            transaction_active: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl GridSession for MemorySession {
    fn is_transaction_active(&self) -> bool {
        self.transaction_active.load(Ordering::SeqCst)
    }

    async fn begin(&self) -> GridResult<()> {
        self.transaction_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| GridError::TransactionAlreadyActive)?;
        self.state.counters.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit(&self) -> GridResult<()> {
        self.transaction_active
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| GridError::NoActiveTransaction)?;
        self.state.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn map(&self, name: &str) -> GridResult<Arc<dyn ObjectMap>> {
        self.state.map(name)?;
        Ok(Arc::new(MemoryMap {
            state: self.state.clone(),
            name: name.to_string(),
        }))
    }
}

struct MemoryMap {
    state: Arc<GridState>,
    name: String,
}

#[async_trait]
impl ObjectMap for MemoryMap {
    async fn get(&self, key: &str) -> GridResult<Option<Value>> {
        self.state.round_trip().await;
        self.state.counters.gets.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_next_get.swap(false, Ordering::SeqCst) {
            return Err(GridError::Connectivity(format!(
                "get {}[{}] failed",
                self.name, key
            )));
        }
        let map = self.state.map(&self.name)?;
        Ok(map.get(key).map(|v| v.value().clone()))
    }

    async fn insert(&self, key: &str, value: Value) -> GridResult<()> {
        self.state.round_trip().await;
        self.state.counters.inserts.fetch_add(1, Ordering::SeqCst);
        let map = self.state.map(&self.name)?;
        match map.entry(key.to_string()) {
            Entry::Occupied(_) => Err(GridError::DuplicateKey {
                map: self.name.clone(),
                key: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(value);
                debug!(map = %self.name, key, "grid insert");
                Ok(())
            }
        }
    }

    async fn upsert(&self, key: &str, value: Value) -> GridResult<()> {
        self.state.round_trip().await;
        self.state.counters.upserts.fetch_add(1, Ordering::SeqCst);
        let map = self.state.map(&self.name)?;
        map.insert(key.to_string(), value);
        debug!(map = %self.name, key, "grid upsert");
        Ok(())
    }
}
