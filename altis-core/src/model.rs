use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::index::IndexMember;

/// Amount in minor units (cents) plus ISO currency code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub amount: i64,
    pub currency: String,
}

impl Money {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn usd(amount: i64) -> Self {
        Self::new(amount, "USD")
    }
}

/// Primary key of a flight: owning segment plus the minted flight id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightPK {
    flight_segment_id: String,
    id: String,
}

impl FlightPK {
    pub fn new(flight_segment_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            flight_segment_id: flight_segment_id.into(),
            id: id.into(),
        }
    }

    pub fn flight_segment_id(&self) -> &str {
        &self.flight_segment_id
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for FlightPK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.flight_segment_id, self.id)
    }
}

/// A route template between two airports. `flight_name` is the segment id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSegment {
    pub flight_name: String,
    pub origin_port: String,
    pub dest_port: String,
    #[serde(default)]
    pub miles: u32,
}

impl FlightSegment {
    pub fn new(
        flight_name: impl Into<String>,
        origin_port: impl Into<String>,
        dest_port: impl Into<String>,
        miles: u32,
    ) -> Self {
        Self {
            flight_name: flight_name.into(),
            origin_port: origin_port.into(),
            dest_port: dest_port.into(),
            miles,
        }
    }
}

impl IndexMember for FlightSegment {
    type Identity = (String, String, String);

    fn identity(&self) -> Self::Identity {
        (
            self.flight_name.clone(),
            self.origin_port.clone(),
            self.dest_port.clone(),
        )
    }
}

/// Outcome of resolving an origin/destination pair.
///
/// `NotFound` is the negative cache entry: the route was looked up and the
/// store has no segment for it. It is never written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentLookup {
    Found(FlightSegment),
    NotFound,
}

impl SegmentLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, SegmentLookup::Found(_))
    }

    pub fn segment(&self) -> Option<&FlightSegment> {
        match self {
            SegmentLookup::Found(segment) => Some(segment),
            SegmentLookup::NotFound => None,
        }
    }

    pub fn into_segment(self) -> Option<FlightSegment> {
        match self {
            SegmentLookup::Found(segment) => Some(segment),
            SegmentLookup::NotFound => None,
        }
    }
}

impl From<Option<FlightSegment>> for SegmentLookup {
    fn from(segment: Option<FlightSegment>) -> Self {
        match segment {
            Some(segment) => SegmentLookup::Found(segment),
            None => SegmentLookup::NotFound,
        }
    }
}

/// A scheduled flight instance on a segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub pkey: FlightPK,
    pub scheduled_departure_time: DateTime<Utc>,
    pub scheduled_arrival_time: DateTime<Utc>,
    pub first_class_base_cost: Money,
    pub economy_class_base_cost: Money,
    pub num_first_class_seats: u32,
    pub num_economy_class_seats: u32,
    pub airplane_type_id: String,
    /// Populated by route lookups, never persisted.
    #[serde(skip)]
    pub flight_segment: Option<FlightSegment>,
}

impl Flight {
    pub fn new(id: impl Into<String>, details: NewFlight) -> Self {
        Self {
            pkey: FlightPK::new(details.flight_segment_id, id),
            scheduled_departure_time: details.scheduled_departure_time,
            scheduled_arrival_time: details.scheduled_arrival_time,
            first_class_base_cost: details.first_class_base_cost,
            economy_class_base_cost: details.economy_class_base_cost,
            num_first_class_seats: details.num_first_class_seats,
            num_economy_class_seats: details.num_economy_class_seats,
            airplane_type_id: details.airplane_type_id,
            flight_segment: None,
        }
    }

    pub fn id(&self) -> &str {
        self.pkey.id()
    }

    pub fn flight_segment_id(&self) -> &str {
        self.pkey.flight_segment_id()
    }

    /// Attach the resolved segment (in place)
    pub fn stamp_segment(&mut self, segment: &FlightSegment) {
        self.flight_segment = Some(segment.clone());
    }
}

/// Two flights are the same index member when every field but the minted id
/// matches.
impl IndexMember for Flight {
    type Identity = (
        String,
        DateTime<Utc>,
        DateTime<Utc>,
        Money,
        Money,
        u32,
        u32,
        String,
    );

    fn identity(&self) -> Self::Identity {
        (
            self.pkey.flight_segment_id.clone(),
            self.scheduled_departure_time,
            self.scheduled_arrival_time,
            self.first_class_base_cost.clone(),
            self.economy_class_base_cost.clone(),
            self.num_first_class_seats,
            self.num_economy_class_seats,
            self.airplane_type_id.clone(),
        )
    }
}

/// Field values for a flight that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFlight {
    pub flight_segment_id: String,
    pub scheduled_departure_time: DateTime<Utc>,
    pub scheduled_arrival_time: DateTime<Utc>,
    pub first_class_base_cost: Money,
    pub economy_class_base_cost: Money,
    pub num_first_class_seats: u32,
    pub num_economy_class_seats: u32,
    pub airplane_type_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportCodeMapping {
    pub airport_code: String,
    pub airport_name: String,
}

impl AirportCodeMapping {
    pub fn new(airport_code: impl Into<String>, airport_name: impl Into<String>) -> Self {
        Self {
            airport_code: airport_code.into(),
            airport_name: airport_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn details(dep_hour: u32) -> NewFlight {
        NewFlight {
            flight_segment_id: "AA101".to_string(),
            scheduled_departure_time: Utc.with_ymd_and_hms(2024, 3, 1, dep_hour, 0, 0).unwrap(),
            scheduled_arrival_time: Utc.with_ymd_and_hms(2024, 3, 1, dep_hour + 5, 0, 0).unwrap(),
            first_class_base_cost: Money::usd(50_000),
            economy_class_base_cost: Money::usd(20_000),
            num_first_class_seats: 10,
            num_economy_class_seats: 200,
            airplane_type_id: "B747".to_string(),
        }
    }

    #[test]
    fn test_flight_identity_ignores_minted_id() {
        let a = Flight::new("id-1", details(8));
        let b = Flight::new("id-2", details(8));
        assert_ne!(a, b);
        assert_eq!(a.identity(), b.identity());

        let later = Flight::new("id-3", details(9));
        assert_ne!(a.identity(), later.identity());
    }

    #[test]
    fn test_flight_identity_covers_fares_and_seats() {
        let base = Flight::new("id-1", details(8));

        let mut pricier = details(8);
        pricier.economy_class_base_cost = Money::usd(35_000);
        assert_ne!(base.identity(), Flight::new("id-2", pricier).identity());

        let mut smaller = details(8);
        smaller.num_economy_class_seats = 150;
        assert_ne!(base.identity(), Flight::new("id-3", smaller).identity());
    }

    #[test]
    fn test_segment_back_reference_is_not_serialized() {
        let mut flight = Flight::new("id-1", details(8));
        flight.stamp_segment(&FlightSegment::new("AA101", "JFK", "LAX", 2475));

        let json = serde_json::to_value(&flight).unwrap();
        assert!(json.get("flight_segment").is_none());

        let back: Flight = serde_json::from_value(json).unwrap();
        assert!(back.flight_segment.is_none());
        assert_eq!(back.pkey, flight.pkey);
    }

    #[test]
    fn test_segment_lookup_from_option() {
        let segment = FlightSegment::new("AA101", "JFK", "LAX", 2475);
        assert_eq!(
            SegmentLookup::from(Some(segment.clone())).segment(),
            Some(&segment)
        );
        assert!(!SegmentLookup::from(None).is_found());
    }
}
