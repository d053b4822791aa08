use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Cache key for an origin/destination pair.
///
/// The codes are joined without a separator, so they must be fixed width
/// (IATA three-letter codes) for the key to be unambiguous.
pub fn route_key(from_airport: &str, to_airport: &str) -> String {
    format!("{}{}", from_airport, to_airport)
}

/// Cache key for the flights of one segment on one calendar date
pub fn date_key(segment_id: &str, date: NaiveDate) -> String {
    format!("{}{}", segment_id, date)
}

/// Reduces timestamps to calendar dates in a fixed zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    offset: FixedOffset,
}

impl DateNormalizer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// `None` when the offset is a day or more
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn normalize(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    pub fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.normalize(a) == self.normalize(b)
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::utc()
    }
}
