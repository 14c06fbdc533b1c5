use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Half-open span of calendar days, `[start, end)`.
///
/// A stay checking out on the day another checks in does not overlap it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// An empty or inverted span is widened to the single day at `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let end = if end <= start {
            add_nights(start, 1)
        } else {
            end
        };
        Self { start, end }
    }

    pub fn from_nights(check_in: NaiveDate, nights: i32) -> Self {
        Self::new(check_in, add_nights(check_in, nights))
    }

    /// Truncates both instants to their UTC calendar date.
    pub fn from_timestamps(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start.date_naive(), end.date_naive())
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d < end)
    }
}

/// `date` plus at least one night, saturating at the last representable date.
pub fn add_nights(date: NaiveDate, nights: i32) -> NaiveDate {
    date.checked_add_days(Days::new(nights.max(1) as u64))
        .unwrap_or(NaiveDate::MAX)
}

/// Parses the timestamp shapes the Bookings API and the web client send.
///
/// Offsets are converted to UTC. Timestamps without an offset are read as UTC,
/// which matches the `Prefer: outlook.timezone="UTC"` header sent on every call.
pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
