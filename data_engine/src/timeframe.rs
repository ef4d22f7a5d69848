use std::fmt;

use chrono::{DateTime, NaiveDateTime};

use crate::error::{DataEngineError, DataEngineResult};

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
pub const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
pub const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;
pub const NANOS_PER_WEEK: i64 = 7 * NANOS_PER_DAY;

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 1_440;
const MINUTES_PER_WEEK: u32 = 10_080;

/// shift so Monday 1969-12-29 00:00 becomes week index 0
const WEEK_MONDAY_ANCHOR_OFFSET: i128 = 3 * NANOS_PER_DAY as i128;

/// Labels written by a default run, in output order.
pub const DEFAULT_TIMEFRAME_LABELS: [&str; 8] =
    ["1", "15", "30", "60", "240", "720", "1440", "10080"];

/// Bucket granularity.
///
/// Variants correspond to:
/// - Minute : `amount` minutes, `amount` divides one day, aligned to midnight
/// - Hour   : `amount` hours, `amount` divides one day, aligned to midnight
/// - Day    : one calendar day
/// - Week   : Monday 00:00 to the next Monday 00:00, labelled by its Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeframeUnit {
    Minute,
    Hour,
    Day,
    Week,
}

impl TimeframeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeframeUnit::Minute => "minute",
            TimeframeUnit::Hour => "hour",
            TimeframeUnit::Day => "day",
            TimeframeUnit::Week => "week",
        }
    }

    fn nanos(&self) -> i64 {
        match self {
            TimeframeUnit::Minute => NANOS_PER_MINUTE,
            TimeframeUnit::Hour => NANOS_PER_HOUR,
            TimeframeUnit::Day => NANOS_PER_DAY,
            TimeframeUnit::Week => NANOS_PER_WEEK,
        }
    }
}

impl fmt::Display for TimeframeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The bucket a timestamp falls into.
///
/// `start` is the inclusive lower edge. `label` is what gets written to the
/// `Time` column: the start for minute/hour/day buckets, the closing Sunday
/// for week buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub start: NaiveDateTime,
    pub label: NaiveDateTime,
}

/// A labelled resampling width, e.g. `"240"` → 4 hours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeframe {
    label: String,
    amount: u32,
    unit: TimeframeUnit,
}

impl Timeframe {
    /// Build a timeframe, rejecting widths that do not line up with calendar
    /// boundaries.
    pub fn new(label: impl Into<String>, amount: u32, unit: TimeframeUnit) -> DataEngineResult<Self> {
        let label = label.into();
        let invalid = |reason: String| DataEngineError::InvalidTimeframe {
            label: label.clone(),
            reason,
        };

        match unit {
            _ if amount == 0 => return Err(invalid("width must be positive".to_string())),
            TimeframeUnit::Minute if MINUTES_PER_DAY % amount != 0 => {
                return Err(invalid(format!("{amount} minutes does not divide one day")));
            }
            TimeframeUnit::Hour if 24 % amount != 0 => {
                return Err(invalid(format!("{amount} hours does not divide one day")));
            }
            TimeframeUnit::Day | TimeframeUnit::Week if amount != 1 => {
                return Err(invalid(format!("only single-{unit} buckets are supported")));
            }
            _ => {}
        }

        Ok(Self { label, amount, unit })
    }

    /// Parse a minute-count label such as `"15"`, `"240"` or `"10080"`.
    ///
    /// The largest whole unit is picked: `"60"` is one hour, `"1440"` one
    /// day, `"10080"` one week.
    pub fn from_label(label: &str) -> DataEngineResult<Self> {
        let minutes: u32 = label.trim().parse().map_err(|_| DataEngineError::InvalidTimeframe {
            label: label.to_string(),
            reason: "label must be a whole number of minutes".to_string(),
        })?;

        let (amount, unit) = if minutes == 0 {
            (0, TimeframeUnit::Minute)
        } else if minutes % MINUTES_PER_WEEK == 0 {
            (minutes / MINUTES_PER_WEEK, TimeframeUnit::Week)
        } else if minutes % MINUTES_PER_DAY == 0 {
            (minutes / MINUTES_PER_DAY, TimeframeUnit::Day)
        } else if minutes % MINUTES_PER_HOUR == 0 {
            (minutes / MINUTES_PER_HOUR, TimeframeUnit::Hour)
        } else {
            (minutes, TimeframeUnit::Minute)
        };

        Timeframe::new(label.trim(), amount, unit)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn unit(&self) -> TimeframeUnit {
        self.unit
    }

    /// Bucket width in nanoseconds.
    pub fn width_nanos(&self) -> i64 {
        self.unit.nanos() * self.amount as i64
    }

    /// Output file name for this timeframe, `candles_M<label>.csv`.
    pub fn file_name(&self) -> String {
        format!("candles_M{}.csv", self.label)
    }

    /// Locate the bucket containing `ts`.
    pub fn bucket(&self, ts: NaiveDateTime) -> DataEngineResult<Bucket> {
        let ns = ts
            .and_utc()
            .timestamp_nanos_opt()
            .ok_or(DataEngineError::BucketOutOfRange(ts))? as i128;
        let width = self.width_nanos() as i128;

        let (start, label) = match self.unit {
            TimeframeUnit::Week => {
                let start = (ns + WEEK_MONDAY_ANCHOR_OFFSET).div_euclid(width) * width
                    - WEEK_MONDAY_ANCHOR_OFFSET;
                (start, start + 6 * NANOS_PER_DAY as i128)
            }
            _ => {
                let start = ns.div_euclid(width) * width;
                (start, start)
            }
        };

        Ok(Bucket {
            start: naive_from_nanos(start).ok_or(DataEngineError::BucketOutOfRange(ts))?,
            label: naive_from_nanos(label).ok_or(DataEngineError::BucketOutOfRange(ts))?,
        })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{} ({} x {})", self.label, self.amount, self.unit)
    }
}

/// The eight timeframes of a default run: 1, 15, 30 minutes; 1, 4, 12 hours;
/// 1 day; 1 week.
pub fn default_timeframes() -> Vec<Timeframe> {
    vec![
        Timeframe { label: "1".into(), amount: 1, unit: TimeframeUnit::Minute },
        Timeframe { label: "15".into(), amount: 15, unit: TimeframeUnit::Minute },
        Timeframe { label: "30".into(), amount: 30, unit: TimeframeUnit::Minute },
        Timeframe { label: "60".into(), amount: 1, unit: TimeframeUnit::Hour },
        Timeframe { label: "240".into(), amount: 4, unit: TimeframeUnit::Hour },
        Timeframe { label: "720".into(), amount: 12, unit: TimeframeUnit::Hour },
        Timeframe { label: "1440".into(), amount: 1, unit: TimeframeUnit::Day },
        Timeframe { label: "10080".into(), amount: 1, unit: TimeframeUnit::Week },
    ]
}

pub(crate) fn naive_from_nanos(ns: i128) -> Option<NaiveDateTime> {
    let per_sec = NANOS_PER_SECOND as i128;
    let secs = i64::try_from(ns.div_euclid(per_sec)).ok()?;
    let sub = ns.rem_euclid(per_sec) as u32;
    DateTime::from_timestamp(secs, sub).map(|dt| dt.naive_utc())
}
