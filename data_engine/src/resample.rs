use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::candle_type::Candle;
use crate::error::DataEngineResult;
use crate::timeframe::Timeframe;
use crate::timestamp::Observation;

/// Aggregate observations into one OHLC candle per non-empty bucket.
///
/// Observations are taken in timestamp order, equal timestamps keeping their
/// input order, so `open` is the earliest value of a bucket and `close` the
/// latest. Missing values are skipped; a bucket without any value yields no
/// candle. The result is ordered by bucket label.
pub fn resample_ohlc(observations: &[Observation], timeframe: &Timeframe) -> DataEngineResult<Vec<Candle>> {
    let mut refs: Vec<&Observation> = observations.iter().collect();
    refs.sort_by_key(|o| o.timestamp);

    let mut candles: BTreeMap<NaiveDateTime, Candle> = BTreeMap::new();

    for o in refs {
        let Some(value) = o.value else { continue };
        let bucket = timeframe.bucket(o.timestamp)?;

        match candles.get_mut(&bucket.label) {
            Some(c) => c.update(value),
            None => {
                candles.insert(bucket.label, Candle::new(bucket.label, value));
            }
        }
    }

    debug!(timeframe = %timeframe, input = observations.len(), bars = candles.len(), "resampled");
    Ok(candles.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    fn obs(timestamp: NaiveDateTime, value: f64) -> Observation {
        Observation { timestamp, value: Some(value) }
    }

    fn tf(label: &str) -> Timeframe {
        Timeframe::from_label(label).unwrap()
    }

    #[test]
    fn single_day_bucket() {
        let series = vec![obs(at(2, 9, 0, 0), 10.0), obs(at(2, 12, 0, 0), 12.0), obs(at(2, 15, 0, 0), 9.0)];
        let out = resample_ohlc(&series, &tf("1440")).unwrap();
        assert_eq!(out, vec![Candle { time: at(2, 0, 0, 0), open: 10.0, high: 12.0, low: 9.0, close: 9.0 }]);
    }

    #[test]
    fn empty_buckets_are_dropped() {
        let series = vec![obs(at(2, 9, 0, 30), 1.0), obs(at(2, 9, 3, 0), 2.0), obs(at(2, 9, 3, 59), 3.0)];
        let out = resample_ohlc(&series, &tf("1")).unwrap();
        let times: Vec<NaiveDateTime> = out.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![at(2, 9, 0, 0), at(2, 9, 3, 0)]);
        assert_eq!((out[1].open, out[1].close), (2.0, 3.0));
    }

    #[test]
    fn unsorted_input_is_ordered_by_time() {
        let series = vec![obs(at(2, 10, 20, 0), 5.0), obs(at(2, 10, 5, 0), 7.0), obs(at(2, 9, 59, 0), 1.0)];
        let out = resample_ohlc(&series, &tf("15")).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].time, at(2, 9, 45, 0));
        assert_eq!(out[1].time, at(2, 10, 0, 0));
        assert_eq!(out[2].time, at(2, 10, 15, 0));

        let hour = resample_ohlc(&series, &tf("60")).unwrap();
        assert_eq!(hour[1], Candle { time: at(2, 10, 0, 0), open: 7.0, high: 7.0, low: 5.0, close: 5.0 });
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let t = at(3, 8, 0, 0);
        let series = vec![obs(t, 4.0), obs(t, 6.0), obs(t, 5.0)];
        let out = resample_ohlc(&series, &tf("30")).unwrap();
        assert_eq!((out[0].open, out[0].close), (4.0, 5.0));
    }

    #[test]
    fn missing_values_are_skipped() {
        let series = vec![
            Observation { timestamp: at(2, 0, 1, 0), value: None },
            obs(at(2, 0, 2, 0), 3.0),
            Observation { timestamp: at(2, 0, 3, 0), value: None },
            Observation { timestamp: at(2, 5, 0, 0), value: None },
        ];
        let out = resample_ohlc(&series, &tf("240")).unwrap();
        // the 04:00 bucket has rows but no values
        assert_eq!(out, vec![Candle::new(at(2, 0, 0, 0), 3.0)]);
    }

    #[test]
    fn weekly_bars_are_labelled_by_sunday() {
        // 2024-01-01 is a Monday
        let series = vec![
            obs(at(1, 0, 0, 0), 2.0),
            obs(at(7, 23, 59, 0), 8.0),
            obs(at(8, 0, 0, 0), 3.0),
            obs(at(10, 12, 0, 0), 1.0),
        ];
        let out = resample_ohlc(&series, &tf("10080")).unwrap();
        assert_eq!(
            out,
            vec![
                Candle { time: at(7, 0, 0, 0), open: 2.0, high: 8.0, low: 2.0, close: 8.0 },
                Candle { time: at(14, 0, 0, 0), open: 3.0, high: 3.0, low: 1.0, close: 1.0 },
            ]
        );
    }

    #[test]
    fn empty_input_gives_no_candles() {
        for label in ["1", "720", "10080"] {
            assert!(resample_ohlc(&[], &tf(label)).unwrap().is_empty());
        }
    }
}
