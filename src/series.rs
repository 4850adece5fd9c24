use crate::date_key::{date_key, parse_date_key};
use crate::errors::StoreError;
use crate::models::{ScoreMap, SeriesPoint, SeriesResponse};
use chrono::{Duration, NaiveDate};

pub const SERIES_LABEL: &str = "Daily Progress";
pub const Y_MIN: u8 = 0;
pub const Y_MAX: u8 = 100;
pub const Y_STEP: u8 = 10;

/// Longest series the chart will draw, roughly ten years of days.
pub const MAX_SERIES_DAYS: i64 = 3660;

/// One point per calendar day from `start` through the later of `end` and the
/// newest scored day. Days without a score read as zero.
pub fn build_series(
    scores: &ScoreMap,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<SeriesPoint>, StoreError> {
    let end = latest_scored_day(scores).map_or(end, |latest| latest.max(end));
    if end < start {
        return Ok(Vec::new());
    }

    let days = (end - start).num_days() + 1;
    if days > MAX_SERIES_DAYS {
        return Err(StoreError::SeriesSpanTooLong {
            start: date_key(start),
            end: date_key(end),
            days,
            max: MAX_SERIES_DAYS,
        });
    }

    let mut points = Vec::with_capacity(days as usize);
    for offset in 0..days {
        let date = date_key(start + Duration::days(offset));
        let score = scores.get(&date).copied().unwrap_or(0.0);
        points.push(SeriesPoint { date, score });
    }
    Ok(points)
}

pub fn to_chart(points: Vec<SeriesPoint>) -> SeriesResponse {
    let (labels, data) = points
        .into_iter()
        .map(|point| (point.date, point.score))
        .unzip();

    SeriesResponse {
        label: SERIES_LABEL.to_string(),
        labels,
        data,
        y_min: Y_MIN,
        y_max: Y_MAX,
        step: Y_STEP,
    }
}

fn latest_scored_day(scores: &ScoreMap) -> Option<NaiveDate> {
    scores.keys().filter_map(|key| parse_date_key(key)).max()
}
