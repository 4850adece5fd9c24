use crate::date_key::parse_date_key;
use crate::series::MAX_SERIES_DAYS;
use chrono::{Duration, NaiveDate};
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MIN_DATE: (i32, u32, u32) = (2024, 7, 17);

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Earliest selectable day, also where the trend chart starts.
    pub min_date: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            min_date: default_min_date(),
        }
    }
}

impl Config {
    /// Reads `PORT`, `TRACKER_DATA_DIR` and `TRACKER_MIN_DATE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let data_dir = env::var("TRACKER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let min_date = match env::var("TRACKER_MIN_DATE") {
            Ok(value) => parse_date_key(&value).unwrap_or_else(|| {
                warn!("ignoring unparsable TRACKER_MIN_DATE {value:?}");
                defaults.min_date
            }),
            Err(_) => defaults.min_date,
        };

        Self {
            port,
            data_dir,
            min_date,
        }
    }

    /// Latest selectable day: the last one a chart starting at `min_date`
    /// can still draw.
    pub fn max_date(&self) -> NaiveDate {
        self.min_date
            .checked_add_signed(Duration::days(MAX_SERIES_DAYS - 1))
            .unwrap_or(NaiveDate::MAX)
    }
}

fn default_min_date() -> NaiveDate {
    let (year, month, day) = DEFAULT_MIN_DATE;
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
