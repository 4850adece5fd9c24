use crate::config::Config;
use crate::storage::FileStorage;
use crate::store::ProgressStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub store: Arc<Mutex<ProgressStore<FileStorage>>>,
}

impl AppState {
    pub fn new(config: &Config, store: ProgressStore<FileStorage>) -> Self {
        Self {
            min_date: config.min_date,
            max_date: config.max_date(),
            store: Arc::new(Mutex::new(store)),
        }
    }
}
