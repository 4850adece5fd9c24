pub mod app;
pub mod config;
pub mod date_key;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod series;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::ProgressStore;
