use axum::http::StatusCode;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    TaskIndexOutOfRange {
        date: String,
        index: usize,
        len: usize,
    },
    SeriesSpanTooLong {
        start: String,
        end: String,
        days: i64,
        max: i64,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskIndexOutOfRange { date, index, len } => write!(
                f,
                "task index {index} is out of range for {date} ({len} tasks)"
            ),
            Self::SeriesSpanTooLong {
                start,
                end,
                days,
                max,
            } => write!(
                f,
                "series from {start} to {end} spans {days} days, more than {max}"
            ),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TaskIndexOutOfRange { .. } => Self::not_found(err.to_string()),
            StoreError::SeriesSpanTooLong { .. } => Self::bad_request(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
