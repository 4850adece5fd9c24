use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    // Blobs written by the old browser page stored the label under `task`.
    #[serde(alias = "task")]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

pub type TaskList = Vec<Task>;

/// DateKey -> ordered tasks for that day.
pub type TaskMap = BTreeMap<String, TaskList>;

/// DateKey -> completion percentage in `[0, 100]`.
pub type ScoreMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayView {
    pub date: String,
    pub tasks: TaskList,
    pub score: f64,
    pub score_display: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectedResponse {
    pub date: Option<String>,
    pub day: Option<DayView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    pub applied: bool,
    pub day: Option<DayView>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct AddTaskRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub date: String,
    pub index: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeriesResponse {
    pub label: String,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    pub y_min: u8,
    pub y_max: u8,
    pub step: u8,
}
