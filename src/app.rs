use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/select", post(handlers::select_form))
        .route("/tasks", post(handlers::add_task_form))
        .route("/tasks/toggle", post(handlers::toggle_task_form))
        .route("/api/selected", get(handlers::get_selected))
        .route("/api/select", post(handlers::select))
        .route("/api/days/:date", get(handlers::get_day))
        .route("/api/tasks", post(handlers::add_task))
        .route("/api/tasks/:date/:index/toggle", post(handlers::toggle_task))
        .route("/api/series", get(handlers::get_series))
        .with_state(state)
}
