use crate::date_key::{date_key, normalize_date_input, parse_date_key};
use crate::errors::AppError;
use crate::models::{
    AddTaskRequest, DayView, MutationResponse, SelectRequest, SelectedResponse, SeriesQuery,
    SeriesResponse, ToggleForm,
};
use crate::series::{build_series, to_chart};
use crate::state::AppState;
use crate::storage::FileStorage;
use crate::store::ProgressStore;
use crate::ui::{render_index, CalendarBounds};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let selected = store.selected();
    let day = selected.map(|date| store.day_view(&date_key(date)));
    let points = build_series(store.scores(), state.min_date, state.min_date).unwrap_or_else(|err| {
        warn!("not drawing chart: {err}");
        Vec::new()
    });

    let bounds = CalendarBounds {
        min: state.min_date,
        max: state.max_date,
        month: selected.unwrap_or_else(|| today().clamp(state.min_date, state.max_date)),
    };
    Html(render_index(&bounds, day.as_ref(), &to_chart(points)))
}

pub async fn get_selected(State(state): State<AppState>) -> Json<SelectedResponse> {
    let store = state.store.lock().await;
    let date = store.selected().map(date_key);
    let day = date.as_deref().map(|key| store.day_view(key));
    Json(SelectedResponse { date, day })
}

pub async fn select(
    State(state): State<AppState>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<DayView>, AppError> {
    let date = selectable_date(&state, &payload.date)?;
    let mut store = state.store.lock().await;
    Ok(Json(store.select_date(date)))
}

pub async fn select_form(
    State(state): State<AppState>,
    Form(payload): Form<SelectRequest>,
) -> Result<Redirect, AppError> {
    let date = selectable_date(&state, &payload.date)?;
    state.store.lock().await.select_date(date);
    Ok(Redirect::to("/"))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayView>, AppError> {
    let key = path_key(&date)?;
    let store = state.store.lock().await;
    Ok(Json(store.day_view(&key)))
}

pub async fn add_task(
    State(state): State<AppState>,
    Json(payload): Json<AddTaskRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let day = with_store(&state, move |store| store.add_task(&payload.text)).await?;
    Ok(Json(MutationResponse {
        applied: day.is_some(),
        day,
    }))
}

pub async fn add_task_form(
    State(state): State<AppState>,
    Form(payload): Form<AddTaskRequest>,
) -> Result<Redirect, AppError> {
    with_store(&state, move |store| store.add_task(&payload.text)).await?;
    Ok(Redirect::to("/"))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path((date, index)): Path<(String, usize)>,
) -> Result<Json<DayView>, AppError> {
    let key = path_key(&date)?;
    let day = with_store(&state, move |store| store.toggle_task(&key, index)).await??;
    Ok(Json(day))
}

pub async fn toggle_task_form(
    State(state): State<AppState>,
    Form(payload): Form<ToggleForm>,
) -> Result<Redirect, AppError> {
    let key = path_key(&payload.date)?;
    with_store(&state, move |store| store.toggle_task(&key, payload.index)).await??;
    Ok(Redirect::to("/"))
}

pub async fn get_series(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<SeriesResponse>, AppError> {
    let start = optional_date(query.start.as_deref())?.unwrap_or(state.min_date);
    let end = optional_date(query.end.as_deref())?.unwrap_or(start);

    let store = state.store.lock().await;
    let points = build_series(store.scores(), start, end)?;
    Ok(Json(to_chart(points)))
}

/// Runs a mutation on the blocking pool; the store writes its files
/// synchronously before `f` returns.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut ProgressStore<FileStorage>) -> T + Send + 'static,
    T: Send + 'static,
{
    let mut store = Arc::clone(&state.store).lock_owned().await;
    tokio::task::spawn_blocking(move || f(&mut store))
        .await
        .map_err(AppError::internal)
}

fn selectable_date(state: &AppState, input: &str) -> Result<NaiveDate, AppError> {
    let date = normalize_date_input(input)
        .ok_or_else(|| AppError::bad_request(format!("invalid date {input:?}")))?;
    if date < state.min_date || date > state.max_date {
        return Err(AppError::bad_request(format!(
            "date must be between {} and {}",
            date_key(state.min_date),
            date_key(state.max_date)
        )));
    }
    Ok(date)
}

fn path_key(input: &str) -> Result<String, AppError> {
    parse_date_key(input)
        .map(date_key)
        .ok_or_else(|| AppError::bad_request(format!("invalid date {input:?}")))
}

fn optional_date(input: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match input {
        None | Some("") => Ok(None),
        Some(value) => parse_date_key(value)
            .map(Some)
            .ok_or_else(|| AppError::bad_request(format!("invalid date {value:?}"))),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
