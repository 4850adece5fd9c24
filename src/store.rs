use crate::date_key::date_key;
use crate::errors::StoreError;
use crate::models::{DayView, ScoreMap, Task, TaskMap};
use crate::storage::{Storage, SCORES_KEY, TASKS_KEY};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

/// Per-day task lists and the completion scores derived from them.
///
/// Scores are a cache of [`compute_score`] over the matching task list and are
/// only ever written by [`ProgressStore::recompute`]. Every applied mutation
/// writes both mappings back to storage in full before returning.
pub struct ProgressStore<S> {
    scores: ScoreMap,
    tasks: TaskMap,
    selected: Option<NaiveDate>,
    storage: S,
}

impl<S: Storage> ProgressStore<S> {
    /// Restores both mappings from `storage`. Missing or unparsable blobs
    /// start out empty.
    pub fn load(storage: S) -> Self {
        let scores = read_blob(&storage, SCORES_KEY);
        let tasks = read_blob(&storage, TASKS_KEY);
        Self {
            scores,
            tasks,
            selected: None,
            storage,
        }
    }

    pub fn scores(&self) -> &ScoreMap {
        &self.scores
    }

    pub fn tasks(&self) -> &TaskMap {
        &self.tasks
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn select_date(&mut self, date: NaiveDate) -> DayView {
        self.selected = Some(date);
        debug!(date = %date, "selected date");
        self.day_view(&date_key(date))
    }

    /// Appends an open task to the selected day. Blank text or no selection
    /// is ignored and returns `None`.
    pub fn add_task(&mut self, text: &str) -> Option<DayView> {
        let text = text.trim();
        let Some(date) = self.selected else {
            debug!("ignoring task without a selected date");
            return None;
        };
        if text.is_empty() {
            debug!("ignoring blank task");
            return None;
        }

        let key = date_key(date);
        self.tasks.entry(key.clone()).or_default().push(Task::new(text));
        self.recompute(&key);
        self.persist();

        debug!(date = %key, "added task");
        Some(self.day_view(&key))
    }

    pub fn toggle_task(&mut self, key: &str, index: usize) -> Result<DayView, StoreError> {
        let list = self.tasks.get_mut(key);
        let len = list.as_ref().map_or(0, |list| list.len());
        let task = list
            .and_then(|list| list.get_mut(index))
            .ok_or_else(|| StoreError::TaskIndexOutOfRange {
                date: key.to_string(),
                index,
                len,
            })?;
        task.completed = !task.completed;

        self.recompute(key);
        self.persist();

        debug!(date = %key, index, "toggled task");
        Ok(self.day_view(key))
    }

    pub fn compute_score(&self, key: &str) -> f64 {
        self.tasks.get(key).map_or(0.0, |list| compute_score(list))
    }

    pub fn day_view(&self, key: &str) -> DayView {
        let score = self.compute_score(key);
        DayView {
            date: key.to_string(),
            tasks: self.tasks.get(key).cloned().unwrap_or_default(),
            score,
            score_display: display_score(score),
        }
    }

    fn recompute(&mut self, key: &str) {
        let score = self.compute_score(key);
        self.scores.insert(key.to_string(), score);
    }

    fn persist(&mut self) {
        write_blob(&mut self.storage, SCORES_KEY, &self.scores);
        write_blob(&mut self.storage, TASKS_KEY, &self.tasks);
    }
}

pub fn compute_score(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks.iter().filter(|task| task.completed).count();
    100.0 * completed as f64 / tasks.len() as f64
}

/// Whole-percent rendering of a stored score.
pub fn display_score(score: f64) -> u8 {
    score.clamp(0.0, 100.0).round() as u8
}

fn read_blob<T: DeserializeOwned + Default>(storage: &impl Storage, key: &str) -> T {
    let Some(raw) = storage.get_item(key) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("discarding unreadable {key} data: {err}");
            T::default()
        }
    }
}

fn write_blob<T: Serialize>(storage: &mut impl Storage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(payload) => storage.set_item(key, &payload),
        Err(err) => error!("failed to encode {key} data: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn store_with_tasks(texts: &[&str]) -> ProgressStore<MemoryStorage> {
        let mut store = ProgressStore::load(MemoryStorage::new());
        store.select_date(day(17));
        for text in texts {
            store.add_task(text).expect("task added");
        }
        store
    }

    #[test]
    fn empty_or_absent_list_scores_zero() {
        let store = ProgressStore::load(MemoryStorage::new());
        assert_eq!(store.compute_score("2024-07-17"), 0.0);
        assert_eq!(compute_score(&[]), 0.0);
    }

    #[test]
    fn score_is_completed_share() {
        let mut store = store_with_tasks(&["a", "b", "c", "d"]);
        store.toggle_task("2024-07-17", 0).unwrap();
        let view = store.toggle_task("2024-07-17", 2).unwrap();

        assert_eq!(view.score, 50.0);
        assert_eq!(store.scores()["2024-07-17"], 50.0);
    }

    #[test]
    fn one_of_three_is_stored_unrounded() {
        let mut store = store_with_tasks(&["a", "b", "c"]);
        let view = store.toggle_task("2024-07-17", 1).unwrap();

        assert!((view.score - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(view.score_display, 33);
    }

    #[test]
    fn blank_text_is_ignored() {
        let mut store = store_with_tasks(&["a"]);
        assert_eq!(store.add_task("   \t"), None);
        assert_eq!(store.tasks()["2024-07-17"].len(), 1);
    }

    #[test]
    fn add_without_selection_is_ignored() {
        let mut store = ProgressStore::load(MemoryStorage::new());
        assert_eq!(store.add_task("write report"), None);
        assert!(store.tasks().is_empty());
        assert_eq!(store.storage().get_item(TASKS_KEY), None);
    }

    #[test]
    fn added_task_is_trimmed_and_open() {
        let store = store_with_tasks(&["  stretch  "]);
        assert_eq!(store.tasks()["2024-07-17"], vec![Task::new("stretch")]);
        assert_eq!(store.scores()["2024-07-17"], 0.0);
    }

    #[test]
    fn toggle_twice_restores_state_and_score() {
        let mut store = store_with_tasks(&["a", "b"]);

        let once = store.toggle_task("2024-07-17", 1).unwrap();
        assert!(once.tasks[1].completed);
        assert_eq!(once.score, 50.0);

        let twice = store.toggle_task("2024-07-17", 1).unwrap();
        assert!(!twice.tasks[1].completed);
        assert_eq!(twice.score, 0.0);
    }

    #[test]
    fn toggle_out_of_range_reports_and_leaves_state() {
        let mut store = store_with_tasks(&["a"]);

        let err = store.toggle_task("2024-07-17", 3).unwrap_err();
        assert_eq!(
            err,
            StoreError::TaskIndexOutOfRange {
                date: "2024-07-17".to_string(),
                index: 3,
                len: 1,
            }
        );
        assert!(store.toggle_task("2024-07-18", 0).is_err());
        assert!(!store.tasks()["2024-07-17"][0].completed);
    }

    #[test]
    fn selecting_does_not_touch_stored_data() {
        let mut store = ProgressStore::load(MemoryStorage::new());
        let view = store.select_date(day(20));

        assert_eq!(view.date, "2024-07-20");
        assert!(view.tasks.is_empty());
        assert_eq!(view.score, 0.0);
        assert!(store.tasks().is_empty());
        assert!(store.scores().is_empty());
        assert_eq!(store.storage().get_item(TASKS_KEY), None);
        assert_eq!(store.storage().get_item(SCORES_KEY), None);
    }

    #[test]
    fn reselecting_moves_new_tasks_to_new_day() {
        let mut store = store_with_tasks(&["a"]);
        store.select_date(day(19));
        store.add_task("b").unwrap();

        assert_eq!(store.tasks()["2024-07-17"].len(), 1);
        assert_eq!(store.tasks()["2024-07-19"].len(), 1);
        assert_eq!(store.selected(), Some(day(19)));
    }

    #[test]
    fn reload_reproduces_mappings() {
        let mut store = store_with_tasks(&["a", "b"]);
        store.toggle_task("2024-07-17", 0).unwrap();
        store.select_date(day(18));
        store.add_task("c").unwrap();

        let reloaded = ProgressStore::load(store.storage().clone());
        assert_eq!(reloaded.tasks(), store.tasks());
        assert_eq!(reloaded.scores(), store.scores());
        assert_eq!(reloaded.selected(), None);
    }

    #[test]
    fn corrupt_blobs_load_as_empty() {
        let mut storage = MemoryStorage::new();
        storage.set_item(SCORES_KEY, "{not json");
        storage.set_item(TASKS_KEY, "[1, 2");

        let store = ProgressStore::load(storage);
        assert!(store.scores().is_empty());
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn legacy_task_field_is_accepted() {
        let mut storage = MemoryStorage::new();
        storage.set_item(
            TASKS_KEY,
            r#"{"2024-07-17":[{"task":"run","completed":true}]}"#,
        );
        storage.set_item(SCORES_KEY, r#"{"2024-07-17":100}"#);

        let store = ProgressStore::load(storage);
        assert_eq!(store.tasks()["2024-07-17"][0].text, "run");
        assert_eq!(store.scores()["2024-07-17"], 100.0);
    }
}
