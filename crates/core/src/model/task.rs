use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ids::TaskId;

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Fixed set of task groups shown on the student dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskCategory {
    Exercise,
    Practice,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 2] = [TaskCategory::Exercise, TaskCategory::Practice];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskCategory::Exercise => "Exercise",
            TaskCategory::Practice => "Practice",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown task category: {}", self.0)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for TaskCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

//
// ─── TASK ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    #[must_use]
    pub fn new(id: TaskId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            completed: false,
        }
    }

    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

//
// ─── BOARD ─────────────────────────────────────────────────────────────────────
//

/// Tasks grouped by category; every category is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskBoard {
    #[serde(rename = "Exercise", default)]
    exercise: Vec<Task>,
    #[serde(rename = "Practice", default)]
    practice: Vec<Task>,
}

impl TaskBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper used by seeding and tests.
    #[must_use]
    pub fn with_tasks(mut self, category: TaskCategory, tasks: Vec<Task>) -> Self {
        *self.slot_mut(category) = tasks;
        self
    }

    #[must_use]
    pub fn tasks(&self, category: TaskCategory) -> &[Task] {
        match category {
            TaskCategory::Exercise => &self.exercise,
            TaskCategory::Practice => &self.practice,
        }
    }

    fn slot_mut(&mut self, category: TaskCategory) -> &mut Vec<Task> {
        match category {
            TaskCategory::Exercise => &mut self.exercise,
            TaskCategory::Practice => &mut self.practice,
        }
    }

    #[must_use]
    pub fn task(&self, category: TaskCategory, id: TaskId) -> Option<&Task> {
        self.tasks(category).iter().find(|task| task.id == id)
    }

    /// Flip `completed` on the matching task.
    ///
    /// Returns the new value, or `None` when the id is not in the category.
    pub fn toggle(&mut self, category: TaskCategory, id: TaskId) -> Option<bool> {
        let task = self.slot_mut(category).iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    /// True when every task of every category is completed (vacuous for empty boards).
    #[must_use]
    pub fn all_completed(&self) -> bool {
        TaskCategory::ALL
            .into_iter()
            .all(|category| self.tasks(category).iter().all(|task| task.completed))
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.exercise.len() + self.practice.len()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        TaskCategory::ALL
            .into_iter()
            .map(|category| self.tasks(category).iter().filter(|t| t.completed).count())
            .sum()
    }

    /// First category containing a repeated task id, if any.
    #[must_use]
    pub fn duplicate_id(&self) -> Option<(TaskCategory, TaskId)> {
        for category in TaskCategory::ALL {
            let tasks = self.tasks(category);
            for (idx, task) in tasks.iter().enumerate() {
                if tasks[..idx].iter().any(|prev| prev.id == task.id) {
                    return Some((category, task.id));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> TaskBoard {
        TaskBoard::new()
            .with_tasks(
                TaskCategory::Exercise,
                vec![Task::new(TaskId::new(1), "Squats")],
            )
            .with_tasks(
                TaskCategory::Practice,
                vec![Task::new(TaskId::new(2), "Footwork").completed(true)],
            )
    }

    #[test]
    fn toggle_flips_only_the_target() {
        let mut board = board();
        assert_eq!(board.toggle(TaskCategory::Exercise, TaskId::new(1)), Some(true));
        assert!(board.task(TaskCategory::Exercise, TaskId::new(1)).unwrap().completed);
        assert!(board.task(TaskCategory::Practice, TaskId::new(2)).unwrap().completed);
    }

    #[test]
    fn double_toggle_restores_original() {
        let original = board();
        let mut board = original.clone();
        board.toggle(TaskCategory::Practice, TaskId::new(2));
        board.toggle(TaskCategory::Practice, TaskId::new(2));
        assert_eq!(board, original);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let original = board();
        let mut board = original.clone();
        // id 2 lives in Practice, not Exercise
        assert_eq!(board.toggle(TaskCategory::Exercise, TaskId::new(2)), None);
        assert_eq!(board, original);
    }

    #[test]
    fn all_completed_requires_every_category() {
        let mut board = board();
        assert!(!board.all_completed());
        board.toggle(TaskCategory::Exercise, TaskId::new(1));
        assert!(board.all_completed());
        assert!(TaskBoard::new().all_completed());
        assert_eq!(board.completed_count(), board.total());
    }

    #[test]
    fn serializes_with_category_names() {
        let json = serde_json::to_value(board()).unwrap();
        assert_eq!(json["Exercise"][0]["id"], 1);
        assert_eq!(json["Practice"][0]["completed"], true);
    }

    #[test]
    fn missing_category_defaults_to_empty() {
        let board: TaskBoard = serde_json::from_str(r#"{"Exercise":[]}"#).unwrap();
        assert!(board.tasks(TaskCategory::Practice).is_empty());
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(serde_json::from_str::<TaskBoard>(r#"{"Cardio":[]}"#).is_err());
    }

    #[test]
    fn detects_duplicate_ids() {
        let board = TaskBoard::new().with_tasks(
            TaskCategory::Practice,
            vec![
                Task::new(TaskId::new(4), "a"),
                Task::new(TaskId::new(4), "b"),
            ],
        );
        assert_eq!(
            board.duplicate_id(),
            Some((TaskCategory::Practice, TaskId::new(4)))
        );
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("practice".parse::<TaskCategory>(), Ok(TaskCategory::Practice));
        assert!("cardio".parse::<TaskCategory>().is_err());
    }
}
