use chrono::NaiveDate;

use gameplan_core::model::{TaskCategory, TaskId};

/// Everything a renderer needs to draw the student dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub student_name: String,
    pub student_id: String,
    pub initial: String,
    pub trainer: Option<TrainerInfoView>,
    pub streak_days: u32,
    pub streak_label: String,
    pub attendance_button: ButtonView,
    pub in_target_location: bool,
    pub categories: Vec<CategoryView>,
    pub marked_dates: Vec<NaiveDate>,
    pub save_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerInfoView {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    pub category: TaskCategory,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: TaskId,
    pub name: String,
    pub completed: bool,
}

#[must_use]
pub fn streak_label(days: u32) -> String {
    format!("🔥 Streak: {days} days")
}

#[must_use]
pub fn attendance_button(marked: bool, in_target_location: bool) -> ButtonView {
    ButtonView {
        label: if marked {
            "Attendance Marked"
        } else {
            "Mark Attendance"
        },
        enabled: in_target_location && !marked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_is_disabled_outside_target_or_after_marking() {
        assert!(attendance_button(false, true).enabled);
        assert!(!attendance_button(false, false).enabled);
        let marked = attendance_button(true, true);
        assert!(!marked.enabled);
        assert_eq!(marked.label, "Attendance Marked");
    }

    #[test]
    fn streak_label_counts_days() {
        assert_eq!(streak_label(3), "🔥 Streak: 3 days");
    }
}
