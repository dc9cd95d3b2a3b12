mod attendance;
mod ids;
mod profile;
mod settings_form;
mod streak;
mod task;
mod trainer;

pub use attendance::{ATTENDANCE_COLOR, AttendanceMark, AttendanceRecord};
pub use ids::{ParseTaskIdError, StudentId, TaskId, TrainerId};
pub use profile::{
    ClientRef, PLACEHOLDER_PROFILE_IMAGE, Profile, StudentProfile, StudentProfilePatch,
    TrainerProfile, TrainerProfilePatch, initial_letter,
};
pub use settings_form::{ProfileFormError, TrainerSettingsForm};
pub use streak::Streak;
pub use task::{ParseCategoryError, Task, TaskBoard, TaskCategory};
pub use trainer::TrainerSummary;
