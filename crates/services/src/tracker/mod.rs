mod guard;
mod service;
mod view;

// Public API of the dashboard tracker.
pub use crate::error::{Operation, TrackerError};
pub use service::{DashboardTracker, LocationCheck, TRAINERS_COLLECTION, TrackerDeps};
pub use view::{ButtonView, CategoryView, DashboardView, TaskView, TrainerInfoView};
