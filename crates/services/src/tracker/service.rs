use std::sync::Arc;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use gameplan_core::Clock;
use gameplan_core::geo::{Geofence, distance_meters};
use gameplan_core::model::{
    AttendanceRecord, Profile, Streak, StudentProfile, TaskBoard, TaskCategory, TaskId,
    TrainerId, TrainerSummary,
};
use storage::codec::StoredValue;
use storage::repository::{DocumentStore, ProgressStore, StorageError};

use super::guard::bounded;
use super::view::{
    CategoryView, DashboardView, TaskView, TrainerInfoView, attendance_button, streak_label,
};
use crate::config::TrackerConfig;
use crate::error::{IntoTrackerError, Operation, TrackerError};
use crate::location::{LocationProvider, PermissionStatus};
use crate::navigation::{NavParams, Navigator, Screen};
use crate::notice::{Notice, Notifier};

/// Remote collection holding trainer records.
pub const TRAINERS_COLLECTION: &str = "trainers";

/// Collaborators a dashboard session talks to.
#[derive(Clone)]
pub struct TrackerDeps {
    pub clock: Clock,
    pub progress: ProgressStore,
    pub documents: Arc<dyn DocumentStore>,
    pub location: Arc<dyn LocationProvider>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub config: TrackerConfig,
    /// Cancelled when the owning screen goes away; aborts in-flight calls.
    pub cancel: CancellationToken,
}

/// Result of a geofence evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationCheck {
    pub distance_meters: f64,
    pub inside: bool,
}

/// Attendance, task and streak state for one student dashboard session.
///
/// A value of this type only exists once initialization finished; every
/// operation takes `&mut self`, so two actions can never interleave.
pub struct DashboardTracker {
    deps: TrackerDeps,
    student: StudentProfile,
    tasks: TaskBoard,
    attendance: AttendanceRecord,
    streak: Streak,
    trainer: Option<TrainerSummary>,
    attendance_marked: bool,
    in_target_location: bool,
}

impl DashboardTracker {
    /// Load persisted progress and the student's trainer, then become ready.
    ///
    /// Storage and trainer lookups never fail initialization: each failure is
    /// reported and the affected value stays at its default.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::MissingIdentity` when `identity` is absent or has no
    /// student id. The login screen is requested before returning.
    #[instrument(skip_all)]
    pub async fn initialize(
        deps: TrackerDeps,
        identity: Option<StudentProfile>,
    ) -> Result<Self, TrackerError> {
        let Some(student) = identity.filter(Profile::has_identity) else {
            let err = TrackerError::MissingIdentity;
            tracing::error!("student dashboard opened without a student identity");
            deps.notifier.notify(err.notice());
            deps.navigator.replace(Screen::Login);
            return Err(err);
        };

        let mut tracker = Self {
            deps,
            student,
            tasks: TaskBoard::default(),
            attendance: AttendanceRecord::default(),
            streak: Streak::default(),
            trainer: None,
            attendance_marked: false,
            in_target_location: false,
        };

        tracker.load_progress().await;
        tracker.load_trainer().await;
        tracker.attendance_marked = tracker.attendance.is_marked(tracker.deps.clock.today());

        tracing::info!(
            student = %tracker.student.student_id(),
            tasks = tracker.tasks.total(),
            attended_days = tracker.attendance.len(),
            streak = tracker.streak.days(),
            "dashboard ready"
        );
        Ok(tracker)
    }

    async fn load_progress(&mut self) {
        let mut first_error = None;

        match self.load::<TaskBoard>().await {
            Ok(tasks) => self.tasks = tasks,
            Err(err) => {
                tracing::error!(error = %err, "failed to load tasks");
                first_error.get_or_insert(err);
            }
        }
        match self.load::<AttendanceRecord>().await {
            Ok(attendance) => self.attendance = attendance,
            Err(err) => {
                tracing::error!(error = %err, "failed to load attendance");
                first_error.get_or_insert(err);
            }
        }
        match self.load::<Streak>().await {
            Ok(streak) => self.streak = streak,
            Err(err) => {
                tracing::error!(error = %err, "failed to load streak");
                first_error.get_or_insert(err);
            }
        }

        if let Some(err) = first_error {
            self.deps.notifier.notify(err.notice());
        }
    }

    async fn load_trainer(&mut self) {
        let trainer_id = self.student.trainer_id().clone();
        if trainer_id.is_empty() {
            tracing::debug!("student has no trainer; skipping lookup");
            return;
        }
        match self.fetch_trainer(&trainer_id).await {
            Ok(summary) => self.trainer = Some(summary),
            Err(err) => self.report(&err),
        }
    }

    async fn fetch_trainer(&self, trainer_id: &TrainerId) -> Result<TrainerSummary, TrackerError> {
        let document = bounded(
            &self.deps.cancel,
            Operation::FetchTrainer,
            self.deps.config.remote_timeout,
            self.deps
                .documents
                .get_document(TRAINERS_COLLECTION, trainer_id.as_str()),
        )
        .await?;

        let Some(document) = document else {
            return Err(TrackerError::TrainerNotFound(trainer_id.clone()));
        };
        serde_json::from_value(document).map_err(|err| {
            StorageError::Serialization(err.to_string()).into_tracker(Operation::FetchTrainer)
        })
    }

    async fn load<T: StoredValue>(&self) -> Result<T, TrackerError> {
        bounded(
            &self.deps.cancel,
            Operation::LoadProgress,
            self.deps.config.storage_timeout,
            self.deps.progress.load::<T>(),
        )
        .await
    }

    async fn persist<T: StoredValue>(
        &self,
        operation: Operation,
        value: &T,
    ) -> Result<(), TrackerError> {
        bounded(
            &self.deps.cancel,
            operation,
            self.deps.config.storage_timeout,
            self.deps.progress.save(value),
        )
        .await
    }

    fn report(&self, err: &TrackerError) {
        tracing::warn!(error = %err, "dashboard action failed");
        self.deps.notifier.notify(err.notice());
    }

    fn fail<T>(&self, err: TrackerError) -> Result<T, TrackerError> {
        self.report(&err);
        Err(err)
    }

    //
    // ─── ACTIONS ───────────────────────────────────────────────────────────────
    //

    /// Flip a task's completion and persist the whole board.
    ///
    /// Returns the new `completed` value, or `None` if the id is not in
    /// `category` (nothing is changed or written in that case).
    ///
    /// # Errors
    ///
    /// Returns a storage, timeout or cancellation error if the board cannot be
    /// written; the toggle is undone.
    #[instrument(skip(self), fields(student = %self.student.student_id()))]
    pub async fn toggle_task(
        &mut self,
        category: TaskCategory,
        id: TaskId,
    ) -> Result<Option<bool>, TrackerError> {
        let Some(completed) = self.tasks.toggle(category, id) else {
            tracing::debug!("unknown task; toggle ignored");
            return Ok(None);
        };

        let saved = self.persist(Operation::SaveTasks, &self.tasks).await;
        if let Err(err) = saved {
            self.tasks.toggle(category, id);
            return self.fail(err);
        }
        Ok(Some(completed))
    }

    /// Decide whether the device is inside `target`.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::PermissionDenied` if location access is refused, or
    /// a location/timeout error if no position is available. The in-location flag
    /// keeps its previous value on any error.
    #[instrument(skip(self), fields(student = %self.student.student_id()))]
    pub async fn evaluate_location(
        &mut self,
        target: Geofence,
    ) -> Result<LocationCheck, TrackerError> {
        let budget = self.deps.config.location_timeout;
        let permission = bounded(
            &self.deps.cancel,
            Operation::LocationPermission,
            budget,
            self.deps.location.request_permission(),
        )
        .await;
        match permission {
            Ok(PermissionStatus::Granted) => {}
            Ok(PermissionStatus::Denied) => return self.fail(TrackerError::PermissionDenied),
            Err(err) => return self.fail(err),
        }

        let position = match bounded(
            &self.deps.cancel,
            Operation::CurrentPosition,
            budget,
            self.deps.location.current_position(),
        )
        .await
        {
            Ok(position) => position,
            Err(err) => return self.fail(err),
        };

        let distance = distance_meters(&position, &target.center());
        let inside = target.contains(&position);
        self.in_target_location = inside;
        tracing::debug!(distance, inside, "location evaluated");

        Ok(LocationCheck {
            distance_meters: distance,
            inside,
        })
    }

    /// Evaluate the geofence from configuration, if one is set.
    ///
    /// # Errors
    ///
    /// Same as `evaluate_location`.
    pub async fn evaluate_configured_location(
        &mut self,
    ) -> Result<Option<LocationCheck>, TrackerError> {
        match self.deps.config.geofence {
            Some(target) => self.evaluate_location(target).await.map(Some),
            None => Ok(None),
        }
    }

    /// Record today's attendance.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyMarked` if today is already recorded, `NotInTargetLocation`
    /// if the last evaluation placed the device outside the target, or a
    /// storage error if the record cannot be written (the mark is undone).
    #[instrument(skip(self), fields(student = %self.student.student_id()))]
    pub async fn mark_attendance(&mut self) -> Result<NaiveDate, TrackerError> {
        let today = self.deps.clock.today();
        if self.attendance_marked || self.attendance.is_marked(today) {
            return self.fail(TrackerError::AlreadyMarked(today));
        }
        if !self.in_target_location {
            return self.fail(TrackerError::NotInTargetLocation);
        }

        self.attendance.mark(today);
        let saved = self.persist(Operation::SaveAttendance, &self.attendance).await;
        if let Err(err) = saved {
            self.attendance.unmark(today);
            return self.fail(err);
        }

        self.attendance_marked = true;
        tracing::info!(%today, "attendance marked");
        self.deps
            .notifier
            .notify(Notice::new("Attendance", "Attendance marked successfully!"));
        Ok(today)
    }

    /// Advance the streak once every task is done.
    ///
    /// Task flags are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `IncompleteTasks` if any task is open, `StreakOverflow` if the
    /// counter is full, or a storage error if the new streak cannot be written.
    /// The streak is not advanced on any error.
    #[instrument(skip(self), fields(student = %self.student.student_id()))]
    pub async fn save_progress(&mut self) -> Result<Streak, TrackerError> {
        if !self.tasks.all_completed() {
            return self.fail(TrackerError::IncompleteTasks);
        }

        let Some(next) = self.streak.incremented() else {
            return self.fail(TrackerError::StreakOverflow(self.streak));
        };
        if let Err(err) = self.persist(Operation::SaveStreak, &next).await {
            return self.fail(err);
        }

        self.streak = next;
        tracing::info!(streak = next.days(), "progress saved");
        self.deps
            .notifier
            .notify(Notice::new("Success", "Progress saved successfully!"));
        Ok(next)
    }

    /// Ask the host to open the student's profile.
    pub fn go_to_profile(&self) {
        self.deps
            .navigator
            .navigate(Screen::StudentProfile, NavParams::Student(self.student.clone()));
    }

    //
    // ─── STATE ─────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn student(&self) -> &StudentProfile {
        &self.student
    }

    #[must_use]
    pub fn tasks(&self) -> &TaskBoard {
        &self.tasks
    }

    #[must_use]
    pub fn attendance(&self) -> &AttendanceRecord {
        &self.attendance
    }

    #[must_use]
    pub fn streak(&self) -> Streak {
        self.streak
    }

    #[must_use]
    pub fn trainer(&self) -> Option<&TrainerSummary> {
        self.trainer.as_ref()
    }

    #[must_use]
    pub fn is_attendance_marked(&self) -> bool {
        self.attendance_marked
    }

    #[must_use]
    pub fn is_in_target_location(&self) -> bool {
        self.in_target_location
    }

    /// Token that aborts this session's in-flight calls when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.deps.cancel.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardView {
        let name = self.student.name().trim();

        DashboardView {
            student_name: if name.is_empty() {
                "Student Name".to_string()
            } else {
                name.to_string()
            },
            // Blank ids never get past initialize.
            student_id: self.student.student_id().as_str().trim().to_string(),
            initial: self.student.initial(),
            trainer: self.trainer.as_ref().map(|trainer| TrainerInfoView {
                name: trainer.display_name().to_string(),
                id: trainer.display_id().to_string(),
            }),
            streak_days: self.streak.days(),
            streak_label: streak_label(self.streak.days()),
            attendance_button: attendance_button(self.attendance_marked, self.in_target_location),
            in_target_location: self.in_target_location,
            categories: TaskCategory::ALL
                .into_iter()
                .map(|category| CategoryView {
                    category,
                    tasks: self
                        .tasks
                        .tasks(category)
                        .iter()
                        .map(|task| TaskView {
                            id: task.id,
                            name: task.name.clone(),
                            completed: task.completed,
                        })
                        .collect(),
                })
                .collect(),
            marked_dates: self.attendance.dates().collect(),
            save_enabled: self.tasks.all_completed(),
        }
    }
}
