use std::sync::Arc;

use gameplan_core::model::TrainerSettingsForm;

use crate::error::ProfileServiceError;
use crate::navigation::{Navigator, Screen};
use crate::notice::{Notice, Notifier};
use crate::profile_store::{StudentStore, TrainerStore};

/// Form submission and logout flows on top of the profile stores.
#[derive(Clone)]
pub struct ProfileService {
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl ProfileService {
    #[must_use]
    pub fn new(navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            navigator,
            notifier,
        }
    }

    /// Validate the trainer settings form and merge it into `store`.
    ///
    /// On success the user is told and sent back to the previous screen.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Form` when a field is blank; the store is
    /// left untouched and an alert is shown.
    pub fn save_trainer_settings(
        &self,
        store: &mut TrainerStore,
        form: TrainerSettingsForm,
    ) -> Result<(), ProfileServiceError> {
        let patch = match form.validate() {
            Ok(patch) => patch,
            Err(err) => {
                let err = ProfileServiceError::from(err);
                self.notifier.notify(err.notice());
                return Err(err);
            }
        };

        store.update(patch);
        tracing::info!(trainer = %store.get().trainer_id(), "trainer settings saved");
        self.notifier
            .notify(Notice::new("Success", "Profile updated successfully!"));
        self.navigator.go_back();
        Ok(())
    }

    /// Clear both profiles and return to the login screen.
    pub fn logout(&self, trainer: &mut TrainerStore, student: &mut StudentStore) {
        trainer.reset();
        student.reset();
        self.navigator.replace(Screen::Login);
    }
}
