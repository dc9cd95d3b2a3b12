use gameplan_core::model::{Profile, StudentProfile, TrainerProfile};

/// The signed-in user's profile for the current session.
///
/// Owned by whoever composes the screens and passed to them explicitly. Starts
/// at the profile's defaults; last write wins.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore<P: Profile> {
    profile: P,
}

pub type TrainerStore = ProfileStore<TrainerProfile>;
pub type StudentStore = ProfileStore<StudentProfile>;

impl<P: Profile> ProfileStore<P> {
    #[must_use]
    pub fn new() -> Self {
        let store = Self {
            profile: P::default(),
        };
        store.check_identity();
        store
    }

    #[must_use]
    pub fn get(&self) -> &P {
        &self.profile
    }

    /// Merge `patch` into the current record. No validation happens here.
    pub fn update(&mut self, patch: P::Patch) {
        self.profile.apply(patch);
        self.check_identity();
    }

    /// Swap in a complete record.
    pub fn replace(&mut self, profile: P) {
        self.profile = profile;
        self.check_identity();
    }

    /// Back to defaults, as on logout.
    pub fn reset(&mut self) {
        self.profile = P::default();
        self.check_identity();
    }

    fn check_identity(&self) {
        if !self.profile.has_identity() {
            tracing::warn!(kind = P::KIND, "profile id is missing; make sure it is set correctly");
        }
    }
}
