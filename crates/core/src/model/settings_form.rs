use thiserror::Error;

use crate::model::profile::{TrainerProfile, TrainerProfilePatch};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileFormError {
    #[error("all fields are required ({0} is empty)")]
    MissingField(&'static str),
}

/// Editable fields on the trainer settings screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainerSettingsForm {
    pub full_name: String,
    pub age: String,
    pub specialty: String,
    pub email: String,
    pub address: String,
}

impl TrainerSettingsForm {
    /// Prefill the form from the current profile.
    #[must_use]
    pub fn from_profile(profile: &TrainerProfile) -> Self {
        Self {
            full_name: profile.name().to_string(),
            age: profile.age().to_string(),
            specialty: profile.sport().to_string(),
            email: profile.email().to_string(),
            address: profile.address().to_string(),
        }
    }

    /// Check that every field is filled and turn the form into a profile patch.
    ///
    /// # Errors
    ///
    /// Returns `ProfileFormError::MissingField` naming the first blank field.
    pub fn validate(self) -> Result<TrainerProfilePatch, ProfileFormError> {
        let full_name = required("full name", self.full_name)?;
        let age = required("age", self.age)?;
        let specialty = required("specialty", self.specialty)?;
        let email = required("email", self.email)?;
        let address = required("address", self.address)?;

        Ok(TrainerProfilePatch {
            name: Some(full_name),
            age: Some(age),
            sport: Some(specialty),
            email: Some(email),
            address: Some(address),
            ..TrainerProfilePatch::default()
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ProfileFormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProfileFormError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
