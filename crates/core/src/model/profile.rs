use serde::{Deserialize, Serialize};

use crate::model::ids::{StudentId, TrainerId};

/// Image shown until the user uploads their own.
pub const PLACEHOLDER_PROFILE_IMAGE: &str = "https://via.placeholder.com/150";

//
// ─── PROFILE CONTRACT ──────────────────────────────────────────────────────────
//

/// A per-session profile record with field-by-field partial updates.
pub trait Profile: Clone + Default + Send + Sync + 'static {
    /// Partial update: every `Some` field overwrites, `None` retains.
    type Patch: Send;

    /// Short label used in diagnostics.
    const KIND: &'static str;

    fn apply(&mut self, patch: Self::Patch);

    /// False when the identifying field is blank.
    fn has_identity(&self) -> bool;
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// First letter of `name` uppercased, or `fallback` when the name is blank.
#[must_use]
pub fn initial_letter(name: &str, fallback: char) -> String {
    name.trim()
        .chars()
        .next()
        .map_or_else(|| fallback.to_string(), |c| c.to_uppercase().collect())
}

//
// ─── TRAINER ───────────────────────────────────────────────────────────────────
//

/// A student on a trainer's client list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    #[serde(rename = "studentID")]
    pub student_id: StudentId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainerProfile {
    #[serde(rename = "trainerID")]
    trainer_id: TrainerId,
    name: String,
    email: String,
    profile_image: String,
    sport: String,
    experience: String,
    clients: Vec<ClientRef>,
    certifications: Vec<String>,
    bio: String,
    address: String,
    age: String,
}

impl Default for TrainerProfile {
    fn default() -> Self {
        Self {
            trainer_id: TrainerId::default(),
            name: String::new(),
            email: String::new(),
            profile_image: PLACEHOLDER_PROFILE_IMAGE.to_string(),
            sport: String::new(),
            experience: String::new(),
            clients: Vec::new(),
            certifications: Vec::new(),
            bio: String::new(),
            address: String::new(),
            age: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainerProfilePatch {
    pub trainer_id: Option<TrainerId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_image: Option<String>,
    pub sport: Option<String>,
    pub experience: Option<String>,
    pub clients: Option<Vec<ClientRef>>,
    pub certifications: Option<Vec<String>>,
    pub bio: Option<String>,
    pub address: Option<String>,
    pub age: Option<String>,
}

impl TrainerProfile {
    #[must_use]
    pub fn trainer_id(&self) -> &TrainerId {
        &self.trainer_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn profile_image(&self) -> &str {
        &self.profile_image
    }

    #[must_use]
    pub fn sport(&self) -> &str {
        &self.sport
    }

    #[must_use]
    pub fn experience(&self) -> &str {
        &self.experience
    }

    #[must_use]
    pub fn clients(&self) -> &[ClientRef] {
        &self.clients
    }

    #[must_use]
    pub fn certifications(&self) -> &[String] {
        &self.certifications
    }

    #[must_use]
    pub fn bio(&self) -> &str {
        &self.bio
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn age(&self) -> &str {
        &self.age
    }

    #[must_use]
    pub fn initial(&self) -> String {
        initial_letter(&self.name, '?')
    }
}

impl Profile for TrainerProfile {
    type Patch = TrainerProfilePatch;

    const KIND: &'static str = "trainer";

    fn apply(&mut self, patch: TrainerProfilePatch) {
        overwrite(&mut self.trainer_id, patch.trainer_id);
        overwrite(&mut self.name, patch.name);
        overwrite(&mut self.email, patch.email);
        overwrite(&mut self.profile_image, patch.profile_image);
        overwrite(&mut self.sport, patch.sport);
        overwrite(&mut self.experience, patch.experience);
        overwrite(&mut self.clients, patch.clients);
        overwrite(&mut self.certifications, patch.certifications);
        overwrite(&mut self.bio, patch.bio);
        overwrite(&mut self.address, patch.address);
        overwrite(&mut self.age, patch.age);
    }

    fn has_identity(&self) -> bool {
        !self.trainer_id.is_empty()
    }
}

//
// ─── STUDENT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentProfile {
    #[serde(rename = "studentID")]
    student_id: StudentId,
    name: String,
    email: String,
    #[serde(rename = "trainerID")]
    trainer_id: TrainerId,
    profile_image: String,
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self {
            student_id: StudentId::default(),
            name: String::new(),
            email: String::new(),
            trainer_id: TrainerId::default(),
            profile_image: PLACEHOLDER_PROFILE_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentProfilePatch {
    pub student_id: Option<StudentId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub trainer_id: Option<TrainerId>,
    pub profile_image: Option<String>,
}

impl StudentProfile {
    /// Convenience constructor for the identifying fields.
    #[must_use]
    pub fn new(student_id: StudentId, name: impl Into<String>, trainer_id: TrainerId) -> Self {
        Self {
            student_id,
            name: name.into(),
            trainer_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn trainer_id(&self) -> &TrainerId {
        &self.trainer_id
    }

    #[must_use]
    pub fn profile_image(&self) -> &str {
        &self.profile_image
    }

    #[must_use]
    pub fn initial(&self) -> String {
        initial_letter(&self.name, 'S')
    }
}

impl Profile for StudentProfile {
    type Patch = StudentProfilePatch;

    const KIND: &'static str = "student";

    fn apply(&mut self, patch: StudentProfilePatch) {
        overwrite(&mut self.student_id, patch.student_id);
        overwrite(&mut self.name, patch.name);
        overwrite(&mut self.email, patch.email);
        overwrite(&mut self.trainer_id, patch.trainer_id);
        overwrite(&mut self.profile_image, patch.profile_image);
    }

    fn has_identity(&self) -> bool {
        !self.student_id.is_empty()
    }
}
