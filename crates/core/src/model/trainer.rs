use serde::{Deserialize, Deserializer, Serialize};

use crate::model::ids::TrainerId;

const MISSING: &str = "N/A";

/// Read-only trainer fields shown on the student dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerSummary {
    #[serde(rename = "trainerID", default, deserialize_with = "null_as_default")]
    pub trainer_id: TrainerId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TrainerSummary {
    #[must_use]
    pub fn display_name(&self) -> &str {
        non_blank_or_missing(&self.name)
    }

    #[must_use]
    pub fn display_id(&self) -> &str {
        non_blank_or_missing(self.trainer_id.as_str())
    }
}

fn non_blank_or_missing(value: &str) -> &str {
    if value.trim().is_empty() { MISSING } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_display_as_missing() {
        let summary = TrainerSummary::default();
        assert_eq!(summary.display_name(), "N/A");
        assert_eq!(summary.display_id(), "N/A");
    }

    #[test]
    fn decodes_from_full_trainer_document() {
        let summary: TrainerSummary = serde_json::from_str(
            r#"{"trainerID":"t1","name":"Rui","sport":"Judo","clients":[]}"#,
        )
        .unwrap();
        assert_eq!(summary.display_name(), "Rui");
        assert_eq!(summary.display_id(), "t1");
    }

    #[test]
    fn null_fields_display_as_missing() {
        let summary: TrainerSummary =
            serde_json::from_str(r#"{"trainerID":null,"name":null}"#).unwrap();
        assert_eq!(summary.display_name(), "N/A");
        assert_eq!(summary.display_id(), "N/A");
    }
}
