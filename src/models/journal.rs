use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthCategory {
    Symptom,
    Medication,
    Appointment,
    Measurement,
    Note,
}

impl HealthCategory {
    pub fn all() -> Vec<HealthCategory> {
        vec![
            HealthCategory::Symptom,
            HealthCategory::Medication,
            HealthCategory::Appointment,
            HealthCategory::Measurement,
            HealthCategory::Note,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthCategory::Symptom => "symptom",
            HealthCategory::Medication => "medication",
            HealthCategory::Appointment => "appointment",
            HealthCategory::Measurement => "measurement",
            HealthCategory::Note => "note",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HealthCategory::Symptom => "Symptom",
            HealthCategory::Medication => "Medication",
            HealthCategory::Appointment => "Appointment",
            HealthCategory::Measurement => "Measurement",
            HealthCategory::Note => "Note",
        }
    }
}

impl std::fmt::Display for HealthCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for HealthCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "symptom" | "symptoms" => Ok(HealthCategory::Symptom),
            "medication" | "med" | "meds" => Ok(HealthCategory::Medication),
            "appointment" | "appt" => Ok(HealthCategory::Appointment),
            "measurement" | "measure" => Ok(HealthCategory::Measurement),
            "note" => Ok(HealthCategory::Note),
            _ => Err(ValidationError::UnknownCategory(s.to_string())),
        }
    }
}

/// One free-text item on the health timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEntry {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub category: HealthCategory,
    pub title: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Option<i64>,
    pub date: NaiveDate,
    /// 1 (rough) to 5 (great)
    pub mood: Option<u8>,
    pub body: String,
}

impl JournalEntry {
    pub fn check_mood(mood: Option<u8>) -> Result<Option<u8>, ValidationError> {
        match mood {
            Some(m) if !(1..=5).contains(&m) => Err(ValidationError::MoodOutOfRange(m)),
            other => Ok(other),
        }
    }
}
