use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
    Unknown,
}

impl CyclePhase {
    pub fn display_name(&self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "Menstrual",
            CyclePhase::Follicular => "Follicular",
            CyclePhase::Ovulation => "Ovulation",
            CyclePhase::Luteal => "Luteal",
            CyclePhase::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A positive cycle length in days. The only way to ask for a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleLength(u32);

impl CycleLength {
    pub fn new(days: i64) -> Result<Self, ValidationError> {
        if days <= 0 || days > u32::MAX as i64 {
            return Err(ValidationError::NonPositiveCycleLength(days));
        }
        Ok(Self(days as u32))
    }

    pub fn days(&self) -> i64 {
        self.0 as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Days since the previous period's start, when there was one.
    pub cycle_length_days: Option<i64>,
    pub notes: Option<String>,
}

impl PeriodRecord {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            id: None,
            start_date,
            end_date: None,
            cycle_length_days: None,
            notes: None,
        }
    }

    /// Inclusive length of the bleed, if the end has been recorded.
    pub fn period_length_days(&self) -> Option<i64> {
        self.end_date
            .map(|end| (end - self.start_date).num_days() + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclePrediction {
    pub predicted_period_start: NaiveDate,
    pub predicted_period_end: NaiveDate,
    pub predicted_ovulation_start: NaiveDate,
    pub predicted_ovulation_end: NaiveDate,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrediction {
    pub id: i64,
    pub created_at: String,
    #[serde(flatten)]
    pub prediction: CyclePrediction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertilityWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FertilityWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseInfo {
    pub phase: CyclePhase,
    pub day_in_cycle: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    pub mean_length_days: Option<f64>,
    pub std_dev_days: Option<f64>,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOverview {
    pub current_phase: CyclePhase,
    pub current_day: i64,
    pub cycle_length: Option<i64>,
    pub last_period: Option<NaiveDate>,
    pub next_predicted: Option<CyclePrediction>,
    pub fertility_window: Option<FertilityWindow>,
}

impl CycleOverview {
    pub fn empty() -> Self {
        Self {
            current_phase: CyclePhase::Unknown,
            current_day: 0,
            cycle_length: None,
            last_period: None,
            next_predicted: None,
            fertility_window: None,
        }
    }

    /// Whole days until the predicted next period; negative when overdue.
    pub fn days_until_next_period(&self, today: NaiveDate) -> Option<i64> {
        self.next_predicted
            .as_ref()
            .map(|p| (p.predicted_period_start - today).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cycle_length_must_be_positive() {
        assert_eq!(CycleLength::new(28).unwrap().days(), 28);
        assert_eq!(
            CycleLength::new(0),
            Err(ValidationError::NonPositiveCycleLength(0))
        );
        assert_eq!(
            CycleLength::new(-3),
            Err(ValidationError::NonPositiveCycleLength(-3))
        );
    }

    #[test]
    fn period_length_is_inclusive() {
        let mut record = PeriodRecord::new(date(2024, 3, 1));
        assert_eq!(record.period_length_days(), None);
        record.end_date = Some(date(2024, 3, 5));
        assert_eq!(record.period_length_days(), Some(5));
    }
}
