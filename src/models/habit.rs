use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSnapshot {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completion_date: Option<NaiveDate>,
}

/// A habit together with everything the dashboard shows for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitSummary {
    pub habit: Habit,
    pub streak: StreakSnapshot,
    pub done_today: bool,
}
