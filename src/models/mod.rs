pub mod cycle;
pub mod habit;
pub mod journal;
pub mod validation;

pub use cycle::{
    CycleLength, CycleOverview, CyclePhase, CyclePrediction, CycleStats, FertilityWindow,
    PeriodRecord, PhaseInfo, StoredPrediction,
};
pub use habit::{Habit, HabitSummary, StreakSnapshot};
pub use journal::{HealthCategory, HealthEntry, JournalEntry};
pub use validation::ValidationError;
