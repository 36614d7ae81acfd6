use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bloom", version, author, about = "A calm terminal companion for cycle, habit and wellness tracking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log and review periods
    Period {
        #[command(subcommand)]
        action: PeriodCommands,
    },
    /// Show the current cycle phase and the next prediction
    Cycle {
        #[command(subcommand)]
        action: Option<CycleCommands>,
    },
    /// Habit tracking
    Habit {
        #[command(subcommand)]
        action: HabitCommands,
    },
    /// Free-text health timeline (symptoms, medication, appointments...)
    Timeline {
        #[command(subcommand)]
        action: TimelineCommands,
    },
    /// Journal entries
    Journal {
        #[command(subcommand)]
        action: JournalCommands,
    },
    /// Show cycle and habit statistics
    Stats,
    /// Export a summary to stdout
    Export {
        /// Dump everything as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum PeriodCommands {
    /// Log the start of a period (YYYY-MM-DD, default today)
    Log {
        start: Option<String>,
        /// Last day of the period, if already known
        #[arg(long)]
        end: Option<String>,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
    },
    /// Set the end date of the most recent period (default today)
    End { date: Option<String> },
    /// List logged periods, most recent first
    List {
        #[arg(long, default_value = "12")]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum CycleCommands {
    /// Mean cycle length and its spread
    Stats,
    /// Stored predictions, newest first
    History {
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum HabitCommands {
    /// Add a habit
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List active habits with their streaks
    List,
    /// Mark a habit done (default today)
    Done {
        name: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a completion (default today)
    Undo {
        name: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Stop tracking a habit, keeping its history
    Archive { name: String },
}

#[derive(Subcommand, Debug)]
pub enum TimelineCommands {
    /// Add an entry: symptom, medication, appointment, measurement or note
    Add {
        category: String,
        title: String,
        #[arg(long)]
        details: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Show recent entries
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "20")]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum JournalCommands {
    /// Write an entry
    Write {
        body: String,
        /// Mood from 1 (rough) to 5 (great)
        #[arg(long)]
        mood: Option<u8>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Show recent entries
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the config file location and current values
    Show,
    /// Write a config file with the current values
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_period_log() {
        let cli = Cli::try_parse_from(["bloom", "period", "log", "2024-01-01", "--end", "2024-01-05"]).unwrap();
        match cli.command {
            Some(Commands::Period {
                action: PeriodCommands::Log { start, end, note },
            }) => {
                assert_eq!(start.as_deref(), Some("2024-01-01"));
                assert_eq!(end.as_deref(), Some("2024-01-05"));
                assert_eq!(note, None);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn bare_cycle_has_no_action() {
        let cli = Cli::try_parse_from(["bloom", "cycle"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Cycle { action: None })));
    }

    #[test]
    fn no_command_opens_dashboard() {
        let cli = Cli::try_parse_from(["bloom"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn habit_done_with_date() {
        let cli = Cli::try_parse_from(["bloom", "habit", "done", "Stretch", "--date", "2024-06-01"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Habit { action: HabitCommands::Done { ref name, date: Some(_) } }) if name == "Stretch"
        ));
    }
}
