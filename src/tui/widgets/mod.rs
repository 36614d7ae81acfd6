pub mod cycle;
pub mod habits;
pub mod header;
pub mod journal;
pub mod statusbar;
pub mod streak;
