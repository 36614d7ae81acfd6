pub mod cycle;
pub mod service;
pub mod streak;
