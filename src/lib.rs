//! Daily weight log that keeps track of how many days in a row you've been logging.
//! The streak is recomputed from every stored measurement and respects a personal day boundary,
//! so a 2am entry can still count for the day before.

pub mod cli;
pub mod insights;
pub mod storage;
pub mod streak;
pub mod utils;
