//! Consensus module - block format, proof of work, upgrades, schedules and rewards

mod block;
mod funding;
mod params;
mod pow;
mod rewards;
mod upgrades;
mod validation;

pub use block::*;
pub use funding::*;
pub use params::*;
pub use pow::*;
pub use upgrades::*;
pub use validation::*;
