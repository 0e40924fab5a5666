//! Battle flow - speed-gauge scheduling, events and post-battle growth
//!
//! A battle is driven one tick at a time by the caller. The scheduler
//! borrows the material forests in play for as long as it lives and hands
//! back a `BattleReport` once done, which the growth collector can read.

pub mod events;
pub mod growth;
pub mod scheduler;

pub use events::{BattleEvent, BattleOutcome};
pub use growth::{DirectCommit, GrowthCollector, GrowthCommitter, ScaledCommit};
pub use scheduler::{
    BattleCounters, BattleReport, BattleSetup, BattleState, CombatScheduler, SpeedGauge,
};
