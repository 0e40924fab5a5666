//! Combat numbers: stats, combatants, attacks and the attack pipeline

pub mod attack;
pub mod combatant;
pub mod pipeline;
pub mod stats;

pub use attack::{AttackField, AttackSnapshot};
pub use combatant::{CombatantConfig, CombatantSnapshot, CombatantState, Combatants};
pub use pipeline::{AttackPipeline, AttackStep, FinalDamage, StepContext, FINAL_DAMAGE_STEP};
pub use stats::{GrowthDelta, PlayerRecord, PlayerStats, StatKey};
