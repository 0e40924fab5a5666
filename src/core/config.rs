//! Battle configuration with documented constants
//!
//! All tuning numbers for the combat loop and the round driver live here.
//! The config is passed explicitly to whoever needs it; there is no global copy.

use serde::{Deserialize, Serialize};

/// Configuration for the combat scheduler and the session driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === SPEED GAUGE ===
    /// Gauge value a combatant must accumulate before it attacks
    ///
    /// Each tick adds `speed_rate * dt` to the gauge. With the default of 10,
    /// a combatant with speed rate 6 attacks roughly every 1.7 seconds.
    /// Values below 1 are treated as 1.
    pub arena_speed_threshold: u32,

    /// Minimum time between two attacks of the same side (seconds)
    ///
    /// A fast combatant can bank several thresholds worth of gauge, but it
    /// still spends them at most once per interval.
    pub attack_interval_secs: f32,

    // === DAMAGE RESOLUTION ===
    /// Subtract the defender's effective defense from raw attack
    pub defense_reduction: bool,

    /// Roll crit chance and apply the crit multiplier
    pub crit_enabled: bool,

    // === SESSION DRIVER ===
    /// Real-time step fed to the scheduler by the headless driver (seconds)
    pub tick_secs: f32,

    /// Tick cap for one battle before the driver stops it
    ///
    /// A stopped battle has no victory or defeat result.
    pub max_ticks: u32,

    /// Mana pool of a freshly started mask
    pub base_mask_mana: u32,

    // === DETERMINISM ===
    /// Seed for the battle RNG (chance gates and crit rolls)
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            arena_speed_threshold: 10,
            attack_interval_secs: 0.25,
            defense_reduction: true,
            crit_enabled: true,
            tick_secs: 0.05,
            max_ticks: 20_000,
            base_mask_mana: 10,
            seed: 0,
        }
    }
}

impl BattleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Threshold with the lower bound applied
    pub fn speed_threshold(&self) -> f32 {
        self.arena_speed_threshold.max(1) as f32
    }

    /// Validate configuration values
    ///
    /// Returns an error message if any values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.arena_speed_threshold == 0 {
            return Err("arena_speed_threshold must be at least 1".into());
        }
        if !self.attack_interval_secs.is_finite() || self.attack_interval_secs < 0.0 {
            return Err("attack_interval_secs must be a non-negative number".into());
        }
        if !self.tick_secs.is_finite() || self.tick_secs <= 0.0 {
            return Err("tick_secs must be positive".into());
        }
        if self.max_ticks == 0 {
            return Err("max_ticks must be positive".into());
        }
        Ok(())
    }
}
