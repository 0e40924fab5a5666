//! Stat keys, the permanent player record and growth deltas
//!
//! `PlayerStats` is the record that survives between battles. `GrowthDelta`
//! accumulates the permanent changes earned during one round and is committed
//! once after the battle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every stat an effect can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    MaxHp,
    Attack,
    Defense,
    CritChance,
    CritMultiplier,
    SpeedRate,
    Luck,
    PenetrationFlat,
    PenetrationPercent,
}

impl StatKey {
    pub const ALL: [StatKey; 9] = [
        StatKey::MaxHp,
        StatKey::Attack,
        StatKey::Defense,
        StatKey::CritChance,
        StatKey::CritMultiplier,
        StatKey::SpeedRate,
        StatKey::Luck,
        StatKey::PenetrationFlat,
        StatKey::PenetrationPercent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatKey::MaxHp => "max HP",
            StatKey::Attack => "attack",
            StatKey::Defense => "defense",
            StatKey::CritChance => "crit chance",
            StatKey::CritMultiplier => "crit multiplier",
            StatKey::SpeedRate => "speed",
            StatKey::Luck => "luck",
            StatKey::PenetrationFlat => "flat penetration",
            StatKey::PenetrationPercent => "penetration %",
        }
    }

    /// Stats stored as whole numbers; fractional deltas are rounded
    pub fn is_integer(self) -> bool {
        matches!(self, StatKey::SpeedRate | StatKey::Luck)
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Permanent stats of the player character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub max_hp: f32,
    pub attack: f32,
    pub defense: f32,
    /// Chance to crit (0.0 to 1.0)
    pub crit_chance: f32,
    /// Damage multiplier on crit (at least 1.0)
    pub crit_multiplier: f32,
    pub speed_rate: i32,
    /// Luck (0 to 100), only meaningful outside battle
    pub luck: i32,
    pub penetration_flat: f32,
    /// Fraction of defense ignored (0.0 to 1.0)
    pub penetration_percent: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            max_hp: 80.0,
            attack: 12.0,
            defense: 3.0,
            crit_chance: 0.10,
            crit_multiplier: 1.5,
            speed_rate: 6,
            luck: 20,
            penetration_flat: 0.0,
            penetration_percent: 0.0,
        }
    }
}

impl PlayerStats {
    pub fn get(&self, stat: StatKey) -> f32 {
        match stat {
            StatKey::MaxHp => self.max_hp,
            StatKey::Attack => self.attack,
            StatKey::Defense => self.defense,
            StatKey::CritChance => self.crit_chance,
            StatKey::CritMultiplier => self.crit_multiplier,
            StatKey::SpeedRate => self.speed_rate as f32,
            StatKey::Luck => self.luck as f32,
            StatKey::PenetrationFlat => self.penetration_flat,
            StatKey::PenetrationPercent => self.penetration_percent,
        }
    }

    /// Force every stat back into its valid domain
    pub fn clamp(&mut self) {
        self.max_hp = self.max_hp.max(1.0);
        self.attack = self.attack.max(0.0);
        self.defense = self.defense.max(0.0);
        self.crit_chance = self.crit_chance.clamp(0.0, 1.0);
        self.crit_multiplier = self.crit_multiplier.max(1.0);
        self.speed_rate = self.speed_rate.max(0);
        self.luck = self.luck.clamp(0, 100);
        self.penetration_flat = self.penetration_flat.max(0.0);
        self.penetration_percent = self.penetration_percent.clamp(0.0, 1.0);
    }

    /// Add a growth delta and clamp
    pub fn apply(&mut self, delta: &GrowthDelta) {
        self.max_hp += delta.max_hp;
        self.attack += delta.attack;
        self.defense += delta.defense;
        self.crit_chance += delta.crit_chance;
        self.crit_multiplier += delta.crit_multiplier;
        self.speed_rate = self.speed_rate.saturating_add(delta.speed_rate);
        self.luck = self.luck.saturating_add(delta.luck);
        self.penetration_flat += delta.penetration_flat;
        self.penetration_percent += delta.penetration_percent;
        self.clamp();
    }
}

/// The player's permanent record: starting stats and current stats
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub name: String,
    pub base: PlayerStats,
    pub actual: PlayerStats,
}

impl PlayerRecord {
    pub fn new(name: impl Into<String>, base: PlayerStats) -> Self {
        let mut base = base;
        base.clamp();
        Self {
            name: name.into(),
            base,
            actual: base,
        }
    }

    pub fn apply_growth(&mut self, delta: &GrowthDelta) {
        self.actual.apply(delta);
    }
}

/// Signed permanent stat changes collected after a battle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthDelta {
    pub max_hp: f32,
    pub attack: f32,
    pub defense: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub speed_rate: i32,
    pub luck: i32,
    pub penetration_flat: f32,
    pub penetration_percent: f32,
}

impl GrowthDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate into one stat; integer stats round the amount
    pub fn add(&mut self, stat: StatKey, amount: f32) {
        match stat {
            StatKey::MaxHp => self.max_hp += amount,
            StatKey::Attack => self.attack += amount,
            StatKey::Defense => self.defense += amount,
            StatKey::CritChance => self.crit_chance += amount,
            StatKey::CritMultiplier => self.crit_multiplier += amount,
            StatKey::SpeedRate => {
                self.speed_rate = self.speed_rate.saturating_add(amount.round() as i32)
            }
            StatKey::Luck => self.luck = self.luck.saturating_add(amount.round() as i32),
            StatKey::PenetrationFlat => self.penetration_flat += amount,
            StatKey::PenetrationPercent => self.penetration_percent += amount,
        }
    }

    pub fn get(&self, stat: StatKey) -> f32 {
        match stat {
            StatKey::MaxHp => self.max_hp,
            StatKey::Attack => self.attack,
            StatKey::Defense => self.defense,
            StatKey::CritChance => self.crit_chance,
            StatKey::CritMultiplier => self.crit_multiplier,
            StatKey::SpeedRate => self.speed_rate as f32,
            StatKey::Luck => self.luck as f32,
            StatKey::PenetrationFlat => self.penetration_flat,
            StatKey::PenetrationPercent => self.penetration_percent,
        }
    }

    pub fn is_empty(&self) -> bool {
        StatKey::ALL.iter().all(|&stat| self.get(stat) == 0.0)
    }

    /// Copy with every entry multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> GrowthDelta {
        let mut scaled = GrowthDelta::default();
        for stat in StatKey::ALL {
            scaled.add(stat, self.get(stat) * factor);
        }
        scaled
    }
}

impl fmt::Display for GrowthDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = StatKey::ALL
            .iter()
            .filter(|&&stat| self.get(stat) != 0.0)
            .map(|&stat| format!("{} {:+}", stat, self.get(stat)))
            .collect();
        if parts.is_empty() {
            f.write_str("no growth")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_player_stats() {
        let stats = PlayerStats::default();
        assert_eq!(stats.max_hp, 80.0);
        assert_eq!(stats.attack, 12.0);
        assert_eq!(stats.speed_rate, 6);
        assert_eq!(stats.luck, 20);
    }

    #[test]
    fn test_clamp_bounds() {
        let mut stats = PlayerStats {
            max_hp: -5.0,
            crit_chance: 1.7,
            crit_multiplier: 0.2,
            luck: 140,
            speed_rate: -3,
            ..Default::default()
        };
        stats.clamp();
        assert_eq!(stats.max_hp, 1.0);
        assert_eq!(stats.crit_chance, 1.0);
        assert_eq!(stats.crit_multiplier, 1.0);
        assert_eq!(stats.luck, 100);
        assert_eq!(stats.speed_rate, 0);
    }

    #[test]
    fn test_growth_rounds_integer_stats() {
        let mut delta = GrowthDelta::new();
        delta.add(StatKey::SpeedRate, 1.6);
        delta.add(StatKey::Luck, 0.4);
        delta.add(StatKey::Attack, 0.4);
        assert_eq!(delta.speed_rate, 2);
        assert_eq!(delta.luck, 0);
        assert!((delta.attack - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_apply_growth_clamps() {
        let mut record = PlayerRecord::new("Hero", PlayerStats::default());
        let mut delta = GrowthDelta::new();
        delta.add(StatKey::Attack, 10.0);
        delta.add(StatKey::Luck, 500.0);
        record.apply_growth(&delta);
        assert_eq!(record.actual.attack, 22.0);
        assert_eq!(record.actual.luck, 100);
        assert_eq!(record.base.attack, 12.0); // Base stays untouched
    }

    #[test]
    fn test_huge_integer_growth_saturates() {
        let mut delta = GrowthDelta::new();
        delta.add(StatKey::SpeedRate, 3.0e9);
        delta.add(StatKey::SpeedRate, 3.0e9);
        delta.add(StatKey::Luck, -3.0e9);
        delta.add(StatKey::Luck, -3.0e9);
        assert_eq!(delta.speed_rate, i32::MAX);
        assert_eq!(delta.luck, i32::MIN);

        let mut record = PlayerRecord::new("Hero", PlayerStats::default());
        record.apply_growth(&delta);
        record.apply_growth(&delta);
        assert_eq!(record.actual.speed_rate, i32::MAX);
        assert_eq!(record.actual.luck, 0);
    }

    #[test]
    fn test_growth_display() {
        let mut delta = GrowthDelta::new();
        assert_eq!(delta.to_string(), "no growth");
        delta.add(StatKey::Attack, 10.0);
        assert_eq!(delta.to_string(), "attack +10");
    }
}
