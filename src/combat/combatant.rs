//! Live combatant state for one battle
//!
//! Every mutation clamps into the valid domain immediately, so effects can
//! push numbers around freely without producing impossible stats.

use serde::{Deserialize, Serialize};

use crate::combat::stats::{PlayerRecord, StatKey};
use crate::core::types::Side;

/// Starting numbers for one side of a battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantConfig {
    pub name: String,
    pub max_hp: f32,
    pub attack: f32,
    pub defense: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub speed_rate: i32,
    pub penetration_flat: f32,
    pub penetration_percent: f32,
}

impl Default for CombatantConfig {
    fn default() -> Self {
        Self {
            name: "Unknown".into(),
            max_hp: 10.0,
            attack: 1.0,
            defense: 0.0,
            crit_chance: 0.0,
            crit_multiplier: 1.5,
            speed_rate: 1,
            penetration_flat: 0.0,
            penetration_percent: 0.0,
        }
    }
}

impl CombatantConfig {
    /// Battle config built from the player's current permanent stats
    pub fn from_record(record: &PlayerRecord) -> Self {
        let stats = &record.actual;
        Self {
            name: record.name.clone(),
            max_hp: stats.max_hp,
            attack: stats.attack,
            defense: stats.defense,
            crit_chance: stats.crit_chance,
            crit_multiplier: stats.crit_multiplier,
            speed_rate: stats.speed_rate,
            penetration_flat: stats.penetration_flat,
            penetration_percent: stats.penetration_percent,
        }
    }
}

/// One side's stats during a battle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatantState {
    pub name: String,
    max_hp: f32,
    current_hp: f32,
    attack: f32,
    defense: f32,
    crit_chance: f32,
    crit_multiplier: f32,
    speed_rate: i32,
    penetration_flat: f32,
    penetration_percent: f32,
}

impl CombatantState {
    pub fn from_config(config: &CombatantConfig) -> Self {
        let max_hp = config.max_hp.max(1.0);
        Self {
            name: config.name.clone(),
            max_hp,
            current_hp: max_hp,
            attack: config.attack.max(0.0),
            defense: config.defense.max(0.0),
            crit_chance: config.crit_chance.clamp(0.0, 1.0),
            crit_multiplier: config.crit_multiplier.max(1.0),
            speed_rate: config.speed_rate.max(0),
            penetration_flat: config.penetration_flat.max(0.0),
            penetration_percent: config.penetration_percent.clamp(0.0, 1.0),
        }
    }

    pub fn max_hp(&self) -> f32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> f32 {
        self.current_hp
    }

    pub fn attack(&self) -> f32 {
        self.attack
    }

    pub fn defense(&self) -> f32 {
        self.defense
    }

    pub fn crit_chance(&self) -> f32 {
        self.crit_chance
    }

    pub fn crit_multiplier(&self) -> f32 {
        self.crit_multiplier
    }

    pub fn speed_rate(&self) -> i32 {
        self.speed_rate
    }

    pub fn penetration_flat(&self) -> f32 {
        self.penetration_flat
    }

    pub fn penetration_percent(&self) -> f32 {
        self.penetration_percent
    }

    pub fn is_dead(&self) -> bool {
        self.current_hp <= 0.0
    }

    pub fn add_attack(&mut self, delta: f32) {
        self.attack = (self.attack + delta).max(0.0);
    }

    pub fn add_defense(&mut self, delta: f32) {
        self.defense = (self.defense + delta).max(0.0);
    }

    pub fn add_crit_chance(&mut self, delta: f32) {
        self.crit_chance = (self.crit_chance + delta).clamp(0.0, 1.0);
    }

    pub fn add_crit_multiplier(&mut self, delta: f32) {
        self.crit_multiplier = (self.crit_multiplier + delta).max(1.0);
    }

    pub fn add_speed_rate(&mut self, delta: i32) {
        self.speed_rate = self.speed_rate.saturating_add(delta).max(0);
    }

    pub fn add_penetration_flat(&mut self, delta: f32) {
        self.penetration_flat = (self.penetration_flat + delta).max(0.0);
    }

    pub fn add_penetration_percent(&mut self, delta: f32) {
        self.penetration_percent = (self.penetration_percent + delta).clamp(0.0, 1.0);
    }

    /// Change max HP; with `also_heal` the current HP moves by the same amount
    pub fn add_max_hp(&mut self, delta: f32, also_heal: bool) {
        let old_max = self.max_hp;
        self.max_hp = (self.max_hp + delta).max(1.0);
        if also_heal {
            self.current_hp += self.max_hp - old_max;
        }
        self.current_hp = self.current_hp.clamp(0.0, self.max_hp);
    }

    /// Heal or hurt directly, clamped to [0, max HP]
    pub fn add_current_hp(&mut self, delta: f32) {
        self.current_hp = (self.current_hp + delta).clamp(0.0, self.max_hp);
    }

    /// Apply attack damage; non-positive amounts are ignored
    pub fn take_damage(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        self.current_hp = (self.current_hp - amount).max(0.0);
    }

    /// Read a stat; luck has no battle-scope value
    pub fn get(&self, stat: StatKey) -> Option<f32> {
        match stat {
            StatKey::MaxHp => Some(self.max_hp),
            StatKey::Attack => Some(self.attack),
            StatKey::Defense => Some(self.defense),
            StatKey::CritChance => Some(self.crit_chance),
            StatKey::CritMultiplier => Some(self.crit_multiplier),
            StatKey::SpeedRate => Some(self.speed_rate as f32),
            StatKey::Luck => None,
            StatKey::PenetrationFlat => Some(self.penetration_flat),
            StatKey::PenetrationPercent => Some(self.penetration_percent),
        }
    }

    /// Add to a stat by key. Returns false for stats with no battle-scope value.
    pub fn add(&mut self, stat: StatKey, amount: f32, heal_on_max_hp: bool) -> bool {
        match stat {
            StatKey::MaxHp => self.add_max_hp(amount, heal_on_max_hp),
            StatKey::Attack => self.add_attack(amount),
            StatKey::Defense => self.add_defense(amount),
            StatKey::CritChance => self.add_crit_chance(amount),
            StatKey::CritMultiplier => self.add_crit_multiplier(amount),
            StatKey::SpeedRate => self.add_speed_rate(amount.round() as i32),
            StatKey::Luck => return false,
            StatKey::PenetrationFlat => self.add_penetration_flat(amount),
            StatKey::PenetrationPercent => self.add_penetration_percent(amount),
        }
        true
    }

    /// Read-only view for presentation
    pub fn snapshot(&self, gauge_ratio: f32) -> CombatantSnapshot {
        CombatantSnapshot {
            name: self.name.clone(),
            current_hp: self.current_hp,
            max_hp: self.max_hp,
            gauge_ratio: gauge_ratio.clamp(0.0, 1.0),
        }
    }
}

/// Both sides of a battle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combatants {
    pub player: CombatantState,
    pub enemy: CombatantState,
}

impl Combatants {
    pub fn new(player: CombatantState, enemy: CombatantState) -> Self {
        Self { player, enemy }
    }

    pub fn get(&self, side: Side) -> &CombatantState {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut CombatantState {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    /// True once either side is down
    pub fn is_decided(&self) -> bool {
        self.player.is_dead() || self.enemy.is_dead()
    }
}

/// HP and gauge fill polled by presentation each tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatantSnapshot {
    pub name: String,
    pub current_hp: f32,
    pub max_hp: f32,
    /// Speed gauge fill relative to the attack threshold (0.0 to 1.0)
    pub gauge_ratio: f32,
}
