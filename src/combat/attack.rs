//! The in-flight attack snapshot

use serde::{Deserialize, Serialize};

use crate::combat::combatant::CombatantState;

/// Attack fields an attack-phase effect can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackField {
    RawAttack,
    BaseValue,
    CritChance,
    CritMultiplier,
}

impl AttackField {
    pub fn label(self) -> &'static str {
        match self {
            AttackField::RawAttack => "raw attack",
            AttackField::BaseValue => "base attack",
            AttackField::CritChance => "crit chance",
            AttackField::CritMultiplier => "crit multiplier",
        }
    }
}

/// Numbers for one attack, built fresh from the attacker and mutated through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttackSnapshot {
    /// Attacker's attack stat when the attack was built
    pub base_value: f32,
    /// Working attack value that steps and effects modify
    pub raw_attack: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub penetration_flat: f32,
    pub penetration_percent: f32,
    pub is_crit: bool,
    /// Set by the finalizer; `None` until it runs
    pub final_damage: Option<f32>,
}

impl AttackSnapshot {
    pub fn from_attacker(attacker: &CombatantState) -> Self {
        Self {
            base_value: attacker.attack(),
            raw_attack: attacker.attack(),
            crit_chance: attacker.crit_chance(),
            crit_multiplier: attacker.crit_multiplier(),
            penetration_flat: attacker.penetration_flat(),
            penetration_percent: attacker.penetration_percent(),
            is_crit: false,
            final_damage: None,
        }
    }

    /// Add to one field, keeping crit chance in [0, 1] and the multiplier at least 1
    pub fn add_field(&mut self, field: AttackField, amount: f32) {
        match field {
            AttackField::RawAttack => self.raw_attack += amount,
            AttackField::BaseValue => self.base_value += amount,
            AttackField::CritChance => {
                self.crit_chance = (self.crit_chance + amount).clamp(0.0, 1.0)
            }
            AttackField::CritMultiplier => {
                self.crit_multiplier = (self.crit_multiplier + amount).max(1.0)
            }
        }
    }

    /// Damage to apply: the finalized value, or raw attack when no finalizer ran
    pub fn damage(&self) -> f32 {
        self.final_damage.unwrap_or(self.raw_attack).max(0.0)
    }
}
