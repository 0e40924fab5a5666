//! Traversal phases, the per-call context and the effect targets
//!
//! `TraversalContext` is a plain `Copy` snapshot. Everything an effect may
//! write through lives in `EffectTargets`, borrowed for one traversal only.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::combat::attack::AttackSnapshot;
use crate::combat::combatant::Combatants;
use crate::combat::stats::{GrowthDelta, PlayerStats};
use crate::core::types::Side;
use crate::mask::binding::ManaPool;

/// Lifecycle moment a traversal represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Bind,
    BattleStart,
    AttackModify,
    DamageApplied,
    BattleEnd,
    PersistentGrowth,
    /// Text generation only; nothing executes
    Description,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Bind => "binding",
            Phase::BattleStart => "battle start",
            Phase::AttackModify => "attack resolution",
            Phase::DamageApplied => "after damage",
            Phase::BattleEnd => "battle end",
            Phase::PersistentGrowth => "growth settlement",
            Phase::Description => "description",
        }
    }

    /// Phases that run once per attack
    pub fn is_attack_phase(self) -> bool {
        matches!(self, Phase::AttackModify | Phase::DamageApplied)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Attacks each side has landed so far in the live battle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HitCounts {
    pub player_attacks: u32,
    pub enemy_attacks: u32,
}

impl HitCounts {
    pub fn attacks_by(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_attacks,
            Side::Enemy => self.enemy_attacks,
        }
    }

    /// Hits a side has taken: the attacks landed by the other side
    pub fn received_by(&self, side: Side) -> u32 {
        self.attacks_by(side.opposite())
    }
}

/// Snapshot handed to every node during one traversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraversalContext {
    pub phase: Phase,
    pub attacker: Option<Side>,
    pub defender: Option<Side>,
    /// 1-based global action index of the attack in flight; after a battle,
    /// the number of actions it took (0 when no battle ran)
    pub action_number: u32,
    /// 1-based index of the in-flight attack among the attacker's own attacks
    pub attack_number: u32,
    /// Applied attack counts; `None` when no battle is live
    pub hits: Option<HitCounts>,
    /// Attack as it stood when the phase began
    pub attack: Option<AttackSnapshot>,
    /// Masks contributing to the battle (library plus active)
    pub mask_count: u32,
    /// Damage applied by the attack in flight
    pub damage: f32,
}

impl TraversalContext {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            attacker: None,
            defender: None,
            action_number: 0,
            attack_number: 0,
            hits: None,
            attack: None,
            mask_count: 0,
            damage: 0.0,
        }
    }

    pub fn description() -> Self {
        Self::new(Phase::Description)
    }

    /// Context for one attack; the defender is the attacker's opposite
    pub fn for_attack(phase: Phase, attacker: Side, action_number: u32, attack_number: u32) -> Self {
        Self {
            attacker: Some(attacker),
            defender: Some(attacker.opposite()),
            action_number,
            attack_number,
            ..Self::new(phase)
        }
    }

    pub fn with_hits(mut self, hits: HitCounts) -> Self {
        self.hits = Some(hits);
        self
    }

    pub fn with_attack(mut self, attack: AttackSnapshot) -> Self {
        self.attack = Some(attack);
        self
    }

    /// Battle-wide action count for phases outside an attack
    pub fn with_action_count(mut self, actions: u32) -> Self {
        self.action_number = actions;
        self
    }

    pub fn with_mask_count(mut self, mask_count: u32) -> Self {
        self.mask_count = mask_count;
        self
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }
}

/// Mutable handles effects write through; any of them may be absent
pub struct EffectTargets<'t> {
    pub attack: Option<&'t mut AttackSnapshot>,
    pub combatants: Option<&'t mut Combatants>,
    pub growth: Option<&'t mut GrowthDelta>,
    /// Permanent player stats, read by growth effects
    pub record: Option<&'t PlayerStats>,
    pub mana: Option<&'t mut ManaPool>,
    pub rng: &'t mut dyn RngCore,
}

impl<'t> EffectTargets<'t> {
    pub fn new(rng: &'t mut dyn RngCore) -> Self {
        Self {
            attack: None,
            combatants: None,
            growth: None,
            record: None,
            mana: None,
            rng,
        }
    }

    pub fn with_attack(mut self, attack: &'t mut AttackSnapshot) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn with_combatants(mut self, combatants: &'t mut Combatants) -> Self {
        self.combatants = Some(combatants);
        self
    }

    pub fn with_growth(mut self, growth: &'t mut GrowthDelta) -> Self {
        self.growth = Some(growth);
        self
    }

    pub fn with_record(mut self, record: &'t PlayerStats) -> Self {
        self.record = Some(record);
        self
    }

    pub fn with_mana(mut self, mana: &'t mut ManaPool) -> Self {
        self.mana = Some(mana);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_context_sets_defender() {
        let ctx = TraversalContext::for_attack(Phase::AttackModify, Side::Enemy, 3, 2);
        assert_eq!(ctx.defender, Some(Side::Player));
        assert_eq!(ctx.action_number, 3);
        assert_eq!(ctx.attack_number, 2);
        assert!(ctx.hits.is_none());
    }

    #[test]
    fn test_received_hits() {
        let hits = HitCounts {
            player_attacks: 4,
            enemy_attacks: 1,
        };
        assert_eq!(hits.received_by(Side::Enemy), 4);
        assert_eq!(hits.received_by(Side::Player), 1);
    }
}
