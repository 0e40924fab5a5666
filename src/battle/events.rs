//! Events returned by the combat scheduler
//!
//! Events are collected into an outbox and handed back from each call.
//! They are informational; nothing in them can change the battle.

use serde::Serialize;

use crate::combat::attack::AttackSnapshot;
use crate::core::types::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    Entered {
        player: String,
        enemy: String,
    },
    Started,
    BeforeAttack {
        attacker: Side,
        action_number: u32,
        attack: AttackSnapshot,
    },
    AfterAttack {
        attacker: Side,
        action_number: u32,
        attack: AttackSnapshot,
    },
    DamageApplied {
        attacker: Side,
        defender: Side,
        attack: AttackSnapshot,
        damage: f32,
        /// Defender HP right after the hit, before post-damage effects
        defender_hp: f32,
    },
    Ended {
        actions: u32,
    },
    Victory,
    Defeat,
}

impl BattleEvent {
    /// One-line summary for logs and text output
    pub fn summary(&self) -> String {
        match self {
            BattleEvent::Entered { player, enemy } => format!("{} encounters {}", player, enemy),
            BattleEvent::Started => "Battle started".to_string(),
            BattleEvent::BeforeAttack {
                attacker,
                action_number,
                attack,
            } => format!(
                "#{} {} winds up (raw {:.1})",
                action_number, attacker, attack.raw_attack
            ),
            BattleEvent::AfterAttack {
                attacker,
                action_number,
                attack,
            } => format!(
                "#{} {} resolved {:.1}{}",
                action_number,
                attacker,
                attack.damage(),
                if attack.is_crit { " (crit)" } else { "" }
            ),
            BattleEvent::DamageApplied {
                attacker,
                defender,
                damage,
                defender_hp,
                ..
            } => format!(
                "{} hits {} for {:.1}, {} HP left",
                attacker, defender, damage, defender_hp
            ),
            BattleEvent::Ended { actions } => format!("Battle ended after {} actions", actions),
            BattleEvent::Victory => "Victory".to_string(),
            BattleEvent::Defeat => "Defeat".to_string(),
        }
    }
}
