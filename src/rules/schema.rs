//! Content schema types for TOML deserialization.
//!
//! A content file holds the battle tuning, the player's starting stats, the
//! enemy roster and every material definition with its logic forest. Nodes
//! nest through `children`; a node names at most one of `gate`, `effect` or
//! `use` (a behavior declared once under the material's `shared` table).

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::combat::attack::AttackField;
use crate::combat::combatant::CombatantConfig;
use crate::combat::stats::{PlayerStats, StatKey};
use crate::core::config::BattleConfig;
use crate::core::types::Side;
use crate::logic::context::Phase;
use crate::logic::effects::{Effect, HpAdjust, HpTarget, StatSource};
use crate::logic::gates::GateKind;
use crate::logic::node::SideFilter;
use crate::mask::material::Quality;

/// Complete content file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub battle: BattleConfig,
    #[serde(default)]
    pub player: PlayerDef,
    /// Material ids stocked into the inventory when a session begins
    #[serde(default)]
    pub starting_materials: Vec<String>,
    #[serde(default, rename = "enemy")]
    pub enemies: Vec<EnemyDef>,
    #[serde(default, rename = "material")]
    pub materials: Vec<MaterialSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerDef {
    #[serde(default = "default_player_name")]
    pub name: String,
    #[serde(flatten)]
    pub stats: PlayerStats,
}

fn default_player_name() -> String {
    "Masked One".to_string()
}

impl Default for PlayerDef {
    fn default() -> Self {
        Self {
            name: default_player_name(),
            stats: PlayerStats::default(),
        }
    }
}

/// An enemy and the material ids it drops on defeat
#[derive(Debug, Clone, Deserialize)]
pub struct EnemyDef {
    #[serde(flatten)]
    pub stats: CombatantConfig,
    #[serde(default)]
    pub rewards: Vec<String>,
}

/// Material definition as authored
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialSchema {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mana_cost: u32,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default = "default_shelf_life")]
    pub shelf_life_turns: u32,
    /// Named behaviors nodes can reference with `use`
    #[serde(default)]
    pub shared: BTreeMap<String, SharedDef>,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

fn default_shelf_life() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct SharedDef {
    pub gate: Option<GateDef>,
    pub effect: Option<EffectDef>,
    #[serde(default)]
    pub invert: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDef {
    pub title: Option<String>,
    #[serde(default)]
    pub side: SideFilter,
    pub gate: Option<GateDef>,
    pub effect: Option<EffectDef>,
    #[serde(rename = "use")]
    pub shared: Option<String>,
    /// Inverts an inline gate
    #[serde(default)]
    pub invert: bool,
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateDef {
    Phase { phase: Phase },
    NthAction { n: u32 },
    NthAttack { n: u32 },
    FirstActions { n: u32 },
    FirstAttacks { n: u32 },
    EveryActions { n: u32 },
    WaitEvery { n: u32 },
    MaxTriggers { n: u32 },
    Chance { chance: f32 },
    AfterHits { target: Side, hits: u32 },
    BattleStart,
    BattleEnd,
}

impl From<GateDef> for GateKind {
    fn from(def: GateDef) -> Self {
        match def {
            GateDef::Phase { phase } => GateKind::Phase(phase),
            GateDef::NthAction { n } => GateKind::NthAction(n),
            GateDef::NthAttack { n } => GateKind::NthAttack(n),
            GateDef::FirstActions { n } => GateKind::FirstActions(n),
            GateDef::FirstAttacks { n } => GateKind::FirstAttacks(n),
            GateDef::EveryActions { n } => GateKind::EveryActions(n),
            GateDef::WaitEvery { n } => GateKind::WaitEvery(n),
            GateDef::MaxTriggers { n } => GateKind::MaxTriggers(n),
            GateDef::Chance { chance } => GateKind::Chance(chance),
            GateDef::AfterHits { target, hits } => GateKind::AfterHits { target, hits },
            GateDef::BattleStart => GateKind::BattleStart,
            GateDef::BattleEnd => GateKind::BattleEnd,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectDef {
    AttackField {
        field: AttackField,
        amount: f32,
    },
    MaskCountScale {
        field: AttackField,
        per_mask: f32,
    },
    AddStats {
        target: Side,
        stats: BTreeMap<StatKey, f32>,
        #[serde(default)]
        heal_on_max_hp: bool,
        #[serde(default)]
        persistent: bool,
    },
    PercentAttach {
        source: StatSource,
        source_stat: StatKey,
        target: Side,
        target_stat: StatKey,
        /// Fraction, 0.5 is half
        percent: f32,
        #[serde(default)]
        heal_on_max_hp: bool,
        #[serde(default)]
        persistent: bool,
    },
    RestoreMana {
        amount: u32,
    },
    AdjustHp {
        target: HpTarget,
        amount: f32,
    },
    AdjustHpPercent {
        target: HpTarget,
        /// Fraction of max HP
        percent: f32,
    },
}

impl From<EffectDef> for Effect {
    fn from(def: EffectDef) -> Self {
        match def {
            EffectDef::AttackField { field, amount } => Effect::AttackField { field, amount },
            EffectDef::MaskCountScale { field, per_mask } => {
                Effect::MaskCountScale { field, per_mask }
            }
            EffectDef::AddStats {
                target,
                stats,
                heal_on_max_hp,
                persistent,
            } => Effect::AddStats {
                target,
                deltas: stats.into_iter().collect(),
                heal_on_max_hp,
                persistent,
            },
            EffectDef::PercentAttach {
                source,
                source_stat,
                target,
                target_stat,
                percent,
                heal_on_max_hp,
                persistent,
            } => Effect::PercentAttach {
                source,
                source_stat,
                target,
                target_stat,
                percent,
                heal_on_max_hp,
                persistent,
            },
            EffectDef::RestoreMana { amount } => Effect::RestoreMana { amount },
            EffectDef::AdjustHp { target, amount } => Effect::AdjustCurrentHp {
                target,
                adjust: HpAdjust::Flat(amount),
            },
            EffectDef::AdjustHpPercent { target, percent } => Effect::AdjustCurrentHp {
                target,
                adjust: HpAdjust::PercentOfMax(percent),
            },
        }
    }
}
