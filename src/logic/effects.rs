//! Effect catalog
//!
//! Attack effects touch only the in-flight attack and run only during
//! `AttackModify`. General effects run in every other executing phase and
//! write either to the live combatants or, with `persistent`, to the growth
//! delta. Which phase an effect fires in is decided by the gates above it.

use serde::{Deserialize, Serialize};

use crate::combat::attack::AttackField;
use crate::combat::stats::StatKey;
use crate::core::types::Side;
use crate::logic::context::{EffectTargets, Phase, TraversalContext};

/// Where a percent-attach effect reads its source value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatSource {
    /// Player's live battle stats
    Player,
    /// Enemy's live battle stats
    Enemy,
    /// Player's permanent record
    Record,
}

impl StatSource {
    fn label(self) -> &'static str {
        match self {
            StatSource::Player => "player",
            StatSource::Enemy => "enemy",
            StatSource::Record => "permanent",
        }
    }
}

/// Which participant of the attack in flight an HP adjustment hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HpTarget {
    Attacker,
    Defender,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HpAdjust {
    Flat(f32),
    /// Fraction of the target's max HP
    PercentOfMax(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Add a constant to one attack field
    AttackField { field: AttackField, amount: f32 },
    /// Add `per_mask * mask count` to one attack field
    MaskCountScale { field: AttackField, per_mask: f32 },
    /// Flat deltas on one side's stats, or on growth when persistent
    AddStats {
        target: Side,
        deltas: Vec<(StatKey, f32)>,
        heal_on_max_hp: bool,
        persistent: bool,
    },
    /// Add `percent` of a source stat to a target stat
    PercentAttach {
        source: StatSource,
        source_stat: StatKey,
        target: Side,
        target_stat: StatKey,
        percent: f32,
        heal_on_max_hp: bool,
        persistent: bool,
    },
    /// Refill the owning mask's mana while binding
    RestoreMana { amount: u32 },
    /// Change the current HP of the attacker or defender after damage
    AdjustCurrentHp { target: HpTarget, adjust: HpAdjust },
}

impl Effect {
    /// Effects that only make sense against the in-flight attack
    pub fn is_attack_effect(&self) -> bool {
        matches!(
            self,
            Effect::AttackField { .. } | Effect::MaskCountScale { .. }
        )
    }

    /// Apply the effect. Returns true if anything was written.
    pub fn apply(&self, ctx: &TraversalContext, targets: &mut EffectTargets<'_>) -> bool {
        if ctx.phase == Phase::Description {
            return false;
        }
        if self.is_attack_effect() != (ctx.phase == Phase::AttackModify) {
            return false;
        }

        match self {
            Effect::AttackField { field, amount } => {
                let Some(attack) = targets.attack.as_deref_mut() else {
                    return false;
                };
                attack.add_field(*field, *amount);
                true
            }
            Effect::MaskCountScale { field, per_mask } => {
                let Some(attack) = targets.attack.as_deref_mut() else {
                    return false;
                };
                attack.add_field(*field, per_mask * ctx.mask_count as f32);
                true
            }
            Effect::AddStats {
                target,
                deltas,
                heal_on_max_hp,
                persistent,
            } => {
                if *persistent {
                    let Some(growth) = targets.growth.as_deref_mut() else {
                        return false;
                    };
                    for &(stat, amount) in deltas {
                        growth.add(stat, amount);
                    }
                    return true;
                }
                let Some(combatants) = targets.combatants.as_deref_mut() else {
                    return false;
                };
                let state = combatants.get_mut(*target);
                for &(stat, amount) in deltas {
                    if !state.add(stat, amount, *heal_on_max_hp) {
                        tracing::warn!(stat = %stat, "Stat has no battle value, ignored");
                    }
                }
                true
            }
            Effect::PercentAttach {
                source,
                source_stat,
                target,
                target_stat,
                percent,
                heal_on_max_hp,
                persistent,
            } => {
                let Some(value) = read_source(*source, *source_stat, targets) else {
                    tracing::debug!(source = source.label(), stat = %source_stat, "Percent source unavailable");
                    return false;
                };
                let amount = value * percent;
                if *persistent {
                    let Some(growth) = targets.growth.as_deref_mut() else {
                        return false;
                    };
                    growth.add(*target_stat, amount);
                    return true;
                }
                let Some(combatants) = targets.combatants.as_deref_mut() else {
                    return false;
                };
                if !combatants
                    .get_mut(*target)
                    .add(*target_stat, amount, *heal_on_max_hp)
                {
                    tracing::warn!(stat = %target_stat, "Percent attach target has no battle value, ignored");
                    return false;
                }
                true
            }
            Effect::RestoreMana { amount } => {
                if ctx.phase != Phase::Bind {
                    return false;
                }
                let Some(mana) = targets.mana.as_deref_mut() else {
                    return false;
                };
                mana.restore(*amount);
                true
            }
            Effect::AdjustCurrentHp { target, adjust } => {
                let side = match target {
                    HpTarget::Attacker => ctx.attacker,
                    HpTarget::Defender => ctx.defender,
                };
                let (Some(side), Some(combatants)) = (side, targets.combatants.as_deref_mut())
                else {
                    return false;
                };
                let state = combatants.get_mut(side);
                let delta = match adjust {
                    HpAdjust::Flat(amount) => *amount,
                    HpAdjust::PercentOfMax(fraction) => state.max_hp() * fraction,
                };
                state.add_current_hp(delta);
                true
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Effect::AttackField { field, amount } => {
                capitalize(&format!("{} {:+}", field.label(), amount))
            }
            Effect::MaskCountScale { field, per_mask } => {
                capitalize(&format!("{} {:+} per mask in play", field.label(), per_mask))
            }
            Effect::AddStats {
                target,
                deltas,
                persistent,
                ..
            } => {
                let parts: Vec<String> = deltas
                    .iter()
                    .map(|(stat, amount)| format!("{} {:+}", stat, amount))
                    .collect();
                if *persistent {
                    format!("Permanently: {}", parts.join(", "))
                } else {
                    capitalize(&format!("{} {}", target, parts.join(", ")))
                }
            }
            Effect::PercentAttach {
                source,
                source_stat,
                target,
                target_stat,
                percent,
                persistent,
                ..
            } => {
                let share = format!("{:.0}%", percent * 100.0);
                if *persistent {
                    format!(
                        "Permanently add {} of {} {} to {}",
                        share,
                        source.label(),
                        source_stat,
                        target_stat
                    )
                } else {
                    format!(
                        "Add {} of {} {} to {} {}",
                        share,
                        source.label(),
                        source_stat,
                        target,
                        target_stat
                    )
                }
            }
            Effect::RestoreMana { amount } => format!("Restore {} mana when bound", amount),
            Effect::AdjustCurrentHp { target, adjust } => {
                let who = match target {
                    HpTarget::Attacker => "Attacker",
                    HpTarget::Defender => "Defender",
                };
                match adjust {
                    HpAdjust::Flat(amount) => format!("{} current HP {:+}", who, amount),
                    HpAdjust::PercentOfMax(fraction) => {
                        format!("{} current HP {:+.0}% of max HP", who, fraction * 100.0)
                    }
                }
            }
        }
    }
}

fn read_source(source: StatSource, stat: StatKey, targets: &EffectTargets<'_>) -> Option<f32> {
    match source {
        StatSource::Record => targets.record.map(|record| record.get(stat)),
        StatSource::Player => targets.combatants.as_deref()?.player.get(stat),
        StatSource::Enemy => targets.combatants.as_deref()?.enemy.get(stat),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
