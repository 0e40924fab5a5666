//! Per-side attack pipeline
//!
//! Steps run in insertion order, then the finalizer. The finalizer is held
//! apart from the step list, so nothing added later can run after it.

use rand::{Rng, RngCore};
use std::fmt;

use crate::combat::attack::AttackSnapshot;
use crate::combat::combatant::CombatantState;
use crate::core::config::BattleConfig;

/// Name of the built-in damage finalizer
pub const FINAL_DAMAGE_STEP: &str = "final_damage";

/// Read-only battle view handed to each step
pub struct StepContext<'a> {
    pub attacker: &'a CombatantState,
    pub defender: Option<&'a CombatantState>,
    pub rng: &'a mut dyn RngCore,
}

/// One stage of attack modification
pub trait AttackStep {
    /// Identity used to keep the finalizer out of the step list
    fn name(&self) -> &str;

    fn apply(&mut self, attack: &mut AttackSnapshot, ctx: &mut StepContext<'_>);
}

/// Ordered steps plus one finalizer pinned last
#[derive(Default)]
pub struct AttackPipeline {
    steps: Vec<Box<dyn AttackStep>>,
    finalizer: Option<Box<dyn AttackStep>>,
}

impl AttackPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. A step sharing the finalizer's name is dropped.
    pub fn add_step(&mut self, step: Box<dyn AttackStep>) -> bool {
        if self.finalizer_name() == Some(step.name()) {
            tracing::debug!(step = step.name(), "Ignoring step that duplicates the finalizer");
            return false;
        }
        self.steps.push(step);
        true
    }

    /// Install the finalizer, removing any same-named step from the list
    pub fn set_finalizer(&mut self, finalizer: Box<dyn AttackStep>) {
        let name = finalizer.name().to_string();
        self.steps.retain(|step| step.name() != name);
        self.finalizer = Some(finalizer);
    }

    pub fn has_finalizer(&self) -> bool {
        self.finalizer.is_some()
    }

    pub fn finalizer_name(&self) -> Option<&str> {
        self.finalizer.as_ref().map(|f| f.name())
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order, then the finalizer
    pub fn process(&mut self, attack: &mut AttackSnapshot, ctx: &mut StepContext<'_>) {
        for step in self.steps.iter_mut() {
            step.apply(attack, ctx);
        }
        match self.finalizer.as_mut() {
            Some(finalizer) => finalizer.apply(attack, ctx),
            None => tracing::warn!("Attack pipeline has no finalizer, damage falls back to raw attack"),
        }
    }
}

impl fmt::Debug for AttackPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttackPipeline")
            .field("steps", &self.step_names())
            .field("finalizer", &self.finalizer_name())
            .finish()
    }
}

/// Defense and crit resolution
///
/// Effective defense is `max(0, defense * (1 - pen%) - pen_flat)`. Damage is
/// `max(0, raw - effective defense)`, multiplied by the crit multiplier when
/// the crit roll lands. Without a defender, damage is `max(0, raw)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalDamage {
    pub defense_reduction: bool,
    pub crit_enabled: bool,
}

impl Default for FinalDamage {
    fn default() -> Self {
        Self {
            defense_reduction: true,
            crit_enabled: true,
        }
    }
}

impl FinalDamage {
    pub fn from_config(config: &BattleConfig) -> Self {
        Self {
            defense_reduction: config.defense_reduction,
            crit_enabled: config.crit_enabled,
        }
    }
}

impl AttackStep for FinalDamage {
    fn name(&self) -> &str {
        FINAL_DAMAGE_STEP
    }

    fn apply(&mut self, attack: &mut AttackSnapshot, ctx: &mut StepContext<'_>) {
        let Some(defender) = ctx.defender else {
            attack.is_crit = false;
            attack.final_damage = Some(attack.raw_attack.max(0.0));
            return;
        };

        let mut damage = attack.raw_attack;
        if self.defense_reduction {
            let effective_defense = (defender.defense() * (1.0 - attack.penetration_percent)
                - attack.penetration_flat)
                .max(0.0);
            damage -= effective_defense;
        }
        damage = damage.max(0.0);

        attack.is_crit = false;
        if self.crit_enabled {
            let chance = attack.crit_chance.clamp(0.0, 1.0);
            let roll: f32 = ctx.rng.gen();
            if roll < chance {
                attack.is_crit = true;
                damage *= attack.crit_multiplier.max(1.0);
            }
        }

        attack.final_damage = Some(damage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combatant::CombatantConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Step that records its name when it runs
    struct Recorder {
        name: String,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl AttackStep for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn apply(&mut self, attack: &mut AttackSnapshot, _ctx: &mut StepContext<'_>) {
            attack.raw_attack += 1.0;
            self.log.borrow_mut().push(self.name.clone());
        }
    }

    fn recorder(name: &str, log: &Rc<RefCell<Vec<String>>>) -> Box<dyn AttackStep> {
        Box::new(Recorder {
            name: name.into(),
            log: Rc::clone(log),
        })
    }

    fn combatant(attack: f32, defense: f32, crit_chance: f32) -> CombatantState {
        CombatantState::from_config(&CombatantConfig {
            attack,
            defense,
            crit_chance,
            crit_multiplier: 2.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_finalizer_runs_after_late_steps() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = AttackPipeline::new();
        pipeline.add_step(recorder("a", &log));
        pipeline.set_finalizer(recorder("final", &log));
        pipeline.add_step(recorder("b", &log)); // Added after the finalizer

        let attacker = combatant(5.0, 0.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut attack = AttackSnapshot::from_attacker(&attacker);
        let mut ctx = StepContext {
            attacker: &attacker,
            defender: None,
            rng: &mut rng,
        };
        pipeline.process(&mut attack, &mut ctx);

        assert_eq!(*log.borrow(), vec!["a", "b", "final"]);
    }

    #[test]
    fn test_finalizer_deduplicated() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = AttackPipeline::new();
        pipeline.add_step(recorder("final", &log));
        pipeline.add_step(recorder("a", &log));
        pipeline.set_finalizer(recorder("final", &log));
        assert_eq!(pipeline.step_names(), vec!["a"]); // Removed from the list

        assert!(!pipeline.add_step(recorder("final", &log)));
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn test_final_damage_subtracts_defense() {
        let attacker = combatant(10.0, 0.0, 0.0);
        let defender = combatant(0.0, 4.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut attack = AttackSnapshot::from_attacker(&attacker);
        let mut ctx = StepContext {
            attacker: &attacker,
            defender: Some(&defender),
            rng: &mut rng,
        };
        FinalDamage::default().apply(&mut attack, &mut ctx);
        assert_eq!(attack.final_damage, Some(6.0));
        assert!(!attack.is_crit);
    }

    #[test]
    fn test_forced_crit_multiplies() {
        let attacker = combatant(10.0, 0.0, 1.0);
        let defender = combatant(0.0, 4.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut attack = AttackSnapshot::from_attacker(&attacker);
        let mut ctx = StepContext {
            attacker: &attacker,
            defender: Some(&defender),
            rng: &mut rng,
        };
        FinalDamage::default().apply(&mut attack, &mut ctx);
        assert_eq!(attack.final_damage, Some(12.0)); // (10 - 4) * 2
        assert!(attack.is_crit);
    }

    #[test]
    fn test_penetration_reduces_defense() {
        let attacker = CombatantState::from_config(&CombatantConfig {
            attack: 10.0,
            penetration_percent: 0.5,
            penetration_flat: 1.0,
            ..Default::default()
        });
        let defender = combatant(0.0, 8.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut attack = AttackSnapshot::from_attacker(&attacker);
        let mut ctx = StepContext {
            attacker: &attacker,
            defender: Some(&defender),
            rng: &mut rng,
        };
        FinalDamage::default().apply(&mut attack, &mut ctx);
        // Effective defense: 8 * 0.5 - 1 = 3
        assert_eq!(attack.final_damage, Some(7.0));
    }

    #[test]
    fn test_missing_finalizer_leaves_damage_unset() {
        let mut pipeline = AttackPipeline::new();
        let attacker = combatant(5.0, 0.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut attack = AttackSnapshot::from_attacker(&attacker);
        let mut ctx = StepContext {
            attacker: &attacker,
            defender: None,
            rng: &mut rng,
        };
        pipeline.process(&mut attack, &mut ctx);
        assert_eq!(attack.final_damage, None);
        assert_eq!(attack.damage(), 5.0);
    }
}
