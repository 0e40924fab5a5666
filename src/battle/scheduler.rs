//! Speed-gauge combat scheduler
//!
//! The scheduler owns both combatants for one battle and advances on real
//! time handed in by the caller. Every tick fills each side's speed gauge by
//! `speed_rate * dt`; a side attacks when its gauge holds a full threshold and
//! its cadence timer has run out. The player side is always tried first.
//!
//! The material forests in play are mutably borrowed for the scheduler's
//! whole lifetime, so a second battle over the same materials cannot start
//! until this one is dropped or turned into a report.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::battle::events::{BattleEvent, BattleOutcome};
use crate::combat::attack::AttackSnapshot;
use crate::combat::combatant::{CombatantConfig, CombatantSnapshot, CombatantState, Combatants};
use crate::combat::pipeline::{AttackPipeline, FinalDamage, StepContext};
use crate::core::config::BattleConfig;
use crate::core::error::{ForgeError, Result};
use crate::core::types::Side;
use crate::logic::context::{EffectTargets, HitCounts, Phase, TraversalContext};
use crate::logic::node::Forest;
use crate::logic::runner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BattleState {
    Idle,
    Fighting,
    Ended,
}

/// Per-side speed accumulator and cadence timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpeedGauge {
    pub value: f32,
    /// Battle clock time before which this side may not attack again
    pub next_attack_at: f32,
}

/// Attacks applied so far; incremented only after post-damage effects run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BattleCounters {
    pub actions: u32,
    pub player_attacks: u32,
    pub enemy_attacks: u32,
}

impl BattleCounters {
    pub fn attacks_by(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_attacks,
            Side::Enemy => self.enemy_attacks,
        }
    }

    pub fn hits(&self) -> HitCounts {
        HitCounts {
            player_attacks: self.player_attacks,
            enemy_attacks: self.enemy_attacks,
        }
    }

    fn record_attack(&mut self, side: Side) {
        self.actions += 1;
        match side {
            Side::Player => self.player_attacks += 1,
            Side::Enemy => self.enemy_attacks += 1,
        }
    }
}

/// Everything needed to start a battle
pub struct BattleSetup<'a> {
    pub player: CombatantConfig,
    pub enemy: Option<CombatantConfig>,
    /// Forests in play, active mask and library, in evaluation order
    pub forests: Vec<&'a mut Forest>,
    pub mask_count: u32,
}

/// Final state handed back once the scheduler is done
#[derive(Debug, Clone, Serialize)]
pub struct BattleReport {
    /// `None` when the battle was stopped before a side fell
    pub outcome: Option<BattleOutcome>,
    pub combatants: Option<Combatants>,
    pub counters: BattleCounters,
    pub elapsed_secs: f32,
}

pub struct CombatScheduler<'a> {
    config: BattleConfig,
    rng: ChaCha8Rng,
    state: BattleState,
    forests: Vec<&'a mut Forest>,
    mask_count: u32,
    combatants: Option<Combatants>,
    gauges: [SpeedGauge; 2],
    counters: BattleCounters,
    pipelines: [AttackPipeline; 2],
    clock: f32,
    outcome: Option<BattleOutcome>,
}

impl<'a> CombatScheduler<'a> {
    pub fn new(config: BattleConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            state: BattleState::Idle,
            forests: Vec::new(),
            mask_count: 0,
            combatants: None,
            gauges: [SpeedGauge::default(); 2],
            counters: BattleCounters::default(),
            pipelines: [AttackPipeline::new(), AttackPipeline::new()],
            clock: 0.0,
            outcome: None,
        }
    }

    /// Build the combatants, run the battle-start phase and pin the finalizers
    pub fn start(&mut self, setup: BattleSetup<'a>) -> Result<Vec<BattleEvent>> {
        if self.state == BattleState::Fighting {
            tracing::warn!("Battle start ignored, a battle is already running");
            return Err(ForgeError::BattleInProgress);
        }
        let Some(enemy) = setup.enemy else {
            tracing::error!("No enemy configured, battle refused");
            return Err(ForgeError::MissingEnemy);
        };

        let mut events = Vec::new();
        let player = CombatantState::from_config(&setup.player);
        let enemy = CombatantState::from_config(&enemy);
        events.push(BattleEvent::Entered {
            player: player.name.clone(),
            enemy: enemy.name.clone(),
        });

        self.combatants = Some(Combatants::new(player, enemy));
        self.forests = setup.forests;
        self.mask_count = setup.mask_count;
        self.gauges = [SpeedGauge::default(); 2];
        self.counters = BattleCounters::default();
        self.clock = 0.0;
        self.outcome = None;
        self.state = BattleState::Fighting;

        // Gate counters are per battle, including ones nested below a phase gate
        for forest in self.forests.iter_mut() {
            forest.reset_state();
        }
        let ctx = TraversalContext::new(Phase::BattleStart)
            .with_hits(self.counters.hits())
            .with_mask_count(self.mask_count);
        self.traverse(&ctx, None);

        for pipeline in self.pipelines.iter_mut() {
            if !pipeline.has_finalizer() {
                pipeline.set_finalizer(Box::new(FinalDamage::from_config(&self.config)));
            }
        }

        events.push(BattleEvent::Started);
        tracing::info!(
            forests = self.forests.len(),
            masks = self.mask_count,
            "Battle started"
        );
        Ok(events)
    }

    /// Advance the battle by `dt` seconds of real time
    pub fn run_tick(&mut self, dt: f32) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        if self.state != BattleState::Fighting {
            return events;
        }
        if self.is_decided() {
            self.finish(&mut events);
            return events;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;
        if let Some(combatants) = &self.combatants {
            for side in Side::ORDER {
                self.gauges[side.index()].value += combatants.get(side).speed_rate() as f32 * dt;
            }
        }

        for side in Side::ORDER {
            if self.try_attack(side, &mut events) && self.is_decided() {
                self.finish(&mut events);
                break;
            }
        }
        events
    }

    /// End the battle at a tick boundary without a result
    pub fn stop(&mut self) {
        if self.state == BattleState::Fighting {
            self.state = BattleState::Ended;
            tracing::info!(actions = self.counters.actions, "Battle stopped");
        }
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == BattleState::Ended
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn counters(&self) -> BattleCounters {
        self.counters
    }

    /// Battle clock in seconds
    pub fn elapsed(&self) -> f32 {
        self.clock
    }

    pub fn gauge(&self, side: Side) -> SpeedGauge {
        self.gauges[side.index()]
    }

    pub fn combatant(&self, side: Side) -> Option<&CombatantState> {
        self.combatants.as_ref().map(|c| c.get(side))
    }

    /// Presentation view: HP and gauge fill
    pub fn snapshot(&self, side: Side) -> Option<CombatantSnapshot> {
        let ratio = self.gauges[side.index()].value / self.config.speed_threshold();
        self.combatant(side).map(|c| c.snapshot(ratio))
    }

    /// Pipeline for one side, for adding custom steps
    pub fn pipeline_mut(&mut self, side: Side) -> &mut AttackPipeline {
        &mut self.pipelines[side.index()]
    }

    /// Release the forests and hand back the final state
    pub fn into_report(self) -> BattleReport {
        BattleReport {
            outcome: self.outcome,
            combatants: self.combatants,
            counters: self.counters,
            elapsed_secs: self.clock,
        }
    }

    fn is_decided(&self) -> bool {
        self.combatants
            .as_ref()
            .map_or(false, Combatants::is_decided)
    }

    fn try_attack(&mut self, side: Side, events: &mut Vec<BattleEvent>) -> bool {
        let threshold = self.config.speed_threshold();
        let gauge = &mut self.gauges[side.index()];
        if gauge.value < threshold || self.clock < gauge.next_attack_at {
            return false;
        }
        gauge.value -= threshold;
        gauge.next_attack_at = self.clock + self.config.attack_interval_secs;
        self.resolve_attack(side, events);
        true
    }

    fn resolve_attack(&mut self, side: Side, events: &mut Vec<BattleEvent>) {
        let defender = side.opposite();
        let action_number = self.counters.actions + 1;
        let attack_number = self.counters.attacks_by(side) + 1;
        let hits = self.counters.hits();

        let Some(combatants) = self.combatants.as_ref() else {
            return;
        };
        let mut attack = AttackSnapshot::from_attacker(combatants.get(side));

        let ctx = TraversalContext::for_attack(Phase::AttackModify, side, action_number, attack_number)
            .with_hits(hits)
            .with_mask_count(self.mask_count)
            .with_attack(attack);
        self.traverse(&ctx, Some(&mut attack));
        events.push(BattleEvent::BeforeAttack {
            attacker: side,
            action_number,
            attack,
        });

        {
            let Self {
                pipelines,
                combatants,
                rng,
                ..
            } = self;
            let Some(combatants) = combatants.as_ref() else {
                return;
            };
            let mut step_ctx = StepContext {
                attacker: combatants.get(side),
                defender: Some(combatants.get(defender)),
                rng,
            };
            pipelines[side.index()].process(&mut attack, &mut step_ctx);
        }
        events.push(BattleEvent::AfterAttack {
            attacker: side,
            action_number,
            attack,
        });

        let damage = attack.damage();
        let Some(combatants) = self.combatants.as_mut() else {
            return;
        };
        let target = combatants.get_mut(defender);
        target.take_damage(damage);
        let defender_hp = target.current_hp();
        events.push(BattleEvent::DamageApplied {
            attacker: side,
            defender,
            attack,
            damage,
            defender_hp,
        });
        tracing::debug!(
            attacker = %side,
            action_number,
            damage,
            crit = attack.is_crit,
            defender_hp,
            "Attack resolved"
        );

        let ctx = TraversalContext::for_attack(Phase::DamageApplied, side, action_number, attack_number)
            .with_hits(hits)
            .with_mask_count(self.mask_count)
            .with_attack(attack)
            .with_damage(damage);
        self.traverse(&ctx, None);

        self.counters.record_attack(side);
    }

    fn finish(&mut self, events: &mut Vec<BattleEvent>) {
        let ctx = TraversalContext::new(Phase::BattleEnd)
            .with_action_count(self.counters.actions)
            .with_hits(self.counters.hits())
            .with_mask_count(self.mask_count);
        self.traverse(&ctx, None);

        self.state = BattleState::Ended;
        events.push(BattleEvent::Ended {
            actions: self.counters.actions,
        });

        let victory = self
            .combatants
            .as_ref()
            .map_or(false, |c| !c.player.is_dead() && c.enemy.is_dead());
        let outcome = if victory {
            BattleOutcome::Victory
        } else {
            BattleOutcome::Defeat
        };
        events.push(match outcome {
            BattleOutcome::Victory => BattleEvent::Victory,
            BattleOutcome::Defeat => BattleEvent::Defeat,
        });
        self.outcome = Some(outcome);
        tracing::info!(
            outcome = ?outcome,
            actions = self.counters.actions,
            elapsed = self.clock,
            "Battle finished"
        );
    }

    /// Walk every forest in play for one phase
    fn traverse(&mut self, ctx: &TraversalContext, attack: Option<&mut AttackSnapshot>) {
        let Self {
            forests,
            combatants,
            rng,
            ..
        } = self;
        let mut targets = EffectTargets::new(rng);
        targets.attack = attack;
        targets.combatants = combatants.as_mut();
        for forest in forests.iter_mut() {
            runner::run(forest, ctx, &mut targets);
        }
    }
}
