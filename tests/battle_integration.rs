//! Battle system integration tests

use mask_forge::battle::*;
use mask_forge::combat::*;
use mask_forge::core::types::Side;
use mask_forge::core::BattleConfig;
use mask_forge::logic::*;

fn fighter(name: &str, max_hp: f32, attack: f32, speed_rate: i32) -> CombatantConfig {
    CombatantConfig {
        name: name.into(),
        max_hp,
        attack,
        speed_rate,
        ..Default::default()
    }
}

fn player_damage(events: &[BattleEvent]) -> Vec<f32> {
    events
        .iter()
        .filter_map(|event| match event {
            BattleEvent::DamageApplied {
                attacker: Side::Player,
                damage,
                ..
            } => Some(*damage),
            _ => None,
        })
        .collect()
}

fn run_to_end(scheduler: &mut CombatScheduler<'_>, dt: f32, max_ticks: u32) -> Vec<BattleEvent> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        if scheduler.is_finished() {
            break;
        }
        events.extend(scheduler.run_tick(dt));
    }
    events
}

struct Doubler;

impl AttackStep for Doubler {
    fn name(&self) -> &str {
        "doubler"
    }

    fn apply(&mut self, attack: &mut AttackSnapshot, _ctx: &mut StepContext<'_>) {
        attack.raw_attack *= 2.0;
    }
}

#[test]
fn test_after_hits_counts_the_hit_in_flight() {
    let mut forest = Forest::new("vengeance");
    let gate = forest
        .add_gate(
            None,
            Gate::new(GateKind::AfterHits {
                target: Side::Enemy,
                hits: 2,
            }),
        )
        .unwrap();
    forest
        .add_effect(
            Some(gate),
            Effect::AttackField {
                field: AttackField::RawAttack,
                amount: 100.0,
            },
        )
        .unwrap();

    let mut scheduler = CombatScheduler::new(BattleConfig::default());
    scheduler
        .start(BattleSetup {
            player: fighter("Hero", 50.0, 1.0, 10),
            enemy: Some(fighter("Wall", 1000.0, 0.0, 0)),
            forests: vec![&mut forest],
            mask_count: 1,
        })
        .unwrap();

    let mut events = Vec::new();
    for _ in 0..3 {
        events.extend(scheduler.run_tick(1.0));
    }
    // The second attack already sees itself as the second hit
    assert_eq!(player_damage(&events), vec![1.0, 101.0, 101.0]);
}

#[test]
fn test_custom_step_runs_before_finalizer() {
    let mut scheduler = CombatScheduler::new(BattleConfig::default());
    assert!(scheduler.pipeline_mut(Side::Player).add_step(Box::new(Doubler)));
    scheduler
        .start(BattleSetup {
            player: fighter("Hero", 50.0, 6.0, 10),
            enemy: Some(CombatantConfig {
                defense: 2.0,
                ..fighter("Knight", 100.0, 0.0, 0)
            }),
            forests: Vec::new(),
            mask_count: 0,
        })
        .unwrap();

    let pipeline = scheduler.pipeline_mut(Side::Player);
    assert_eq!(pipeline.step_names(), vec!["doubler"]);
    assert_eq!(pipeline.finalizer_name(), Some(FINAL_DAMAGE_STEP));

    let events = scheduler.run_tick(1.0);
    // 6 doubled to 12, then 2 defense
    assert_eq!(player_damage(&events), vec![10.0]);
}

#[test]
fn test_step_named_like_finalizer_is_refused() {
    struct Impostor;
    impl AttackStep for Impostor {
        fn name(&self) -> &str {
            FINAL_DAMAGE_STEP
        }
        fn apply(&mut self, attack: &mut AttackSnapshot, _ctx: &mut StepContext<'_>) {
            attack.final_damage = Some(9999.0);
        }
    }

    let mut scheduler = CombatScheduler::new(BattleConfig::default());
    scheduler
        .start(BattleSetup {
            player: fighter("Hero", 50.0, 5.0, 10),
            enemy: Some(fighter("Slime", 100.0, 0.0, 0)),
            forests: Vec::new(),
            mask_count: 0,
        })
        .unwrap();
    assert!(!scheduler.pipeline_mut(Side::Player).add_step(Box::new(Impostor)));
    assert_eq!(player_damage(&scheduler.run_tick(1.0)), vec![5.0]);
}

#[test]
fn test_same_seed_replays_identically() {
    let config = BattleConfig {
        seed: 99,
        ..Default::default()
    };
    let player = CombatantConfig {
        crit_chance: 0.5,
        crit_multiplier: 2.0,
        ..fighter("Hero", 60.0, 7.0, 8)
    };
    let enemy = CombatantConfig {
        crit_chance: 0.3,
        ..fighter("Bandit", 60.0, 6.0, 7)
    };

    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut scheduler = CombatScheduler::new(config.clone());
        scheduler
            .start(BattleSetup {
                player: player.clone(),
                enemy: Some(enemy.clone()),
                forests: Vec::new(),
                mask_count: 0,
            })
            .unwrap();
        runs.push(run_to_end(&mut scheduler, 0.05, 20_000));
    }
    assert_eq!(runs[0], runs[1]);
    assert!(matches!(
        runs[0].last(),
        Some(BattleEvent::Victory) | Some(BattleEvent::Defeat)
    ));
}

#[test]
fn test_heal_after_enemy_hits_is_capped() {
    // Heals the player for 5 after each of the first two enemy hits
    let mut forest = Forest::new("pearl");
    let phase = forest
        .add_gate(None, Gate::new(GateKind::Phase(Phase::DamageApplied)))
        .unwrap();
    forest.set_side(phase, SideFilter::Enemy).unwrap();
    let cap = forest
        .add_gate(Some(phase), Gate::new(GateKind::MaxTriggers(2)))
        .unwrap();
    forest
        .add_effect(
            Some(cap),
            Effect::AdjustCurrentHp {
                target: HpTarget::Defender,
                adjust: HpAdjust::Flat(5.0),
            },
        )
        .unwrap();

    let mut scheduler = CombatScheduler::new(BattleConfig::default());
    scheduler
        .start(BattleSetup {
            player: fighter("Hero", 100.0, 0.0, 0),
            enemy: Some(fighter("Ogre", 100.0, 10.0, 10)),
            forests: vec![&mut forest],
            mask_count: 1,
        })
        .unwrap();

    for _ in 0..3 {
        scheduler.run_tick(1.0);
    }
    let hero = scheduler.combatant(Side::Player).unwrap();
    // Three hits of 10, two heals of 5
    assert_eq!(hero.current_hp(), 80.0);
    assert_eq!(scheduler.counters().enemy_attacks, 3);
}

#[test]
fn test_report_after_victory() {
    let mut scheduler = CombatScheduler::new(BattleConfig::default());
    scheduler
        .start(BattleSetup {
            player: fighter("Hero", 50.0, 15.0, 10),
            enemy: Some(fighter("Slime", 30.0, 1.0, 1)),
            forests: Vec::new(),
            mask_count: 0,
        })
        .unwrap();
    run_to_end(&mut scheduler, 0.05, 1000);

    let report = scheduler.into_report();
    assert_eq!(report.outcome, Some(BattleOutcome::Victory));
    assert_eq!(report.counters.player_attacks, 2);
    let combatants = report.combatants.unwrap();
    assert!(combatants.enemy.is_dead());
    assert!(!combatants.player.is_dead());
}
