use mask_forge::combat::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::rc::Rc;

struct Recorder {
    name: String,
    log: Rc<RefCell<Vec<String>>>,
}

impl AttackStep for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, _attack: &mut AttackSnapshot, _ctx: &mut StepContext<'_>) {
        self.log.borrow_mut().push(self.name.clone());
    }
}

fn state(attack: f32, defense: f32) -> CombatantState {
    CombatantState::from_config(&CombatantConfig {
        max_hp: 100.0,
        attack,
        defense,
        ..Default::default()
    })
}

fn step_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("sharpen".to_string()),
        Just("pierce".to_string()),
        Just("focus".to_string()),
        Just(FINAL_DAMAGE_STEP.to_string()),
    ]
}

proptest! {
    #[test]
    fn finalizer_always_runs_last(
        names in prop::collection::vec(step_name(), 0..12),
        finalizer_at in 0usize..12,
    ) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorder = |name: &str| -> Box<dyn AttackStep> {
            Box::new(Recorder { name: name.to_string(), log: Rc::clone(&log) })
        };

        let mut pipeline = AttackPipeline::new();
        let finalizer_at = finalizer_at.min(names.len());
        for (i, name) in names.iter().enumerate() {
            if i == finalizer_at {
                pipeline.set_finalizer(recorder(FINAL_DAMAGE_STEP));
            }
            pipeline.add_step(recorder(name));
        }
        if !pipeline.has_finalizer() {
            pipeline.set_finalizer(recorder(FINAL_DAMAGE_STEP));
        }

        let attacker = state(10.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = StepContext { attacker: &attacker, defender: None, rng: &mut rng };
        let mut attack = AttackSnapshot::from_attacker(&attacker);
        pipeline.process(&mut attack, &mut ctx);

        let log = log.borrow();
        prop_assert_eq!(log.last().map(String::as_str), Some(FINAL_DAMAGE_STEP));
        prop_assert_eq!(log.iter().filter(|n| n.as_str() == FINAL_DAMAGE_STEP).count(), 1);
        prop_assert_eq!(log.len(), pipeline.len() + 1);
    }

    #[test]
    fn damage_follows_defense_law(
        raw in 0.0f32..500.0,
        defense in 0.0f32..200.0,
        pen_percent in 0.0f32..=1.0,
        pen_flat in 0.0f32..50.0,
    ) {
        let attacker = state(raw, 0.0);
        let defender = state(0.0, defense);
        let mut attack = AttackSnapshot::from_attacker(&attacker);
        attack.penetration_percent = pen_percent;
        attack.penetration_flat = pen_flat;

        let mut step = FinalDamage { defense_reduction: true, crit_enabled: false };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = StepContext { attacker: &attacker, defender: Some(&defender), rng: &mut rng };
        step.apply(&mut attack, &mut ctx);

        let effective = (defense * (1.0 - pen_percent) - pen_flat).max(0.0);
        let expected = (raw - effective).max(0.0);
        prop_assert!((attack.damage() - expected).abs() < 1e-3);
        prop_assert!(attack.damage() >= 0.0);
        prop_assert!(!attack.is_crit);
    }

    #[test]
    fn certain_crit_multiplies(
        raw in 0.0f32..300.0,
        defense in 0.0f32..100.0,
        multiplier in 0.0f32..4.0,
        seed in any::<u64>(),
    ) {
        let attacker = state(raw, 0.0);
        let defender = state(0.0, defense);
        let mut attack = AttackSnapshot::from_attacker(&attacker);
        attack.crit_chance = 1.0;
        attack.crit_multiplier = multiplier;

        let mut step = FinalDamage::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut ctx = StepContext { attacker: &attacker, defender: Some(&defender), rng: &mut rng };
        step.apply(&mut attack, &mut ctx);

        let expected = (raw - defense).max(0.0) * multiplier.max(1.0);
        prop_assert!(attack.is_crit);
        prop_assert!((attack.damage() - expected).abs() < 1e-2);
    }

    #[test]
    fn unfinalized_damage_is_clamped_raw(raw in -100.0f32..100.0) {
        let attacker = state(0.0, 0.0);
        let mut attack = AttackSnapshot::from_attacker(&attacker);
        attack.raw_attack = raw;
        prop_assert_eq!(attack.damage(), raw.max(0.0));
    }
}
