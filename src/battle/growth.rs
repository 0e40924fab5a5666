//! Post-battle growth
//!
//! Collection and commitment are separate steps. The collector runs every
//! forest through the growth phase and gathers a `GrowthDelta` without
//! touching the player record; a `GrowthCommitter` decides how that delta
//! lands on the record.

use rand::RngCore;

use crate::battle::scheduler::BattleReport;
use crate::combat::stats::{GrowthDelta, PlayerRecord, PlayerStats};
use crate::logic::context::{EffectTargets, Phase, TraversalContext};
use crate::logic::node::Forest;
use crate::logic::runner;

pub struct GrowthCollector<'r> {
    record: &'r PlayerStats,
    battle: Option<&'r BattleReport>,
    mask_count: u32,
}

impl<'r> GrowthCollector<'r> {
    pub fn new(record: &'r PlayerStats) -> Self {
        Self {
            record,
            battle: None,
            mask_count: 0,
        }
    }

    /// Final battle state, readable by percent effects sourced from a side
    pub fn with_battle(mut self, report: &'r BattleReport) -> Self {
        self.battle = Some(report);
        self
    }

    pub fn with_mask_count(mut self, mask_count: u32) -> Self {
        self.mask_count = mask_count;
        self
    }

    /// Run the growth phase over `forests` and return the summed delta
    pub fn collect<'f>(
        &self,
        forests: impl IntoIterator<Item = &'f mut Forest>,
        rng: &mut dyn RngCore,
    ) -> GrowthDelta {
        let mut delta = GrowthDelta::new();
        // Effects may write to the combatants; the report stays untouched
        let mut combatants = self.battle.and_then(|report| report.combatants.clone());
        let actions = self.battle.map_or(0, |report| report.counters.actions);
        let ctx = TraversalContext::new(Phase::PersistentGrowth)
            .with_action_count(actions)
            .with_mask_count(self.mask_count);

        let mut targets = EffectTargets::new(rng)
            .with_growth(&mut delta)
            .with_record(self.record);
        targets.combatants = combatants.as_mut();

        let mut visited = 0;
        for forest in forests {
            runner::run(forest, &ctx, &mut targets);
            visited += 1;
        }
        drop(targets);

        tracing::debug!(forests = visited, delta = %delta, "Growth collected");
        delta
    }
}

/// Applies a collected delta to the permanent record
pub trait GrowthCommitter {
    fn commit(&self, record: &mut PlayerRecord, delta: &GrowthDelta);
}

/// Apply the delta as collected
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectCommit;

impl GrowthCommitter for DirectCommit {
    fn commit(&self, record: &mut PlayerRecord, delta: &GrowthDelta) {
        record.apply_growth(delta);
        tracing::info!(growth = %delta, "Growth committed");
    }
}

/// Apply the delta multiplied by a fixed factor
#[derive(Debug, Clone, Copy)]
pub struct ScaledCommit {
    pub factor: f32,
}

impl GrowthCommitter for ScaledCommit {
    fn commit(&self, record: &mut PlayerRecord, delta: &GrowthDelta) {
        let scaled = delta.scaled(self.factor);
        record.apply_growth(&scaled);
        tracing::info!(growth = %scaled, factor = self.factor, "Scaled growth committed");
    }
}
