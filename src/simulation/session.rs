//! Round orchestration
//!
//! One round is: start a mask, bind materials from the inventory, end the
//! make phase (shelf life ticks down), fight one enemy, then settle. Settling
//! files the current mask into the library, collects growth from every
//! material in play and commits it to the player record.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::battle::growth::{DirectCommit, GrowthCollector, GrowthCommitter};
use crate::battle::scheduler::{BattleReport, BattleSetup, CombatScheduler};
use crate::battle::events::BattleOutcome;
use crate::combat::combatant::CombatantConfig;
use crate::combat::stats::{GrowthDelta, PlayerRecord};
use crate::core::config::BattleConfig;
use crate::core::error::{ForgeError, Result};
use crate::core::types::MaterialInstanceId;
use crate::logic::node::Forest;
use crate::mask::binding::{BindError, Mask};
use crate::mask::inventory::MaterialInventory;
use crate::mask::material::{MaterialInstance, MaterialRegistry};
use crate::rules::loader::Content;
use crate::rules::schema::EnemyDef;

/// What settling a battle produced
#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub round: u32,
    pub growth: GrowthDelta,
    /// Names of materials stocked as victory rewards
    pub rewards: Vec<String>,
}

/// A fought and settled round
#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    pub enemy: String,
    pub report: BattleReport,
    pub settlement: Settlement,
}

pub struct GameSession {
    config: BattleConfig,
    record: PlayerRecord,
    registry: MaterialRegistry,
    enemies: Vec<EnemyDef>,
    library: Vec<Mask>,
    current: Option<Mask>,
    inventory: MaterialInventory,
    committer: Box<dyn GrowthCommitter>,
    rng: ChaCha8Rng,
    round: u32,
    last_enemy: Option<String>,
    /// Cursor into `enemies` for sequential spawning
    next_enemy_index: usize,
}

impl GameSession {
    /// New session with the content's starting materials stocked
    pub fn new(content: Content) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(content.battle.seed);
        let mut session = Self {
            config: content.battle,
            record: content.player,
            registry: content.registry,
            enemies: content.enemies,
            library: Vec::new(),
            current: None,
            inventory: MaterialInventory::new(),
            committer: Box::new(DirectCommit),
            rng,
            round: 1,
            last_enemy: None,
            next_enemy_index: 0,
        };
        for id in &content.starting_materials {
            session.stock(id)?;
        }
        Ok(session)
    }

    pub fn with_committer(mut self, committer: Box<dyn GrowthCommitter>) -> Self {
        self.committer = committer;
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn record(&self) -> &PlayerRecord {
        &self.record
    }

    pub fn registry(&self) -> &MaterialRegistry {
        &self.registry
    }

    pub fn enemies(&self) -> &[EnemyDef] {
        &self.enemies
    }

    pub fn library(&self) -> &[Mask] {
        &self.library
    }

    pub fn current_mask(&self) -> Option<&Mask> {
        self.current.as_ref()
    }

    pub fn inventory(&self) -> &MaterialInventory {
        &self.inventory
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Masks contributing to the next battle
    pub fn mask_count(&self) -> u32 {
        self.library.len() as u32 + u32::from(self.current.is_some())
    }

    pub fn start_mask(&mut self, name: &str) -> Result<()> {
        if self.current.is_some() {
            return Err(ForgeError::MaskInProgress);
        }
        self.current = Some(Mask::new(name, self.config.base_mask_mana));
        tracing::info!(mask = name, mana = self.config.base_mask_mana, "Mask started");
        Ok(())
    }

    /// Instantiate a material definition into the inventory
    pub fn stock(&mut self, def_id: &str) -> Result<MaterialInstanceId> {
        let material = self.registry.instantiate(def_id)?;
        let id = material.id();
        self.inventory.add(material);
        Ok(id)
    }

    /// Move one material from the inventory into the current mask
    pub fn bind_from_inventory(&mut self, id: MaterialInstanceId) -> Result<()> {
        let mask = self.current.as_mut().ok_or(ForgeError::NoActiveMask)?;
        let material = self
            .inventory
            .remove(id)
            .ok_or(ForgeError::MaterialNotFound(id))?;

        match mask.bind(material, &mut self.rng) {
            Ok(()) => Ok(()),
            Err(err) => {
                let BindError::NotEnoughMana {
                    needed, available, ..
                } = &err;
                let (needed, available) = (*needed, *available);
                tracing::debug!(%err, "Bind refused");
                self.inventory.put_back(err.into_material());
                Err(ForgeError::NotEnoughMana { needed, available })
            }
        }
    }

    /// Bind everything affordable, soonest to expire first
    pub fn auto_bind(&mut self) -> Result<Vec<MaterialInstanceId>> {
        let mut bound = Vec::new();
        for id in self.inventory.ids_by_expiry() {
            match self.bind_from_inventory(id) {
                Ok(()) => bound.push(id),
                Err(ForgeError::NotEnoughMana { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(bound)
    }

    /// Tick shelf life; returns what expired
    pub fn end_make_phase(&mut self) -> Vec<MaterialInstance> {
        let expired = self.inventory.tick_end_of_make_phase();
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Materials expired");
        }
        expired
    }

    /// Next enemy in content order, wrapping after the last one
    pub fn next_enemy(&mut self) -> Option<String> {
        if self.enemies.is_empty() {
            return None;
        }
        let index = self.next_enemy_index % self.enemies.len();
        self.next_enemy_index = (index + 1) % self.enemies.len();
        let name = self.enemies[index].stats.name.clone();
        tracing::debug!(enemy = %name, index, "Enemy spawned");
        Some(name)
    }

    /// Run one battle to completion against a named enemy
    pub fn fight(&mut self, enemy: &str) -> Result<BattleReport> {
        let enemy_stats = self
            .enemies
            .iter()
            .find(|e| e.stats.name == enemy)
            .map(|e| e.stats.clone())
            .ok_or_else(|| ForgeError::UnknownEnemy(enemy.to_string()))?;

        let mut config = self.config.clone();
        config.seed = config.seed.wrapping_add(u64::from(self.round));
        let tick_secs = config.tick_secs;
        let max_ticks = config.max_ticks;
        let mask_count = self.mask_count();
        let player = CombatantConfig::from_record(&self.record);

        let forests: Vec<&mut Forest> = self
            .library
            .iter_mut()
            .chain(self.current.iter_mut())
            .flat_map(|mask| mask.forests_mut())
            .collect();

        let mut scheduler = CombatScheduler::new(config);
        scheduler.start(BattleSetup {
            player,
            enemy: Some(enemy_stats),
            forests,
            mask_count,
        })?;

        let mut ticks = 0;
        while !scheduler.is_finished() {
            if ticks >= max_ticks {
                tracing::warn!(ticks, "Tick limit reached, stopping battle");
                scheduler.stop();
                break;
            }
            for event in scheduler.run_tick(tick_secs) {
                tracing::debug!(round = self.round, "{}", event.summary());
            }
            ticks += 1;
        }

        let report = scheduler.into_report();
        self.last_enemy = Some(enemy.to_string());
        Ok(report)
    }

    /// File the current mask, collect and commit growth, grant rewards
    pub fn settle(&mut self, report: &BattleReport) -> Result<Settlement> {
        if let Some(mask) = self.current.take() {
            tracing::info!(mask = %mask.name, materials = mask.materials().len(), "Mask added to library");
            self.library.push(mask);
        }

        let mask_count = self.library.len() as u32;
        let growth = {
            let collector = GrowthCollector::new(&self.record.actual)
                .with_battle(report)
                .with_mask_count(mask_count);
            let forests = self.library.iter_mut().flat_map(|mask| mask.forests_mut());
            collector.collect(forests, &mut self.rng)
        };
        self.committer.commit(&mut self.record, &growth);

        let mut rewards = Vec::new();
        let enemy = self.last_enemy.take();
        if report.outcome == Some(BattleOutcome::Victory) {
            let reward_ids = enemy
                .as_deref()
                .and_then(|name| self.enemies.iter().find(|e| e.stats.name == name))
                .map(|e| e.rewards.clone())
                .unwrap_or_default();
            for def_id in reward_ids {
                let id = self.stock(&def_id)?;
                if let Some(material) = self.inventory.items().iter().find(|m| m.id() == id) {
                    rewards.push(material.name().to_string());
                }
            }
        }

        let settlement = Settlement {
            round: self.round,
            growth,
            rewards,
        };
        self.round += 1;
        Ok(settlement)
    }

    /// Fight then settle
    pub fn play_round(&mut self, enemy: &str) -> Result<RoundSummary> {
        let report = self.fight(enemy)?;
        let settlement = self.settle(&report)?;
        Ok(RoundSummary {
            enemy: enemy.to_string(),
            report,
            settlement,
        })
    }
}
