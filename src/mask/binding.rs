//! Masks, their mana pool and material binding

use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

use crate::logic::context::{EffectTargets, Phase, TraversalContext};
use crate::logic::node::Forest;
use crate::logic::runner;
use crate::mask::material::MaterialInstance;

/// Mana available for binding materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManaPool {
    base: u32,
    current: u32,
}

impl ManaPool {
    pub fn new(base: u32) -> Self {
        Self {
            base,
            current: base,
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.current >= cost
    }

    /// Spend `cost` if affordable
    pub fn spend(&mut self, cost: u32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.current -= cost;
        true
    }

    pub fn restore(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount);
    }
}

#[derive(Debug, Error)]
pub enum BindError {
    /// The material is handed back untouched
    #[error("Not enough mana to bind {}: need {needed}, have {available}", .material.name())]
    NotEnoughMana {
        needed: u32,
        available: u32,
        material: Box<MaterialInstance>,
    },
}

impl BindError {
    pub fn into_material(self) -> MaterialInstance {
        match self {
            BindError::NotEnoughMana { material, .. } => *material,
        }
    }
}

/// A mask under construction or finished in the library
#[derive(Debug, Clone)]
pub struct Mask {
    pub name: String,
    mana: ManaPool,
    materials: Vec<MaterialInstance>,
}

impl Mask {
    pub fn new(name: impl Into<String>, base_mana: u32) -> Self {
        Self {
            name: name.into(),
            mana: ManaPool::new(base_mana),
            materials: Vec::new(),
        }
    }

    pub fn mana(&self) -> &ManaPool {
        &self.mana
    }

    /// Bound materials in binding order
    pub fn materials(&self) -> &[MaterialInstance] {
        &self.materials
    }

    /// Spend the material's cost, append it and run its bind phase
    pub fn bind(&mut self, material: MaterialInstance, rng: &mut dyn RngCore) -> Result<(), BindError> {
        let cost = material.mana_cost();
        if !self.mana.spend(cost) {
            return Err(BindError::NotEnoughMana {
                needed: cost,
                available: self.mana.current(),
                material: Box::new(material),
            });
        }

        self.materials.push(material);
        let mask_name = &self.name;
        if let Some(bound) = self.materials.last_mut() {
            tracing::debug!(mask = %mask_name, material = bound.name(), cost, "Material bound");
            let ctx = TraversalContext::new(Phase::Bind);
            let mut targets = EffectTargets::new(rng).with_mana(&mut self.mana);
            runner::run(bound.forest_mut(), &ctx, &mut targets);
        }
        Ok(())
    }

    pub fn forests_mut(&mut self) -> impl Iterator<Item = &mut Forest> {
        self.materials.iter_mut().map(MaterialInstance::forest_mut)
    }

    pub fn describe(&self) -> String {
        let mut out = format!(
            "{} (mana {}/{})\n",
            self.name,
            self.mana.current(),
            self.mana.base()
        );
        for material in &self.materials {
            out.push_str(&material.describe());
        }
        out
    }
}
