//! Material definitions, instances and the registry
//!
//! A definition is loaded once from content. Each instance gets its own copy
//! of the forest so gate counters never leak between two copies of the same
//! material.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{ForgeError, Result};
use crate::core::types::MaterialInstanceId;
use crate::logic::description::describe;
use crate::logic::node::Forest;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Authored material: costs, shelf life and the logic forest template
#[derive(Debug, Clone)]
pub struct MaterialDef {
    pub id: String,
    pub name: String,
    pub mana_cost: u32,
    pub quality: Quality,
    /// Make phases the material survives in the inventory (at least 1)
    pub shelf_life_turns: u32,
    pub forest: Forest,
}

impl MaterialDef {
    pub fn instantiate(&self) -> MaterialInstance {
        let mut instance = MaterialInstance {
            id: MaterialInstanceId::new(),
            def_id: self.id.clone(),
            name: self.name.clone(),
            mana_cost: self.mana_cost,
            quality: self.quality,
            shelf_life_turns: self.shelf_life_turns.max(1),
            remaining_shelf_life: 0,
            forest: self.forest.clone(),
        };
        instance.forest.reset_state();
        instance.reset_shelf_life();
        instance
    }

    pub fn describe(&self) -> String {
        format!(
            "{} [{:?}, cost {}]\n{}",
            self.name,
            self.quality,
            self.mana_cost,
            describe(&self.forest)
        )
    }
}

/// One owned copy of a material
#[derive(Debug, Clone)]
pub struct MaterialInstance {
    id: MaterialInstanceId,
    def_id: String,
    name: String,
    mana_cost: u32,
    quality: Quality,
    shelf_life_turns: u32,
    remaining_shelf_life: u32,
    forest: Forest,
}

impl MaterialInstance {
    pub fn id(&self) -> MaterialInstanceId {
        self.id
    }

    pub fn def_id(&self) -> &str {
        &self.def_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mana_cost(&self) -> u32 {
        self.mana_cost
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn remaining_shelf_life(&self) -> u32 {
        self.remaining_shelf_life
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn forest_mut(&mut self) -> &mut Forest {
        &mut self.forest
    }

    /// Restart the inventory countdown (on stocking)
    pub fn reset_shelf_life(&mut self) {
        self.remaining_shelf_life = self.shelf_life_turns.max(1);
    }

    /// Count down one make phase. Returns true once expired.
    pub fn tick_shelf_life(&mut self) -> bool {
        self.remaining_shelf_life = self.remaining_shelf_life.saturating_sub(1);
        self.remaining_shelf_life == 0
    }

    pub fn describe(&self) -> String {
        format!(
            "{} [{:?}, cost {}]\n{}",
            self.name,
            self.quality,
            self.mana_cost,
            describe(&self.forest)
        )
    }
}

/// Material definitions indexed by id
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    materials: AHashMap<String, MaterialDef>,
    /// Ids in load order, for stable listings
    order: Vec<String>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: MaterialDef) -> Result<()> {
        if self.materials.contains_key(&def.id) {
            return Err(ForgeError::Config(format!("duplicate material id '{}'", def.id)));
        }
        self.order.push(def.id.clone());
        self.materials.insert(def.id.clone(), def);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&MaterialDef> {
        self.materials.get(id)
    }

    pub fn instantiate(&self, id: &str) -> Result<MaterialInstance> {
        self.get(id)
            .map(MaterialDef::instantiate)
            .ok_or_else(|| ForgeError::UnknownMaterial(id.to_string()))
    }

    /// Definitions in load order
    pub fn iter(&self) -> impl Iterator<Item = &MaterialDef> {
        self.order.iter().filter_map(|id| self.materials.get(id))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str, shelf_life_turns: u32) -> MaterialDef {
        MaterialDef {
            id: id.into(),
            name: id.to_uppercase(),
            mana_cost: 2,
            quality: Quality::Common,
            shelf_life_turns,
            forest: Forest::new(id),
        }
    }

    #[test]
    fn test_instances_are_distinct() {
        let ember = def("ember", 2);
        let a = ember.instantiate();
        let b = ember.instantiate();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.def_id(), "ember");
        assert_eq!(a.remaining_shelf_life(), 2);
    }

    #[test]
    fn test_shelf_life_minimum_one() {
        let mut instance = def("dust", 0).instantiate();
        assert_eq!(instance.remaining_shelf_life(), 1);
        assert!(instance.tick_shelf_life());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = MaterialRegistry::new();
        registry.register(def("ember", 1)).unwrap();
        assert!(registry.register(def("ember", 1)).is_err());
        assert!(matches!(
            registry.instantiate("nope"),
            Err(ForgeError::UnknownMaterial(_))
        ));
        assert_eq!(registry.len(), 1);
    }
}
