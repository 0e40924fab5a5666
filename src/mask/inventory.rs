//! Material inventory with shelf life
//!
//! Stocked materials lose one turn of shelf life at the end of every make
//! phase and are discarded when it runs out. Binding removes a material from
//! the inventory for good.

use crate::core::types::MaterialInstanceId;
use crate::mask::material::MaterialInstance;

#[derive(Debug, Clone, Default)]
pub struct MaterialInventory {
    items: Vec<MaterialInstance>,
}

impl MaterialInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock a material with a fresh shelf life
    pub fn add(&mut self, mut material: MaterialInstance) {
        if self.contains(material.id()) {
            return;
        }
        material.reset_shelf_life();
        self.items.push(material);
    }

    /// Return a material that failed to bind, keeping its remaining shelf life
    pub fn put_back(&mut self, material: MaterialInstance) {
        if !self.contains(material.id()) {
            self.items.push(material);
        }
    }

    pub fn contains(&self, id: MaterialInstanceId) -> bool {
        self.items.iter().any(|m| m.id() == id)
    }

    pub fn remove(&mut self, id: MaterialInstanceId) -> Option<MaterialInstance> {
        let index = self.items.iter().position(|m| m.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn items(&self) -> &[MaterialInstance] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// End-of-make-phase countdown. Returns the materials that expired.
    pub fn tick_end_of_make_phase(&mut self) -> Vec<MaterialInstance> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for mut material in self.items.drain(..) {
            if material.tick_shelf_life() {
                tracing::debug!(material = material.name(), "Material expired in inventory");
                expired.push(material);
            } else {
                kept.push(material);
            }
        }
        self.items = kept;
        expired
    }

    /// Ids ordered by remaining shelf life, soonest to expire first
    pub fn ids_by_expiry(&self) -> Vec<MaterialInstanceId> {
        let mut live: Vec<&MaterialInstance> = self
            .items
            .iter()
            .filter(|m| m.remaining_shelf_life() > 0)
            .collect();
        live.sort_by_key(|m| m.remaining_shelf_life());
        live.into_iter().map(|m| m.id()).collect()
    }
}
