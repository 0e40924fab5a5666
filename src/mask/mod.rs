//! Masks and the materials bound into them

pub mod binding;
pub mod inventory;
pub mod material;

pub use binding::{BindError, ManaPool, Mask};
pub use inventory::MaterialInventory;
pub use material::{MaterialDef, MaterialInstance, MaterialRegistry, Quality};
