//! Mask Forge - mask-crafting roguelike rules core

pub mod battle;
pub mod combat;
pub mod core;
pub mod logic;
pub mod mask;
pub mod rules;
pub mod simulation;
