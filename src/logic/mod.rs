//! Material logic trees
//!
//! A material carries a forest of nodes. Each node holds a gate or an effect
//! (or nothing, as a grouping node) and an ordered list of children. The
//! runner walks the forest once per lifecycle phase.

pub mod context;
pub mod description;
pub mod effects;
pub mod gates;
pub mod node;
pub mod runner;

pub use context::{EffectTargets, HitCounts, Phase, TraversalContext};
pub use description::describe;
pub use effects::{Effect, HpAdjust, HpTarget, StatSource};
pub use gates::{Gate, GateKind, GateState};
pub use node::{Behavior, BehaviorId, Forest, LogicNode, NodeId, SideFilter};
pub use runner::run;
