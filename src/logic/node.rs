//! Logic forest: an arena of nodes and the behaviors they reference
//!
//! Nodes are only ever created as a new root or as a new child of an existing
//! node, so a forest is acyclic by construction. Node ids are stable for the
//! lifetime of the forest. A behavior may be shared by several nodes; gate
//! counters live on the node, so every position counts on its own.

use serde::{Deserialize, Serialize};

use crate::core::error::{ForgeError, Result};
use crate::core::types::Side;
use crate::logic::context::TraversalContext;
use crate::logic::effects::Effect;
use crate::logic::gates::{Gate, GateState};

/// Index of a node inside its forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Handle to a behavior inside its forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BehaviorId(pub(crate) usize);

impl BehaviorId {
    /// Handle for an arbitrary slot; resolving a missing slot yields nothing
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Gate(Gate),
    Effect(Effect),
}

impl From<Gate> for Behavior {
    fn from(gate: Gate) -> Self {
        Behavior::Gate(gate)
    }
}

impl From<Effect> for Behavior {
    fn from(effect: Effect) -> Self {
        Behavior::Effect(effect)
    }
}

/// Restricts a node to one side's attacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideFilter {
    #[default]
    Both,
    Player,
    Enemy,
}

impl SideFilter {
    /// Outside attack phases every node is admitted
    pub fn admits(self, ctx: &TraversalContext) -> bool {
        if !ctx.phase.is_attack_phase() {
            return true;
        }
        match self {
            SideFilter::Both => true,
            SideFilter::Player => ctx.attacker == Some(Side::Player),
            SideFilter::Enemy => ctx.attacker == Some(Side::Enemy),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogicNode {
    pub(crate) title: Option<String>,
    pub(crate) behavior: Option<BehaviorId>,
    pub(crate) side: SideFilter,
    pub(crate) children: Vec<NodeId>,
    pub(crate) state: GateState,
}

impl LogicNode {
    fn new(behavior: Option<BehaviorId>) -> Self {
        Self {
            title: None,
            behavior,
            side: SideFilter::Both,
            children: Vec::new(),
            state: GateState::default(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn behavior(&self) -> Option<BehaviorId> {
        self.behavior
    }

    pub fn side(&self) -> SideFilter {
        self.side
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Stateful gate progress (wait count or pass count)
    pub fn counter(&self) -> u32 {
        self.state.counter
    }
}

/// Ordered roots owned by one material
#[derive(Debug, Clone, Default)]
pub struct Forest {
    pub(crate) label: String,
    pub(crate) behaviors: Vec<Behavior>,
    pub(crate) nodes: Vec<LogicNode>,
    pub(crate) roots: Vec<NodeId>,
}

impl Forest {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn add_behavior(&mut self, behavior: impl Into<Behavior>) -> BehaviorId {
        self.behaviors.push(behavior.into());
        BehaviorId(self.behaviors.len() - 1)
    }

    /// Create a node as a new root (`parent == None`) or as the last child of `parent`
    pub fn add_node(&mut self, parent: Option<NodeId>, behavior: Option<BehaviorId>) -> Result<NodeId> {
        if let Some(parent) = parent {
            if parent.0 >= self.nodes.len() {
                return Err(ForgeError::InvalidNode(format!(
                    "parent {} does not exist in '{}'",
                    parent.0, self.label
                )));
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(LogicNode::new(behavior));
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    pub fn add_gate(&mut self, parent: Option<NodeId>, gate: Gate) -> Result<NodeId> {
        let behavior = self.add_behavior(gate);
        self.add_node(parent, Some(behavior))
    }

    pub fn add_effect(&mut self, parent: Option<NodeId>, effect: Effect) -> Result<NodeId> {
        let behavior = self.add_behavior(effect);
        self.add_node(parent, Some(behavior))
    }

    /// Grouping node with no behavior
    pub fn add_group(&mut self, parent: Option<NodeId>, title: &str) -> Result<NodeId> {
        let id = self.add_node(parent, None)?;
        self.nodes[id.0].title = Some(title.to_string());
        Ok(id)
    }

    pub fn set_title(&mut self, id: NodeId, title: &str) -> Result<()> {
        self.node_mut(id)?.title = Some(title.to_string());
        Ok(())
    }

    pub fn set_side(&mut self, id: NodeId, side: SideFilter) -> Result<()> {
        self.node_mut(id)?.side = side;
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&LogicNode> {
        self.nodes.get(id.0)
    }

    pub fn behavior(&self, id: BehaviorId) -> Option<&Behavior> {
        self.behaviors.get(id.0)
    }

    /// Every node in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &LogicNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Zero every gate counter
    pub fn reset_state(&mut self) {
        for node in &mut self.nodes {
            node.state = GateState::default();
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut LogicNode> {
        let label = &self.label;
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| ForgeError::InvalidNode(format!("node {} does not exist in '{}'", id.0, label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::context::Phase;
    use crate::logic::gates::GateKind;

    #[test]
    fn test_build_tree() {
        let mut forest = Forest::new("ember");
        let root = forest
            .add_gate(None, Gate::new(GateKind::Phase(Phase::AttackModify)))
            .unwrap();
        let child = forest
            .add_gate(Some(root), Gate::new(GateKind::WaitEvery(2)))
            .unwrap();
        assert_eq!(forest.roots(), &[root]);
        assert_eq!(forest.node(root).unwrap().children(), &[child]);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut forest = Forest::new("broken");
        let result = forest.add_node(Some(NodeId(3)), None);
        assert!(matches!(result, Err(ForgeError::InvalidNode(_))));
        assert!(forest.is_empty());
    }

    #[test]
    fn test_shared_behavior_handles() {
        let mut forest = Forest::new("shared");
        let gate = forest.add_behavior(Gate::new(GateKind::WaitEvery(2)));
        let a = forest.add_node(None, Some(gate)).unwrap();
        let b = forest.add_node(None, Some(gate)).unwrap();
        assert_eq!(forest.node(a).unwrap().behavior(), forest.node(b).unwrap().behavior());
        assert_eq!(forest.behaviors.len(), 1);
    }

    #[test]
    fn test_side_filter_only_in_attack_phases() {
        let attack = TraversalContext::for_attack(Phase::AttackModify, Side::Enemy, 1, 1);
        assert!(!SideFilter::Player.admits(&attack));
        assert!(SideFilter::Enemy.admits(&attack));
        assert!(SideFilter::Player.admits(&TraversalContext::new(Phase::BattleStart)));
    }
}
