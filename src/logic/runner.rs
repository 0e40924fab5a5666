//! Depth-first pre-order tree runner
//!
//! A gate that says skip stops its own effect and its own children; siblings
//! and ancestors carry on. A node without a gate never blocks its children.

use crate::logic::context::{EffectTargets, Phase, TraversalContext};
use crate::logic::node::{Behavior, Forest, NodeId};

/// Walk every root of `forest` in order
pub fn run(forest: &mut Forest, ctx: &TraversalContext, targets: &mut EffectTargets<'_>) {
    for i in 0..forest.roots.len() {
        let root = forest.roots[i];
        visit(forest, root, ctx, targets);
    }
}

fn visit(forest: &mut Forest, id: NodeId, ctx: &TraversalContext, targets: &mut EffectTargets<'_>) {
    let Some(node) = forest.nodes.get(id.0) else {
        return;
    };

    if !node.side.admits(ctx) {
        tracing::trace!(forest = %forest.label, node = id.0, "Side filter skipped subtree");
        return;
    }

    if let Some(handle) = node.behavior {
        match forest.behaviors.get(handle.0) {
            Some(Behavior::Gate(gate)) => {
                let state = &mut forest.nodes[id.0].state;
                if gate.should_skip(state, ctx, &mut *targets.rng) {
                    tracing::trace!(
                        forest = %forest.label,
                        node = id.0,
                        phase = %ctx.phase,
                        gate = ?gate.kind,
                        "Gate skipped subtree"
                    );
                    return;
                }
            }
            Some(Behavior::Effect(effect)) => {
                if ctx.phase != Phase::Description && effect.apply(ctx, targets) {
                    tracing::trace!(
                        forest = %forest.label,
                        node = id.0,
                        phase = %ctx.phase,
                        "Effect applied: {}",
                        effect.describe()
                    );
                }
            }
            None => {
                tracing::warn!(forest = %forest.label, node = id.0, "Node references a missing behavior");
            }
        }
    }

    let child_count = forest.nodes[id.0].children.len();
    for i in 0..child_count {
        let child = forest.nodes[id.0].children[i];
        visit(forest, child, ctx, targets);
    }
}
