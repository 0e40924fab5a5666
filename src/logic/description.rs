//! Human-readable text for a forest
//!
//! Gates never skip in the description phase, so every node is visited.
//! Gate nodes become indented headers, effect nodes become clauses. The walk
//! borrows the forest immutably and cannot disturb gate counters.

use crate::logic::node::{Behavior, Forest, NodeId, SideFilter};

pub fn describe(forest: &Forest) -> String {
    let mut out = String::new();
    for &root in forest.roots() {
        describe_node(forest, root, 0, &mut out);
    }
    out
}

fn describe_node(forest: &Forest, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = forest.node(id) else {
        return;
    };

    let suffix = match node.side() {
        SideFilter::Both => "",
        SideFilter::Player => " (player attacks)",
        SideFilter::Enemy => " (enemy attacks)",
    };
    let indent = "  ".repeat(depth);

    let child_depth = match node.behavior() {
        Some(handle) => {
            match forest.behavior(handle) {
                Some(Behavior::Gate(gate)) => {
                    out.push_str(&format!("{}{}{}:\n", indent, gate.describe(), suffix));
                }
                Some(Behavior::Effect(effect)) => {
                    out.push_str(&format!("{}- {}{}\n", indent, effect.describe(), suffix));
                }
                None => out.push_str(&format!("{}- (unbound behavior)\n", indent)),
            }
            depth + 1
        }
        None => match node.title() {
            Some(title) => {
                out.push_str(&format!("{}{}{}:\n", indent, title, suffix));
                depth + 1
            }
            None => depth,
        },
    };

    for &child in node.children() {
        describe_node(forest, child, child_depth, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::attack::AttackField;
    use crate::logic::context::Phase;
    use crate::logic::effects::Effect;
    use crate::logic::gates::{Gate, GateKind};

    #[test]
    fn test_headers_and_clauses() {
        let mut forest = Forest::new("ember");
        let phase = forest
            .add_gate(None, Gate::new(GateKind::Phase(Phase::AttackModify)))
            .unwrap();
        let wait = forest
            .add_gate(Some(phase), Gate::new(GateKind::WaitEvery(2)))
            .unwrap();
        forest
            .add_effect(
                Some(wait),
                Effect::AttackField {
                    field: AttackField::RawAttack,
                    amount: 3.0,
                },
            )
            .unwrap();

        let text = describe(&forest);
        assert_eq!(
            text,
            "During attack resolution:\n  Once every 2 times:\n    - Raw attack +3\n"
        );
    }

    #[test]
    fn test_untitled_group_is_transparent() {
        let mut forest = Forest::new("group");
        let group = forest.add_node(None, None).unwrap();
        forest
            .add_effect(Some(group), Effect::RestoreMana { amount: 1 })
            .unwrap();
        assert_eq!(describe(&forest), "- Restore 1 mana when bound\n");
    }
}
