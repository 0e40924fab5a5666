//! Gate catalog
//!
//! A gate decides whether its node's subtree runs for one traversal. Gates
//! never skip in the description phase. `invert` flips the final answer.
//! Stateful gates keep their counter in the node, not in the gate, so one
//! shared gate definition still counts separately at every position.

use rand::{Rng, RngCore};

use crate::core::types::Side;
use crate::logic::context::{Phase, TraversalContext};

/// Per-node counter used by stateful gates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateState {
    pub counter: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateKind {
    /// Allow only during one phase
    Phase(Phase),
    /// Allow on the Nth action of the battle
    NthAction(u32),
    /// Allow on the attacker's own Nth attack
    NthAttack(u32),
    FirstActions(u32),
    FirstAttacks(u32),
    /// Allow when the action number is a multiple of N
    EveryActions(u32),
    /// Allow on every Nth call, counted per node
    WaitEvery(u32),
    /// Allow at most `limit` times per battle
    MaxTriggers(u32),
    /// Allow with probability p, rolled on every call
    Chance(f32),
    /// Allow once `target` has taken at least `hits` hits
    AfterHits { target: Side, hits: u32 },
    BattleStart,
    BattleEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate {
    pub kind: GateKind,
    pub invert: bool,
}

impl Gate {
    pub fn new(kind: GateKind) -> Self {
        Self { kind, invert: false }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// True when this node's effect and children must not run
    pub fn should_skip(
        &self,
        state: &mut GateState,
        ctx: &TraversalContext,
        rng: &mut dyn RngCore,
    ) -> bool {
        if ctx.phase == Phase::Description {
            return false;
        }

        let allow = match self.kind {
            GateKind::Phase(phase) => ctx.phase == phase,
            GateKind::NthAction(n) => match index_applies(ctx.action_number, n) {
                Some(index) => index == n,
                None => return false,
            },
            GateKind::NthAttack(n) => match index_applies(ctx.attack_number, n) {
                Some(index) => index == n,
                None => return false,
            },
            GateKind::FirstActions(n) => match index_applies(ctx.action_number, n) {
                Some(index) => index <= n,
                None => return false,
            },
            GateKind::FirstAttacks(n) => match index_applies(ctx.attack_number, n) {
                Some(index) => index <= n,
                None => return false,
            },
            GateKind::EveryActions(n) => match index_applies(ctx.action_number, n) {
                Some(index) => index % n == 0,
                None => return false,
            },
            GateKind::WaitEvery(n) => {
                if ctx.phase == Phase::BattleStart {
                    state.counter = 0;
                    return true;
                }
                if n == 0 {
                    return false;
                }
                state.counter += 1;
                if state.counter >= n {
                    state.counter = 0;
                    true
                } else {
                    false
                }
            }
            GateKind::MaxTriggers(limit) => {
                if ctx.phase == Phase::BattleStart {
                    state.counter = 0;
                    return true;
                }
                // Counted after invert: every pass spends one trigger
                let allow = (state.counter < limit) != self.invert;
                if allow {
                    state.counter += 1;
                }
                return !allow;
            }
            GateKind::Chance(p) => {
                let roll: f32 = rng.gen();
                roll < p.clamp(0.0, 1.0)
            }
            GateKind::AfterHits { target, hits } => {
                if hits == 0 {
                    return false;
                }
                let Some(counts) = ctx.hits else {
                    return true;
                };
                let mut received = counts.received_by(target);
                if ctx.defender == Some(target) && ctx.attack_number > received {
                    received = ctx.attack_number;
                }
                received >= hits
            }
            GateKind::BattleStart => ctx.phase == Phase::BattleStart,
            GateKind::BattleEnd => ctx.phase == Phase::BattleEnd,
        };

        let allow = allow != self.invert;
        !allow
    }

    pub fn describe(&self) -> String {
        let text = match self.kind {
            GateKind::Phase(phase) => format!("During {}", phase.label()),
            GateKind::NthAction(n) => format!("On action #{}", n),
            GateKind::NthAttack(n) => format!("On own attack #{}", n),
            GateKind::FirstActions(n) => format!("During the first {} actions", n),
            GateKind::FirstAttacks(n) => format!("During the first {} own attacks", n),
            GateKind::EveryActions(n) => format!("Every {} actions", n),
            GateKind::WaitEvery(1) => "Every time".to_string(),
            GateKind::WaitEvery(n) => format!("Once every {} times", n),
            GateKind::MaxTriggers(limit) => format!("At most {} times per battle", limit),
            GateKind::Chance(p) => format!("With {:.0}% chance", p.clamp(0.0, 1.0) * 100.0),
            GateKind::AfterHits { target, hits } => {
                format!("Once the {} has taken {} hits", target, hits)
            }
            GateKind::BattleStart => "At battle start".to_string(),
            GateKind::BattleEnd => "At battle end".to_string(),
        };
        if self.invert {
            format!("Unless: {}", text)
        } else {
            text
        }
    }
}

/// Index gates only apply while an attack is in flight and N is positive
fn index_applies(index: u32, n: u32) -> Option<u32> {
    if index == 0 || n == 0 {
        None
    } else {
        Some(index)
    }
}
