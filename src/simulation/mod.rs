//! Game session: rounds of mask making, battle and growth

pub mod session;

pub use session::{GameSession, RoundSummary, Settlement};
