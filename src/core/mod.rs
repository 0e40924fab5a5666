pub mod config;
pub mod error;
pub mod types;

pub use config::BattleConfig;
pub use error::{ForgeError, Result};
pub use types::{MaterialInstanceId, Side};
