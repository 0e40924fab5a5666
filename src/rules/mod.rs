//! Game content loaded from TOML: materials, enemies and tuning

pub mod loader;
pub mod schema;

pub use loader::{build_material, load_content, parse_content, Content};
pub use schema::{ContentFile, EffectDef, EnemyDef, GateDef, MaterialSchema, NodeDef, PlayerDef, SharedDef};
