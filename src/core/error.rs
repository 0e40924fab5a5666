use thiserror::Error;

use crate::core::types::MaterialInstanceId;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error("Unknown material definition: {0}")]
    UnknownMaterial(String),

    #[error("Unknown enemy: {0}")]
    UnknownEnemy(String),

    #[error("Material instance not found: {0}")]
    MaterialNotFound(MaterialInstanceId),

    #[error("Not enough mana: need {needed}, have {available}")]
    NotEnoughMana { needed: u32, available: u32 },

    #[error("No mask is being crafted")]
    NoActiveMask,

    #[error("A mask is already being crafted")]
    MaskInProgress,

    #[error("No enemy configured for battle")]
    MissingEnemy,

    #[error("A battle is already in progress")]
    BattleInProgress,

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
