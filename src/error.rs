//! Error types for recipe construction and execution

use thiserror::Error;

use crate::capability::Capability;

/// Errors raised while assembling a recipe
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecipeError {
    #[error("recipe id must not be empty")]
    EmptyId,

    /// Chance outside `[0, 1]`
    #[error("content chance {chance} for '{capability}' is outside [0, 1]")]
    InvalidChance { capability: Capability, chance: f32 },

    #[error("tier chance boost {boost} for '{capability}' is negative")]
    NegativeTierBoost { capability: Capability, boost: f32 },

    /// Value shape does not belong to the capability it was declared under
    #[error("capability '{capability}' does not accept content {content}")]
    ContentMismatch {
        capability: Capability,
        content: String,
    },
}

/// Errors raised when committing a recipe against a holder
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("holder exposes no recipe handlers")]
    NoHandlers,

    #[error("recipe contents can only be handled one direction at a time")]
    InvalidDirection,

    /// A handler rejected content during commit that it accepted in simulation
    #[error("io error while handling recipe '{recipe}': {capability} left unplaced")]
    Inconsistent {
        recipe: String,
        capability: Capability,
    },
}
