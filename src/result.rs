//! Structured outcome of matching and condition checks

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::capability::Capability;
use crate::handler::Leftover;
use crate::models::{ContentValue, IO};

/// Outcome of a match or condition check.
///
/// `expecting_rate` estimates how far a failed match was from succeeding:
/// requested amount over placed amount, maximised over the failing parts.
/// It is 0 unless the caller asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    success: bool,
    reason: Option<FailReason>,
    expecting_rate: f32,
}

impl ActionResult {
    pub const SUCCESS: ActionResult = ActionResult {
        success: true,
        reason: None,
        expecting_rate: 0.0,
    };

    pub fn fail(reason: FailReason) -> Self {
        Self::fail_with_rate(reason, 0.0)
    }

    pub fn fail_with_rate(reason: FailReason, expecting_rate: f32) -> Self {
        Self {
            success: false,
            reason: Some(reason),
            expecting_rate,
        }
    }

    pub fn fail_no_reason() -> Self {
        Self {
            success: false,
            reason: None,
            expecting_rate: 0.0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn reason(&self) -> Option<&FailReason> {
        self.reason.as_ref()
    }

    pub fn expecting_rate(&self) -> f32 {
        self.expecting_rate
    }
}

/// Why a recipe cannot run. Rendered only when displayed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FailReason {
    #[error("{0}")]
    Insufficient(Shortfall),

    #[error("condition fails: {description}")]
    Condition { description: String },

    #[error("condition fails: no condition in group '{group}' holds")]
    ConditionGroup { group: String },
}

/// Content of one capability that no handler could place.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortfall {
    pub io: IO,
    pub per_tick: bool,
    pub capability: Capability,
    pub missing: Leftover,
    pub missing_slots: BTreeMap<String, Vec<ContentValue>>,
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insufficient {}", self.io)?;
        if self.per_tick {
            write!(f, "/t")?;
        }
        write!(f, ": {}", self.capability)?;

        if let Leftover::Remaining(values) = &self.missing {
            write!(f, " | miss: {}", self.capability.format_shortfall(values))?;
        }
        for (slot, values) in &self.missing_slots {
            write!(
                f,
                " | slot ({}) miss: {}",
                slot,
                self.capability.format_shortfall(values)
            )?;
        }
        Ok(())
    }
}
