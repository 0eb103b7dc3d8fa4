//! Recipe matching and execution for processing machines.
//!
//! A recipe declares capability-typed inputs and outputs (energy, items,
//! fluids...), gating conditions and a duration. A machine exposes its
//! resource endpoints as handlers grouped by direction and capability. This
//! crate decides whether a machine can run a recipe, how many copies it can
//! run at once, and commits contents to the handlers when it does.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`capability`] | Resource kinds and their copy/merge/format behaviour |
//! | [`condition`] | Recipe conditions with AND/OR group evaluation |
//! | [`error`] | Recipe construction and execution errors |
//! | [`execution`] | Chance rolls, committing contents, working hooks |
//! | [`handler`] | Handler trait, per-holder handler table |
//! | [`models`] | Directions, content values, content modifiers |
//! | [`parallel`] | Largest runnable multiplier via binary search |
//! | [`pool`] | In-memory stock handler |
//! | [`recipe`] | Recipe aggregate, copies, builder |
//! | [`result`] | Match outcomes and failure reasons |
//!
//! Matching itself (`match_recipe`, `match_tick_recipe`, `match_recipe_io`)
//! lives on [`recipe::Recipe`].

pub mod capability;
pub mod condition;
pub mod error;
pub mod execution;
pub mod handler;
mod matching;
pub mod models;
pub mod parallel;
pub mod pool;
pub mod recipe;
pub mod result;

pub use capability::{Capability, ENERGY, FLUID, ITEM, RecipeCapability};
pub use condition::{Condition, ConditionContext, RecipeCondition};
pub use error::{ExecutionError, RecipeError};
pub use handler::{HandlerTable, Leftover, RecipeCapabilityHolder, RecipeHandler};
pub use models::{Content, ContentModifier, ContentValue, IO};
pub use parallel::accurate_parallel;
pub use recipe::{Recipe, RecipeBuilder};
pub use result::{ActionResult, FailReason, Shortfall};
