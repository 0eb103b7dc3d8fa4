//! Recipe conditions and AND/OR group evaluation

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use tracing::debug;

use crate::recipe::Recipe;
use crate::result::{ActionResult, FailReason};

/// Machine-side state a condition is evaluated against.
#[derive(Debug, Clone, Default)]
pub struct ConditionContext {
    /// Machine tier/level
    pub level: u32,
    /// Current simulation tick
    pub tick: u64,
    /// Named readings such as `temperature` or `light`
    pub environment: BTreeMap<String, f64>,
}

impl ConditionContext {
    pub fn with_reading(mut self, key: impl Into<String>, value: f64) -> Self {
        self.environment.insert(key.into(), value);
        self
    }
}

/// A boolean gate over a recipe and its context.
pub trait RecipeCondition: fmt::Debug + Send + Sync {
    /// Grouping key; OR-flagged conditions sharing a group form one OR group.
    fn group(&self) -> &str;

    fn test(&self, recipe: &Recipe, context: &ConditionContext) -> bool;

    fn describe(&self) -> String;
}

/// A predicate plus the flags controlling how it combines with the others.
#[derive(Debug, Clone)]
pub struct Condition {
    predicate: Arc<dyn RecipeCondition>,
    is_or: bool,
    is_reverse: bool,
}

impl Condition {
    pub fn new(predicate: impl RecipeCondition + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
            is_or: false,
            is_reverse: false,
        }
    }

    /// Mark as member of its group's OR set.
    pub fn or(mut self) -> Self {
        self.is_or = true;
        self
    }

    /// Invert the pass criterion.
    pub fn reverse(mut self) -> Self {
        self.is_reverse = true;
        self
    }

    pub fn is_or(&self) -> bool {
        self.is_or
    }

    pub fn is_reverse(&self) -> bool {
        self.is_reverse
    }

    pub fn group(&self) -> &str {
        self.predicate.group()
    }

    pub fn test(&self, recipe: &Recipe, context: &ConditionContext) -> bool {
        self.predicate.test(recipe, context)
    }

    /// `test` with `is_reverse` applied.
    pub fn passes(&self, recipe: &Recipe, context: &ConditionContext) -> bool {
        self.test(recipe, context) != self.is_reverse
    }

    pub fn describe(&self) -> String {
        if self.is_reverse {
            format!("not ({})", self.predicate.describe())
        } else {
            self.predicate.describe()
        }
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.predicate, &other.predicate)
            && self.is_or == other.is_or
            && self.is_reverse == other.is_reverse
    }
}

impl Recipe {
    /// Evaluate the recipe's conditions.
    ///
    /// Plain conditions are AND-ed in declaration order and fail fast.
    /// OR-flagged conditions are grouped by [`RecipeCondition::group`]; a group
    /// fails only when none of its members passes. Groups are AND-ed together.
    pub fn check_conditions(&self, context: &ConditionContext) -> ActionResult {
        if self.conditions.is_empty() {
            return ActionResult::SUCCESS;
        }

        let mut or_groups: BTreeMap<&str, Vec<&Condition>> = BTreeMap::new();
        for condition in &self.conditions {
            if condition.is_or() {
                or_groups.entry(condition.group()).or_default().push(condition);
            } else if !condition.passes(self, context) {
                debug!(recipe = %self.id, condition = %condition.describe(), "condition failed");
                return ActionResult::fail(FailReason::Condition {
                    description: condition.describe(),
                });
            }
        }

        for (group, members) in or_groups {
            if members.iter().all(|condition| !condition.passes(self, context)) {
                debug!(recipe = %self.id, group, "every condition in OR group failed");
                return ActionResult::fail(FailReason::ConditionGroup {
                    group: group.to_string(),
                });
            }
        }

        ActionResult::SUCCESS
    }
}

/// Requires the machine level to be at least `min_level`.
#[derive(Debug, Clone)]
pub struct MachineLevelCondition {
    pub min_level: u32,
}

impl MachineLevelCondition {
    pub fn new(min_level: u32) -> Self {
        Self { min_level }
    }
}

impl RecipeCondition for MachineLevelCondition {
    fn group(&self) -> &str {
        "machine_level"
    }

    fn test(&self, _recipe: &Recipe, context: &ConditionContext) -> bool {
        context.level >= self.min_level
    }

    fn describe(&self) -> String {
        format!("machine level >= {}", self.min_level)
    }
}

/// Requires a named environment reading to lie inside a closed range.
/// A missing reading fails.
#[derive(Debug, Clone)]
pub struct EnvironmentCondition {
    pub key: String,
    pub range: RangeInclusive<f64>,
}

impl EnvironmentCondition {
    pub fn new(key: impl Into<String>, range: RangeInclusive<f64>) -> Self {
        Self {
            key: key.into(),
            range,
        }
    }
}

impl RecipeCondition for EnvironmentCondition {
    fn group(&self) -> &str {
        "environment"
    }

    fn test(&self, _recipe: &Recipe, context: &ConditionContext) -> bool {
        context
            .environment
            .get(&self.key)
            .is_some_and(|value| self.range.contains(value))
    }

    fn describe(&self) -> String {
        format!(
            "{} in [{}, {}]",
            self.key,
            self.range.start(),
            self.range.end()
        )
    }
}
