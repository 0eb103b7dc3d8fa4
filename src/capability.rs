//! Recipe capabilities: typed resource channels such as energy, items and fluids
//!
//! A capability is registered once as a `static` and referred to everywhere
//! through the copyable [`Capability`] handle. Equality, ordering and hashing
//! go through the capability's stable name, which also fixes the iteration
//! order of a recipe's content maps.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use crate::models::{ContentModifier, ContentValue};

/// Operations over the raw content values of one capability.
pub trait RecipeCapability: Send + Sync {
    /// Stable key, unique across the process.
    fn name(&self) -> &'static str;

    /// Whether `value` has the shape this capability carries.
    fn accepts(&self, value: &ContentValue) -> bool;

    fn copy_content(
        &self,
        value: &ContentValue,
        modifier: Option<&ContentModifier>,
    ) -> ContentValue {
        value.modified(modifier)
    }

    /// Combine values of the same resource, keeping first-seen order.
    fn merge_contents(&self, values: &[ContentValue]) -> Vec<ContentValue> {
        let mut merged: Vec<ContentValue> = Vec::new();
        for value in values {
            match merged.iter_mut().find(|m| m.resource() == value.resource()) {
                Some(existing) => {
                    *existing = existing.with_amount(existing.amount() + value.amount())
                }
                None => merged.push(value.clone()),
            }
        }
        merged
    }

    fn calculate_amount(&self, values: &[ContentValue]) -> f64 {
        values.iter().map(|v| v.amount() as f64).sum()
    }

    /// Human readable rendering of content that could not be placed.
    fn format_shortfall(&self, values: &[ContentValue]) -> String;
}

/// Handle to a process-wide capability.
#[derive(Clone, Copy)]
pub struct Capability(&'static dyn RecipeCapability);

impl Capability {
    pub const fn new(inner: &'static dyn RecipeCapability) -> Self {
        Capability(inner)
    }
}

impl Deref for Capability {
    type Target = dyn RecipeCapability;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.0.name() == other.0.name()
    }
}

impl Eq for Capability {}

impl PartialOrd for Capability {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Capability {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.name().cmp(other.0.name())
    }
}

impl Hash for Capability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name().hash(state);
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({})", self.0.name())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name())
    }
}

/// Capability carrying bare amounts ([`ContentValue::Quantity`]).
#[derive(Debug)]
pub struct QuantityCapability {
    pub name: &'static str,
    pub unit: &'static str,
}

impl RecipeCapability for QuantityCapability {
    fn name(&self) -> &'static str {
        self.name
    }

    fn accepts(&self, value: &ContentValue) -> bool {
        matches!(value, ContentValue::Quantity(_))
    }

    fn format_shortfall(&self, values: &[ContentValue]) -> String {
        format!("{} {}", self.calculate_amount(values), self.unit)
    }
}

/// Capability carrying named resource stacks ([`ContentValue::Stack`]).
#[derive(Debug)]
pub struct StackCapability {
    pub name: &'static str,
    /// Printed right after the amount, e.g. `x` for items, `mB` for fluids
    pub unit: &'static str,
}

impl RecipeCapability for StackCapability {
    fn name(&self) -> &'static str {
        self.name
    }

    fn accepts(&self, value: &ContentValue) -> bool {
        matches!(value, ContentValue::Stack { .. })
    }

    fn format_shortfall(&self, values: &[ContentValue]) -> String {
        self.merge_contents(values)
            .iter()
            .map(|v| format!("{}{} {}", v.amount(), self.unit, v.resource()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub static ENERGY: Capability = Capability(&QuantityCapability {
    name: "energy",
    unit: "EU",
});

pub static ITEM: Capability = Capability(&StackCapability {
    name: "item",
    unit: "x",
});

pub static FLUID: Capability = Capability(&StackCapability {
    name: "fluid",
    unit: "mB",
});
