//! Data models for recipe contents

use std::fmt;

/// Direction a recipe content or a handler faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IO {
    In,
    Out,
    Both,
}

impl fmt::Display for IO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IO::In => write!(f, "input"),
            IO::Out => write!(f, "output"),
            IO::Both => write!(f, "both"),
        }
    }
}

/// A raw content value. Which shape is valid depends on the capability
/// the content is declared under.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentValue {
    /// Bare amount, e.g. energy units
    Quantity(i64),
    /// Amount of a named resource, e.g. 4x iron_ingot or 1000mB water
    Stack { resource: String, amount: i64 },
}

impl ContentValue {
    pub fn stack(resource: impl Into<String>, amount: i64) -> Self {
        ContentValue::Stack {
            resource: resource.into(),
            amount,
        }
    }

    pub fn amount(&self) -> i64 {
        match self {
            ContentValue::Quantity(amount) => *amount,
            ContentValue::Stack { amount, .. } => *amount,
        }
    }

    /// Resource key; bare quantities share the empty key.
    pub fn resource(&self) -> &str {
        match self {
            ContentValue::Quantity(_) => "",
            ContentValue::Stack { resource, .. } => resource,
        }
    }

    /// Same value with a different amount.
    pub fn with_amount(&self, amount: i64) -> Self {
        match self {
            ContentValue::Quantity(_) => ContentValue::Quantity(amount),
            ContentValue::Stack { resource, .. } => ContentValue::Stack {
                resource: resource.clone(),
                amount,
            },
        }
    }

    /// Copy of this value with the modifier applied to its amount.
    pub fn modified(&self, modifier: Option<&ContentModifier>) -> Self {
        match modifier {
            Some(modifier) => self.with_amount(modifier.apply_amount(self.amount())),
            None => self.clone(),
        }
    }
}

/// Pure `number -> number` transform applied to amounts (and optionally
/// durations) when producing a scaled recipe copy: `x * multiplier + addition`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentModifier {
    multiplier: f64,
    addition: f64,
}

impl ContentModifier {
    pub const IDENTITY: ContentModifier = ContentModifier {
        multiplier: 1.0,
        addition: 0.0,
    };

    pub fn new(multiplier: f64, addition: f64) -> Self {
        Self {
            multiplier,
            addition,
        }
    }

    pub fn multiplier(multiplier: f64) -> Self {
        Self::new(multiplier, 0.0)
    }

    pub fn addition(addition: f64) -> Self {
        Self::new(1.0, addition)
    }

    pub fn apply(&self, number: f64) -> f64 {
        number * self.multiplier + self.addition
    }

    /// Apply to an integer amount, truncating toward zero.
    pub fn apply_amount(&self, amount: i64) -> i64 {
        self.apply(amount as f64) as i64
    }
}

/// One declared input or output of a recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub content: ContentValue,
    /// Inclusion probability in `[0, 1]`; `>= 1` is guaranteed.
    pub chance: f32,
    /// Added to `chance` once per holder chance tier.
    pub tier_chance_boost: f32,
    /// Empty string means unslotted.
    pub slot_name: String,
    pub per_tick: bool,
}

impl Content {
    pub fn new(content: ContentValue) -> Self {
        Self {
            content,
            chance: 1.0,
            tier_chance_boost: 0.0,
            slot_name: String::new(),
            per_tick: false,
        }
    }

    /// Effective inclusion threshold for a holder at `chance_tier`.
    /// Not clamped; anything at or above 1 always passes the roll.
    pub fn effective_chance(&self, chance_tier: f32) -> f32 {
        self.chance + chance_tier * self.tier_chance_boost
    }
}
