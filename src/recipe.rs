//! The recipe aggregate, its copies and its builder

use std::cell::OnceCell;
use std::collections::BTreeMap;

use crate::capability::Capability;
use crate::condition::Condition;
use crate::error::RecipeError;
use crate::models::{Content, ContentModifier, ContentValue, IO};

/// Capability -> ordered contents. Order within one list is significant for
/// matching; order across capabilities follows capability names.
pub type ContentMap = BTreeMap<Capability, Vec<Content>>;

/// A declarative recipe: what goes in, what comes out, for how long and under
/// which conditions.
///
/// Content maps are fixed at `build()` and only readable afterwards, which
/// keeps the cached `has_tick` valid. Scaling or renaming produces a copy
/// that shares the conditions and deep-copies content values.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: String,
    pub recipe_type: String,
    inputs: ContentMap,
    outputs: ContentMap,
    pub conditions: Vec<Condition>,
    /// Ticks per cycle
    pub duration: u32,
    pub priority: i32,
    pub is_fuel: bool,
    has_tick: OnceCell<bool>,
}

impl Recipe {
    pub fn builder(id: impl Into<String>) -> RecipeBuilder {
        RecipeBuilder::new(id)
    }

    /// Rename without scaling.
    pub fn copy_with_id(&self, id: impl Into<String>) -> Recipe {
        Recipe {
            id: id.into(),
            recipe_type: self.recipe_type.clone(),
            inputs: copy_contents(&self.inputs, None),
            outputs: copy_contents(&self.outputs, None),
            conditions: self.conditions.clone(),
            duration: self.duration,
            priority: self.priority,
            is_fuel: self.is_fuel,
            has_tick: OnceCell::new(),
        }
    }

    /// Scale both directions and the duration.
    pub fn copy_modified(&self, modifier: &ContentModifier) -> Recipe {
        self.copy_modified_io(modifier, true, IO::Both)
    }

    /// Scale the contents of `io` (`Both` for inputs and outputs) and,
    /// optionally, the duration. The other direction is carried over as is.
    pub fn copy_modified_io(
        &self,
        modifier: &ContentModifier,
        modify_duration: bool,
        io: IO,
    ) -> Recipe {
        let inputs = match io {
            IO::In | IO::Both => copy_contents(&self.inputs, Some(modifier)),
            IO::Out => self.inputs.clone(),
        };
        let outputs = match io {
            IO::Out | IO::Both => copy_contents(&self.outputs, Some(modifier)),
            IO::In => self.outputs.clone(),
        };
        let duration = if modify_duration {
            modifier.apply(self.duration as f64) as u32
        } else {
            self.duration
        };

        Recipe {
            id: self.id.clone(),
            recipe_type: self.recipe_type.clone(),
            inputs,
            outputs,
            conditions: self.conditions.clone(),
            duration,
            priority: self.priority,
            is_fuel: self.is_fuel,
            has_tick: OnceCell::new(),
        }
    }

    pub fn inputs(&self) -> &ContentMap {
        &self.inputs
    }

    pub fn outputs(&self) -> &ContentMap {
        &self.outputs
    }

    pub fn input_contents(&self, capability: Capability) -> &[Content] {
        self.inputs.get(&capability).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn output_contents(&self, capability: Capability) -> &[Content] {
        self.outputs.get(&capability).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Contents for one direction. `Both` has no map of its own and yields the outputs.
    pub(crate) fn contents(&self, io: IO) -> &ContentMap {
        match io {
            IO::In => &self.inputs,
            IO::Out | IO::Both => &self.outputs,
        }
    }

    /// Whether any input or output is consumed/produced per tick.
    /// Computed on first call and cached.
    pub fn has_tick(&self) -> bool {
        *self.has_tick.get_or_init(|| {
            self.inputs
                .values()
                .chain(self.outputs.values())
                .flatten()
                .any(|content| content.per_tick)
        })
    }
}

impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.recipe_type == other.recipe_type
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.conditions == other.conditions
            && self.duration == other.duration
            && self.priority == other.priority
            && self.is_fuel == other.is_fuel
    }
}

fn copy_contents(contents: &ContentMap, modifier: Option<&ContentModifier>) -> ContentMap {
    let mut copied = ContentMap::new();
    for (capability, list) in contents {
        if list.is_empty() {
            continue;
        }
        let list = list
            .iter()
            .map(|content| Content {
                content: capability.copy_content(&content.content, modifier),
                ..content.clone()
            })
            .collect();
        copied.insert(*capability, list);
    }
    copied
}

/// Incremental recipe definition.
///
/// `chance`, `tier_chance_boost`, `slot` and `per_tick` are sticky: they apply
/// to every input/output added after them until changed again.
#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    id: String,
    recipe_type: String,
    inputs: ContentMap,
    outputs: ContentMap,
    conditions: Vec<Condition>,
    duration: u32,
    priority: i32,
    is_fuel: bool,
    chance: f32,
    tier_chance_boost: f32,
    slot_name: String,
    per_tick: bool,
}

impl RecipeBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            recipe_type: "default".to_string(),
            inputs: ContentMap::new(),
            outputs: ContentMap::new(),
            conditions: Vec::new(),
            duration: 100,
            priority: 0,
            is_fuel: false,
            chance: 1.0,
            tier_chance_boost: 0.0,
            slot_name: String::new(),
            per_tick: false,
        }
    }

    pub fn recipe_type(mut self, recipe_type: impl Into<String>) -> Self {
        self.recipe_type = recipe_type.into();
        self
    }

    pub fn duration(mut self, ticks: u32) -> Self {
        self.duration = ticks;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn fuel(mut self, is_fuel: bool) -> Self {
        self.is_fuel = is_fuel;
        self
    }

    pub fn chance(mut self, chance: f32) -> Self {
        self.chance = chance;
        self
    }

    pub fn tier_chance_boost(mut self, boost: f32) -> Self {
        self.tier_chance_boost = boost;
        self
    }

    /// Route following contents to a named slot; an empty name means unslotted.
    pub fn slot(mut self, slot_name: impl Into<String>) -> Self {
        self.slot_name = slot_name.into();
        self
    }

    pub fn per_tick(mut self, per_tick: bool) -> Self {
        self.per_tick = per_tick;
        self
    }

    pub fn input(mut self, capability: Capability, value: ContentValue) -> Self {
        let content = self.content(value);
        self.inputs.entry(capability).or_default().push(content);
        self
    }

    pub fn output(mut self, capability: Capability, value: ContentValue) -> Self {
        let content = self.content(value);
        self.outputs.entry(capability).or_default().push(content);
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    fn content(&self, value: ContentValue) -> Content {
        Content {
            content: value,
            chance: self.chance,
            tier_chance_boost: self.tier_chance_boost,
            slot_name: self.slot_name.clone(),
            per_tick: self.per_tick,
        }
    }

    /// Validate and assemble the recipe.
    pub fn build(self) -> Result<Recipe, RecipeError> {
        if self.id.is_empty() {
            return Err(RecipeError::EmptyId);
        }
        for (capability, list) in self.inputs.iter().chain(self.outputs.iter()) {
            for content in list {
                validate_content(*capability, content)?;
            }
        }

        Ok(Recipe {
            id: self.id,
            recipe_type: self.recipe_type,
            inputs: self.inputs,
            outputs: self.outputs,
            conditions: self.conditions,
            duration: self.duration,
            priority: self.priority,
            is_fuel: self.is_fuel,
            has_tick: OnceCell::new(),
        })
    }
}

fn validate_content(capability: Capability, content: &Content) -> Result<(), RecipeError> {
    if !(0.0..=1.0).contains(&content.chance) {
        return Err(RecipeError::InvalidChance {
            capability,
            chance: content.chance,
        });
    }
    if content.tier_chance_boost < 0.0 {
        return Err(RecipeError::NegativeTierBoost {
            capability,
            boost: content.tier_chance_boost,
        });
    }
    if !capability.accepts(&content.content) {
        return Err(RecipeError::ContentMismatch {
            capability,
            content: format!("{:?}", content.content),
        });
    }
    Ok(())
}
