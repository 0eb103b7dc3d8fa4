//! Recipe handlers and the per-holder handler table
//!
//! A handler is a capability-typed resource endpoint (an energy buffer, an
//! item inventory, a fluid tank...) owned by a holder. The engine only ever
//! iterates the holder's handlers in registration order and asks them to
//! place content, either simulated or for real.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::capability::Capability;
use crate::models::{ContentValue, IO};
use crate::recipe::Recipe;

/// What a handler could not place.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Leftover {
    /// Everything was placed.
    #[default]
    Consumed,
    /// This much is still left to place.
    Remaining(Vec<ContentValue>),
}

impl Leftover {
    pub fn is_consumed(&self) -> bool {
        matches!(self, Leftover::Consumed)
    }

    pub fn remaining(&self) -> Option<&[ContentValue]> {
        match self {
            Leftover::Consumed => None,
            Leftover::Remaining(values) => Some(values.as_slice()),
        }
    }
}

/// A resource endpoint for one capability.
pub trait RecipeHandler: fmt::Debug {
    fn capability(&self) -> Capability;

    /// Slots this handler services. Empty means unslotted content only.
    fn slot_names(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    /// A distinct handler must place a whole content list on its own or
    /// not touch it at all.
    fn is_distinct(&self) -> bool {
        false
    }

    /// Place `contents` (consume for inputs, insert for outputs).
    ///
    /// With `simulate` set the handler must not change any state.
    fn handle_recipe(
        &mut self,
        io: IO,
        recipe: &Recipe,
        contents: &[ContentValue],
        slot: Option<&str>,
        simulate: bool,
    ) -> Leftover;

    /// Called before a recipe starts working.
    fn pre_working(&mut self, _io: IO, _recipe: &Recipe) {}

    /// Called after a recipe finished working.
    fn post_working(&mut self, _io: IO, _recipe: &Recipe) {}
}

/// (direction, capability) -> handlers in registration order.
#[derive(Debug, Default)]
pub struct HandlerTable {
    buckets: BTreeMap<(IO, Capability), Vec<Box<dyn RecipeHandler>>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the bucket for `io` and the handler's capability.
    pub fn register(&mut self, io: IO, handler: impl RecipeHandler + 'static) {
        self.register_boxed(io, Box::new(handler));
    }

    pub fn register_boxed(&mut self, io: IO, handler: Box<dyn RecipeHandler>) {
        let capability = handler.capability();
        self.buckets.entry((io, capability)).or_default().push(handler);
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    pub fn contains(&self, io: IO, capability: Capability) -> bool {
        self.buckets.contains_key(&(io, capability))
    }

    pub fn handlers_mut(
        &mut self,
        io: IO,
        capability: Capability,
    ) -> Option<&mut [Box<dyn RecipeHandler>]> {
        self.buckets.get_mut(&(io, capability)).map(Vec::as_mut_slice)
    }

    /// Every handler with its bucket, buckets in (direction, capability) order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (IO, Capability, &(dyn RecipeHandler + 'static))> + '_ {
        self.buckets.iter().flat_map(|((io, capability), handlers)| {
            handlers
                .iter()
                .map(move |handler| (*io, *capability, &**handler))
        })
    }
}

/// Anything exposing recipe handlers: a machine, a multiblock controller...
pub trait RecipeCapabilityHolder {
    fn handler_table(&self) -> &HandlerTable;

    fn handler_table_mut(&mut self) -> &mut HandlerTable;

    /// Raises the inclusion probability of chanced contents.
    fn chance_tier(&self) -> f32 {
        0.0
    }

    fn has_handlers(&self) -> bool {
        !self.handler_table().is_empty()
    }
}

impl RecipeCapabilityHolder for HandlerTable {
    fn handler_table(&self) -> &HandlerTable {
        self
    }

    fn handler_table_mut(&mut self) -> &mut HandlerTable {
        self
    }
}
