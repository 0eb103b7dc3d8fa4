//! Recipe matching: can a recipe run against a holder right now?
//!
//! Content of each capability is turned into a [`Demand`] and offered to the
//! holder's handlers in two passes: first the handlers registered for the
//! recipe direction, then whatever is left goes to the `Both` handlers.
//! Within a pass, distinct handlers go first and must take a whole list or
//! nothing; shared handlers then chip away at the rest in registration order.
//!
//! The same distribution runs non-simulated from [`crate::execution`].

use std::collections::BTreeMap;
use std::mem;

use tracing::trace;

use crate::capability::Capability;
use crate::handler::{HandlerTable, Leftover, RecipeCapabilityHolder, RecipeHandler};
use crate::models::{Content, ContentValue, IO};
use crate::recipe::Recipe;
use crate::result::{ActionResult, FailReason, Shortfall};

/// Outstanding content of one capability.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Demand {
    pub unslotted: Leftover,
    pub slots: BTreeMap<String, Vec<ContentValue>>,
    /// A distinct handler accepted this demand but left part of it behind on
    /// commit. No other handler may take the rest.
    pub stranded: bool,
}

impl Demand {
    /// Demand for the contents whose per-tick flag equals `per_tick`.
    pub fn collect(capability: Capability, contents: &[Content], per_tick: bool) -> Self {
        let mut demand = Demand::default();
        for content in contents.iter().filter(|c| c.per_tick == per_tick) {
            demand.push(&content.slot_name, capability.copy_content(&content.content, None));
        }
        demand
    }

    pub fn push(&mut self, slot_name: &str, value: ContentValue) {
        if !slot_name.is_empty() {
            self.slots.entry(slot_name.to_string()).or_default().push(value);
        } else if let Leftover::Remaining(values) = &mut self.unslotted {
            values.push(value);
        } else {
            self.unslotted = Leftover::Remaining(vec![value]);
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.unslotted.is_consumed() && self.slots.is_empty()
    }
}

/// Offer `demand` to the handlers for `io`, then to the `Both` handlers.
///
/// `search` is the full shape of the demand; distinct handlers are probed
/// against it so that an all-or-nothing decision holds for the whole list.
pub(crate) fn resolve(
    recipe: &Recipe,
    io: IO,
    capability: Capability,
    table: &mut HandlerTable,
    mut demand: Demand,
    search: &Demand,
    simulate: bool,
) -> Demand {
    for bucket in [io, IO::Both] {
        if demand.is_satisfied() || demand.stranded {
            break;
        }
        if let Some(handlers) = table.handlers_mut(bucket, capability) {
            demand = distribute(recipe, io, handlers, demand, search, simulate);
        }
    }
    demand
}

/// One pass over a handler bucket: distinct handlers, then shared ones.
fn distribute(
    recipe: &Recipe,
    io: IO,
    handlers: &mut [Box<dyn RecipeHandler>],
    mut demand: Demand,
    search: &Demand,
    simulate: bool,
) -> Demand {
    for handler in handlers.iter_mut().filter(|h| h.is_distinct()) {
        if demand.is_satisfied() {
            return demand;
        }
        demand = place_distinct(recipe, io, handler.as_mut(), demand, search, simulate);
        if demand.stranded {
            return demand;
        }
    }
    for handler in handlers.iter_mut().filter(|h| !h.is_distinct()) {
        if demand.is_satisfied() {
            break;
        }
        demand = place_shared(recipe, io, handler.as_mut(), demand, simulate);
    }
    demand
}

/// All-or-nothing placement on a distinct handler.
///
/// Acceptance is decided against the full search shape, never the rolled
/// demand, so a rolled-out content cannot make a handler eligible that
/// matching rejected. An accepted handler takes the whole demand.
fn place_distinct(
    recipe: &Recipe,
    io: IO,
    handler: &mut dyn RecipeHandler,
    demand: Demand,
    search: &Demand,
    simulate: bool,
) -> Demand {
    if !accepts_whole(recipe, io, handler, search) {
        return demand;
    }
    if simulate {
        return Demand::default();
    }

    let mut left = Demand::default();
    for (slot, values) in demand.slots {
        let placed = handler.handle_recipe(io, recipe, &values, Some(slot.as_str()), false);
        if let Leftover::Remaining(rest) = placed {
            left.slots.insert(slot, rest);
        }
    }
    if let Leftover::Remaining(values) = &demand.unslotted {
        left.unslotted = handler.handle_recipe(io, recipe, values, None, false);
    }
    left.stranded = !left.is_satisfied();
    left
}

/// Whether `handler` can take the unslotted list and every slot of `search`.
fn accepts_whole(
    recipe: &Recipe,
    io: IO,
    handler: &mut dyn RecipeHandler,
    search: &Demand,
) -> bool {
    let unslotted = search.unslotted.remaining().unwrap_or(&[]);
    if !handler.handle_recipe(io, recipe, unslotted, None, true).is_consumed() {
        return false;
    }

    let serviced = handler.slot_names();
    if !search.slots.keys().all(|slot| serviced.contains(slot)) {
        return false;
    }
    search.slots.iter().all(|(slot, values)| {
        handler
            .handle_recipe(io, recipe, values, Some(slot.as_str()), true)
            .is_consumed()
    })
}

/// Partial placement on a shared handler; whatever it reports as left stays open.
fn place_shared(
    recipe: &Recipe,
    io: IO,
    handler: &mut dyn RecipeHandler,
    mut demand: Demand,
    simulate: bool,
) -> Demand {
    if let Leftover::Remaining(values) = mem::take(&mut demand.unslotted) {
        demand.unslotted = handler.handle_recipe(io, recipe, &values, None, simulate);
    }

    let serviced = handler.slot_names();
    if serviced.is_empty() {
        return demand;
    }
    for (slot, values) in mem::take(&mut demand.slots) {
        if !serviced.contains(&slot) {
            demand.slots.insert(slot, values);
            continue;
        }
        let placed = handler.handle_recipe(io, recipe, &values, Some(slot.as_str()), simulate);
        if let Leftover::Remaining(left) = placed {
            demand.slots.insert(slot, left);
        }
    }
    demand
}

/// Requested over placed amount, maximised over the unslotted list and each slot.
fn expecting_rate(capability: Capability, requested: &Demand, left: &Demand) -> f32 {
    let mut parts: Vec<(&[ContentValue], &[ContentValue])> = Vec::new();
    if let (Some(required), Some(missing)) =
        (requested.unslotted.remaining(), left.unslotted.remaining())
    {
        parts.push((required, missing));
    }
    for (slot, missing) in &left.slots {
        if let Some(required) = requested.slots.get(slot) {
            parts.push((required.as_slice(), missing.as_slice()));
        }
    }

    parts
        .into_iter()
        .map(|(required, missing)| {
            let required = capability.calculate_amount(required);
            let placed = required - capability.calculate_amount(missing);
            if placed > 0.0 {
                (required / placed) as f32
            } else {
                f32::INFINITY
            }
        })
        .fold(0.0, f32::max)
}

impl Recipe {
    /// Simulate the whole-cycle inputs, then outputs. Fails on the first
    /// capability that cannot be placed.
    pub fn match_recipe<H: RecipeCapabilityHolder + ?Sized>(&self, holder: &mut H) -> ActionResult {
        if !holder.has_handlers() {
            return ActionResult::fail_no_reason();
        }
        let result = self.match_recipe_io(false, IO::In, holder, false);
        if !result.is_success() {
            return result;
        }
        self.match_recipe_io(false, IO::Out, holder, false)
    }

    /// Like [`Recipe::match_recipe`] for the per-tick contents. Succeeds
    /// trivially when the recipe has none.
    pub fn match_tick_recipe<H>(&self, holder: &mut H) -> ActionResult
    where
        H: RecipeCapabilityHolder + ?Sized,
    {
        if !self.has_tick() {
            return ActionResult::SUCCESS;
        }
        if !holder.has_handlers() {
            return ActionResult::fail_no_reason();
        }
        let result = self.match_recipe_io(true, IO::In, holder, false);
        if !result.is_success() {
            return result;
        }
        self.match_recipe_io(true, IO::Out, holder, false)
    }

    /// Simulate one direction. `Both` is not a recipe direction and never matches.
    pub fn match_recipe_io<H: RecipeCapabilityHolder + ?Sized>(
        &self,
        per_tick: bool,
        io: IO,
        holder: &mut H,
        calculate_expecting_rate: bool,
    ) -> ActionResult {
        if io == IO::Both {
            return ActionResult::fail_no_reason();
        }
        let table = holder.handler_table_mut();

        for (capability, contents) in self.contents(io) {
            let demand = Demand::collect(*capability, contents, per_tick);
            if demand.is_satisfied() {
                continue;
            }

            let left = resolve(self, io, *capability, table, demand.clone(), &demand, true);
            if left.is_satisfied() {
                trace!(recipe = %self.id, %capability, %io, per_tick, "capability matched");
                continue;
            }

            let rate = if calculate_expecting_rate {
                expecting_rate(*capability, &demand, &left)
            } else {
                0.0
            };
            return ActionResult::fail_with_rate(
                FailReason::Insufficient(Shortfall {
                    io,
                    per_tick,
                    capability: *capability,
                    missing: left.unslotted,
                    missing_slots: left.slots,
                }),
                rate,
            );
        }
        ActionResult::SUCCESS
    }
}
