//! Recipe execution: commit contents to a holder's handlers
//!
//! Execution runs the same distribution as matching, non-simulated, after
//! rolling each chanced content. It is only meant to be called after a
//! successful match; a handler refusing content here means the holder
//! changed underneath us, and is reported rather than panicked on since
//! some handlers may already have been mutated.

use rand::Rng;
use tracing::warn;

use crate::capability::Capability;
use crate::error::ExecutionError;
use crate::handler::{HandlerTable, RecipeCapabilityHolder, RecipeHandler};
use crate::matching::{Demand, resolve};
use crate::models::{Content, IO};
use crate::recipe::Recipe;

/// Whether a content makes it into this cycle.
pub fn roll_chance<R: Rng>(content: &Content, chance_tier: f32, rng: &mut R) -> bool {
    content.chance >= 1.0 || rng.random::<f32>() < content.effective_chance(chance_tier)
}

/// Rolled demand plus the unrolled search shape it is probed against.
fn roll_demand<R: Rng>(
    capability: Capability,
    contents: &[Content],
    per_tick: bool,
    chance_tier: f32,
    rng: &mut R,
) -> (Demand, Demand) {
    let mut demand = Demand::default();
    let mut search = Demand::default();
    for content in contents.iter().filter(|c| c.per_tick == per_tick) {
        search.push(&content.slot_name, content.content.clone());
        if roll_chance(content, chance_tier, rng) {
            demand.push(&content.slot_name, capability.copy_content(&content.content, None));
        }
    }
    (demand, search)
}

impl Recipe {
    /// Commit the whole-cycle contents of one direction.
    pub fn handle_recipe_io<H, R>(
        &self,
        io: IO,
        holder: &mut H,
        rng: &mut R,
    ) -> Result<(), ExecutionError>
    where
        H: RecipeCapabilityHolder + ?Sized,
        R: Rng,
    {
        self.handle_contents(false, io, holder, rng)
    }

    /// Commit the per-tick contents of one direction.
    pub fn handle_tick_recipe_io<H, R>(
        &self,
        io: IO,
        holder: &mut H,
        rng: &mut R,
    ) -> Result<(), ExecutionError>
    where
        H: RecipeCapabilityHolder + ?Sized,
        R: Rng,
    {
        self.handle_contents(true, io, holder, rng)
    }

    fn handle_contents<H, R>(
        &self,
        per_tick: bool,
        io: IO,
        holder: &mut H,
        rng: &mut R,
    ) -> Result<(), ExecutionError>
    where
        H: RecipeCapabilityHolder + ?Sized,
        R: Rng,
    {
        if !holder.has_handlers() {
            return Err(ExecutionError::NoHandlers);
        }
        if io == IO::Both {
            return Err(ExecutionError::InvalidDirection);
        }
        let chance_tier = holder.chance_tier();
        let table = holder.handler_table_mut();

        for (capability, contents) in self.contents(io) {
            let (demand, search) = roll_demand(*capability, contents, per_tick, chance_tier, rng);
            if demand.is_satisfied() {
                continue;
            }

            let left = resolve(self, io, *capability, table, demand, &search, false);
            if !left.is_satisfied() {
                warn!(
                    recipe = %self.id,
                    %capability,
                    %io,
                    per_tick,
                    stranded = left.stranded,
                    "io error while handling recipe contents"
                );
                return Err(ExecutionError::Inconsistent {
                    recipe: self.id.clone(),
                    capability: *capability,
                });
            }
        }
        Ok(())
    }

    /// Notify handlers that the recipe is about to start.
    pub fn pre_working<H: RecipeCapabilityHolder + ?Sized>(&self, holder: &mut H) {
        let table = holder.handler_table_mut();
        for io in [IO::In, IO::Out] {
            self.notify(table, io, |handler, io, recipe| handler.pre_working(io, recipe));
        }
    }

    /// Notify handlers that the recipe has finished.
    pub fn post_working<H: RecipeCapabilityHolder + ?Sized>(&self, holder: &mut H) {
        let table = holder.handler_table_mut();
        for io in [IO::In, IO::Out] {
            self.notify(table, io, |handler, io, recipe| handler.post_working(io, recipe));
        }
    }

    /// Call `hook` on the handlers of every capability used in `io`, falling
    /// back to the `Both` bucket when no direction-specific one exists.
    fn notify<F>(&self, table: &mut HandlerTable, io: IO, hook: F)
    where
        F: Fn(&mut dyn RecipeHandler, IO, &Recipe),
    {
        for capability in self.contents(io).keys() {
            let bucket = if table.contains(io, *capability) { io } else { IO::Both };
            if let Some(handlers) = table.handlers_mut(bucket, *capability) {
                for handler in handlers.iter_mut() {
                    hook(handler.as_mut(), io, self);
                }
            }
        }
    }
}
