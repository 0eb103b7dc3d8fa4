//! Parallel search: the largest multiplier of a recipe a holder can run at once

use std::borrow::Cow;

use tracing::debug;

use crate::handler::RecipeCapabilityHolder;
use crate::models::{ContentModifier, IO};
use crate::recipe::Recipe;

/// Find the largest `k` in `[1, max_parallel]` such that the recipe scaled by
/// `k` passes both the whole-cycle and the per-tick match.
///
/// Returns the scaled copy and `k`. With `max_parallel <= 1`, or when not even
/// `k = 1` fits, the original recipe comes back borrowed with `k = 1`.
pub fn accurate_parallel<'a, H>(
    holder: &mut H,
    recipe: &'a Recipe,
    max_parallel: u32,
    modify_duration: bool,
) -> (Cow<'a, Recipe>, u32)
where
    H: RecipeCapabilityHolder + ?Sized,
{
    if max_parallel <= 1 {
        return (Cow::Borrowed(recipe), 1);
    }
    match try_parallel(holder, recipe, 1, max_parallel, modify_duration) {
        Some((copied, parallel)) => (Cow::Owned(copied), parallel),
        None => (Cow::Borrowed(recipe), 1),
    }
}

/// Binary search over `[min, max]`. On a fit the upper half is tried first,
/// so the highest fitting multiplier wins.
fn try_parallel<H>(
    holder: &mut H,
    original: &Recipe,
    min: u32,
    max: u32,
    modify_duration: bool,
) -> Option<(Recipe, u32)>
where
    H: RecipeCapabilityHolder + ?Sized,
{
    if min > max {
        return None;
    }
    let mid = min + (max - min) / 2;

    let modifier = ContentModifier::multiplier(f64::from(mid));
    let copied = original.copy_modified_io(&modifier, modify_duration, IO::Both);
    if !copied.match_recipe(holder).is_success() || !copied.match_tick_recipe(holder).is_success() {
        debug!(recipe = %original.id, parallel = mid, "too many parallels");
        return try_parallel(holder, original, min, mid - 1, modify_duration);
    }

    if mid == max {
        return Some((copied, mid));
    }
    match try_parallel(holder, original, mid + 1, max, modify_duration) {
        Some(more) => Some(more),
        None => Some((copied, mid)),
    }
}
