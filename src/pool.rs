//! In-memory resource pool handler
//!
//! A plain stock of amounts per resource key. Inputs are taken out of the
//! stock, outputs are put in (up to an optional total capacity). Used by the
//! harness binary and by tests; real machines bring their own handlers.

use std::collections::{BTreeMap, BTreeSet};

use crate::capability::Capability;
use crate::handler::{Leftover, RecipeHandler};
use crate::models::{ContentValue, IO};
use crate::recipe::Recipe;

#[derive(Debug, Clone)]
pub struct PoolHandler {
    capability: Capability,
    stock: BTreeMap<String, i64>,
    capacity: Option<i64>,
    slot_names: BTreeSet<String>,
    distinct: bool,
}

impl PoolHandler {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            stock: BTreeMap::new(),
            capacity: None,
            slot_names: BTreeSet::new(),
            distinct: false,
        }
    }

    /// Add `value` to the stock.
    pub fn with_stock(mut self, value: ContentValue) -> Self {
        *self.stock.entry(value.resource().to_string()).or_default() += value.amount();
        self
    }

    /// Cap the total amount the pool can hold.
    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slot_names.extend(slots.into_iter().map(Into::into));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn amount(&self, resource: &str) -> i64 {
        self.stock.get(resource).copied().unwrap_or(0)
    }

    pub fn total(&self) -> i64 {
        self.stock.values().sum()
    }
}

/// Move `contents` out of (`In`) or into (`Out`) `stock`, returning what did not fit.
fn transfer(
    stock: &mut BTreeMap<String, i64>,
    capacity: Option<i64>,
    io: IO,
    contents: &[ContentValue],
) -> Leftover {
    let mut left = Vec::new();
    for value in contents {
        let wanted = value.amount();
        let moved = match io {
            IO::In => {
                let available = stock.get(value.resource()).copied().unwrap_or(0);
                wanted.min(available).max(0)
            }
            IO::Out | IO::Both => {
                let total: i64 = stock.values().sum();
                let free = capacity.map_or(wanted, |cap| (cap - total).max(0));
                wanted.min(free).max(0)
            }
        };

        if moved > 0 {
            let entry = stock.entry(value.resource().to_string()).or_default();
            match io {
                IO::In => *entry -= moved,
                IO::Out | IO::Both => *entry += moved,
            }
        }
        if moved < wanted {
            left.push(value.with_amount(wanted - moved));
        }
    }

    if left.is_empty() {
        Leftover::Consumed
    } else {
        Leftover::Remaining(left)
    }
}

impl RecipeHandler for PoolHandler {
    fn capability(&self) -> Capability {
        self.capability
    }

    fn slot_names(&self) -> BTreeSet<String> {
        self.slot_names.clone()
    }

    fn is_distinct(&self) -> bool {
        self.distinct
    }

    fn handle_recipe(
        &mut self,
        io: IO,
        _recipe: &Recipe,
        contents: &[ContentValue],
        _slot: Option<&str>,
        simulate: bool,
    ) -> Leftover {
        if simulate {
            let mut scratch = self.stock.clone();
            transfer(&mut scratch, self.capacity, io, contents)
        } else {
            transfer(&mut self.stock, self.capacity, io, contents)
        }
    }
}
