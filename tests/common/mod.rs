//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use recipe_engine::capability::Capability;
use recipe_engine::handler::{Leftover, RecipeHandler};
use recipe_engine::models::{ContentValue, IO};
use recipe_engine::pool::PoolHandler;
use recipe_engine::recipe::Recipe;

/// One observed call on a [`RecordingHandler`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Handle {
        io: IO,
        slot: Option<String>,
        contents: Vec<ContentValue>,
        simulate: bool,
    },
    PreWorking(IO),
    PostWorking(IO),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// A pool handler that records every call made on it.
#[derive(Debug)]
pub struct RecordingHandler {
    inner: PoolHandler,
    log: CallLog,
}

impl RecordingHandler {
    /// Wrap `inner`; the returned log stays readable after the handler is
    /// moved into a table.
    pub fn wrap(inner: PoolHandler) -> (Self, CallLog) {
        let log = CallLog::default();
        (
            Self {
                inner,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl RecipeHandler for RecordingHandler {
    fn capability(&self) -> Capability {
        self.inner.capability()
    }

    fn slot_names(&self) -> BTreeSet<String> {
        self.inner.slot_names()
    }

    fn is_distinct(&self) -> bool {
        self.inner.is_distinct()
    }

    fn handle_recipe(
        &mut self,
        io: IO,
        recipe: &Recipe,
        contents: &[ContentValue],
        slot: Option<&str>,
        simulate: bool,
    ) -> Leftover {
        self.log.borrow_mut().push(Call::Handle {
            io,
            slot: slot.map(str::to_string),
            contents: contents.to_vec(),
            simulate,
        });
        self.inner.handle_recipe(io, recipe, contents, slot, simulate)
    }

    fn pre_working(&mut self, io: IO, _recipe: &Recipe) {
        self.log.borrow_mut().push(Call::PreWorking(io));
    }

    fn post_working(&mut self, io: IO, _recipe: &Recipe) {
        self.log.borrow_mut().push(Call::PostWorking(io));
    }
}

/// Calls that actually changed state.
pub fn commits(log: &CallLog) -> Vec<Call> {
    log.borrow()
        .iter()
        .filter(|call| matches!(call, Call::Handle { simulate: false, .. }))
        .cloned()
        .collect()
}

/// Everything committed through `handle_recipe`, flattened.
pub fn committed_contents(log: &CallLog) -> Vec<ContentValue> {
    commits(log)
        .into_iter()
        .flat_map(|call| match call {
            Call::Handle { contents, .. } => contents,
            _ => Vec::new(),
        })
        .collect()
}
