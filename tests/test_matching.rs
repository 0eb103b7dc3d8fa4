//! Integration tests for matching, conditions, copies and parallel search.
//!
//! All holders are in-memory pools; handlers that need to be observed are
//! wrapped in a recording handler.

mod common;

use std::borrow::Cow;

use common::{Call, RecordingHandler};
use recipe_engine::capability::{Capability, ENERGY, FLUID, ITEM};
use recipe_engine::condition::{
    Condition, ConditionContext, EnvironmentCondition, MachineLevelCondition, RecipeCondition,
};
use recipe_engine::handler::{HandlerTable, Leftover};
use recipe_engine::models::{ContentModifier, ContentValue, IO};
use recipe_engine::parallel::accurate_parallel;
use recipe_engine::pool::PoolHandler;
use recipe_engine::recipe::Recipe;
use recipe_engine::result::FailReason;

// ── Helpers ──────────────────────────────────────────────────────────

fn gear_recipe(gears: i64) -> Recipe {
    Recipe::builder("assemble")
        .duration(10)
        .input(ITEM, ContentValue::stack("gear", gears))
        .build()
        .unwrap()
}

fn gear_stock(gears: i64) -> HandlerTable {
    let mut table = HandlerTable::new();
    table.register(IO::In, PoolHandler::new(ITEM).with_stock(ContentValue::stack("gear", gears)));
    table
}

// ── Shortfall reports ────────────────────────────────────────────────

#[test]
fn energy_shortfall_names_capability_and_amount() {
    let recipe = Recipe::builder("smelt")
        .input(ENERGY, ContentValue::Quantity(300))
        .build()
        .unwrap();
    let mut table = HandlerTable::new();
    table.register(IO::In, PoolHandler::new(ENERGY).with_stock(ContentValue::Quantity(100)));

    let result = recipe.match_recipe(&mut table);
    assert!(!result.is_success());

    let Some(FailReason::Insufficient(shortfall)) = result.reason() else {
        panic!("expected a shortfall, got {:?}", result.reason());
    };
    assert_eq!(shortfall.capability, ENERGY);
    assert_eq!(shortfall.io, IO::In);
    assert!(!shortfall.per_tick);
    assert_eq!(shortfall.missing, Leftover::Remaining(vec![ContentValue::Quantity(200)]));
    assert_eq!(
        result.reason().unwrap().to_string(),
        "insufficient input: energy | miss: 200 EU"
    );
}

#[test]
fn matching_never_changes_stock() {
    let recipe = gear_recipe(3);
    let mut table = gear_stock(3);
    for _ in 0..5 {
        assert!(recipe.match_recipe(&mut table).is_success());
    }
}

// ── Distinct handlers ────────────────────────────────────────────────

#[test]
fn distinct_slot_handler_clears_demand_before_shared_phase() {
    let recipe = Recipe::builder("etch")
        .slot("A")
        .input(ITEM, ContentValue::stack("gear", 2))
        .build()
        .unwrap();

    let (distinct, distinct_log) = RecordingHandler::wrap(
        PoolHandler::new(ITEM)
            .distinct()
            .with_slots(["A"])
            .with_stock(ContentValue::stack("gear", 2)),
    );
    let (shared, shared_log) = RecordingHandler::wrap(
        PoolHandler::new(ITEM)
            .with_slots(["A"])
            .with_stock(ContentValue::stack("gear", 10)),
    );
    let mut table = HandlerTable::new();
    table.register(IO::In, distinct);
    table.register(IO::In, shared);

    assert!(recipe.match_recipe(&mut table).is_success());
    assert!(shared_log.borrow().is_empty());
    assert!(
        distinct_log
            .borrow()
            .iter()
            .all(|call| matches!(call, Call::Handle { simulate: true, .. }))
    );
}

#[test]
fn distinct_handler_takes_whole_list_or_nothing() {
    let recipe = Recipe::builder("rivet")
        .input(ITEM, ContentValue::stack("gear", 3))
        .input(ITEM, ContentValue::stack("bolt", 2))
        .build()
        .unwrap();

    let (distinct, distinct_log) = RecordingHandler::wrap(
        PoolHandler::new(ITEM)
            .distinct()
            .with_stock(ContentValue::stack("gear", 3)),
    );
    let mut table = HandlerTable::new();
    table.register(IO::In, distinct);
    table.register(IO::In, PoolHandler::new(ITEM).with_stock(ContentValue::stack("bolt", 2)));

    let result = recipe.match_recipe(&mut table);
    assert!(!result.is_success());
    assert_eq!(
        result.reason().unwrap().to_string(),
        "insufficient input: item | miss: 3x gear"
    );
    // One simulated check of the full list, nothing else.
    assert_eq!(distinct_log.borrow().len(), 1);
    assert!(common::commits(&distinct_log).is_empty());
}

// ── More stock, more handlers ────────────────────────────────────────

#[test]
fn more_stock_or_more_handlers_keeps_a_match() {
    let recipe = gear_recipe(4);

    assert!(recipe.match_recipe(&mut gear_stock(4)).is_success());
    assert!(recipe.match_recipe(&mut gear_stock(8)).is_success());

    let mut table = gear_stock(4);
    table.register(IO::In, PoolHandler::new(ITEM).with_stock(ContentValue::stack("bolt", 16)));
    table.register(IO::Both, PoolHandler::new(ITEM).with_stock(ContentValue::stack("gear", 1)));
    assert!(recipe.match_recipe(&mut table).is_success());
}

#[test]
fn both_handlers_cover_what_directional_ones_cannot() {
    let recipe = gear_recipe(5);
    let mut table = gear_stock(3);
    assert!(!recipe.match_recipe(&mut table).is_success());

    table.register(IO::Both, PoolHandler::new(ITEM).with_stock(ContentValue::stack("gear", 2)));
    assert!(recipe.match_recipe(&mut table).is_success());
}

// ── Fewer requirements ───────────────────────────────────────────────

fn workbench_inputs() -> Vec<(Capability, ContentValue)> {
    vec![
        (ITEM, ContentValue::stack("gear", 2)),
        (ITEM, ContentValue::stack("bolt", 3)),
        (ENERGY, ContentValue::Quantity(50)),
        (FLUID, ContentValue::stack("oil", 100)),
    ]
}

fn workbench(inputs: &[(Capability, ContentValue)]) -> Recipe {
    inputs
        .iter()
        .fold(Recipe::builder("workbench"), |builder, (capability, value)| {
            builder.input(*capability, value.clone())
        })
        .output(ITEM, ContentValue::stack("widget", 1))
        .build()
        .unwrap()
}

/// Stocked with exactly what the full workbench recipe needs.
fn workbench_stock(distinct_items: bool) -> HandlerTable {
    let mut items = PoolHandler::new(ITEM)
        .with_stock(ContentValue::stack("gear", 2))
        .with_stock(ContentValue::stack("bolt", 3));
    if distinct_items {
        items = items.distinct();
    }
    let mut table = HandlerTable::new();
    table.register(IO::In, items);
    table.register(IO::In, PoolHandler::new(ENERGY).with_stock(ContentValue::Quantity(50)));
    table.register(IO::In, PoolHandler::new(FLUID).with_stock(ContentValue::stack("oil", 100)));
    table.register(IO::Out, PoolHandler::new(ITEM));
    table
}

#[test]
fn dropping_any_input_keeps_a_match() {
    let inputs = workbench_inputs();
    for distinct_items in [false, true] {
        let mut table = workbench_stock(distinct_items);
        assert!(workbench(&inputs).match_recipe(&mut table).is_success());

        for skipped in 0..inputs.len() {
            let mut fewer = inputs.clone();
            let dropped = fewer.remove(skipped);
            let result = workbench(&fewer).match_recipe(&mut table);
            assert!(result.is_success(), "without {:?}: {:?}", dropped.1, result.reason());
        }
    }
}

// ── Copies ───────────────────────────────────────────────────────────

#[test]
fn copy_with_id_only_renames() {
    let recipe = Recipe::builder("press")
        .duration(30)
        .priority(2)
        .input(ITEM, ContentValue::stack("gear", 1))
        .output(ITEM, ContentValue::stack("plate", 1))
        .condition(Condition::new(MachineLevelCondition::new(3)))
        .build()
        .unwrap();

    let copy = recipe.copy_with_id("press_alt");
    assert_eq!(copy.id, "press_alt");
    assert_eq!(copy.inputs(), recipe.inputs());
    assert_eq!(copy.outputs(), recipe.outputs());
    assert_eq!(copy.conditions, recipe.conditions);
    assert_eq!(copy.duration, 30);
    assert_eq!(copy.priority, 2);
}

#[test]
fn identity_copy_matches_like_the_original() {
    let recipe = gear_recipe(4);
    let copy = recipe.copy_modified(&ContentModifier::multiplier(1.0));
    assert_eq!(copy, recipe);

    for stock in [2, 4, 9] {
        assert_eq!(
            copy.match_recipe(&mut gear_stock(stock)),
            recipe.match_recipe(&mut gear_stock(stock))
        );
    }
}

// ── Conditions ───────────────────────────────────────────────────────

fn lit_recipe() -> Recipe {
    Recipe::builder("grow")
        .condition(Condition::new(MachineLevelCondition::new(2)))
        .condition(Condition::new(EnvironmentCondition::new("light", 200.0..=1000.0)).or())
        .condition(Condition::new(EnvironmentCondition::new("temperature", 20.0..=40.0)).or())
        .build()
        .unwrap()
}

#[test]
fn or_group_needs_one_member() {
    let recipe = lit_recipe();

    let lit = ConditionContext {
        level: 2,
        ..ConditionContext::default()
    }
    .with_reading("light", 300.0);
    assert!(recipe.check_conditions(&lit).is_success());

    let warm = ConditionContext {
        level: 2,
        ..ConditionContext::default()
    }
    .with_reading("temperature", 25.0);
    assert!(recipe.check_conditions(&warm).is_success());

    let dark = ConditionContext {
        level: 2,
        ..ConditionContext::default()
    }
    .with_reading("light", 10.0);
    let result = recipe.check_conditions(&dark);
    assert_eq!(
        result.reason(),
        Some(&FailReason::ConditionGroup {
            group: "environment".to_string()
        })
    );
}

#[test]
fn and_condition_fails_regardless_of_or_group() {
    let recipe = lit_recipe();
    let context = ConditionContext {
        level: 1,
        ..ConditionContext::default()
    }
    .with_reading("light", 300.0);

    let result = recipe.check_conditions(&context);
    assert!(!result.is_success());
    assert!(matches!(result.reason(), Some(FailReason::Condition { .. })));
}

#[test]
fn reversed_condition_inverts() {
    let recipe = Recipe::builder("night_shift")
        .condition(Condition::new(EnvironmentCondition::new("light", 200.0..=1000.0)).reverse())
        .build()
        .unwrap();

    let night = ConditionContext::default().with_reading("light", 5.0);
    let day = ConditionContext::default().with_reading("light", 500.0);
    assert!(recipe.check_conditions(&night).is_success());
    assert!(!recipe.check_conditions(&day).is_success());
}

/// Holds a recipe back until the machine has run for `ticks`.
#[derive(Debug)]
struct WarmUp {
    ticks: u64,
}

impl RecipeCondition for WarmUp {
    fn group(&self) -> &str {
        "warm_up"
    }

    fn test(&self, _recipe: &Recipe, context: &ConditionContext) -> bool {
        context.tick >= self.ticks
    }

    fn describe(&self) -> String {
        format!("warmed up for {} ticks", self.ticks)
    }
}

#[test]
fn custom_condition_reads_the_tick() {
    let recipe = Recipe::builder("anneal")
        .condition(Condition::new(WarmUp { ticks: 100 }))
        .build()
        .unwrap();

    let cold = ConditionContext {
        tick: 40,
        ..ConditionContext::default()
    };
    assert_eq!(
        recipe.check_conditions(&cold).reason().map(ToString::to_string),
        Some("condition fails: warmed up for 100 ticks".to_string())
    );

    let warm = ConditionContext {
        tick: 100,
        ..ConditionContext::default()
    };
    assert!(recipe.check_conditions(&warm).is_success());
}

// ── Parallel search ──────────────────────────────────────────────────

#[test]
fn single_parallel_skips_matching() {
    let recipe = gear_recipe(1);
    let (pool, log) =
        RecordingHandler::wrap(PoolHandler::new(ITEM).with_stock(ContentValue::stack("gear", 64)));
    let mut table = HandlerTable::new();
    table.register(IO::In, pool);

    let (scaled, parallel) = accurate_parallel(&mut table, &recipe, 1, true);
    assert_eq!(parallel, 1);
    assert!(matches!(scaled, Cow::Borrowed(_)));
    assert!(log.borrow().is_empty());
}

#[test]
fn parallel_stops_at_stock() {
    let recipe = gear_recipe(1);
    let mut table = gear_stock(6);

    let (scaled, parallel) = accurate_parallel(&mut table, &recipe, 12, true);
    assert_eq!(parallel, 6);
    assert_eq!(scaled.duration, 60);
    assert_eq!(scaled.input_contents(ITEM)[0].content, ContentValue::stack("gear", 6));
    assert!(scaled.match_recipe(&mut table).is_success());
}
