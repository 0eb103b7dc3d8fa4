//! Sample recipes and a sample machine for the harness

use recipe_engine::capability::{ENERGY, FLUID, ITEM};
use recipe_engine::condition::{Condition, EnvironmentCondition, MachineLevelCondition};
use recipe_engine::error::RecipeError;
use recipe_engine::handler::{HandlerTable, RecipeCapabilityHolder};
use recipe_engine::models::{ContentValue, IO};
use recipe_engine::pool::PoolHandler;
use recipe_engine::recipe::Recipe;

/// A processing machine with a fixed set of buffers, tanks and inventories.
#[derive(Debug)]
pub struct Machine {
    pub name: String,
    pub chance_tier: f32,
    table: HandlerTable,
}

impl Machine {
    /// Machine stocked for the sample recipes
    pub fn sample(chance_tier: f32) -> Self {
        let mut table = HandlerTable::new();

        // Power
        table.register(IO::In, PoolHandler::new(ENERGY).with_stock(ContentValue::Quantity(20_000)));
        table.register(IO::Out, PoolHandler::new(ENERGY).with_capacity(50_000));

        // Input bus and a catalyst hatch that only takes whole catalyst lists
        table.register(
            IO::In,
            PoolHandler::new(ITEM)
                .with_stock(ContentValue::stack("iron_ore", 45))
                .with_stock(ContentValue::stack("algae", 30))
                .with_stock(ContentValue::stack("coal", 10)),
        );
        table.register(
            IO::In,
            PoolHandler::new(ITEM)
                .distinct()
                .with_slots(["catalyst"])
                .with_stock(ContentValue::stack("platinum", 2)),
        );
        table.register(
            IO::In,
            PoolHandler::new(FLUID)
                .with_stock(ContentValue::stack("water", 16_000))
                .with_stock(ContentValue::stack("crude_oil", 4_000)),
        );

        // Output bus and tank
        table.register(IO::Out, PoolHandler::new(ITEM).with_capacity(128));
        table.register(IO::Out, PoolHandler::new(FLUID).with_capacity(32_000));

        Self {
            name: "sample_machine".to_string(),
            chance_tier,
            table,
        }
    }
}

impl RecipeCapabilityHolder for Machine {
    fn handler_table(&self) -> &HandlerTable {
        &self.table
    }

    fn handler_table_mut(&mut self) -> &mut HandlerTable {
        &mut self.table
    }

    fn chance_tier(&self) -> f32 {
        self.chance_tier
    }
}

/// Sample recipe set
pub fn recipes() -> Result<Vec<Recipe>, RecipeError> {
    // Electrolyzer: Water -> Oxygen + Hydrogen, powered per tick
    let electrolyzer = Recipe::builder("electrolyzer")
        .recipe_type("electrolysis")
        .duration(20)
        .input(FLUID, ContentValue::stack("water", 1_000))
        .output(FLUID, ContentValue::stack("oxygen", 888))
        .output(FLUID, ContentValue::stack("hydrogen", 112))
        .per_tick(true)
        .input(ENERGY, ContentValue::Quantity(120))
        .build()?;

    // Metal Refinery: Ore -> Refined Metal, slag as a chanced byproduct
    let refinery = Recipe::builder("metal_refinery")
        .recipe_type("refining")
        .duration(40)
        .input(ITEM, ContentValue::stack("iron_ore", 10))
        .output(ITEM, ContentValue::stack("iron_ingot", 10))
        .chance(0.25)
        .tier_chance_boost(0.05)
        .output(ITEM, ContentValue::stack("slag", 1))
        .chance(1.0)
        .tier_chance_boost(0.0)
        .per_tick(true)
        .input(ENERGY, ContentValue::Quantity(240))
        .condition(Condition::new(MachineLevelCondition::new(2)))
        .build()?;

    // Algae Terrarium: Water + Algae -> Oxygen + Polluted Water, needs light or heat
    let terrarium = Recipe::builder("algae_terrarium")
        .recipe_type("oxygen")
        .duration(60)
        .input(ITEM, ContentValue::stack("algae", 3))
        .input(FLUID, ContentValue::stack("water", 300))
        .output(FLUID, ContentValue::stack("oxygen", 40))
        .output(FLUID, ContentValue::stack("dirty_water", 290))
        .condition(Condition::new(EnvironmentCondition::new("light", 200.0..=f64::MAX)).or())
        .condition(Condition::new(EnvironmentCondition::new("temperature", 30.0..=60.0)).or())
        .build()?;

    // Catalytic Cracker: Crude Oil -> Petroleum over a platinum catalyst
    let cracker = Recipe::builder("catalytic_cracker")
        .recipe_type("refining")
        .duration(80)
        .input(FLUID, ContentValue::stack("crude_oil", 500))
        .output(FLUID, ContentValue::stack("petroleum", 250))
        .slot("catalyst")
        .input(ITEM, ContentValue::stack("platinum", 1))
        .build()?;

    // Coal Generator: burns coal for power
    let generator = Recipe::builder("coal_generator")
        .recipe_type("power")
        .duration(100)
        .fuel(true)
        .input(ITEM, ContentValue::stack("coal", 1))
        .output(ENERGY, ContentValue::Quantity(600))
        .build()?;

    Ok(vec![electrolyzer, refinery, terrarium, cracker, generator])
}
