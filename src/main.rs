//! Recipe Engine harness
//!
//! Runs the sample recipe set against a sample machine: condition checks,
//! matching with shortfall reports, parallel search and full work cycles.

mod sample;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use recipe_engine::condition::ConditionContext;
use recipe_engine::handler::RecipeCapabilityHolder;
use recipe_engine::models::IO;
use recipe_engine::parallel::accurate_parallel;
use recipe_engine::recipe::Recipe;
use recipe_engine::result::ActionResult;

use crate::sample::Machine;

#[derive(Parser)]
#[command(name = "recipe-engine")]
#[command(about = "Match and run machine recipes against a sample machine")]
struct Cli {
    /// Seed for chanced contents (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Chance tier of the machine
    #[arg(long, global = true, default_value = "0.0")]
    chance_tier: f32,

    /// Machine level seen by conditions
    #[arg(long, global = true, default_value = "1")]
    level: u32,

    /// Light reading seen by environment conditions
    #[arg(long, global = true)]
    light: Option<f64>,

    /// Temperature reading seen by environment conditions
    #[arg(long, global = true)]
    temperature: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sample recipes
    Recipes,

    /// List the handlers of the sample machine
    Handlers,

    /// Check conditions and match a recipe without running it
    Check {
        /// Recipe ID
        recipe: String,
    },

    /// Find how many copies of a recipe the machine can run at once
    Parallel {
        /// Recipe ID
        recipe: String,

        /// Upper bound for the multiplier
        #[arg(short, long, default_value = "16")]
        max: u32,

        /// Keep the duration of a single run instead of scaling it
        #[arg(long)]
        keep_duration: bool,
    },

    /// Run full work cycles of a recipe
    Run {
        /// Recipe ID
        recipe: String,

        /// Number of cycles to run
        #[arg(short, long, default_value = "1")]
        cycles: u32,

        /// Upper bound for the parallel multiplier
        #[arg(short, long, default_value = "1")]
        parallel: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let recipes = sample::recipes().context("Failed to build sample recipes")?;
    let mut machine = Machine::sample(cli.chance_tier);
    let mut context = ConditionContext {
        level: cli.level,
        ..ConditionContext::default()
    };
    if let Some(light) = cli.light {
        context = context.with_reading("light", light);
    }
    if let Some(temperature) = cli.temperature {
        context = context.with_reading("temperature", temperature);
    }

    match cli.command {
        Commands::Recipes => {
            println!("{:<20} {:<14} {:>8} {:>6}", "Recipe", "Type", "Duration", "Tick");
            println!("{}", "-".repeat(51));
            for r in &recipes {
                println!(
                    "{:<20} {:<14} {:>8} {:>6}",
                    r.id,
                    r.recipe_type,
                    r.duration,
                    if r.has_tick() { "yes" } else { "no" }
                );
            }
        }

        Commands::Handlers => {
            println!("Machine: {}", machine.name);
            for (io, capability, handler) in machine.handler_table().iter() {
                let slots: Vec<_> = handler.slot_names().into_iter().collect();
                println!(
                    "  {:<6} {:<7} distinct={:<5} slots=[{}]",
                    io.to_string(),
                    capability.to_string(),
                    handler.is_distinct(),
                    slots.join(", ")
                );
            }
        }

        Commands::Check { recipe } => {
            let recipe = find(&recipes, &recipe)?;
            report("conditions", &recipe.check_conditions(&context));
            for io in [IO::In, IO::Out] {
                report(
                    &format!("{io}"),
                    &recipe.match_recipe_io(false, io, &mut machine, true),
                );
                if recipe.has_tick() {
                    report(
                        &format!("{io}/t"),
                        &recipe.match_recipe_io(true, io, &mut machine, true),
                    );
                }
            }
        }

        Commands::Parallel {
            recipe,
            max,
            keep_duration,
        } => {
            let recipe = find(&recipes, &recipe)?;
            let (scaled, parallel) = accurate_parallel(&mut machine, recipe, max, !keep_duration);
            println!("{} x{} (duration {} ticks)", recipe.id, parallel, scaled.duration);
        }

        Commands::Run {
            recipe,
            cycles,
            parallel,
        } => {
            let recipe = find(&recipes, &recipe)?;
            let mut rng = match cli.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };

            let mut elapsed: u64 = 0;
            for cycle in 1..=cycles {
                context.tick = elapsed;
                let conditions = recipe.check_conditions(&context);
                if !conditions.is_success() {
                    bail!("Cycle {}: {}", cycle, describe(&conditions));
                }

                let (scaled, factor) = accurate_parallel(&mut machine, recipe, parallel, true);
                let working: &Recipe = &scaled;
                let matched = working.match_recipe(&mut machine);
                if !matched.is_success() {
                    bail!("Cycle {}: {}", cycle, describe(&matched));
                }

                working.pre_working(&mut machine);
                working.handle_recipe_io(IO::In, &mut machine, &mut rng)?;
                for tick in 0..working.duration {
                    let ticked = working.match_tick_recipe(&mut machine);
                    if !ticked.is_success() {
                        bail!("Cycle {}, tick {}: {}", cycle, tick, describe(&ticked));
                    }
                    working.handle_tick_recipe_io(IO::In, &mut machine, &mut rng)?;
                    working.handle_tick_recipe_io(IO::Out, &mut machine, &mut rng)?;
                }
                working.handle_recipe_io(IO::Out, &mut machine, &mut rng)?;
                working.post_working(&mut machine);
                elapsed += u64::from(working.duration);

                info!(recipe = %recipe.id, cycle, parallel = factor, "cycle finished");
                println!(
                    "Cycle {}: {} x{} done in {} ticks",
                    cycle, recipe.id, factor, working.duration
                );
            }

            println!("\nHandlers after {} cycle(s):", cycles);
            for (io, capability, handler) in machine.handler_table().iter() {
                println!("  {:<6} {:<7} {:?}", io.to_string(), capability.to_string(), handler);
            }
        }
    }

    Ok(())
}

fn find<'a>(recipes: &'a [Recipe], id: &str) -> Result<&'a Recipe> {
    recipes
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| anyhow!("Recipe '{}' not found", id))
}

fn describe(result: &ActionResult) -> String {
    match result.reason() {
        Some(reason) => reason.to_string(),
        None => "no reason given".to_string(),
    }
}

fn report(label: &str, result: &ActionResult) {
    if result.is_success() {
        println!("  {:<12} ok", label);
    } else if result.expecting_rate() > 0.0 {
        println!(
            "  {:<12} {} (expecting rate {:.2})",
            label,
            describe(result),
            result.expecting_rate()
        );
    } else {
        println!("  {:<12} {}", label, describe(result));
    }
}
