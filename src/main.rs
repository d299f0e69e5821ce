use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use transforming_city::{render, EngineBuilder, ScenarioLoader};

#[derive(Debug, Parser)]
#[command(author, version, about = "Urban land use transformation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/reference_city.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of agents
    #[arg(long)]
    agents: Option<usize>,

    /// Print land use and density maps after the run
    #[arg(long)]
    render: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(agents) = cli.agents {
        scenario.agents = agents;
    }
    let ticks = scenario.ticks(cli.ticks);

    let mut engine = EngineBuilder::for_scenario(&scenario)?.build();
    let mut city = engine.initialize(&scenario)?;

    let mut moves = 0;
    let mut rejected = 0;
    engine.run_with_hook(&mut city, ticks, |summary| {
        moves += summary.moved;
        rejected += summary.rejected;
    })?;
    city.refresh_population(scenario.census.high_density_threshold);

    info!(
        scenario = %scenario.name,
        ticks,
        moves,
        rejected,
        "run complete"
    );
    println!(
        "Scenario '{}' completed for {} ticks: {} agents, {} moves",
        scenario.name,
        ticks,
        city.agent_count(),
        moves
    );

    if cli.render {
        let snapshot = city.snapshot();
        println!("\nLand use\n{}\n{}", render::land_use_map(&snapshot), render::legend());
        println!(
            "\nPopulation density\n{}\n{}",
            render::density_map(&snapshot),
            render::density_legend()
        );
    }
    Ok(())
}
