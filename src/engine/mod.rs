use anyhow::{Context, Result};
use tracing::debug;

use crate::{
    city::{City, TickLedger},
    initializer,
    rng::{RngManager, RngStream},
    scenario::Scenario,
    systems::{CensusSystem, RelocationSystem},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub search_budget: f64,
}

impl EngineSettings {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            scenario_name: scenario.name.clone(),
            seed: scenario.seed,
            search_budget: scenario.search_budget,
        }
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    /// Relocation with the scenario's policy, plus a census pass when the
    /// scenario asks for one every tick.
    pub fn for_scenario(scenario: &Scenario) -> Result<Self> {
        let policy = scenario
            .relocation
            .policy()
            .context("Invalid relocation settings")?;
        let mut builder =
            Self::new(EngineSettings::from_scenario(scenario)).with_system(RelocationSystem::new(policy));
        if scenario.census.refresh_each_tick {
            builder.push_system(CensusSystem::new(scenario.census.high_density_threshold));
        }
        Ok(builder)
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            settings: self.settings,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    settings: EngineSettings,
}

impl Engine {
    /// Builds the initial city from the engine's random source, so the whole
    /// run derives from a single seed.
    pub fn initialize(&mut self, scenario: &Scenario) -> Result<City> {
        initializer::build_city(scenario, &mut self.rng)
            .with_context(|| format!("Failed to initialize scenario '{}'", scenario.name))
    }

    pub fn tick(&mut self, city: &mut City) -> Result<TickSummary> {
        let current_tick = city.tick();
        city.ledger = TickLedger::default();
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.stream());
            let ctx = SystemContext {
                tick: current_tick,
                search_budget: self.settings.search_budget,
                scenario_name: &self.settings.scenario_name,
            };
            system
                .run(&ctx, city, &mut rng_stream)
                .with_context(|| format!("System '{}' failed at tick {current_tick}", system.name()))?;
        }
        city.advance_time();

        let ledger = city.ledger();
        let summary = TickSummary {
            tick: city.tick(),
            moved: ledger.moved,
            stayed: ledger.stayed,
            rejected: ledger.rejected,
        };
        debug!(
            tick = summary.tick,
            moved = summary.moved,
            stayed = summary.stayed,
            rejected = summary.rejected,
            "tick complete"
        );
        Ok(summary)
    }

    pub fn run(&mut self, city: &mut City, ticks: u64) -> Result<()> {
        self.run_with_hook(city, ticks, |_| {})
    }

    pub fn run_with_hook(
        &mut self,
        city: &mut City,
        ticks: u64,
        mut hook: impl FnMut(&TickSummary),
    ) -> Result<()> {
        for _ in 0..ticks {
            let summary = self.tick(city)?;
            hook(&summary);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: u64,
    pub moved: usize,
    pub stayed: usize,
    pub rejected: usize,
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub search_budget: f64,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;

    /// Random stream the system draws from.
    fn stream(&self) -> &str {
        self.name()
    }

    fn run(&mut self, ctx: &SystemContext, city: &mut City, rng: &mut RngStream<'_>)
        -> Result<()>;
}
