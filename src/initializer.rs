use rand::Rng;
use tracing::info;

use crate::{
    agent::{Agent, AgentId},
    city::City,
    error::CityError,
    grid::{init_land_use, CityGrid},
    land_use::LandUse,
    occupancy::OccupancyIndex,
    rng::{RngManager, LAND_USE_STREAM, PLACEMENT_STREAM},
    scenario::Scenario,
};

/// Builds the initial city: draws land use for every cell, then places each
/// agent on a uniformly chosen residential cell (with replacement).
pub fn build_city(scenario: &Scenario, rng: &mut RngManager) -> Result<City, CityError> {
    scenario.validate()?;
    let (rows, cols) = (scenario.rows, scenario.cols());

    let land_use = init_land_use(
        &LandUse::ALL,
        &scenario.land_use.weights(),
        rows,
        cols,
        &mut rng.stream(LAND_USE_STREAM),
    )?;
    let mut grid = CityGrid::new(land_use);

    let (agents, occupancy) = place_agents(&grid, scenario.agents, rng)?;
    grid.refresh_population(&occupancy, scenario.census.high_density_threshold);

    info!(
        scenario = %scenario.name,
        seed = rng.seed(),
        rows,
        cols,
        agents = agents.len(),
        "city initialized"
    );
    Ok(City::new(grid, occupancy, agents))
}

fn place_agents(
    grid: &CityGrid,
    count: usize,
    rng: &mut RngManager,
) -> Result<(Vec<Agent>, OccupancyIndex), CityError> {
    let mut agents = Vec::with_capacity(count);
    let mut occupancy = OccupancyIndex::new();
    if count == 0 {
        return Ok((agents, occupancy));
    }

    let residential = grid.residential_cells();
    if residential.is_empty() {
        return Err(CityError::EmptyEligibleSet {
            predicate: LandUse::Residential.name(),
        });
    }

    let mut stream = rng.stream(PLACEMENT_STREAM);
    for raw in 0..count {
        let raw = u32::try_from(raw)
            .map_err(|_| CityError::InvalidConfig(format!("agent count {count} is too large")))?;
        let id = AgentId::new(raw);
        let loc = residential[stream.gen_range(0..residential.len())];
        agents.push(Agent::new(id, loc));
        occupancy.insert(id, loc);
    }
    Ok((agents, occupancy))
}
