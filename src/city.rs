use crate::{
    agent::{Agent, AgentId, CityView},
    grid::{CityGrid, Loc},
    occupancy::OccupancyIndex,
};

/// Outcome counters for the tick in progress.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickLedger {
    pub moved: usize,
    pub stayed: usize,
    pub rejected: usize,
}

/// What map renderers read: dimensions plus row-major land use codes and
/// population counts.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySnapshot {
    pub tick: u64,
    pub rows: usize,
    pub cols: usize,
    pub agents: usize,
    pub land_use: Vec<u8>,
    pub pop_count: Vec<u32>,
    pub pop_density: Vec<f64>,
}

/// The running simulation: grid state, occupancy index and residents.
pub struct City {
    tick: u64,
    pub(crate) grid: CityGrid,
    pub(crate) occupancy: OccupancyIndex,
    pub(crate) agents: Vec<Agent>,
    pub(crate) ledger: TickLedger,
}

impl City {
    pub(crate) fn new(grid: CityGrid, occupancy: OccupancyIndex, agents: Vec<Agent>) -> Self {
        Self {
            tick: 0,
            grid,
            occupancy,
            agents,
            ledger: TickLedger::default(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_time(&mut self) {
        self.tick += 1;
    }

    pub fn grid(&self) -> &CityGrid {
        &self.grid
    }

    /// Derived attributes (population, density, satisfaction) are not kept
    /// in sync automatically; see [`City::refresh_population`].
    pub fn grid_mut(&mut self) -> &mut CityGrid {
        &mut self.grid
    }

    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.raw() as usize)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn ledger(&self) -> TickLedger {
        self.ledger
    }

    pub fn view(&self) -> CityView<'_> {
        CityView {
            grid: &self.grid,
            occupancy: &self.occupancy,
        }
    }

    pub fn refresh_population(&mut self, high_threshold: u32) {
        self.grid.refresh_population(&self.occupancy, high_threshold);
    }

    /// Checks that every agent is indexed at its own location and nowhere
    /// else. Returns the first offending agent.
    pub fn find_index_mismatch(&self) -> Option<AgentId> {
        let missing = self
            .agents
            .iter()
            .find(|agent| !self.occupancy.occupants_at(agent.loc()).contains(&agent.id()))
            .map(Agent::id);
        missing.or_else(|| {
            self.occupancy.iter().find_map(|(loc, occupants)| {
                occupants
                    .iter()
                    .copied()
                    .find(|id| self.agent(*id).map(Agent::loc) != Some(loc))
            })
        })
    }

    pub(crate) fn apply_move(&mut self, id: AgentId, old: Loc, new: Loc) {
        self.occupancy.move_agent(id, old, new);
        if let Some(agent) = self.agents.get_mut(id.raw() as usize) {
            agent.relocate(new);
        }
    }

    pub fn snapshot(&self) -> CitySnapshot {
        CitySnapshot {
            tick: self.tick,
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            agents: self.agents.len(),
            land_use: self
                .grid
                .land_use()
                .as_slice()
                .iter()
                .map(|land_use| land_use.code())
                .collect(),
            pop_count: self.grid.pop_count.as_slice().to_vec(),
            pop_density: self.grid.pop_density.as_slice().to_vec(),
        }
    }
}
