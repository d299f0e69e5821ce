use std::fmt;

use rand::{seq::SliceRandom, Rng, RngCore};

use crate::{
    error::CityError,
    grid::{CityGrid, Loc},
    occupancy::OccupancyIndex,
};

/// Index of an agent in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(u32);

impl AgentId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only state an agent consults when deciding whether to move.
#[derive(Clone, Copy)]
pub struct CityView<'a> {
    pub grid: &'a CityGrid,
    pub occupancy: &'a OccupancyIndex,
}

/// A resident. Its only state is where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    id: AgentId,
    loc: Loc,
}

impl Agent {
    pub(crate) fn new(id: AgentId, loc: Loc) -> Self {
        Self { id, loc }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn loc(&self) -> Loc {
        self.loc
    }

    pub(crate) fn relocate(&mut self, loc: Loc) {
        self.loc = loc;
    }

    /// Asks `policy` where this agent wants to live next. `None` means stay.
    pub fn step(
        &self,
        policy: &dyn RelocationPolicy,
        view: CityView<'_>,
        budget: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Option<Loc>, CityError> {
        policy.decide(self, view, budget, rng)
    }
}

/// Relocation rule. Implementations hold no mutable state, so the same
/// agent, view, budget and RNG state always produce the same answer.
pub trait RelocationPolicy {
    fn name(&self) -> &str;

    fn decide(
        &self,
        agent: &Agent,
        view: CityView<'_>,
        budget: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Option<Loc>, CityError>;
}

/// Never moves anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stay;

impl RelocationPolicy for Stay {
    fn name(&self) -> &str {
        "stay"
    }

    fn decide(
        &self,
        _agent: &Agent,
        _view: CityView<'_>,
        _budget: f64,
        _rng: &mut dyn RngCore,
    ) -> Result<Option<Loc>, CityError> {
        Ok(None)
    }
}

/// With probability `move_probability` an agent looks for another
/// residential cell it can afford (current rent <= budget) that is not at
/// capacity, and picks one uniformly at random.
#[derive(Debug, Clone, Copy)]
pub struct ResidentialSearch {
    move_probability: f64,
    max_occupants: Option<usize>,
}

impl ResidentialSearch {
    pub fn new(move_probability: f64, max_occupants: Option<usize>) -> Result<Self, CityError> {
        if !(0.0..=1.0).contains(&move_probability) {
            return Err(CityError::InvalidConfig(format!(
                "move probability {move_probability} is outside [0, 1]"
            )));
        }
        Ok(Self {
            move_probability,
            max_occupants,
        })
    }

    fn affordable_with_room(&self, loc: Loc, view: CityView<'_>, budget: f64) -> bool {
        let affordable = view
            .grid
            .rent_current
            .get(loc)
            .map_or(false, |rent| rent <= budget);
        let has_room = self
            .max_occupants
            .map_or(true, |cap| view.occupancy.count_at(loc) < cap);
        affordable && has_room
    }
}

impl RelocationPolicy for ResidentialSearch {
    fn name(&self) -> &str {
        "residential_search"
    }

    fn decide(
        &self,
        agent: &Agent,
        view: CityView<'_>,
        budget: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Option<Loc>, CityError> {
        if !rng.gen_bool(self.move_probability) {
            return Ok(None);
        }
        // TODO: narrow candidates to a neighbourhood of the current cell once
        // the neighbourhood radius is part of the scenario.
        let candidates: Vec<Loc> = view
            .grid
            .land_use()
            .iter()
            .filter(|(loc, land_use)| {
                land_use.is_residential()
                    && *loc != agent.loc()
                    && self.affordable_with_room(*loc, view, budget)
            })
            .map(|(loc, _)| loc)
            .collect();
        Ok(candidates.choose(rng).copied())
    }
}
