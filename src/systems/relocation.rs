use anyhow::Result;
use tracing::warn;

use crate::{
    agent::{AgentId, RelocationPolicy},
    city::{City, TickLedger},
    engine::{System, SystemContext},
    error::CityError,
    grid::Loc,
    rng::{RngStream, RELOCATION_STREAM},
};

/// Gives every agent, in creation order, one chance to move and applies
/// accepted moves to the occupancy index.
///
/// Targets outside the grid are logged and treated as "stay". A policy
/// error aborts the tick after the moves already applied in it are undone.
pub struct RelocationSystem {
    policy: Box<dyn RelocationPolicy>,
}

impl RelocationSystem {
    pub fn new(policy: impl RelocationPolicy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
        }
    }

    fn rollback(city: &mut City, applied: &[(AgentId, Loc, Loc)]) {
        for (id, old, new) in applied.iter().rev() {
            city.apply_move(*id, *new, *old);
        }
    }
}

impl System for RelocationSystem {
    fn name(&self) -> &str {
        "relocation"
    }

    fn stream(&self) -> &str {
        RELOCATION_STREAM
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        city: &mut City,
        rng: &mut RngStream<'_>,
    ) -> Result<()> {
        let mut ledger = TickLedger::default();
        let mut applied = Vec::new();

        for idx in 0..city.agents.len() {
            let agent = &city.agents[idx];
            let (id, old) = (agent.id(), agent.loc());
            let decision = agent.step(self.policy.as_ref(), city.view(), ctx.search_budget, &mut *rng);
            let target = match decision {
                Ok(target) => target,
                Err(err) => {
                    Self::rollback(city, &applied);
                    return Err(err.into());
                }
            };

            match target {
                None => ledger.stayed += 1,
                Some(new) if new == old => ledger.stayed += 1,
                Some(new) if !city.grid.in_bounds(new) => {
                    let err = CityError::OutOfBounds {
                        loc: new,
                        rows: city.grid.rows(),
                        cols: city.grid.cols(),
                    };
                    warn!(
                        tick = ctx.tick,
                        agent = %id,
                        policy = self.policy.name(),
                        error = %err,
                        "rejected relocation"
                    );
                    ledger.rejected += 1;
                }
                Some(new) => {
                    city.apply_move(id, old, new);
                    applied.push((id, old, new));
                    ledger.moved += 1;
                }
            }
        }

        city.ledger = ledger;
        Ok(())
    }
}
