use anyhow::Result;

use crate::{
    city::City,
    engine::{System, SystemContext},
    rng::RngStream,
};

/// Recomputes population counts and density classes from the occupancy
/// index. Only runs when registered; relocation never does this itself.
pub struct CensusSystem {
    high_density_threshold: u32,
}

impl CensusSystem {
    pub fn new(high_density_threshold: u32) -> Self {
        Self {
            high_density_threshold,
        }
    }
}

impl System for CensusSystem {
    fn name(&self) -> &str {
        "census"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        city: &mut City,
        _rng: &mut RngStream<'_>,
    ) -> Result<()> {
        city.refresh_population(self.high_density_threshold);
        Ok(())
    }
}
