use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    agent::ResidentialSearch,
    error::CityError,
    grid::{cell_count, check_proportions},
};

fn default_agents() -> usize {
    400
}

fn default_search_budget() -> f64 {
    50_000.0
}

fn default_move_probability() -> f64 {
    0.1
}

fn default_high_density_threshold() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seed: u64,
    pub rows: usize,
    #[serde(default)]
    pub cols: Option<usize>,
    #[serde(default = "default_agents")]
    pub agents: usize,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_search_budget")]
    pub search_budget: f64,
    #[serde(default)]
    pub land_use: LandUseProportions,
    #[serde(default)]
    pub relocation: RelocationConfig,
    #[serde(default)]
    pub census: CensusConfig,
}

/// Share of cells drawn for each land use category. Categories left out of
/// a scenario file get no cells; a missing table means the reference mix.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LandUseProportions {
    #[serde(default)]
    pub undeveloped: f64,
    #[serde(default)]
    pub residential: f64,
    #[serde(default)]
    pub commercial: f64,
    #[serde(default)]
    pub gray: f64,
    #[serde(default)]
    pub high_density: f64,
    #[serde(default)]
    pub water: f64,
    #[serde(default)]
    pub green: f64,
}

impl LandUseProportions {
    /// Weights in [`crate::land_use::LandUse::ALL`] order.
    pub fn weights(&self) -> [f64; 7] {
        [
            self.undeveloped,
            self.residential,
            self.commercial,
            self.gray,
            self.high_density,
            self.water,
            self.green,
        ]
    }
}

impl Default for LandUseProportions {
    fn default() -> Self {
        Self {
            undeveloped: 0.0,
            residential: 0.6,
            commercial: 0.1,
            gray: 0.1,
            high_density: 0.0,
            water: 0.1,
            green: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelocationConfig {
    #[serde(default = "default_move_probability")]
    pub move_probability: f64,
    #[serde(default)]
    pub max_occupants: Option<usize>,
}

impl Default for RelocationConfig {
    fn default() -> Self {
        Self {
            move_probability: default_move_probability(),
            max_occupants: None,
        }
    }
}

impl RelocationConfig {
    pub fn policy(&self) -> Result<ResidentialSearch, CityError> {
        ResidentialSearch::new(self.move_probability, self.max_occupants)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CensusConfig {
    #[serde(default = "default_high_density_threshold")]
    pub high_density_threshold: u32,
    #[serde(default)]
    pub refresh_each_tick: bool,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            high_density_threshold: default_high_density_threshold(),
            refresh_each_tick: false,
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// The 10x10 city with 400 residents the model was first run with.
    pub fn reference() -> Self {
        Self {
            name: "reference_city".into(),
            description: None,
            seed: 7,
            rows: 10,
            cols: None,
            agents: default_agents(),
            ticks: None,
            search_budget: default_search_budget(),
            land_use: LandUseProportions::default(),
            relocation: RelocationConfig::default(),
            census: CensusConfig::default(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols.unwrap_or(self.rows)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(50)
    }

    pub fn validate(&self) -> Result<(), CityError> {
        cell_count(self.rows, self.cols())?;
        check_proportions(&self.land_use.weights())?;
        if !self.search_budget.is_finite() {
            return Err(CityError::InvalidConfig(
                "search budget must be finite".into(),
            ));
        }
        if u32::try_from(self.agents).is_err() {
            return Err(CityError::InvalidConfig(format!(
                "agent count {} is too large",
                self.agents
            )));
        }
        self.relocation.policy()?;
        Ok(())
    }
}
