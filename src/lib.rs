pub mod agent;
pub mod city;
pub mod engine;
pub mod error;
pub mod grid;
pub mod initializer;
pub mod land_use;
pub mod occupancy;
pub mod render;
pub mod rng;
pub mod scenario;
pub mod systems;

pub use city::{City, CitySnapshot};
pub use engine::{Engine, EngineBuilder, EngineSettings, TickSummary};
pub use error::CityError;
pub use scenario::{Scenario, ScenarioLoader};
