use thiserror::Error;

use crate::{agent::AgentId, grid::Loc};

#[derive(Debug, Error)]
pub enum CityError {
    #[error("land use proportions must sum to 1.0 (+/- {tolerance}), got {sum:.4}")]
    InvalidProportions { sum: f64, tolerance: f64 },

    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no cells satisfy the {predicate} placement predicate")]
    EmptyEligibleSet { predicate: &'static str },

    #[error("location {loc} is outside the {rows}x{cols} grid")]
    OutOfBounds { loc: Loc, rows: usize, cols: usize },

    #[error("agent {agent} failed to decide: {reason}")]
    Decision { agent: AgentId, reason: String },
}

impl CityError {
    /// True for errors raised while validating construction parameters.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CityError::InvalidProportions { .. }
                | CityError::InvalidDimensions { .. }
                | CityError::InvalidConfig(_)
        )
    }
}
