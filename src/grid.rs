//! Per-cell state of the city grid.
//!
//! Every attribute lives in its own [`Layer`], a row-major array with a fixed
//! element type. Layers never recompute one another: derived values such as
//! population density are only refreshed by an explicit call to
//! [`CityGrid::refresh_population`].

use std::fmt;

use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};

use crate::{
    error::CityError,
    land_use::{DensityClass, LandUse},
    occupancy::OccupancyIndex,
};

/// Allowed deviation of the land use proportions from 1.0.
pub const PROPORTION_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Loc {
    pub row: usize,
    pub col: usize,
}

impl Loc {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Copy> Layer<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Result<Self, CityError> {
        let len = cell_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![value; len],
        })
    }

    /// A layer with the same shape as `other`.
    fn shaped_like<U>(other: &Layer<U>, value: T) -> Self {
        Self {
            rows: other.rows,
            cols: other.cols,
            cells: vec![value; other.cells.len()],
        }
    }

    fn from_cells(rows: usize, cols: usize, cells: Vec<T>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, loc: Loc) -> bool {
        loc.row < self.rows && loc.col < self.cols
    }

    fn index(&self, loc: Loc) -> Option<usize> {
        self.in_bounds(loc).then(|| loc.row * self.cols + loc.col)
    }

    pub fn get(&self, loc: Loc) -> Option<T> {
        self.index(loc).map(|idx| self.cells[idx])
    }

    pub fn set(&mut self, loc: Loc, value: T) -> Result<(), CityError> {
        let idx = self.index(loc).ok_or(CityError::OutOfBounds {
            loc,
            rows: self.rows,
            cols: self.cols,
        })?;
        self.cells[idx] = value;
        Ok(())
    }

    pub fn fill(&mut self, value: T) {
        self.cells.iter_mut().for_each(|cell| *cell = value);
    }

    /// Cells in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (Loc, T)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, value)| (Loc::new(idx / cols, idx % cols), *value))
    }
}

/// Number of cells in a `rows` x `cols` grid. Zero-sized or overflowing
/// dimensions are rejected.
pub fn cell_count(rows: usize, cols: usize) -> Result<usize, CityError> {
    if rows == 0 || cols == 0 {
        return Err(CityError::InvalidDimensions { rows, cols });
    }
    rows.checked_mul(cols)
        .ok_or(CityError::InvalidDimensions { rows, cols })
}

/// Rejects negative or non-finite weights and weights whose sum is not
/// within [`PROPORTION_TOLERANCE`] of 1.0.
pub fn check_proportions(proportions: &[f64]) -> Result<(), CityError> {
    if let Some(bad) = proportions.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(CityError::InvalidConfig(format!(
            "land use proportion {bad} is not a finite non-negative number"
        )));
    }
    let sum: f64 = proportions.iter().sum();
    let within_tolerance = (sum - 1.0).abs() < PROPORTION_TOLERANCE;
    if !within_tolerance {
        return Err(CityError::InvalidProportions {
            sum,
            tolerance: PROPORTION_TOLERANCE,
        });
    }
    Ok(())
}

/// Draws a category for every cell independently from the categorical
/// distribution `proportions` over `categories`.
pub fn init_land_use<R: Rng + ?Sized>(
    categories: &[LandUse],
    proportions: &[f64],
    rows: usize,
    cols: usize,
    rng: &mut R,
) -> Result<Layer<LandUse>, CityError> {
    let len = cell_count(rows, cols)?;
    if categories.is_empty() || categories.len() != proportions.len() {
        return Err(CityError::InvalidConfig(format!(
            "{} land use categories but {} proportions",
            categories.len(),
            proportions.len()
        )));
    }
    check_proportions(proportions)?;

    let dist = WeightedIndex::new(proportions)
        .map_err(|err| CityError::InvalidConfig(format!("land use weights: {err}")))?;
    let cells = (0..len)
        .map(|_| categories[dist.sample(rng)])
        .collect();
    Ok(Layer::from_cells(rows, cols, cells))
}

/// The grid state store: land use plus every per-cell attribute.
#[derive(Debug, Clone)]
pub struct CityGrid {
    rows: usize,
    cols: usize,
    land_use: Layer<LandUse>,
    pub amenities: Layer<f64>,
    /// Number of agents on the cell.
    pub pop_count: Layer<u32>,
    /// Density class value (see [`DensityClass::value`]).
    pub pop_density: Layer<f64>,
    pub occupancy_start: Layer<f64>,
    pub percent_full: Layer<f64>,
    pub rent_start: Layer<f64>,
    pub rent_current: Layer<f64>,
    pub creative_space: Layer<bool>,
    pub creative_value: Layer<f64>,
    pub creative_density: Layer<f64>,
    pub num_satisfied: Layer<u32>,
}

impl CityGrid {
    pub fn new(land_use: Layer<LandUse>) -> Self {
        let (rows, cols) = (land_use.rows(), land_use.cols());
        Self {
            rows,
            cols,
            amenities: Layer::shaped_like(&land_use, 0.0),
            pop_count: Layer::shaped_like(&land_use, 0),
            pop_density: Layer::shaped_like(&land_use, 0.0),
            occupancy_start: Layer::shaped_like(&land_use, 0.0),
            percent_full: Layer::shaped_like(&land_use, 0.0),
            rent_start: Layer::shaped_like(&land_use, 1.0),
            rent_current: Layer::shaped_like(&land_use, 1.0),
            creative_space: Layer::shaped_like(&land_use, false),
            creative_value: Layer::shaped_like(&land_use, 0.0),
            creative_density: Layer::shaped_like(&land_use, 0.0),
            num_satisfied: Layer::shaped_like(&land_use, 0),
            land_use,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.land_use.cells.len()
    }

    pub fn in_bounds(&self, loc: Loc) -> bool {
        self.land_use.in_bounds(loc)
    }

    pub fn land_use(&self) -> &Layer<LandUse> {
        &self.land_use
    }

    pub fn land_use_at(&self, loc: Loc) -> Option<LandUse> {
        self.land_use.get(loc)
    }

    pub fn set_land_use(&mut self, loc: Loc, land_use: LandUse) -> Result<(), CityError> {
        self.land_use.set(loc, land_use)
    }

    /// Locations whose land use satisfies `predicate`, in row-major order.
    pub fn cells_where(&self, predicate: impl Fn(LandUse) -> bool) -> Vec<Loc> {
        self.land_use
            .iter()
            .filter(|(_, land_use)| predicate(*land_use))
            .map(|(loc, _)| loc)
            .collect()
    }

    pub fn residential_cells(&self) -> Vec<Loc> {
        self.cells_where(LandUse::is_residential)
    }

    /// Rewrites population counts from the occupancy index and reclassifies
    /// density. Cells without occupants are reset to zero.
    pub fn refresh_population(&mut self, occupancy: &OccupancyIndex, high_threshold: u32) {
        self.pop_count.fill(0);
        self.pop_density.fill(DensityClass::Empty.value());
        for (loc, occupants) in occupancy.iter() {
            let Some(idx) = self.pop_count.index(loc) else {
                continue;
            };
            let count = u32::try_from(occupants.len()).unwrap_or(u32::MAX);
            self.pop_count.cells[idx] = count;
            self.pop_density.cells[idx] = DensityClass::classify(count, high_threshold).value();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const REFERENCE: [f64; 7] = [0.0, 0.6, 0.1, 0.1, 0.0, 0.1, 0.1];

    #[test]
    fn land_use_frequencies_track_proportions() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let layer = init_land_use(&LandUse::ALL, &REFERENCE, 200, 200, &mut rng).unwrap();
        let total = layer.as_slice().len() as f64;
        for (land_use, expected) in LandUse::ALL.iter().zip(REFERENCE) {
            let observed =
                layer.as_slice().iter().filter(|cell| *cell == land_use).count() as f64 / total;
            assert!(
                (observed - expected).abs() < 0.015,
                "{:?}: observed {observed:.4}, expected {expected}",
                land_use
            );
        }
    }

    #[test]
    fn proportions_off_by_more_than_tolerance_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let props = [0.0, 0.6, 0.1, 0.1, 0.0, 0.1, 0.2];
        let err = init_land_use(&LandUse::ALL, &props, 10, 10, &mut rng).unwrap_err();
        assert!(matches!(err, CityError::InvalidProportions { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn proportions_within_tolerance_are_accepted() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let props = [0.0, 0.6005, 0.1, 0.1, 0.0, 0.1, 0.1];
        assert!(init_land_use(&LandUse::ALL, &props, 4, 4, &mut rng).is_ok());
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = init_land_use(&LandUse::ALL, &REFERENCE, 0, 5, &mut rng).unwrap_err();
        assert!(matches!(err, CityError::InvalidDimensions { rows: 0, cols: 5 }));
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let huge = 1usize << (usize::BITS / 2 + 1);
        let err = init_land_use(&LandUse::ALL, &REFERENCE, huge, huge, &mut rng).unwrap_err();
        assert!(matches!(err, CityError::InvalidDimensions { .. }));
        assert!(Layer::filled(huge, huge, 0u8).is_err());
        assert_eq!(cell_count(3, 4).unwrap(), 12);
    }

    #[test]
    fn nan_and_negative_weights_are_rejected() {
        let nan = [0.0, f64::NAN, 0.0, 0.0, 0.0, 1.0, 0.0];
        assert!(matches!(
            check_proportions(&nan),
            Err(CityError::InvalidConfig(_))
        ));
        let negative = [0.0, 1.2, 0.0, 0.0, 0.0, -0.2, 0.0];
        assert!(matches!(
            check_proportions(&negative),
            Err(CityError::InvalidConfig(_))
        ));
        assert!(check_proportions(&REFERENCE).is_ok());
    }

    #[test]
    fn mismatched_category_count_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = init_land_use(&LandUse::ALL[..3], &REFERENCE, 5, 5, &mut rng).unwrap_err();
        assert!(matches!(err, CityError::InvalidConfig(_)));
    }

    #[test]
    fn layers_are_addressed_row_major() {
        let mut layer = Layer::filled(2, 3, 0u32).unwrap();
        layer.set(Loc::new(1, 2), 7).unwrap();
        assert_eq!(layer.as_slice()[5], 7);
        assert_eq!(layer.get(Loc::new(1, 2)), Some(7));
        assert_eq!(layer.get(Loc::new(2, 0)), None);
        assert!(matches!(
            layer.set(Loc::new(0, 3), 1),
            Err(CityError::OutOfBounds { rows: 2, cols: 3, .. })
        ));
    }

    #[test]
    fn attribute_writes_do_not_touch_other_layers() {
        let grid_land = Layer::filled(3, 3, LandUse::Residential).unwrap();
        let mut grid = CityGrid::new(grid_land);
        grid.pop_count.set(Loc::new(1, 1), 9).unwrap();
        assert_eq!(grid.pop_density.get(Loc::new(1, 1)), Some(0.0));
        assert_eq!(grid.rent_current.get(Loc::new(1, 1)), Some(1.0));
        assert_eq!(grid.creative_space.get(Loc::new(1, 1)), Some(false));
    }

    #[test]
    fn refresh_population_counts_and_classifies() {
        let mut grid = CityGrid::new(Layer::filled(2, 2, LandUse::Residential).unwrap());
        let mut occupancy = OccupancyIndex::new();
        for raw in 0..6 {
            occupancy.insert(crate::agent::AgentId::new(raw), Loc::new(0, 0));
        }
        occupancy.insert(crate::agent::AgentId::new(6), Loc::new(1, 1));
        grid.pop_count.set(Loc::new(0, 1), 3).unwrap();

        grid.refresh_population(&occupancy, 5);

        assert_eq!(grid.pop_count.as_slice(), &[6, 0, 0, 1]);
        assert_eq!(grid.pop_density.as_slice(), &[5.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn cells_where_lists_matches_in_row_major_order() {
        let mut grid = CityGrid::new(Layer::filled(2, 2, LandUse::Water).unwrap());
        grid.set_land_use(Loc::new(1, 0), LandUse::Residential).unwrap();
        grid.set_land_use(Loc::new(0, 1), LandUse::Residential).unwrap();
        assert_eq!(
            grid.residential_cells(),
            vec![Loc::new(0, 1), Loc::new(1, 0)]
        );
    }
}
