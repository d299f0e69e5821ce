/// Land use category of a grid cell. The numeric codes are shared by the
/// simulation and every map that colors cells by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LandUse {
    Undeveloped = 0,
    Residential = 1,
    Commercial = 2,
    /// Cannot be developed: airports, gray areas.
    Gray = 3,
    HighDensity = 4,
    Water = 5,
    Green = 6,
}

impl LandUse {
    pub const ALL: [LandUse; 7] = [
        LandUse::Undeveloped,
        LandUse::Residential,
        LandUse::Commercial,
        LandUse::Gray,
        LandUse::HighDensity,
        LandUse::Water,
        LandUse::Green,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn is_residential(self) -> bool {
        matches!(self, LandUse::Residential)
    }

    pub fn name(self) -> &'static str {
        match self {
            LandUse::Undeveloped => "undeveloped",
            LandUse::Residential => "residential",
            LandUse::Commercial => "commercial",
            LandUse::Gray => "gray",
            LandUse::HighDensity => "high_density",
            LandUse::Water => "water",
            LandUse::Green => "green",
        }
    }

    /// Color used by the land use map (ColorBrewer "Accent", 7 classes).
    pub fn color(self) -> &'static str {
        match self {
            LandUse::Green => "#7fc97f",
            LandUse::Undeveloped => "#beaed4",
            LandUse::Residential => "#fdc086",
            LandUse::Commercial => "#ffff99",
            LandUse::Water => "#386cb0",
            LandUse::Gray => "#f0027f",
            LandUse::HighDensity => "#bf5b17",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            LandUse::Undeveloped => '_',
            LandUse::Residential => 'r',
            LandUse::Commercial => 'c',
            LandUse::Gray => '#',
            LandUse::HighDensity => 'R',
            LandUse::Water => '~',
            LandUse::Green => '"',
        }
    }
}

/// Discrete population density classes rendered by the density map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityClass {
    Empty,
    Populated,
    High,
}

impl DensityClass {
    pub const ALL: [DensityClass; 3] = [
        DensityClass::Empty,
        DensityClass::Populated,
        DensityClass::High,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DensityClass::Empty => "empty",
            DensityClass::Populated => "populated",
            DensityClass::High => "high",
        }
    }

    pub fn classify(count: u32, high_threshold: u32) -> Self {
        if count == 0 {
            DensityClass::Empty
        } else if count >= high_threshold {
            DensityClass::High
        } else {
            DensityClass::Populated
        }
    }

    pub fn from_value(value: f64) -> Self {
        if value >= 5.0 {
            DensityClass::High
        } else if value >= 1.0 {
            DensityClass::Populated
        } else {
            DensityClass::Empty
        }
    }

    pub fn value(self) -> f64 {
        match self {
            DensityClass::Empty => 0.0,
            DensityClass::Populated => 1.0,
            DensityClass::High => 5.0,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            DensityClass::Empty => "#d3d3d3",
            DensityClass::Populated => "#fdc086",
            DensityClass::High => "#cd6302",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            DensityClass::Empty => '.',
            DensityClass::Populated => 'o',
            DensityClass::High => 'O',
        }
    }
}
