//! Text maps of a [`CitySnapshot`], one glyph per cell.

use crate::{
    city::CitySnapshot,
    land_use::{DensityClass, LandUse},
};

pub fn land_use_map(snapshot: &CitySnapshot) -> String {
    draw(snapshot.cols, &snapshot.land_use, |code| {
        LandUse::from_code(*code).map_or('?', LandUse::glyph)
    })
}

pub fn density_map(snapshot: &CitySnapshot) -> String {
    draw(snapshot.cols, &snapshot.pop_density, |value| {
        DensityClass::from_value(*value).glyph()
    })
}

/// One entry per land use: glyph, name and map color.
pub fn legend() -> String {
    LandUse::ALL
        .iter()
        .map(|land_use| format!("{} {} {}", land_use.glyph(), land_use.name(), land_use.color()))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn density_legend() -> String {
    DensityClass::ALL
        .iter()
        .map(|class| format!("{} {} {}", class.glyph(), class.name(), class.color()))
        .collect::<Vec<_>>()
        .join("  ")
}

fn draw<T>(cols: usize, cells: &[T], glyph: impl Fn(&T) -> char) -> String {
    if cols == 0 {
        return String::new();
    }
    cells
        .chunks(cols)
        .map(|row| row.iter().map(&glyph).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
