mod census;
mod relocation;

pub use census::CensusSystem;
pub use relocation::RelocationSystem;
