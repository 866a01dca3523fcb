//! Immutable model inputs: zones, sectors, scenarios, baselines, conversions.

pub mod baseline;
pub mod conversion;
pub mod projections;
pub mod scenario;
pub mod sector;
pub mod zone;
