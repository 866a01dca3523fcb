//! Error taxonomy for the demand engine.
//!
//! Every variant carries the offending (sector, zone, year) or (zone, cell)
//! key so that failures can be traced back to a single input record. Nothing
//! is silently corrected: input-validation errors are raised eagerly at load
//! time, and a run either fully succeeds or fails with one of these.

use thiserror::Error;

use crate::model::sector::Sector;
use crate::model::zone::ZoneId;

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, DemandError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DemandError {
    #[error("decarbonization fraction {fraction} for {sector}/{zone}/{year} is outside [0, 1]")]
    OutOfRangeFraction {
        sector: Sector,
        zone: ZoneId,
        year: u16,
        fraction: f64,
    },

    #[error("no baseline projection for {sector}/{zone}/{year}")]
    MissingBaseline {
        sector: Sector,
        zone: ZoneId,
        year: u16,
    },

    #[error(
        "year {year} for {sector}/{zone} is outside the declared scenario range \
         {first}..={last} and extrapolation is disallowed"
    )]
    ExtrapolationNotAllowed {
        sector: Sector,
        zone: ZoneId,
        year: u16,
        first: u16,
        last: u16,
    },

    #[error("temporal shape for {sector} (zone {zone:?}) sums to {sum}, expected 1.0")]
    UnnormalizedShape {
        sector: Sector,
        zone: Option<ZoneId>,
        sum: f64,
    },

    #[error("temporal shape for {sector} has {found} entries, expected {expected}")]
    ShapeLengthMismatch {
        sector: Sector,
        expected: usize,
        found: usize,
    },

    #[error("no temporal shape registered for {sector}")]
    MissingShape { sector: Sector },

    #[error("allocation weights for zone {zone} sum to {sum}, expected 1.0")]
    WeightsNotNormalized { zone: ZoneId, sum: f64 },

    #[error(
        "zone {zone} carries {demand_kg} kg of demand but has no allocation weights; \
         its demand would be dropped from the grid"
    )]
    UnassignedZone { zone: ZoneId, demand_kg: f64 },

    #[error(
        "conservation violated at {stage} for zone {zone}: relative discrepancy \
         {discrepancy:e} exceeds tolerance {tolerance:e}"
    )]
    ConservationViolation {
        stage: &'static str,
        zone: ZoneId,
        discrepancy: f64,
        tolerance: f64,
    },

    #[error("compute budget exhausted after {completed} of {total} work units")]
    BudgetExhausted { completed: usize, total: usize },

    #[error("baseline for {sector}/{zone}/{year} is negative ({value})")]
    NegativeBaseline {
        sector: Sector,
        zone: ZoneId,
        year: u16,
        value: f64,
    },

    #[error("zone {zone} declared more than once")]
    DuplicateZone { zone: ZoneId },

    #[error("year {year} is outside the supported model range {first}..={last}")]
    YearOutOfRange { year: u16, first: u16, last: u16 },
}
