//! Annual demand calculation.
//!
//! Applies decarbonization fractions to baseline fuel/energy use and converts
//! the displaced energy into kilograms of hydrogen per (sector, zone, year).

use std::collections::HashMap;

use crate::error::{DemandError, Result};
use crate::model::baseline::BaselineProjection;
use crate::model::conversion::ConversionTable;
use crate::model::scenario::Scenario;
use crate::model::sector::Sector;
use crate::model::zone::{ZoneId, ZoneSet};

/// Derived annual hydrogen demand in kg, keyed by (sector, zone, year).
///
/// Never mutated in place: regenerated whenever scenario or baseline inputs
/// change. Entries that compute to zero are not stored.
#[derive(Debug, Clone, Default)]
pub struct AnnualDemand {
    values: HashMap<(Sector, ZoneId, u16), f64>,
}

impl AnnualDemand {
    /// Demand for one (sector, zone, year), 0.0 when absent.
    pub fn sector_value(&self, sector: Sector, zone: &ZoneId, year: u16) -> f64 {
        self.values
            .get(&(sector, zone.clone(), year))
            .copied()
            .unwrap_or(0.0)
    }

    /// Cross-sector total for one zone and year.
    pub fn zone_total(&self, zone: &ZoneId, year: u16) -> f64 {
        Sector::ALL
            .iter()
            .map(|&s| self.sector_value(s, zone, year))
            .sum()
    }

    /// Total over all zones for one year.
    pub fn year_total(&self, year: u16) -> f64 {
        self.values
            .iter()
            .filter(|((_, _, y), _)| *y == year)
            .map(|(_, v)| v)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Sector, ZoneId, u16), &f64)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Computes annual hydrogen-equivalent demand from immutable inputs.
pub struct AnnualDemandCalculator<'a> {
    scenario: &'a Scenario,
    baseline: &'a BaselineProjection,
    conversions: &'a ConversionTable,
}

impl<'a> AnnualDemandCalculator<'a> {
    pub fn new(
        scenario: &'a Scenario,
        baseline: &'a BaselineProjection,
        conversions: &'a ConversionTable,
    ) -> Self {
        Self {
            scenario,
            baseline,
            conversions,
        }
    }

    /// Hydrogen demand in kg for one (sector, zone, year).
    ///
    /// `demand = baseline * fraction * conversion_factor`. For `ExistingH2`
    /// the baseline is already hydrogen-denominated and no factor applies:
    /// the fraction selects the share of existing SMR production displaced
    /// into the model. A sector the scenario never declares contributes zero
    /// and does not require a baseline.
    pub fn demand_for(&self, sector: Sector, zone: &ZoneId, year: u16) -> Result<f64> {
        let fraction = self.scenario.fraction_at(sector, zone, year)?;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(DemandError::OutOfRangeFraction {
                sector,
                zone: zone.clone(),
                year,
                fraction,
            });
        }
        if fraction == 0.0 {
            return Ok(0.0);
        }
        let baseline = self.baseline.require(sector, zone, year)?;
        let factor = self.conversions.factor_for(sector, year);
        Ok(baseline * fraction * factor)
    }

    /// Computes demand for every sector over the given zones and years.
    pub fn compute(&self, zones: &ZoneSet, years: &[u16]) -> Result<AnnualDemand> {
        let mut out = AnnualDemand::default();
        for &year in years {
            for sector in Sector::ALL {
                for zone in zones.iter() {
                    let demand = self.demand_for(sector, zone, year)?;
                    if demand > 0.0 {
                        out.values.insert((sector, zone.clone(), year), demand);
                    }
                }
            }
        }
        Ok(out)
    }
}
