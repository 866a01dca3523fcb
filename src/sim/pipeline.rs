//! Run orchestration.
//!
//! Wires the stages together for a set of model years: annual calculation,
//! hourly expansion, spatial disaggregation, and conservation checks. Inputs
//! are validated eagerly before any demand is computed, so a run fails fast
//! on bad data rather than partway through a long year loop.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calendar::{LeapPolicy, ModelYear};
use crate::error::{DemandError, Result};
use crate::model::baseline::BaselineProjection;
use crate::model::conversion::ConversionTable;
use crate::model::scenario::Scenario;
use crate::model::zone::ZoneSet;
use crate::shapes::{BoundShapes, ShapeLibrary};
use crate::sim::annual::{AnnualDemand, AnnualDemandCalculator};
use crate::sim::conservation::{ConservationChecker, ConservationReport, DEFAULT_TOLERANCE};
use crate::sim::hourly::{HourlyProfile, HourlyProfileSynthesizer};
use crate::sim::spatial::{AllocationWeights, GridDemand, GridHourlyDemand, SpatialDisaggregator};

/// Run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Model years to compute, e.g. `[2030, 2040, 2050]`.
    pub years: Vec<u16>,
    pub leap_policy: LeapPolicy,
    /// Relative tolerance for conservation checks.
    pub conservation_tolerance: f64,
    /// Also produce hourly gridded demand (large: cells x hours per year).
    pub grid_hourly: bool,
    /// Wall-clock budget; a run that exceeds it stops with an error rather
    /// than returning partial results.
    #[serde(skip)]
    pub compute_budget: Option<Duration>,
}

impl RunConfig {
    pub fn new(years: Vec<u16>) -> Self {
        Self {
            years,
            leap_policy: LeapPolicy::default(),
            conservation_tolerance: DEFAULT_TOLERANCE,
            grid_hourly: false,
            compute_budget: None,
        }
    }
}

/// Results for one model year.
#[derive(Debug, Clone)]
pub struct YearResult {
    pub year: u16,
    pub calendar: ModelYear,
    /// One combined hourly profile per zone, sorted by zone.
    pub profiles: Vec<HourlyProfile>,
    pub grid: GridDemand,
    pub grid_hourly: Option<GridHourlyDemand>,
    pub conservation: Vec<ConservationReport>,
}

impl YearResult {
    pub fn total_kg(&self) -> f64 {
        self.profiles.iter().map(|p| p.annual_total_kg).sum()
    }
}

/// Results of a full run, one entry per requested year in request order.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub years: Vec<YearResult>,
}

impl RunResult {
    pub fn year(&self, year: u16) -> Option<&YearResult> {
        self.years.iter().find(|y| y.year == year)
    }
}

/// The assembled demand model: all inputs needed for a run.
#[derive(Debug, Clone)]
pub struct DemandModel {
    pub zones: ZoneSet,
    pub scenario: Scenario,
    pub baseline: BaselineProjection,
    pub conversions: ConversionTable,
    pub shapes: ShapeLibrary,
    pub weights: AllocationWeights,
}

impl DemandModel {
    /// Runs the full pipeline for every configured year.
    pub fn run(&self, config: &RunConfig) -> Result<RunResult> {
        let started = Instant::now();
        let total_units = config.years.len();
        info!(
            "starting run: {} zones, {} years",
            self.zones.len(),
            total_units
        );

        // Bind every year's shapes before any demand is computed: calendar
        // and shape errors (lengths, normalization) surface here, ahead of
        // the annual calculation.
        let mut bound_years = Vec::with_capacity(total_units);
        for &year in &config.years {
            let calendar = ModelYear::new(year)?;
            let bound = self.shapes.materialize(&calendar, config.leap_policy)?;
            bound_years.push((calendar, bound));
        }

        let calculator =
            AnnualDemandCalculator::new(&self.scenario, &self.baseline, &self.conversions);
        let annual = calculator.compute(&self.zones, &config.years)?;
        debug!("annual calculation done: {} non-zero entries", annual.len());

        let checker = ConservationChecker::new(config.conservation_tolerance);
        let disaggregator = SpatialDisaggregator::new(&self.weights);

        let mut years = Vec::with_capacity(total_units);
        for (completed, (calendar, bound)) in bound_years.into_iter().enumerate() {
            if let Some(budget) = config.compute_budget {
                if started.elapsed() > budget {
                    return Err(DemandError::BudgetExhausted {
                        completed,
                        total: total_units,
                    });
                }
            }
            years.push(self.run_year(calendar, &bound, &annual, &checker, &disaggregator, config)?);
        }

        info!("run finished in {:.2?}", started.elapsed());
        Ok(RunResult { years })
    }

    fn run_year(
        &self,
        calendar: ModelYear,
        bound: &BoundShapes,
        annual: &AnnualDemand,
        checker: &ConservationChecker,
        disaggregator: &SpatialDisaggregator,
        config: &RunConfig,
    ) -> Result<YearResult> {
        let year = calendar.year();
        let synthesizer = HourlyProfileSynthesizer::new(bound);

        let profiles: Vec<HourlyProfile> = self
            .zones
            .as_slice()
            .par_iter()
            .map(|zone| synthesizer.synthesize(annual, zone, year))
            .collect::<Result<_>>()?;

        let hourly_report = checker.check_profiles(annual, &profiles, year)?;

        let zone_totals: HashMap<_, _> = self
            .zones
            .iter()
            .map(|zone| (zone.clone(), annual.zone_total(zone, year)))
            .collect();
        let grid = disaggregator.disaggregate_annual(&zone_totals, year)?;
        let grid_report = checker.check_grid(&zone_totals, &grid)?;
        let mut conservation = vec![hourly_report, grid_report];

        let grid_hourly = if config.grid_hourly {
            let hourly_grid = disaggregator.disaggregate_profiles(&profiles, year)?;
            conservation.push(checker.check_grid_hourly(&zone_totals, &hourly_grid)?);
            Some(hourly_grid)
        } else {
            None
        };

        debug!(
            "year {year}: {:.1} kg across {} grid cells",
            grid.total_kg(),
            grid.cells.len()
        );
        Ok(YearResult {
            year,
            calendar,
            profiles,
            grid,
            grid_hourly,
            conservation,
        })
    }
}
