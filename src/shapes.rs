//! Temporal shape library.
//!
//! A temporal shape distributes an annual total across the hours of a model
//! year; its weights are non-negative and sum to 1.0. Shapes are declared as
//! calendar-independent specs (weekly curves, weekly x monthly combinations,
//! or explicit hourly weights) and materialized against a concrete model
//! year, which fixes the hour count and the weekday alignment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::calendar::{LeapPolicy, ModelYear, HOURS_PER_DAY, HOURS_PER_WEEK};
use crate::error::{DemandError, Result};
use crate::model::sector::Sector;
use crate::model::zone::ZoneId;
use crate::vecutils;

/// Relative tolerance for shape normalization checks.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// A normalized hourly weight sequence covering one model year.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalShape {
    weights: Vec<f64>,
}

impl TemporalShape {
    /// Uniform shape: every hour carries 1/n of the annual total.
    pub fn flat(calendar: &ModelYear) -> Self {
        let n = calendar.hours();
        Self {
            weights: vec![1.0 / n as f64; n],
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Calendar-independent description of a temporal shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeSpec {
    /// Uniform over the year (e.g. SMR baseload).
    Flat,
    /// 168 hourly weights, Monday 00:00 first, repeated with real-calendar
    /// weekday alignment.
    Weekly(Vec<f64>),
    /// A 168-hour weekly curve modulated by 12 monthly factors.
    WeeklyMonthly { weekly: Vec<f64>, monthly: Vec<f64> },
    /// Explicit hourly weights; length must match the target year
    /// (8760, or 8784 for leap years unless the leap policy derives one).
    Explicit(Vec<f64>),
}

impl ShapeSpec {
    fn materialize(
        &self,
        sector: Sector,
        zone: Option<&ZoneId>,
        calendar: &ModelYear,
        leap_policy: LeapPolicy,
    ) -> Result<TemporalShape> {
        let hours = calendar.hours();
        match self {
            ShapeSpec::Flat => Ok(TemporalShape::flat(calendar)),
            ShapeSpec::Weekly(weekly) => {
                check_len(sector, HOURS_PER_WEEK, weekly.len())?;
                check_non_negative(sector, zone, weekly)?;
                let mut weights: Vec<f64> = (0..hours)
                    .map(|h| weekly[calendar.hour_of_week(h)])
                    .collect();
                vecutils::normalize_in_place(&mut weights);
                Ok(TemporalShape { weights })
            }
            ShapeSpec::WeeklyMonthly { weekly, monthly } => {
                check_len(sector, HOURS_PER_WEEK, weekly.len())?;
                check_len(sector, 12, monthly.len())?;
                check_non_negative(sector, zone, weekly)?;
                check_non_negative(sector, zone, monthly)?;
                let mut weights: Vec<f64> = (0..hours)
                    .map(|h| weekly[calendar.hour_of_week(h)] * monthly[calendar.month_of_hour(h)])
                    .collect();
                vecutils::normalize_in_place(&mut weights);
                Ok(TemporalShape { weights })
            }
            ShapeSpec::Explicit(values) => {
                let mut weights = values.clone();
                if weights.len() + HOURS_PER_DAY == hours
                    && leap_policy == LeapPolicy::RepeatLastDay
                {
                    // Tile Dec 31 from the final common-year day, then renormalize.
                    let tail: Vec<f64> = weights[weights.len() - HOURS_PER_DAY..].to_vec();
                    weights.extend(tail);
                    vecutils::normalize_in_place(&mut weights);
                }
                check_len(sector, hours, weights.len())?;
                check_non_negative(sector, zone, &weights)?;
                let sum: f64 = weights.iter().sum();
                if (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
                    return Err(DemandError::UnnormalizedShape {
                        sector,
                        zone: zone.cloned(),
                        sum,
                    });
                }
                Ok(TemporalShape { weights })
            }
        }
    }
}

fn check_len(sector: Sector, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(DemandError::ShapeLengthMismatch {
            sector,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_non_negative(sector: Sector, zone: Option<&ZoneId>, values: &[f64]) -> Result<()> {
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        let sum = values.iter().sum();
        return Err(DemandError::UnnormalizedShape {
            sector,
            zone: zone.cloned(),
            sum,
        });
    }
    Ok(())
}

/// Declared shapes per sector, with optional per-zone overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeLibrary {
    by_sector: HashMap<Sector, ShapeSpec>,
    overrides: HashMap<(Sector, ZoneId), ShapeSpec>,
}

impl ShapeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default curves the study was run with: a vehicle fueling-station
    /// diurnal curve with seasonal gasoline/diesel modulation for transport,
    /// an industrial process-heat shift curve for industry, and flat SMR
    /// baseload for existing hydrogen.
    pub fn with_wecc_defaults() -> Self {
        let mut lib = Self::new();
        lib.set(
            Sector::LdTransport,
            ShapeSpec::WeeklyMonthly {
                weekly: weekly_from_day_curves(&FUELING_WEEKDAY, &FUELING_WEEKEND),
                monthly: GASOLINE_MONTHLY.to_vec(),
            },
        );
        lib.set(
            Sector::HdTransport,
            ShapeSpec::WeeklyMonthly {
                weekly: weekly_from_day_curves(&FUELING_WEEKDAY, &FUELING_WEEKEND),
                monthly: DIESEL_MONTHLY.to_vec(),
            },
        );
        for sector in Sector::ALL {
            if sector.is_industry() {
                lib.set(
                    sector,
                    ShapeSpec::Weekly(weekly_from_day_curves(
                        &PROCESS_HEAT_WEEKDAY,
                        &PROCESS_HEAT_WEEKEND,
                    )),
                );
            }
        }
        lib.set(Sector::ExistingH2, ShapeSpec::Flat);
        lib
    }

    pub fn set(&mut self, sector: Sector, spec: ShapeSpec) {
        self.by_sector.insert(sector, spec);
    }

    pub fn set_for_zone(&mut self, sector: Sector, zone: ZoneId, spec: ShapeSpec) {
        self.overrides.insert((sector, zone), spec);
    }

    /// Validates and binds every declared spec to a concrete model year.
    pub fn materialize(
        &self,
        calendar: &ModelYear,
        leap_policy: LeapPolicy,
    ) -> Result<BoundShapes> {
        let mut by_sector = HashMap::new();
        for (&sector, spec) in &self.by_sector {
            by_sector.insert(sector, spec.materialize(sector, None, calendar, leap_policy)?);
        }
        let mut overrides = HashMap::new();
        for ((sector, zone), spec) in &self.overrides {
            let shape = spec.materialize(*sector, Some(zone), calendar, leap_policy)?;
            overrides.insert((*sector, zone.clone()), shape);
        }
        Ok(BoundShapes {
            calendar: calendar.clone(),
            by_sector,
            overrides,
        })
    }
}

/// Shapes validated against one model year.
#[derive(Debug, Clone)]
pub struct BoundShapes {
    calendar: ModelYear,
    by_sector: HashMap<Sector, TemporalShape>,
    overrides: HashMap<(Sector, ZoneId), TemporalShape>,
}

impl BoundShapes {
    pub fn calendar(&self) -> &ModelYear {
        &self.calendar
    }

    /// The shape for (sector, zone): zone override first, then the sector shape.
    pub fn resolve(&self, sector: Sector, zone: &ZoneId) -> Result<&TemporalShape> {
        if let Some(shape) = self.overrides.get(&(sector, zone.clone())) {
            return Ok(shape);
        }
        self.by_sector
            .get(&sector)
            .ok_or(DemandError::MissingShape { sector })
    }
}

/// Builds a 168-hour weekly curve (Monday first) from weekday/weekend day curves.
pub fn weekly_from_day_curves(weekday: &[f64; 24], weekend: &[f64; 24]) -> Vec<f64> {
    let mut weekly = Vec::with_capacity(HOURS_PER_WEEK);
    for day in 0..7 {
        let curve = if day < 5 { weekday } else { weekend };
        weekly.extend_from_slice(curve);
    }
    weekly
}

/// Station fueling curve for a weekday: overnight trough, commute peaks.
const FUELING_WEEKDAY: [f64; 24] = [
    0.20, 0.15, 0.12, 0.12, 0.18, 0.35, 0.60, 0.85, 0.90, 0.85, 0.80, 0.85, 0.90, 0.90, 0.95,
    1.00, 1.05, 1.10, 1.00, 0.85, 0.70, 0.55, 0.40, 0.30,
];

/// Station fueling curve for a weekend day: single midday hump.
const FUELING_WEEKEND: [f64; 24] = [
    0.25, 0.18, 0.14, 0.12, 0.15, 0.25, 0.40, 0.60, 0.80, 0.95, 1.05, 1.10, 1.10, 1.05, 1.00,
    0.95, 0.90, 0.85, 0.80, 0.70, 0.60, 0.50, 0.40, 0.30,
];

/// Industrial process-heat curve for a weekday: continuous with day shift bias.
const PROCESS_HEAT_WEEKDAY: [f64; 24] = [
    0.92, 0.90, 0.90, 0.90, 0.92, 0.95, 1.00, 1.05, 1.08, 1.08, 1.08, 1.07, 1.06, 1.07, 1.08,
    1.08, 1.06, 1.03, 1.00, 0.98, 0.96, 0.95, 0.94, 0.93,
];

/// Industrial process-heat curve for a weekend day: reduced shift coverage.
const PROCESS_HEAT_WEEKEND: [f64; 24] = [
    0.82, 0.80, 0.80, 0.80, 0.81, 0.83, 0.86, 0.88, 0.90, 0.90, 0.90, 0.89, 0.89, 0.89, 0.90,
    0.90, 0.89, 0.87, 0.85, 0.84, 0.83, 0.83, 0.82, 0.82,
];

/// Monthly gasoline demand factors (summer driving peak).
const GASOLINE_MONTHLY: [f64; 12] = [
    0.92, 0.88, 0.98, 1.00, 1.04, 1.06, 1.08, 1.09, 1.02, 1.00, 0.96, 0.97,
];

/// Monthly diesel demand factors (freight peaks in spring and fall).
const DIESEL_MONTHLY: [f64; 12] = [
    0.97, 0.95, 1.03, 1.00, 1.02, 1.03, 1.00, 1.02, 1.01, 1.05, 1.00, 0.92,
];
