//! Mass-conservation checks.
//!
//! Annual zone totals are authoritative. After every derivation stage the
//! derived values are summed back and compared against the authoritative
//! totals; a discrepancy beyond tolerance fails the whole run rather than
//! shipping a silently lossy output.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{DemandError, Result};
use crate::model::zone::ZoneId;
use crate::sim::annual::AnnualDemand;
use crate::sim::hourly::HourlyProfile;
use crate::sim::spatial::{GridDemand, GridHourlyDemand};
use crate::vecutils;

/// Default relative tolerance for conservation checks.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// One zone's reconciliation record.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneConservation {
    pub zone: ZoneId,
    /// Annual total from the authoritative calculation, kg.
    pub authoritative_kg: f64,
    /// Total recomputed from the derived (hourly or gridded) values, kg.
    pub recomputed_kg: f64,
    pub rel_discrepancy: f64,
}

/// Reconciliation of one derivation stage against annual totals.
#[derive(Debug, Clone, Serialize)]
pub struct ConservationReport {
    pub stage: &'static str,
    pub year: u16,
    pub tolerance: f64,
    pub max_rel_discrepancy: f64,
    pub worst_zone: Option<ZoneId>,
    pub zones: Vec<ZoneConservation>,
}

impl ConservationReport {
    fn build(stage: &'static str, year: u16, tolerance: f64, zones: Vec<ZoneConservation>) -> Self {
        let worst = zones
            .iter()
            .max_by(|a, b| a.rel_discrepancy.total_cmp(&b.rel_discrepancy));
        let (max_rel_discrepancy, worst_zone) = match worst {
            Some(z) => (z.rel_discrepancy, Some(z.zone.clone())),
            None => (0.0, None),
        };
        Self {
            stage,
            year,
            tolerance,
            max_rel_discrepancy,
            worst_zone,
            zones,
        }
    }

    pub fn passed(&self) -> bool {
        self.max_rel_discrepancy <= self.tolerance
    }

    /// Turns the report into an error for the worst zone when it failed.
    pub fn check(self) -> Result<Self> {
        if self.passed() {
            return Ok(self);
        }
        let zone = self
            .worst_zone
            .clone()
            .unwrap_or_else(|| ZoneId::new("<none>"));
        Err(DemandError::ConservationViolation {
            stage: self.stage,
            zone,
            discrepancy: self.max_rel_discrepancy,
            tolerance: self.tolerance,
        })
    }
}

/// Verifies that derived demand sums back to the annual totals.
#[derive(Debug, Clone)]
pub struct ConservationChecker {
    tolerance: f64,
}

impl Default for ConservationChecker {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl ConservationChecker {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Reconciles hourly profiles against annual zone totals.
    pub fn check_profiles(
        &self,
        annual: &AnnualDemand,
        profiles: &[HourlyProfile],
        year: u16,
    ) -> Result<ConservationReport> {
        let zones = profiles
            .iter()
            .map(|profile| {
                let authoritative_kg = annual.zone_total(&profile.zone, year);
                let recomputed_kg: f64 = profile.total.iter().sum();
                ZoneConservation {
                    zone: profile.zone.clone(),
                    authoritative_kg,
                    recomputed_kg,
                    rel_discrepancy: vecutils::rel_discrepancy(recomputed_kg, authoritative_kg),
                }
            })
            .collect();
        ConservationReport::build("hourly", year, self.tolerance, zones).check()
    }

    /// Reconciles the gridded year against annual zone totals.
    ///
    /// The per-zone side recomputes from the grid's own record of what was
    /// placed per zone (accumulated cell by cell before the cross-zone
    /// merge), and a global total closes the loop against the merged cells.
    pub fn check_grid(
        &self,
        zone_totals: &HashMap<ZoneId, f64>,
        grid: &GridDemand,
    ) -> Result<ConservationReport> {
        let zones = Self::reconcile_placed(zone_totals, &grid.zone_placed);
        let report = ConservationReport::build("grid", grid.year, self.tolerance, zones).check()?;
        self.check_global("grid-total", zone_totals, grid.total_kg())?;
        Ok(report)
    }

    /// Reconciles the hourly gridded year against annual zone totals.
    pub fn check_grid_hourly(
        &self,
        zone_totals: &HashMap<ZoneId, f64>,
        grid: &GridHourlyDemand,
    ) -> Result<ConservationReport> {
        let zones = Self::reconcile_placed(zone_totals, &grid.zone_placed);
        let report =
            ConservationReport::build("grid-hourly", grid.year, self.tolerance, zones).check()?;
        self.check_global("grid-hourly-total", zone_totals, grid.total_kg())?;
        Ok(report)
    }

    fn reconcile_placed(
        zone_totals: &HashMap<ZoneId, f64>,
        zone_placed: &HashMap<ZoneId, f64>,
    ) -> Vec<ZoneConservation> {
        zone_totals
            .iter()
            .map(|(zone, &authoritative_kg)| {
                let recomputed_kg = zone_placed.get(zone).copied().unwrap_or(0.0);
                ZoneConservation {
                    zone: zone.clone(),
                    authoritative_kg,
                    recomputed_kg,
                    rel_discrepancy: vecutils::rel_discrepancy(recomputed_kg, authoritative_kg),
                }
            })
            .collect()
    }

    fn check_global(
        &self,
        stage: &'static str,
        zone_totals: &HashMap<ZoneId, f64>,
        grid_total: f64,
    ) -> Result<()> {
        let zones_total: f64 = zone_totals.values().sum();
        let global = vecutils::rel_discrepancy(grid_total, zones_total);
        if global > self.tolerance {
            return Err(DemandError::ConservationViolation {
                stage,
                zone: ZoneId::new("<all>"),
                discrepancy: global,
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spatial::GridCellId;
    use std::collections::HashMap;

    fn profile(zone: &str, hours: usize, per_hour: f64) -> HourlyProfile {
        HourlyProfile {
            zone: ZoneId::from(zone),
            year: 2030,
            total: vec![per_hour; hours],
            by_sector: HashMap::new(),
            annual_total_kg: per_hour * hours as f64,
            peak_kg_per_h: per_hour,
        }
    }

    #[test]
    fn test_conserved_profiles_pass() {
        let annual = AnnualDemand::default();
        let checker = ConservationChecker::default();
        // Empty annual means both sides are zero for an all-zero profile.
        let report = checker
            .check_profiles(&annual, &[profile("AZ_APS", 24, 0.0)], 2030)
            .unwrap();
        assert!(report.passed());
        assert_eq!(report.stage, "hourly");
        assert_eq!(report.zones.len(), 1);
    }

    #[test]
    fn test_lossy_profile_fails() {
        // Annual says zero, profile claims 24 kg.
        let annual = AnnualDemand::default();
        let checker = ConservationChecker::default();
        let err = checker
            .check_profiles(&annual, &[profile("AZ_APS", 24, 1.0)], 2030)
            .unwrap_err();
        match err {
            DemandError::ConservationViolation { stage, zone, .. } => {
                assert_eq!(stage, "hourly");
                assert_eq!(zone.as_str(), "AZ_APS");
            }
            other => panic!("expected conservation violation, got {other:?}"),
        }
    }

    #[test]
    fn test_grid_check_passes_for_consistent_split() {
        let mut totals = HashMap::new();
        totals.insert(ZoneId::from("AZ_APS"), 500.0);
        let mut cells = HashMap::new();
        cells.insert(GridCellId::new(0, 0), 300.0);
        cells.insert(GridCellId::new(1, 0), 200.0);
        let mut zone_placed = HashMap::new();
        zone_placed.insert(ZoneId::from("AZ_APS"), 500.0);
        let grid = GridDemand {
            year: 2030,
            cells,
            zone_placed,
        };
        let report = ConservationChecker::default()
            .check_grid(&totals, &grid)
            .unwrap();
        assert!(report.passed());
        assert_eq!(report.stage, "grid");
    }

    #[test]
    fn test_misallocated_zone_demand_fails_per_zone_check() {
        // 100 kg of zone A's demand landed on zone B's cells. The merged
        // cell total still matches, so only the per-zone reconciliation
        // against placed amounts can catch it.
        let mut totals = HashMap::new();
        totals.insert(ZoneId::from("AZ_APS"), 500.0);
        totals.insert(ZoneId::from("NV_S"), 500.0);
        let mut cells = HashMap::new();
        cells.insert(GridCellId::new(0, 0), 400.0);
        cells.insert(GridCellId::new(9, 9), 600.0);
        let mut zone_placed = HashMap::new();
        zone_placed.insert(ZoneId::from("AZ_APS"), 400.0);
        zone_placed.insert(ZoneId::from("NV_S"), 600.0);
        let grid = GridDemand {
            year: 2030,
            cells,
            zone_placed,
        };
        let err = ConservationChecker::default()
            .check_grid(&totals, &grid)
            .unwrap_err();
        match err {
            DemandError::ConservationViolation { stage, zone, discrepancy, .. } => {
                assert_eq!(stage, "grid");
                assert_eq!(zone.as_str(), "AZ_APS", "worst zone is the shorted one");
                assert!((discrepancy - 0.2).abs() < 1e-12);
            }
            other => panic!("expected conservation violation, got {other:?}"),
        }
    }

    #[test]
    fn test_grid_total_mismatch_fails() {
        let mut totals = HashMap::new();
        totals.insert(ZoneId::from("AZ_APS"), 500.0);
        let mut cells = HashMap::new();
        cells.insert(GridCellId::new(0, 0), 450.0);
        let mut zone_placed = HashMap::new();
        zone_placed.insert(ZoneId::from("AZ_APS"), 500.0);
        let grid = GridDemand {
            year: 2030,
            cells,
            zone_placed,
        };
        let err = ConservationChecker::default()
            .check_grid(&totals, &grid)
            .unwrap_err();
        assert!(matches!(
            err,
            DemandError::ConservationViolation { stage: "grid-total", .. }
        ));
    }

    #[test]
    fn test_hourly_grid_check() {
        let mut totals = HashMap::new();
        totals.insert(ZoneId::from("AZ_APS"), 48.0);
        let mut cells = HashMap::new();
        cells.insert(GridCellId::new(0, 0), vec![2.0; 24]);
        let mut zone_placed = HashMap::new();
        zone_placed.insert(ZoneId::from("AZ_APS"), 48.0);
        let grid = GridHourlyDemand {
            year: 2030,
            cells,
            zone_placed,
        };
        let report = ConservationChecker::default()
            .check_grid_hourly(&totals, &grid)
            .unwrap();
        assert!(report.passed());
        assert_eq!(report.stage, "grid-hourly");

        let mut short = HashMap::new();
        short.insert(ZoneId::from("AZ_APS"), 40.0);
        let lossy = GridHourlyDemand {
            year: 2030,
            cells: grid.cells.clone(),
            zone_placed: short,
        };
        let err = ConservationChecker::default()
            .check_grid_hourly(&totals, &lossy)
            .unwrap_err();
        assert!(matches!(
            err,
            DemandError::ConservationViolation { stage: "grid-hourly", .. }
        ));
    }
}
