//! Spatial disaggregation onto the study grid.
//!
//! Each zone's demand is split across 5 x 5 km grid cells by fixed allocation
//! weights (derived upstream from VMT and facility locations). Weights are
//! validated eagerly at load time, so disaggregation itself is pure
//! multiply-and-accumulate.

use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{DemandError, Result};
use crate::model::zone::ZoneId;
use crate::sim::hourly::HourlyProfile;

/// Column/row index of one grid cell in the study raster.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCellId {
    pub col: i32,
    pub row: i32,
}

impl GridCellId {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for GridCellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Fixed per-zone allocation weights over grid cells.
///
/// Each zone's weights must be non-negative and sum to 1 within tolerance;
/// `insert_zone` rejects anything else so a run never starts with weights
/// that would leak demand.
#[derive(Debug, Clone, Default)]
pub struct AllocationWeights {
    by_zone: HashMap<ZoneId, Vec<(GridCellId, f64)>>,
    tolerance: f64,
}

impl AllocationWeights {
    pub fn new() -> Self {
        Self {
            by_zone: HashMap::new(),
            tolerance: 1e-6,
        }
    }

    /// Registers weights for one zone, replacing any prior entry.
    pub fn insert_zone(
        &mut self,
        zone: ZoneId,
        mut weights: Vec<(GridCellId, f64)>,
    ) -> Result<()> {
        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        let valid = weights.iter().all(|(_, w)| *w >= 0.0 && w.is_finite());
        if !valid || (sum - 1.0).abs() > self.tolerance {
            return Err(DemandError::WeightsNotNormalized { zone, sum });
        }
        weights.sort_by_key(|(cell, _)| *cell);
        self.by_zone.insert(zone, weights);
        Ok(())
    }

    pub fn covers(&self, zone: &ZoneId) -> bool {
        self.by_zone.contains_key(zone)
    }

    pub fn zone_weights(&self, zone: &ZoneId) -> Option<&[(GridCellId, f64)]> {
        self.by_zone.get(zone).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.by_zone.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_zone.is_empty()
    }
}

/// Annual demand per grid cell, kg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDemand {
    pub year: u16,
    pub cells: HashMap<GridCellId, f64>,
    /// Total kg actually placed on the grid per zone, accumulated from the
    /// individual cell contributions before the cross-zone merge. This is
    /// what the conservation checker reconciles against the annual totals.
    pub zone_placed: HashMap<ZoneId, f64>,
}

impl GridDemand {
    pub fn total_kg(&self) -> f64 {
        self.cells.values().sum()
    }
}

/// Hourly demand per grid cell, kg/h.
#[derive(Debug, Clone)]
pub struct GridHourlyDemand {
    pub year: u16,
    pub cells: HashMap<GridCellId, Vec<f64>>,
    /// Total kg placed per zone, summed over that zone's cell series before
    /// the cross-zone merge.
    pub zone_placed: HashMap<ZoneId, f64>,
}

impl GridHourlyDemand {
    pub fn total_kg(&self) -> f64 {
        self.cells.values().flatten().sum()
    }
}

/// Splits zone demand across grid cells by allocation weight.
pub struct SpatialDisaggregator<'a> {
    weights: &'a AllocationWeights,
}

impl<'a> SpatialDisaggregator<'a> {
    pub fn new(weights: &'a AllocationWeights) -> Self {
        Self { weights }
    }

    /// Looks up a zone's weights, failing only when the unassigned zone
    /// actually carries demand. Zero-demand unassigned zones are a no-op.
    fn weights_for(
        &self,
        zone: &ZoneId,
        demand_kg: f64,
    ) -> Result<Option<&[(GridCellId, f64)]>> {
        match self.weights.zone_weights(zone) {
            Some(w) => Ok(Some(w)),
            None if demand_kg == 0.0 => Ok(None),
            None => Err(DemandError::UnassignedZone {
                zone: zone.clone(),
                demand_kg,
            }),
        }
    }

    /// Distributes annual zone totals onto the grid.
    pub fn disaggregate_annual(
        &self,
        zone_totals: &HashMap<ZoneId, f64>,
        year: u16,
    ) -> Result<GridDemand> {
        let mut cells: HashMap<GridCellId, f64> = HashMap::new();
        let mut zone_placed: HashMap<ZoneId, f64> = HashMap::new();
        for (zone, &demand_kg) in zone_totals {
            let Some(weights) = self.weights_for(zone, demand_kg)? else {
                continue;
            };
            let mut placed = 0.0;
            for &(cell, weight) in weights {
                let contribution = demand_kg * weight;
                *cells.entry(cell).or_insert(0.0) += contribution;
                placed += contribution;
            }
            zone_placed.insert(zone.clone(), placed);
        }
        Ok(GridDemand {
            year,
            cells,
            zone_placed,
        })
    }

    /// Distributes one hour of zone demand onto the grid.
    pub fn disaggregate_hour(
        &self,
        zone_demand_kg: &HashMap<ZoneId, f64>,
    ) -> Result<HashMap<GridCellId, f64>> {
        let mut cells: HashMap<GridCellId, f64> = HashMap::new();
        for (zone, &demand_kg) in zone_demand_kg {
            let Some(weights) = self.weights_for(zone, demand_kg)? else {
                continue;
            };
            for &(cell, weight) in weights {
                *cells.entry(cell).or_insert(0.0) += demand_kg * weight;
            }
        }
        Ok(cells)
    }

    /// Distributes full hourly profiles onto the grid.
    ///
    /// Per-zone expansion runs in parallel; the merge into the shared cell
    /// map stays single-threaded so accumulation order is the only source of
    /// rounding and results are reproducible per zone.
    pub fn disaggregate_profiles(
        &self,
        profiles: &[HourlyProfile],
        year: u16,
    ) -> Result<GridHourlyDemand> {
        let per_zone: Vec<(ZoneId, Vec<(GridCellId, Vec<f64>)>)> = profiles
            .par_iter()
            .map(|profile| {
                let Some(weights) =
                    self.weights_for(&profile.zone, profile.annual_total_kg)?
                else {
                    return Ok((profile.zone.clone(), Vec::new()));
                };
                let expanded = weights
                    .iter()
                    .map(|&(cell, weight)| {
                        let series =
                            profile.total.iter().map(|v| v * weight).collect();
                        (cell, series)
                    })
                    .collect();
                Ok((profile.zone.clone(), expanded))
            })
            .collect::<Result<_>>()?;

        let hours = profiles.first().map(|p| p.total.len()).unwrap_or(0);
        let mut cells: HashMap<GridCellId, Vec<f64>> = HashMap::new();
        let mut zone_placed: HashMap<ZoneId, f64> = HashMap::new();
        for (zone, zone_cells) in per_zone {
            let mut placed = 0.0;
            for (cell, series) in zone_cells {
                placed += series.iter().sum::<f64>();
                let acc = cells.entry(cell).or_insert_with(|| vec![0.0; hours]);
                for (a, v) in acc.iter_mut().zip(series.iter()) {
                    *a += v;
                }
            }
            zone_placed.insert(zone, placed);
        }
        Ok(GridHourlyDemand {
            year,
            cells,
            zone_placed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cell_weights() -> AllocationWeights {
        let mut weights = AllocationWeights::new();
        weights
            .insert_zone(
                ZoneId::from("AZ_APS"),
                vec![
                    (GridCellId::new(10, 20), 0.6),
                    (GridCellId::new(11, 20), 0.4),
                ],
            )
            .unwrap();
        weights
    }

    #[test]
    fn test_unnormalized_weights_rejected() {
        let mut weights = AllocationWeights::new();
        let err = weights
            .insert_zone(
                ZoneId::from("AZ_APS"),
                vec![
                    (GridCellId::new(0, 0), 0.6),
                    (GridCellId::new(1, 0), 0.5),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, DemandError::WeightsNotNormalized { .. }));

        let err = weights
            .insert_zone(
                ZoneId::from("AZ_APS"),
                vec![
                    (GridCellId::new(0, 0), 1.5),
                    (GridCellId::new(1, 0), -0.5),
                ],
            )
            .unwrap_err();
        assert!(
            matches!(err, DemandError::WeightsNotNormalized { .. }),
            "negative weights rejected even when the sum is 1"
        );
    }

    #[test]
    fn test_annual_split_follows_weights() {
        let weights = two_cell_weights();
        let disagg = SpatialDisaggregator::new(&weights);
        let mut totals = HashMap::new();
        totals.insert(ZoneId::from("AZ_APS"), 500.0);
        let grid = disagg.disaggregate_annual(&totals, 2030).unwrap();
        assert_eq!(grid.cells[&GridCellId::new(10, 20)], 300.0);
        assert_eq!(grid.cells[&GridCellId::new(11, 20)], 200.0);
        assert!((grid.total_kg() - 500.0).abs() < 1e-9);
        assert!(
            (grid.zone_placed[&ZoneId::from("AZ_APS")] - 500.0).abs() < 1e-9,
            "placed total tracks the actual cell contributions"
        );
    }

    #[test]
    fn test_unassigned_zone_with_demand_fails() {
        let weights = two_cell_weights();
        let disagg = SpatialDisaggregator::new(&weights);
        let mut totals = HashMap::new();
        totals.insert(ZoneId::from("NV_S"), 42.0);
        let err = disagg.disaggregate_annual(&totals, 2030).unwrap_err();
        assert!(matches!(err, DemandError::UnassignedZone { .. }));
    }

    #[test]
    fn test_unassigned_zone_without_demand_is_skipped() {
        let weights = two_cell_weights();
        let disagg = SpatialDisaggregator::new(&weights);
        let mut totals = HashMap::new();
        totals.insert(ZoneId::from("NV_S"), 0.0);
        let grid = disagg.disaggregate_annual(&totals, 2030).unwrap();
        assert!(grid.cells.is_empty());
    }

    #[test]
    fn test_hourly_grid_conserves_profile_totals() {
        let weights = two_cell_weights();
        let disagg = SpatialDisaggregator::new(&weights);
        let profile = HourlyProfile {
            zone: ZoneId::from("AZ_APS"),
            year: 2030,
            total: vec![2.0; 24],
            by_sector: HashMap::new(),
            annual_total_kg: 48.0,
            peak_kg_per_h: 2.0,
        };
        let grid = disagg.disaggregate_profiles(&[profile], 2030).unwrap();
        assert_eq!(grid.cells.len(), 2);
        assert!((grid.total_kg() - 48.0).abs() < 1e-9);
        assert!((grid.zone_placed[&ZoneId::from("AZ_APS")] - 48.0).abs() < 1e-9);
        let series = &grid.cells[&GridCellId::new(10, 20)];
        assert!((series[0] - 1.2).abs() < 1e-12, "0.6 of 2 kg/h lands here");
    }
}
