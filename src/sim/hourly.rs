//! Hourly profile synthesis.
//!
//! Expands annual per-sector demand into hourly series using the bound
//! temporal shapes, then sums across sectors into one combined profile per
//! zone. The combined profile reconstructs the zone's cross-sector annual
//! total within floating-point tolerance.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::sector::Sector;
use crate::model::zone::ZoneId;
use crate::shapes::BoundShapes;
use crate::sim::annual::AnnualDemand;
use crate::vecutils;

/// Hourly hydrogen demand for one zone and year, in kg per hour.
#[derive(Debug, Clone)]
pub struct HourlyProfile {
    pub zone: ZoneId,
    pub year: u16,
    /// Combined demand across all sectors, one entry per hour of the year.
    pub total: Vec<f64>,
    /// Per-sector series, kept for audit; zero-demand sectors are absent.
    pub by_sector: HashMap<Sector, Vec<f64>>,
    /// Annual total in kg (sum over sectors of annual demand).
    pub annual_total_kg: f64,
    /// Peak hourly demand in kg/h.
    pub peak_kg_per_h: f64,
}

/// Expands annual demand into hourly profiles.
pub struct HourlyProfileSynthesizer<'a> {
    shapes: &'a BoundShapes,
}

impl<'a> HourlyProfileSynthesizer<'a> {
    pub fn new(shapes: &'a BoundShapes) -> Self {
        Self { shapes }
    }

    /// Builds the combined hourly profile for one zone and year.
    pub fn synthesize(
        &self,
        annual: &AnnualDemand,
        zone: &ZoneId,
        year: u16,
    ) -> Result<HourlyProfile> {
        let hours = self.shapes.calendar().hours();
        let mut total = vec![0.0; hours];
        let mut by_sector = HashMap::new();
        let mut annual_total_kg = 0.0;

        for sector in Sector::ALL {
            let demand_kg = annual.sector_value(sector, zone, year);
            if demand_kg == 0.0 {
                continue;
            }
            let shape = self.shapes.resolve(sector, zone)?;
            let series: Vec<f64> = shape.weights().iter().map(|w| demand_kg * w).collect();
            for (acc, v) in total.iter_mut().zip(series.iter()) {
                *acc += v;
            }
            annual_total_kg += demand_kg;
            by_sector.insert(sector, series);
        }

        let peak_kg_per_h = vecutils::max(&total);
        Ok(HourlyProfile {
            zone: zone.clone(),
            year,
            total,
            by_sector,
            annual_total_kg,
            peak_kg_per_h,
        })
    }
}
