//! Hydrogen-equivalence conversion factors.
//!
//! Maps each sector's baseline unit to kilograms of hydrogen required to
//! displace it. Treated as a supplied lookup service; `wecc_defaults()` ships
//! the constants the study was calibrated with.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::projections;
use crate::model::sector::Sector;

/// 1 kg H2 carries the energy of 1 gallon of gasoline.
pub const GASOLINE_GAL_PER_KG_H2: f64 = 1.0;
/// 1 kg H2 carries the energy of 0.9 gallons of diesel.
pub const DIESEL_GAL_PER_KG_H2: f64 = 0.9;
/// Lower heating value of hydrogen, Btu per lb.
pub const BTU_PER_LB_H2: f64 = 61_013.0;
pub const LB_TO_KG: f64 = 0.453_592;

/// kg of H2 per mmBtu of displaced combustion fuel.
pub const KG_H2_PER_MMBTU: f64 = 1.0e6 / BTU_PER_LB_H2 * LB_TO_KG;

/// Per-sector conversion factors: kg H2 per baseline unit.
///
/// `ExistingH2` baselines are already hydrogen-denominated, so no factor is
/// ever applied there. When `adjust_transport_efficiency` is set, transport
/// factors are divided by the year's FCEV-to-ICEV relative efficiency — a
/// fuel-cell drivetrain travels further per unit of energy than the engine it
/// replaces, so it needs less than energy-parity hydrogen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionTable {
    factors: HashMap<Sector, f64>,
    adjust_transport_efficiency: bool,
}

impl ConversionTable {
    /// Factors used by the WECC study.
    pub fn wecc_defaults() -> Self {
        let mut factors = HashMap::new();
        for sector in Sector::ALL {
            let factor = match sector {
                Sector::LdTransport => 1.0 / GASOLINE_GAL_PER_KG_H2,
                Sector::HdTransport => 1.0 / DIESEL_GAL_PER_KG_H2,
                Sector::ExistingH2 => 1.0,
                _ => KG_H2_PER_MMBTU,
            };
            factors.insert(sector, factor);
        }
        Self {
            factors,
            adjust_transport_efficiency: true,
        }
    }

    /// Energy-parity factors with no drivetrain-efficiency adjustment.
    ///
    /// Useful for controlled tests where conversion should be exactly the
    /// declared constant.
    pub fn energy_parity() -> Self {
        let mut table = Self::wecc_defaults();
        table.adjust_transport_efficiency = false;
        table
    }

    /// Overrides the factor for one sector (kg H2 per baseline unit).
    pub fn with_factor(mut self, sector: Sector, factor: f64) -> Self {
        self.factors.insert(sector, factor);
        self
    }

    /// Conversion factor for a sector in a given year.
    pub fn factor_for(&self, sector: Sector, year: u16) -> f64 {
        if sector == Sector::ExistingH2 {
            return 1.0;
        }
        let base = self.factors.get(&sector).copied().unwrap_or(1.0);
        if self.adjust_transport_efficiency && sector.is_transport() {
            let rel_efficiency = match sector {
                Sector::LdTransport => projections::ld_fcev_to_icev_efficiency(year),
                _ => projections::hd_fcev_to_icev_efficiency(year),
            };
            base / rel_efficiency
        } else {
            base
        }
    }
}
