//! Baseline energy/fuel-use projections.
//!
//! Externally supplied, pre-decarbonization fuel or energy use per
//! (sector, zone, year). Units are declared by the sector's energy carrier
//! and never inferred from the data.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DemandError, Result};
use crate::model::projections;
use crate::model::sector::{EnergyCarrier, Sector};
use crate::model::zone::ZoneId;

/// Unit a baseline quantity is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaselineUnit {
    /// Gallons of liquid fuel.
    Gallons,
    /// Million Btu of combustion fuel.
    MmBtu,
    /// Kilograms of hydrogen.
    KilogramsH2,
}

impl BaselineUnit {
    pub fn for_carrier(carrier: EnergyCarrier) -> Self {
        match carrier {
            EnergyCarrier::Gasoline | EnergyCarrier::Diesel => BaselineUnit::Gallons,
            EnergyCarrier::ProcessFuel => BaselineUnit::MmBtu,
            EnergyCarrier::Hydrogen => BaselineUnit::KilogramsH2,
        }
    }
}

impl fmt::Display for BaselineUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BaselineUnit::Gallons => "gal",
            BaselineUnit::MmBtu => "mmBtu",
            BaselineUnit::KilogramsH2 => "kg H2",
        };
        f.write_str(s)
    }
}

/// Read-only store of baseline projections.
///
/// Invariant: every stored quantity is non-negative, checked at insertion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineProjection {
    values: HashMap<(Sector, ZoneId, u16), f64>,
}

impl BaselineProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit the given sector's baseline is expressed in.
    pub fn unit_for(sector: Sector) -> BaselineUnit {
        BaselineUnit::for_carrier(sector.carrier())
    }

    pub fn insert(&mut self, sector: Sector, zone: ZoneId, year: u16, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(DemandError::NegativeBaseline {
                sector,
                zone,
                year,
                value,
            });
        }
        self.values.insert((sector, zone, year), value);
        Ok(())
    }

    /// Inserts baselines for every given year by projecting a reference-year
    /// (2023) quantity.
    ///
    /// Transport fuel volumes follow the AEO vehicle-miles and fuel-economy
    /// trajectories; other sectors are held at the reference value, matching
    /// how the study treats industrial fuel use.
    pub fn insert_projected_from_reference(
        &mut self,
        sector: Sector,
        zone: ZoneId,
        reference: f64,
        years: &[u16],
    ) -> Result<()> {
        for &year in years {
            let value = match sector {
                Sector::LdTransport => projections::project_ld_fuel_use(reference, year)?,
                Sector::HdTransport => projections::project_hd_fuel_use(reference, year)?,
                _ => reference,
            };
            self.insert(sector, zone.clone(), year, value)?;
        }
        Ok(())
    }

    pub fn get(&self, sector: Sector, zone: &ZoneId, year: u16) -> Option<f64> {
        self.values.get(&(sector, zone.clone(), year)).copied()
    }

    /// The baseline for a required (sector, zone, year).
    pub fn require(&self, sector: Sector, zone: &ZoneId, year: u16) -> Result<f64> {
        self.get(sector, zone, year)
            .ok_or_else(|| DemandError::MissingBaseline {
                sector,
                zone: zone.clone(),
                year,
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_require() {
        let zone = ZoneId::from("AZ_APS");
        let mut b = BaselineProjection::new();
        b.insert(Sector::LdTransport, zone.clone(), 2030, 1.0e9)
            .unwrap();
        assert_eq!(b.require(Sector::LdTransport, &zone, 2030).unwrap(), 1.0e9);

        let err = b.require(Sector::LdTransport, &zone, 2040).unwrap_err();
        assert!(matches!(err, DemandError::MissingBaseline { year: 2040, .. }));
    }

    #[test]
    fn test_negative_baseline_rejected() {
        let mut b = BaselineProjection::new();
        let err = b
            .insert(Sector::Cement, ZoneId::from("NV_S"), 2030, -1.0)
            .unwrap_err();
        assert!(matches!(err, DemandError::NegativeBaseline { .. }));
    }

    #[test]
    fn test_projected_insertion_follows_trajectories() {
        let zone = ZoneId::from("AZ_APS");
        let mut b = BaselineProjection::new();
        b.insert_projected_from_reference(
            Sector::HdTransport,
            zone.clone(),
            1000.0,
            &[2023, 2050],
        )
        .unwrap();
        assert_eq!(
            b.get(Sector::HdTransport, &zone, 2023).unwrap(),
            1000.0,
            "reference year is carried through unchanged"
        );
        let projected = b.get(Sector::HdTransport, &zone, 2050).unwrap();
        assert!(
            projected < 1000.0,
            "HD fuel economy outpaces miles traveled, got {projected}"
        );

        b.insert_projected_from_reference(Sector::Cement, zone.clone(), 5.0e6, &[2023, 2050])
            .unwrap();
        assert_eq!(
            b.get(Sector::Cement, &zone, 2050).unwrap(),
            5.0e6,
            "industrial baselines are held at the reference value"
        );

        let err = b
            .insert_projected_from_reference(Sector::LdTransport, zone, 1000.0, &[2060])
            .unwrap_err();
        assert!(matches!(err, DemandError::YearOutOfRange { year: 2060, .. }));
    }

    #[test]
    fn test_units_follow_carrier() {
        assert_eq!(
            BaselineProjection::unit_for(Sector::LdTransport),
            BaselineUnit::Gallons
        );
        assert_eq!(
            BaselineProjection::unit_for(Sector::IronSteel),
            BaselineUnit::MmBtu
        );
        assert_eq!(
            BaselineProjection::unit_for(Sector::ExistingH2),
            BaselineUnit::KilogramsH2
        );
    }
}
