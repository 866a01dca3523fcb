//! Decarbonization scenarios.
//!
//! A scenario declares, per (sector, zone) or sector-wide, the fraction of the
//! baseline fuel/energy use displaced by hydrogen in each declared year.
//! Fractions for undeclared years are resolved by interpolation between the
//! two nearest declared years; behavior outside the declared range is an
//! explicit policy, never a guess.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DemandError, Result};
use crate::model::sector::Sector;
use crate::model::zone::ZoneId;

/// How fractions between declared years are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    /// Linear interpolation between the two bounding declared years.
    #[default]
    Linear,
    /// Hold the most recent declared value.
    Step,
}

/// Behavior for years outside the declared range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtrapolationPolicy {
    /// Fail with `ExtrapolationNotAllowed`.
    #[default]
    Error,
    /// Clamp to the nearest boundary value.
    Clamp,
}

/// Declared decarbonization breakpoints, sorted by year.
type Curve = Vec<(u16, f64)>;

/// Per-sector, per-zone, per-year decarbonization fractions.
///
/// Pure data with validation invariants: every declared fraction lies in
/// [0, 1], checked eagerly at insertion. A sector with no declared curve at
/// all contributes zero demand (it is simply not part of the scenario).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    interpolation: InterpolationMode,
    extrapolation: ExtrapolationPolicy,
    /// Zone-specific curves; looked up before sector-wide defaults.
    zone_curves: HashMap<Sector, HashMap<ZoneId, Curve>>,
    /// Sector-wide curves applying to every zone without an override.
    sector_curves: HashMap<Sector, Curve>,
}

impl Scenario {
    pub fn new(interpolation: InterpolationMode, extrapolation: ExtrapolationPolicy) -> Self {
        Self {
            interpolation,
            extrapolation,
            zone_curves: HashMap::new(),
            sector_curves: HashMap::new(),
        }
    }

    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    pub fn extrapolation(&self) -> ExtrapolationPolicy {
        self.extrapolation
    }

    /// Declares a sector-wide fraction for one year.
    pub fn set_sector_fraction(&mut self, sector: Sector, year: u16, fraction: f64) -> Result<()> {
        validate_fraction(sector, None, year, fraction)?;
        insert_breakpoint(self.sector_curves.entry(sector).or_default(), year, fraction);
        Ok(())
    }

    /// Declares a zone-specific fraction for one year, overriding the
    /// sector-wide curve for that zone.
    pub fn set_fraction(
        &mut self,
        sector: Sector,
        zone: ZoneId,
        year: u16,
        fraction: f64,
    ) -> Result<()> {
        validate_fraction(sector, Some(&zone), year, fraction)?;
        let curve = self
            .zone_curves
            .entry(sector)
            .or_default()
            .entry(zone)
            .or_default();
        insert_breakpoint(curve, year, fraction);
        Ok(())
    }

    /// True if the sector participates in this scenario at all.
    pub fn declares(&self, sector: Sector) -> bool {
        self.sector_curves.contains_key(&sector)
            || self
                .zone_curves
                .get(&sector)
                .is_some_and(|m| !m.is_empty())
    }

    /// Resolves the decarbonization fraction for (sector, zone, year).
    ///
    /// Exact declared years return the declared value unchanged. Undeclared
    /// years interpolate per the configured mode; years outside the declared
    /// range follow the extrapolation policy. A sector without any declared
    /// curve resolves to 0.0.
    pub fn fraction_at(&self, sector: Sector, zone: &ZoneId, year: u16) -> Result<f64> {
        let curve = self
            .zone_curves
            .get(&sector)
            .and_then(|m| m.get(zone))
            .or_else(|| self.sector_curves.get(&sector));
        let Some(curve) = curve else {
            return Ok(0.0);
        };
        // Curves are non-empty by construction.
        let (first, _) = curve[0];
        let (last, _) = curve[curve.len() - 1];

        if year < first || year > last {
            return match self.extrapolation {
                ExtrapolationPolicy::Clamp => {
                    let boundary = if year < first { curve[0].1 } else { curve[curve.len() - 1].1 };
                    Ok(boundary)
                }
                ExtrapolationPolicy::Error => Err(DemandError::ExtrapolationNotAllowed {
                    sector,
                    zone: zone.clone(),
                    year,
                    first,
                    last,
                }),
            };
        }

        match curve.binary_search_by_key(&year, |&(y, _)| y) {
            Ok(i) => Ok(curve[i].1),
            Err(i) => {
                // `year` lies strictly between curve[i-1] and curve[i].
                let (y0, f0) = curve[i - 1];
                let (y1, f1) = curve[i];
                match self.interpolation {
                    InterpolationMode::Step => Ok(f0),
                    InterpolationMode::Linear => {
                        let t = f64::from(year - y0) / f64::from(y1 - y0);
                        Ok(f0 + (f1 - f0) * t)
                    }
                }
            }
        }
    }
}

fn validate_fraction(
    sector: Sector,
    zone: Option<&ZoneId>,
    year: u16,
    fraction: f64,
) -> Result<()> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(DemandError::OutOfRangeFraction {
            sector,
            zone: zone.cloned().unwrap_or_else(|| ZoneId::new("*")),
            year,
            fraction,
        });
    }
    Ok(())
}

fn insert_breakpoint(curve: &mut Curve, year: u16, fraction: f64) {
    match curve.binary_search_by_key(&year, |&(y, _)| y) {
        Ok(i) => curve[i] = (year, fraction),
        Err(i) => curve.insert(i, (year, fraction)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> ZoneId {
        ZoneId::from("CA_PGE_BAY")
    }

    fn scenario_with(points: &[(u16, f64)]) -> Scenario {
        let mut s = Scenario::new(InterpolationMode::Linear, ExtrapolationPolicy::Error);
        for &(y, f) in points {
            s.set_sector_fraction(Sector::HdTransport, y, f).unwrap();
        }
        s
    }

    #[test]
    fn test_declared_year_returns_declared_value() {
        let s = scenario_with(&[(2030, 0.05), (2040, 0.10), (2050, 0.20)]);
        let f = s.fraction_at(Sector::HdTransport, &zone(), 2040).unwrap();
        assert_eq!(f, 0.10, "breakpoint value returned unchanged");
    }

    #[test]
    fn test_linear_interpolation() {
        let s = scenario_with(&[(2030, 0.0), (2050, 0.2)]);
        let f = s.fraction_at(Sector::HdTransport, &zone(), 2040).unwrap();
        assert!((f - 0.1).abs() < 1e-12);
        let f = s.fraction_at(Sector::HdTransport, &zone(), 2035).unwrap();
        assert!((f - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_step_interpolation_holds_previous_value() {
        let mut s = Scenario::new(InterpolationMode::Step, ExtrapolationPolicy::Error);
        s.set_sector_fraction(Sector::HdTransport, 2030, 0.05).unwrap();
        s.set_sector_fraction(Sector::HdTransport, 2040, 0.10).unwrap();
        let f = s.fraction_at(Sector::HdTransport, &zone(), 2039).unwrap();
        assert_eq!(f, 0.05);
        let f = s.fraction_at(Sector::HdTransport, &zone(), 2040).unwrap();
        assert_eq!(f, 0.10);
    }

    #[test]
    fn test_extrapolation_error_and_clamp() {
        let s = scenario_with(&[(2030, 0.05), (2050, 0.2)]);
        let err = s.fraction_at(Sector::HdTransport, &zone(), 2025).unwrap_err();
        assert!(matches!(
            err,
            DemandError::ExtrapolationNotAllowed { first: 2030, last: 2050, .. }
        ));

        let mut clamped = scenario_with(&[(2030, 0.05), (2050, 0.2)]);
        clamped.extrapolation = ExtrapolationPolicy::Clamp;
        assert_eq!(
            clamped.fraction_at(Sector::HdTransport, &zone(), 2025).unwrap(),
            0.05
        );
        assert_eq!(
            clamped.fraction_at(Sector::HdTransport, &zone(), 2055).unwrap(),
            0.2
        );
    }

    #[test]
    fn test_zone_override_beats_sector_default() {
        let mut s = scenario_with(&[(2030, 0.05)]);
        s.set_fraction(Sector::HdTransport, zone(), 2030, 0.5).unwrap();
        assert_eq!(s.fraction_at(Sector::HdTransport, &zone(), 2030).unwrap(), 0.5);
        assert_eq!(
            s.fraction_at(Sector::HdTransport, &ZoneId::from("NV_S"), 2030)
                .unwrap(),
            0.05,
            "other zones keep the sector-wide value"
        );
    }

    #[test]
    fn test_out_of_range_fraction_rejected() {
        let mut s = Scenario::default();
        let err = s
            .set_sector_fraction(Sector::Cement, 2030, 1.5)
            .unwrap_err();
        assert!(matches!(err, DemandError::OutOfRangeFraction { fraction, .. } if fraction == 1.5));
        assert!(s
            .set_sector_fraction(Sector::Cement, 2030, f64::NAN)
            .is_err());
    }

    #[test]
    fn test_undeclared_sector_resolves_to_zero() {
        let s = scenario_with(&[(2030, 0.05)]);
        assert_eq!(s.fraction_at(Sector::Glass, &zone(), 2030).unwrap(), 0.0);
        assert!(!s.declares(Sector::Glass));
        assert!(s.declares(Sector::HdTransport));
    }
}
