//! Transport parameter projections.
//!
//! Trajectories used to project reference-year (2023) on-road fuel use into a
//! model year and to relate FCEV fuel economy to the ICEV fleet it displaces.
//!
//! Relative FCEV/ICEV efficiencies are linear fits anchored at 2020 and 2050
//! estimates from E3's "Deep Decarbonization in a High Renewables Future"
//! (LDV values averaged over the truck/auto pair, per the CEC renewable
//! hydrogen roadmap methodology). Fuel economy and VMT trajectories are the
//! EIA Annual Energy Outlook 2025 reference case, tables 41 and 49, one entry
//! per year from 2023 through 2050.

use crate::error::{DemandError, Result};

/// First year the AEO trajectories cover.
pub const FIRST_MODEL_YEAR: u16 = 2023;
/// Last year the AEO trajectories cover.
pub const LAST_MODEL_YEAR: u16 = 2050;

/// Projected HD diesel fuel economy (mpg), 2023..=2050.
const HD_FUEL_ECONOMY_MPG: [f64; 28] = [
    6.259011, 6.360165, 6.470843, 6.589664, 6.714928, 6.836287, 6.954601, 7.068473, 7.178148,
    7.282597, 7.3777, 7.462639, 7.53763, 7.603401, 7.660309, 7.708639, 7.750559, 7.787107,
    7.819769, 7.846699, 7.869397, 7.88855, 7.905129, 7.92081, 7.935941, 7.950862, 7.966321,
    7.982552,
];

/// Projected LD vehicle miles traveled (billions), 2023..=2050.
const LD_VMT_BILLION_MILES: [f64; 28] = [
    2540.002441, 2549.398193, 2547.35083, 2552.27832, 2560.690674, 2564.727295, 2560.838867,
    2550.160156, 2538.888184, 2524.38623, 2513.166504, 2504.722168, 2494.232422, 2480.870605,
    2469.888672, 2461.147461, 2452.884766, 2447.28125, 2444.361572, 2443.996338, 2444.437988,
    2447.431152, 2453.515381, 2463.175537, 2475.763184, 2489.99292, 2505.494385, 2524.001465,
];

/// Projected HD vehicle miles traveled (billions), 2023..=2050.
const HD_VMT_BILLION_MILES: [f64; 28] = [
    186.77066, 187.000778, 188.452835, 190.68486, 192.556381, 194.116348, 194.965881, 195.397522,
    195.893646, 196.827133, 197.409042, 197.923721, 198.56163, 198.940033, 199.573639, 200.202545,
    200.718475, 201.372726, 202.111191, 202.838333, 203.409256, 203.777603, 203.913666,
    204.187134, 204.440094, 204.417526, 204.473785, 205.137848,
];

fn table_at(table: &[f64; 28], year: u16) -> Result<f64> {
    if !(FIRST_MODEL_YEAR..=LAST_MODEL_YEAR).contains(&year) {
        return Err(DemandError::YearOutOfRange {
            year,
            first: FIRST_MODEL_YEAR,
            last: LAST_MODEL_YEAR,
        });
    }
    Ok(table[usize::from(year - FIRST_MODEL_YEAR)])
}

/// Relative efficiency of LD FCEVs to the gasoline ICEVs they displace.
pub fn ld_fcev_to_icev_efficiency(year: u16) -> f64 {
    // Truck/auto averages: ICEV mpg and FCEV mpge in 2020 and 2050.
    let icev_2020 = (33.0 + 23.0) / 2.0;
    let icev_2050 = (40.0 + 30.0) / 2.0;
    let fcev_2020 = (83.0 + 60.0) / 2.0;
    let fcev_2050 = (138.0 + 95.0) / 2.0;
    linear_between(
        fcev_2020 / icev_2020,
        fcev_2050 / icev_2050,
        2020,
        2050,
        year,
    )
}

/// Relative efficiency of HD FCEVs to the diesel ICEVs they displace.
pub fn hd_fcev_to_icev_efficiency(year: u16) -> f64 {
    linear_between(8.5 / 7.6, 11.2 / 7.7, 2020, 2050, year)
}

/// Relative change in LD fuel economy from 2023 to `year`.
///
/// Line of best fit to BTS average LD fuel efficiency, 2000-2023.
pub fn rel_change_ld_fuel_economy(year: u16) -> Result<f64> {
    if !(FIRST_MODEL_YEAR..=LAST_MODEL_YEAR).contains(&year) {
        return Err(DemandError::YearOutOfRange {
            year,
            first: FIRST_MODEL_YEAR,
            last: LAST_MODEL_YEAR,
        });
    }
    let mpg_2023 = 22.6;
    let projected = 0.1352 * f64::from(year - 2000) + 19.731;
    Ok((projected - mpg_2023) / mpg_2023)
}

/// Relative change in HD fuel economy from 2023 to `year`.
pub fn rel_change_hd_fuel_economy(year: u16) -> Result<f64> {
    Ok((table_at(&HD_FUEL_ECONOMY_MPG, year)? - HD_FUEL_ECONOMY_MPG[0]) / HD_FUEL_ECONOMY_MPG[0])
}

/// Relative change in LD vehicle miles traveled from 2023 to `year`.
pub fn rel_change_ld_vmt(year: u16) -> Result<f64> {
    Ok((table_at(&LD_VMT_BILLION_MILES, year)? - LD_VMT_BILLION_MILES[0]) / LD_VMT_BILLION_MILES[0])
}

/// Relative change in HD vehicle miles traveled from 2023 to `year`.
pub fn rel_change_hd_vmt(year: u16) -> Result<f64> {
    Ok((table_at(&HD_VMT_BILLION_MILES, year)? - HD_VMT_BILLION_MILES[0]) / HD_VMT_BILLION_MILES[0])
}

/// Projects 2023 LD gasoline use to `year`.
///
/// Fuel use scales with miles traveled and inversely with fuel economy.
pub fn project_ld_fuel_use(reference_gallons: f64, year: u16) -> Result<f64> {
    let vmt = 1.0 + rel_change_ld_vmt(year)?;
    let mpg = 1.0 + rel_change_ld_fuel_economy(year)?;
    Ok(reference_gallons * vmt / mpg)
}

/// Projects 2023 HD diesel use to `year`.
pub fn project_hd_fuel_use(reference_gallons: f64, year: u16) -> Result<f64> {
    let vmt = 1.0 + rel_change_hd_vmt(year)?;
    let mpg = 1.0 + rel_change_hd_fuel_economy(year)?;
    Ok(reference_gallons * vmt / mpg)
}

fn linear_between(v0: f64, v1: f64, y0: u16, y1: u16, year: u16) -> f64 {
    let span = f64::from(y1 - y0);
    v0 + (v1 - v0) / span * (f64::from(year) - f64::from(y0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency_anchors() {
        let e2020 = ld_fcev_to_icev_efficiency(2020);
        assert!((e2020 - (71.5 / 28.0)).abs() < 1e-9);
        let e2050 = ld_fcev_to_icev_efficiency(2050);
        assert!((e2050 - (116.5 / 35.0)).abs() < 1e-9);
        // Midpoint lies between the anchors.
        let e2035 = ld_fcev_to_icev_efficiency(2035);
        assert!(e2035 > e2020 && e2035 < e2050);
    }

    #[test]
    fn test_hd_efficiency_increasing() {
        assert!(hd_fcev_to_icev_efficiency(2050) > hd_fcev_to_icev_efficiency(2023));
    }

    #[test]
    fn test_reference_year_is_identity() {
        assert_eq!(rel_change_hd_fuel_economy(2023).unwrap(), 0.0);
        assert_eq!(rel_change_ld_vmt(2023).unwrap(), 0.0);
        assert_eq!(rel_change_hd_vmt(2023).unwrap(), 0.0);
        let projected = project_hd_fuel_use(1000.0, 2023).unwrap();
        assert!((projected - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_hd_fuel_use_declines_with_better_economy() {
        // HD VMT grows ~10% by 2050 while fuel economy grows ~28%;
        // projected fuel use ends below the reference.
        let projected = project_hd_fuel_use(1000.0, 2050).unwrap();
        assert!(projected < 1000.0, "got {projected}");
    }

    #[test]
    fn test_year_out_of_range() {
        let err = rel_change_ld_vmt(2060).unwrap_err();
        assert!(matches!(
            err,
            crate::error::DemandError::YearOutOfRange { year: 2060, .. }
        ));
    }
}
