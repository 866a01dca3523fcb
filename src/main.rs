use std::path::Path;

use anyhow::Result;
use h2demand::{
    AllocationWeights, BaselineProjection, ConversionTable, DemandModel, ExtrapolationPolicy,
    GridCellId, InterpolationMode, RunConfig, Scenario, Sector, ShapeLibrary, ZoneId, ZoneSet,
};

/// Runs a small two-zone scenario and writes the outputs to ./out.
fn main() -> Result<()> {
    env_logger::init();

    let zones = ZoneSet::from_names(["AZ_APS", "NV_S"])?;

    let mut scenario = Scenario::new(InterpolationMode::Linear, ExtrapolationPolicy::Error);
    scenario.set_sector_fraction(Sector::LdTransport, 2030, 0.1)?;
    scenario.set_sector_fraction(Sector::LdTransport, 2050, 0.6)?;
    scenario.set_sector_fraction(Sector::Cement, 2030, 0.0)?;
    scenario.set_sector_fraction(Sector::Cement, 2050, 0.4)?;

    // Reference-year (2023) fuel volumes, projected along the AEO
    // trajectories for transport and held flat for industry.
    let years = [2030u16, 2040, 2050];
    let mut baseline = BaselineProjection::new();
    baseline.insert_projected_from_reference(
        Sector::LdTransport,
        ZoneId::from("AZ_APS"),
        1.2e9,
        &years,
    )?;
    baseline.insert_projected_from_reference(
        Sector::LdTransport,
        ZoneId::from("NV_S"),
        0.8e9,
        &years,
    )?;
    baseline.insert_projected_from_reference(
        Sector::Cement,
        ZoneId::from("AZ_APS"),
        3.0e6,
        &years,
    )?;
    baseline.insert_projected_from_reference(Sector::Cement, ZoneId::from("NV_S"), 1.0e6, &years)?;

    let mut weights = AllocationWeights::new();
    weights.insert_zone(
        ZoneId::from("AZ_APS"),
        vec![
            (GridCellId::new(120, 84), 0.55),
            (GridCellId::new(121, 84), 0.30),
            (GridCellId::new(121, 85), 0.15),
        ],
    )?;
    weights.insert_zone(
        ZoneId::from("NV_S"),
        vec![
            (GridCellId::new(98, 110), 0.7),
            (GridCellId::new(99, 110), 0.3),
        ],
    )?;

    let model = DemandModel {
        zones,
        scenario,
        baseline,
        conversions: ConversionTable::wecc_defaults(),
        shapes: ShapeLibrary::with_wecc_defaults(),
        weights,
    };

    let config = RunConfig::new(vec![2030, 2040, 2050]);
    let result = model.run(&config)?;

    for year in &result.years {
        println!(
            "{}: {:.1} t H2 across {} grid cells",
            year.year,
            year.total_kg() / 1000.0,
            year.grid.cells.len()
        );
    }

    h2demand::io::write_run_outputs(&result, Path::new("out"))?;
    Ok(())
}
