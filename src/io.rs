//! Output writers.
//!
//! Hourly profiles go out in the SWITCH timeseries CSV layout (one file per
//! zone and year), gridded demand as cell CSVs, and conservation reports as
//! JSON for downstream auditing.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::calendar::ModelYear;
use crate::sim::conservation::ConservationReport;
use crate::sim::hourly::HourlyProfile;
use crate::sim::pipeline::{RunResult, YearResult};
use crate::sim::spatial::{GridDemand, GridHourlyDemand};

#[derive(Serialize)]
struct TimepointRow<'a> {
    timepoint_id: usize,
    timeseries: &'a str,
    timestamp: String,
    h2_demand_kg: f64,
}

/// Writes one zone's hourly profile in the SWITCH timeseries layout.
///
/// Timepoint ids are 1-based; the timeseries label groups the whole year.
pub fn write_profile_csv(
    profile: &HourlyProfile,
    calendar: &ModelYear,
    path: &Path,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    let timeseries = format!("{}_all", profile.year);
    for (hour, &demand) in profile.total.iter().enumerate() {
        writer.serialize(TimepointRow {
            timepoint_id: hour + 1,
            timeseries: &timeseries,
            timestamp: calendar.timestamp(hour).format("%Y-%m-%d-%H").to_string(),
            h2_demand_kg: demand,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct GridRow {
    col: i32,
    row: i32,
    h2_demand_kg: f64,
}

/// Writes annual gridded demand, one row per cell, sorted by (col, row).
pub fn write_grid_csv(grid: &GridDemand, path: &Path) -> Result<()> {
    let mut cells: Vec<_> = grid.cells.iter().collect();
    cells.sort_by_key(|(cell, _)| **cell);
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    for (cell, &demand) in cells {
        writer.serialize(GridRow {
            col: cell.col,
            row: cell.row,
            h2_demand_kg: demand,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct GridHourlyRow {
    col: i32,
    row: i32,
    hour: usize,
    h2_demand_kg: f64,
}

/// Writes hourly gridded demand, one row per (cell, hour).
pub fn write_grid_hourly_csv(grid: &GridHourlyDemand, path: &Path) -> Result<()> {
    let mut cells: Vec<_> = grid.cells.iter().collect();
    cells.sort_by_key(|(cell, _)| **cell);
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    for (cell, series) in cells {
        for (hour, &demand) in series.iter().enumerate() {
            writer.serialize(GridHourlyRow {
                col: cell.col,
                row: cell.row,
                hour,
                h2_demand_kg: demand,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes the year's conservation reports as pretty-printed JSON.
pub fn write_conservation_report(reports: &[ConservationReport], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

/// Writes everything one year produced into `dir`.
pub fn write_year_outputs(year: &YearResult, dir: &Path) -> Result<()> {
    for profile in &year.profiles {
        let name = format!("profile_{}_{}.csv", year.year, profile.zone);
        write_profile_csv(profile, &year.calendar, &dir.join(name))?;
    }
    write_grid_csv(&year.grid, &dir.join(format!("grid_{}.csv", year.year)))?;
    if let Some(grid_hourly) = &year.grid_hourly {
        write_grid_hourly_csv(
            grid_hourly,
            &dir.join(format!("grid_hourly_{}.csv", year.year)),
        )?;
    }
    write_conservation_report(
        &year.conservation,
        &dir.join(format!("conservation_{}.json", year.year)),
    )?;
    Ok(())
}

/// Writes a full run into `dir`, creating it if needed.
pub fn write_run_outputs(result: &RunResult, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    for year in &result.years {
        write_year_outputs(year, dir)?;
    }
    info!("wrote outputs for {} years to {}", result.years.len(), dir.display());
    Ok(())
}
