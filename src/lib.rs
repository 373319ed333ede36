pub mod analysis;
pub mod core;
pub mod errors;
pub mod input;
pub mod observation_table;
pub mod output;
pub mod performance;
pub mod results_store;
pub mod sample_data;
#[cfg(test)]
mod tests;

pub use crate::analysis::{compute, AnalysisResults};
use crate::input::{
    ingest_for_processing, read_observations_csv, AnalysisInput, AnalysisSettings, RawObservation,
};
use crate::output::Output;
use bitflags::bitflags;
use csv::WriterBuilder;
use itertools::Itertools;
use std::io::Read;
use tracing::info;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct AnalysisFlags: u32 {
        /// Average each year's annualised EnPI for the baseline, instead of pooling every
        /// month's normalised energy and dividing by the number of years.
        const ANNUALISED_BASELINE = 0b1;
    }
}

/// Runs an analysis over a JSON `AnalysisInput` and writes the results to the given output.
pub fn run_analysis(
    input: impl Read,
    output: impl Output,
    flags: &AnalysisFlags,
) -> anyhow::Result<AnalysisResults> {
    let AnalysisInput {
        settings,
        observations,
    } = ingest_for_processing(input)?;

    run_analysis_for_observations(&observations, &settings, output, flags)
}

/// Runs an analysis over observation rows in CSV form, with settings supplied separately.
pub fn run_analysis_from_csv(
    csv: impl Read,
    settings: &AnalysisSettings,
    output: impl Output,
    flags: &AnalysisFlags,
) -> anyhow::Result<AnalysisResults> {
    let observations = read_observations_csv(csv)?;

    run_analysis_for_observations(&observations, settings, output, flags)
}

fn run_analysis_for_observations(
    observations: &[RawObservation],
    settings: &AnalysisSettings,
    output: impl Output,
    flags: &AnalysisFlags,
) -> anyhow::Result<AnalysisResults> {
    let results = compute(observations, settings, flags)?;

    if !output.is_noop() {
        write_normalised_output_file(&output, &results)?;
        write_annual_output_file(&output, &results)?;
        write_summary_output_file(&output, &results)?;
    }

    Ok(results)
}

const NORMALISED_OUTPUT_KEY: &str = "normalised";
const ANNUAL_OUTPUT_KEY: &str = "annual";
const SUMMARY_OUTPUT_KEY: &str = "summary";

fn write_normalised_output_file(
    output: &impl Output,
    results: &AnalysisResults,
) -> anyhow::Result<()> {
    info!("writing out to {NORMALISED_OUTPUT_KEY}");
    let writer = output.writer_for_location_key(NORMALISED_OUTPUT_KEY, "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    let energy_unit = format!("[{}]", results.settings.energy_unit);
    writer.write_record([
        "Period",
        "Total degree days",
        "Actual energy",
        "Normalised energy",
        "Savings",
    ])?;
    writer.write_record([
        "[label]",
        "[degree days]",
        energy_unit.as_str(),
        energy_unit.as_str(),
        energy_unit.as_str(),
    ])?;

    for record in &results.normalised {
        writer.write_record([
            record.period.clone(),
            record.tdd.to_string(),
            record.actual_energy.to_string(),
            record.normalised_energy.to_string(),
            record.savings.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_annual_output_file(
    output: &impl Output,
    results: &AnalysisResults,
) -> anyhow::Result<()> {
    info!("writing out to {ANNUAL_OUTPUT_KEY}");
    let writer = output.writer_for_location_key(ANNUAL_OUTPUT_KEY, "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    let intensity_unit = format!("[{}]", results.settings.intensity_unit());
    writer.write_record([
        "Year",
        "Months",
        "Annualisation factor",
        "Actual EUI",
        "Normalised EnPI",
    ])?;
    writer.write_record([
        "[label]",
        "[count]",
        "[ratio]",
        intensity_unit.as_str(),
        intensity_unit.as_str(),
    ])?;

    for summary in &results.annual {
        writer.write_record([
            summary.year.clone(),
            summary.months.to_string(),
            summary.annualisation_factor.to_string(),
            summary.actual_eui.to_string(),
            summary.normalised_enpi.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_summary_output_file(
    output: &impl Output,
    results: &AnalysisResults,
) -> anyhow::Result<()> {
    info!("writing out to {SUMMARY_OUTPUT_KEY}");
    let writer = output.writer_for_location_key(SUMMARY_OUTPUT_KEY, "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    let energy_unit = format!("[{}]", results.settings.energy_unit);
    let slope_unit = format!("[{}/degree day]", results.settings.energy_unit);
    let intensity_unit = format!("[{}]", results.settings.intensity_unit());
    let area_unit = format!("[{}]", results.settings.area_unit);
    let model = &results.model;

    let mut rows: Vec<[String; 3]> = vec![
        ["Conditioned area".into(), results.area.to_string(), area_unit],
        ["Model".into(), model.equation(), "".into()],
        ["Slope (BLC)".into(), model.slope.to_string(), slope_unit],
        ["Intercept (baseload)".into(), model.intercept.to_string(), energy_unit],
        ["R squared".into(), model.r_squared.to_string(), "[ratio]".into()],
        [
            "Baseline EUI (EnB)".into(),
            results.baseline_eui.to_string(),
            intensity_unit.clone(),
        ],
        [
            "Baseline method".into(),
            results.baseline_method.as_str().into(),
            "".into(),
        ],
    ];

    if let Some(performance) = results.performance() {
        rows.push(["Latest year".into(), performance.latest_year.clone(), "[label]".into()]);
        rows.push([
            "Latest year EnPI".into(),
            performance.latest_enpi.to_string(),
            intensity_unit.clone(),
        ]);
        rows.push([
            "Latest year actual EUI".into(),
            performance.latest_actual_eui.to_string(),
            intensity_unit,
        ]);
        if let Some(trend) = performance.describe_trend() {
            rows.push(["Trend".into(), trend, "".into()]);
        }
    }

    rows.push([
        "Advisories".into(),
        results.advisories.iter().join("; "),
        "".into(),
    ]);

    writer.write_record(["Quantity", "Value", "Unit"])?;
    for row in rows {
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
