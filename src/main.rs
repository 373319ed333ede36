use anyhow::bail;
use clap::Parser;
use energy_signature::input::{AnalysisSettings, AreaUnit, EnergyUnit};
use energy_signature::output::FileOutput;
use energy_signature::sample_data::sample_input;
use energy_signature::{run_analysis, run_analysis_from_csv, AnalysisFlags, AnalysisResults};
use serde::de::DeserializeOwned;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct SignatureArgs {
    #[arg(
        required_unless_present = "sample",
        help = "Path to analysis input in .json format, or to monthly observations in .csv format"
    )]
    input_file: Option<String>,
    #[arg(long, help = "Conditioned floor area, for .csv input")]
    area: Option<String>,
    #[arg(long, value_parser = parse_unit_label::<AreaUnit>, help = "Area unit label, for .csv input")]
    area_unit: Option<AreaUnit>,
    #[arg(long, value_parser = parse_unit_label::<EnergyUnit>, help = "Energy unit label, for .csv input")]
    energy_unit: Option<EnergyUnit>,
    #[clap(
        long,
        default_value_t = false,
        help = "Use the mean of each year's annualised EnPI as the baseline"
    )]
    annualised_baseline: bool,
    #[clap(
        long,
        default_value_t = false,
        conflicts_with = "input_file",
        help = "Run the bundled 2023-2024 reference dataset"
    )]
    sample: bool,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
    #[clap(long, short, default_value_t = false, help = "Log at trace level")]
    verbose: bool,
}

fn parse_unit_label<T: DeserializeOwned>(label: &str) -> Result<T, String> {
    serde_json::from_str::<T>(format!("\"{label}\"").as_str()).map_err(|err| err.to_string())
}

fn main() -> anyhow::Result<()> {
    let args = SignatureArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let max_level = if args.verbose {
            Level::TRACE
        } else {
            Level::INFO
        };
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(max_level);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)
        .expect("setting tracing subscriber failed");

    let input_file = args.input_file.as_deref().unwrap_or("sample");
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };
    let input_file_stem = PathBuf::from(input_file_stem);

    let mut output_path = input_file_stem.clone().into_os_string();
    output_path.push("__results");
    let output_path = PathBuf::from(output_path);
    fs::create_dir_all(&output_path)?;
    let input_file_name = input_file_stem
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("results");
    let file_output = FileOutput::new(output_path.clone(), format!("{input_file_name}__{{}}.{{}}"));

    let flags: AnalysisFlags = (&args).into();

    let results = if args.sample {
        run_analysis(
            serde_json::to_vec(&sample_input())?.as_slice(),
            &file_output,
            &flags,
        )?
    } else {
        match input_file_ext {
            Some("json") => {
                if args.area.is_some() || args.area_unit.is_some() || args.energy_unit.is_some() {
                    bail!("Area and unit options only apply to .csv input; set them in the JSON file instead");
                }
                run_analysis(
                    BufReader::new(File::open(Path::new(input_file))?),
                    &file_output,
                    &flags,
                )?
            }
            Some("csv") => {
                let Some(area) = args.area.as_deref() else {
                    bail!("--area is required for .csv input");
                };
                let settings = AnalysisSettings::new(
                    area,
                    args.area_unit.unwrap_or_default(),
                    args.energy_unit.unwrap_or_default(),
                );
                run_analysis_from_csv(
                    BufReader::new(File::open(Path::new(input_file))?),
                    &settings,
                    &file_output,
                    &flags,
                )?
            }
            _ => bail!("Input file {input_file:?} must have a .json or .csv extension"),
        }
    };

    log_summary(&results);
    info!("results written to {}", output_path.display());
    debug!("JSON results: {}", serde_json::to_string_pretty(&results)?);

    Ok(())
}

fn log_summary(results: &AnalysisResults) {
    let intensity_unit = results.settings.intensity_unit();

    info!("model: {}", results.model.equation());
    info!("R squared: {:.3}", results.model.r_squared);
    info!(
        "baseline EUI ({}): {:.1} {intensity_unit}",
        results.baseline_method.as_str(),
        results.baseline_eui
    );
    if let Some(performance) = results.performance() {
        info!(
            "{} EnPI: {:.1} {intensity_unit}",
            performance.latest_year, performance.latest_enpi
        );
        if let Some(trend) = performance.describe_trend() {
            info!("trend: {trend}");
        }
    }
}

impl From<&SignatureArgs> for AnalysisFlags {
    fn from(args: &SignatureArgs) -> Self {
        let mut flags = AnalysisFlags::empty();
        if args.annualised_baseline {
            flags.insert(AnalysisFlags::ANNUALISED_BASELINE);
        }
        flags
    }
}
