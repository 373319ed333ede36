use crate::core::aggregation::{aggregate_annual, AnnualSummary};
use crate::core::baseline::{baseline_eui, BaselineMethod};
use crate::core::normalisation::{normalise, NormalisedRecord};
use crate::core::regression::{fit_energy_signature, RegressionModel};
use crate::core::validation::{validate_area, validate_observations};
use crate::errors::{Advisory, AnalysisError};
use crate::input::{AnalysisSettings, RawObservation};
use crate::performance::PerformanceSummary;
use crate::AnalysisFlags;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Below this R² the model is still used, but flagged as unreliable.
pub const LOW_FIT_THRESHOLD: f64 = 0.1;

/// Everything derived from one snapshot of observations and settings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisResults {
    pub settings: AnalysisSettings,
    pub area: f64,
    pub model: RegressionModel,
    pub normalised: Vec<NormalisedRecord>,
    pub annual: Vec<AnnualSummary>,
    pub baseline_eui: f64,
    pub baseline_method: BaselineMethod,
    pub advisories: Vec<Advisory>,
}

impl AnalysisResults {
    pub fn performance(&self) -> Option<PerformanceSummary> {
        PerformanceSummary::new(&self.annual, self.baseline_eui)
    }

    pub fn latest_year(&self) -> Option<&AnnualSummary> {
        self.annual.last()
    }
}

/// Runs the full pipeline over a snapshot of rows: validation, regression, normalisation,
/// annual aggregation and the baseline. Fatal errors are returned before any fitting happens.
#[instrument(skip_all, fields(rows = observations.len()))]
pub fn compute(
    observations: &[RawObservation],
    settings: &AnalysisSettings,
    flags: &AnalysisFlags,
) -> Result<AnalysisResults, AnalysisError> {
    let area = validate_area(&settings.area)?;
    let records = validate_observations(observations)?;

    let fit = fit_energy_signature(&records);
    let model = fit.model;
    debug!(
        slope = model.slope,
        intercept = model.intercept,
        r_squared = model.r_squared,
        "fitted energy signature over {} months",
        records.len()
    );

    let mut advisories = vec![];
    if fit.degenerate {
        warn!("{}", Advisory::DegenerateModel);
        advisories.push(Advisory::DegenerateModel);
    }
    if model.r_squared.is_nan() || model.r_squared < LOW_FIT_THRESHOLD {
        let advisory = Advisory::LowFit {
            r_squared: model.r_squared,
        };
        warn!("{advisory}");
        advisories.push(advisory);
    }

    let normalised = normalise(&records, &model);
    let annual = aggregate_annual(&records, &normalised, area);

    let baseline_method = if flags.contains(AnalysisFlags::ANNUALISED_BASELINE) {
        BaselineMethod::Annualised
    } else {
        BaselineMethod::PooledMonths
    };
    let baseline_eui = baseline_eui(&normalised, &annual, area, baseline_method);
    debug!(
        years = annual.len(),
        baseline_eui, "aggregated normalised energy by year"
    );

    Ok(AnalysisResults {
        settings: settings.clone(),
        area,
        model,
        normalised,
        annual,
        baseline_eui,
        baseline_method,
        advisories,
    })
}
