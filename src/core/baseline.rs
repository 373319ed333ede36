use crate::core::aggregation::AnnualSummary;
use crate::core::normalisation::NormalisedRecord;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMethod {
    /// Total normalised energy across every month, divided by the number of distinct years.
    /// Partial years are not annualised individually.
    #[default]
    PooledMonths,
    /// Mean of each year's annualised normalised EnPI.
    Annualised,
}

impl BaselineMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineMethod::PooledMonths => "pooled months",
            BaselineMethod::Annualised => "annualised",
        }
    }
}

/// Reduces the whole normalised series to the reference EnPI that later years are compared to.
///
/// With no years present the baseline is zero.
pub fn baseline_eui(
    normalised: &[NormalisedRecord],
    annual: &[AnnualSummary],
    area: f64,
    method: BaselineMethod,
) -> f64 {
    if annual.is_empty() {
        return 0.;
    }
    let number_of_years = annual.len() as f64;

    match method {
        BaselineMethod::PooledMonths => {
            let total_normalised = normalised
                .iter()
                .map(|record| record.normalised_energy)
                .sum::<f64>();
            total_normalised / number_of_years / area
        }
        BaselineMethod::Annualised => {
            annual
                .iter()
                .map(|summary| summary.normalised_enpi)
                .sum::<f64>()
                / number_of_years
        }
    }
}
