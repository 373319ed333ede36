use crate::core::normalisation::NormalisedRecord;
use crate::core::units::annualisation_factor;
use crate::core::validation::MonthlyRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Energy use intensity figures for one year key, scaled to a twelve month equivalent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnualSummary {
    pub year: String,
    pub months: usize,
    pub annualisation_factor: f64,
    pub actual_eui: f64,
    pub normalised_enpi: f64,
}

#[derive(Clone, Copy, Debug, Default)]
struct YearTotals {
    actual_sum: f64,
    normalised_sum: f64,
    count: usize,
}

/// Groups records by their year label and derives each year's actual EUI and normalised EnPI.
///
/// `records` and `normalised` must be the same length and in the same order, as produced by
/// [`crate::core::normalisation::normalise`]. Years are returned in ascending lexical order of
/// their labels. Partial (or over-full) years are scaled by `12 / months present`.
pub fn aggregate_annual(
    records: &[MonthlyRecord],
    normalised: &[NormalisedRecord],
    area: f64,
) -> Vec<AnnualSummary> {
    debug_assert_eq!(records.len(), normalised.len());

    let mut years: BTreeMap<&str, YearTotals> = BTreeMap::new();
    for (record, normalised) in records.iter().zip(normalised) {
        let totals = years.entry(record.year.as_str()).or_default();
        totals.actual_sum += normalised.actual_energy;
        totals.normalised_sum += normalised.normalised_energy;
        totals.count += 1;
    }

    years
        .into_iter()
        .map(|(year, totals)| {
            let factor = annualisation_factor(totals.count);
            AnnualSummary {
                year: year.to_string(),
                months: totals.count,
                annualisation_factor: factor,
                actual_eui: totals.actual_sum * factor / area,
                normalised_enpi: totals.normalised_sum * factor / area,
            }
        })
        .collect()
}
