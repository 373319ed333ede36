use crate::core::regression::RegressionModel;
use crate::core::validation::MonthlyRecord;
use serde::Serialize;

/// A single month's actual energy alongside what the model expects for that month's weather.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NormalisedRecord {
    /// Display label, month then year, e.g. `Jan 2023`.
    pub period: String,
    pub tdd: f64,
    pub actual_energy: f64,
    pub normalised_energy: f64,
    /// Positive when actual use was below the weather-expected value.
    pub savings: f64,
}

impl NormalisedRecord {
    fn new(record: &MonthlyRecord, model: &RegressionModel) -> Self {
        let tdd = record.tdd();
        let normalised_energy = model.predict(tdd);

        Self {
            period: format!("{} {}", record.month, record.year),
            tdd,
            actual_energy: record.energy,
            normalised_energy,
            savings: normalised_energy - record.energy,
        }
    }
}

pub fn normalise(records: &[MonthlyRecord], model: &RegressionModel) -> Vec<NormalisedRecord> {
    records
        .iter()
        .map(|record| NormalisedRecord::new(record, model))
        .collect()
}
