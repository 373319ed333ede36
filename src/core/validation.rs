use crate::core::units::parse_finite;
use crate::errors::AnalysisError;
use crate::input::RawObservation;
use serde::Serialize;
use tracing::debug;

/// The fewest valid months for which a regression is considered meaningful.
pub const MINIMUM_VALID_ROWS: usize = 12;

/// A month of data whose numeric fields have all been parsed and checked.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyRecord {
    pub year: String,
    pub month: String,
    pub energy: f64,
    pub hdd: f64,
    pub cdd: f64,
}

impl MonthlyRecord {
    fn from_observation(observation: &RawObservation) -> Option<Self> {
        let energy = parse_finite(&observation.energy)?;
        let hdd = parse_finite(&observation.hdd)?;
        let cdd = parse_finite(&observation.cdd)?;

        (energy > 0. && hdd >= 0. && cdd >= 0.).then(|| Self {
            year: observation.year.clone(),
            month: observation.month.clone(),
            energy,
            hdd,
            cdd,
        })
    }

    /// Total degree days, the single regression predictor.
    pub fn tdd(&self) -> f64 {
        self.hdd + self.cdd
    }
}

/// Parses the conditioned floor area, which must be a finite number greater than zero.
pub fn validate_area(area: &str) -> Result<f64, AnalysisError> {
    parse_finite(area)
        .filter(|area| *area > 0.)
        .ok_or_else(|| AnalysisError::invalid_area(area))
}

/// Keeps the rows whose energy and degree day cells parse and satisfy the record invariants,
/// preserving input order. Invalid rows are dropped, never repaired.
pub fn filter_valid<'a>(
    observations: impl IntoIterator<Item = &'a RawObservation>,
) -> Vec<MonthlyRecord> {
    observations
        .into_iter()
        .filter_map(MonthlyRecord::from_observation)
        .collect()
}

pub fn validate_observations<'a>(
    observations: impl IntoIterator<Item = &'a RawObservation>,
) -> Result<Vec<MonthlyRecord>, AnalysisError> {
    let records = filter_valid(observations);
    debug!("{} observation rows passed validation", records.len());

    if records.len() < MINIMUM_VALID_ROWS {
        return Err(AnalysisError::InsufficientData {
            valid: records.len(),
            required: MINIMUM_VALID_ROWS,
        });
    }

    Ok(records)
}
