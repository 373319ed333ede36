use crate::core::aggregation::AnnualSummary;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Better,
    Worse,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Better => "better",
            TrendDirection::Worse => "worse",
        }
    }
}

/// The latest year's performance compared against the baseline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub latest_year: String,
    pub latest_enpi: f64,
    pub latest_actual_eui: f64,
    /// Percentage change of the latest EnPI relative to the baseline; `None` when the baseline
    /// is zero.
    pub trend_percent: Option<f64>,
    pub direction: Option<TrendDirection>,
}

impl PerformanceSummary {
    pub fn new(annual: &[AnnualSummary], baseline_eui: f64) -> Option<Self> {
        let latest = annual.last()?;

        let trend_percent = (baseline_eui != 0.)
            .then(|| (latest.normalised_enpi - baseline_eui) / baseline_eui * 100.);
        // a rise in normalised intensity is a deterioration
        let direction = trend_percent.map(|trend| {
            if trend >= 0. {
                TrendDirection::Worse
            } else {
                TrendDirection::Better
            }
        });

        Some(Self {
            latest_year: latest.year.clone(),
            latest_enpi: latest.normalised_enpi,
            latest_actual_eui: latest.actual_eui,
            trend_percent,
            direction,
        })
    }

    /// Human-readable trend, e.g. `2.0% better than baseline`.
    pub fn describe_trend(&self) -> Option<String> {
        Some(format!(
            "{:.1}% {} than baseline",
            self.trend_percent?.abs(),
            self.direction?.as_str()
        ))
    }
}
