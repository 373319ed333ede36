use crate::core::validation::MonthlyRecord;
use serde::Serialize;

/// A fitted model of the form `energy = slope × tdd + intercept`.
///
/// The slope is the building load coefficient (energy per degree day) and the intercept is the
/// weather-independent baseload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl RegressionModel {
    /// The all-zero model returned when the predictor has no variance.
    pub const DEGENERATE: Self = Self {
        slope: 0.,
        intercept: 0.,
        r_squared: 0.,
    };

    pub fn predict(&self, tdd: f64) -> f64 {
        self.slope * tdd + self.intercept
    }

    pub fn equation(&self) -> String {
        format!(
            "Energy = {:.2} × (HDD + CDD) + {:.0}",
            self.slope, self.intercept
        )
    }
}

/// The result of a fit, noting whether the degenerate fallback was taken.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegressionFit {
    pub model: RegressionModel,
    pub degenerate: bool,
}

/// Running sums for a closed-form ordinary least squares fit.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeastSquares {
    x_sum: f64,
    y_sum: f64,
    xy_sum: f64,
    x2_sum: f64,
    y2_sum: f64,
    n: usize,
    bounds: Option<Bounds>,
}

/// Extremes of the pushed values, so that zero variance is detected exactly rather than from
/// sums that carry rounding error.
#[derive(Clone, Copy, Debug)]
struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Bounds {
    fn including(self, x: f64, y: f64) -> Self {
        Self {
            x_min: self.x_min.min(x),
            x_max: self.x_max.max(x),
            y_min: self.y_min.min(y),
            y_max: self.y_max.max(y),
        }
    }
}

impl LeastSquares {
    pub fn push(&mut self, x: f64, y: f64) {
        self.x_sum += x;
        self.y_sum += y;
        self.xy_sum += x * y;
        self.x2_sum += x * x;
        self.y2_sum += y * y;
        self.n += 1;
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.including(x, y),
            None => Bounds {
                x_min: x,
                x_max: x,
                y_min: y,
                y_max: y,
            },
        });
    }

    pub fn fit(&self) -> RegressionFit {
        let degenerate = RegressionFit {
            model: RegressionModel::DEGENERATE,
            degenerate: true,
        };

        let Some(bounds) = self.bounds else {
            return degenerate;
        };
        if bounds.x_min == bounds.x_max {
            return degenerate;
        }
        // a flat response is fitted exactly by a horizontal line that explains none of it
        if bounds.y_min == bounds.y_max {
            return RegressionFit {
                model: RegressionModel {
                    slope: 0.,
                    intercept: bounds.y_min,
                    r_squared: 0.,
                },
                degenerate: false,
            };
        }

        let n = self.n as f64;
        let denom = n * self.x2_sum - self.x_sum * self.x_sum;
        if denom <= 0. || !denom.is_finite() {
            return degenerate;
        }

        let numerator = n * self.xy_sum - self.x_sum * self.y_sum;
        let slope = numerator / denom;
        let intercept = (self.y_sum - slope * self.x_sum) / n;

        // the radicand can round to a tiny negative for near-constant responses
        let radicand = denom * (n * self.y2_sum - self.y_sum * self.y_sum);
        let r_squared = if radicand > 0. && radicand.is_finite() {
            (numerator / radicand.sqrt()).powi(2).min(1.)
        } else {
            0.
        };

        RegressionFit {
            model: RegressionModel {
                slope,
                intercept,
                r_squared,
            },
            degenerate: false,
        }
    }
}

impl FromIterator<(f64, f64)> for LeastSquares {
    fn from_iter<T: IntoIterator<Item = (f64, f64)>>(iter: T) -> Self {
        let mut sums = Self::default();
        for (x, y) in iter {
            sums.push(x, y);
        }
        sums
    }
}

/// Fits energy against total degree days over the validated records.
pub fn fit_energy_signature(records: &[MonthlyRecord]) -> RegressionFit {
    records
        .iter()
        .map(|record| (record.tdd(), record.energy))
        .collect::<LeastSquares>()
        .fit()
}
