pub const MONTHS_PER_YEAR: u32 = 12;

/// Parses a user-entered numeric cell. Surrounding whitespace is ignored; anything that is not
/// a finite number (including `inf` and `NaN`) is rejected.
pub(crate) fn parse_finite(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Scales a sum over `months_present` months up to a full twelve-month equivalent.
pub(crate) fn annualisation_factor(months_present: usize) -> f64 {
    MONTHS_PER_YEAR as f64 / months_present as f64
}
