use crate::input::{AnalysisInput, AnalysisSettings, AreaUnit, EnergyUnit, RawObservation};

/// Two years of monthly readings for a 10 000 m² building, used for demonstrations and as a
/// regression reference.
const SAMPLE_ROWS: [(&str, &str, &str, &str, &str); 24] = [
    ("2023", "Jan", "120000", "450", "10"),
    ("2023", "Feb", "115000", "400", "15"),
    ("2023", "Mar", "100000", "300", "50"),
    ("2023", "Apr", "85000", "150", "100"),
    ("2023", "May", "90000", "50", "200"),
    ("2023", "Jun", "105000", "10", "300"),
    ("2023", "Jul", "115000", "0", "350"),
    ("2023", "Aug", "110000", "5", "320"),
    ("2023", "Sep", "95000", "40", "220"),
    ("2023", "Oct", "88000", "120", "110"),
    ("2023", "Nov", "102000", "280", "40"),
    ("2023", "Dec", "118000", "420", "10"),
    ("2024", "Jan", "118000", "460", "5"),
    ("2024", "Feb", "112000", "410", "20"),
    ("2024", "Mar", "98000", "310", "60"),
    ("2024", "Apr", "82000", "140", "110"),
    ("2024", "May", "87000", "60", "210"),
    ("2024", "Jun", "102000", "15", "310"),
    ("2024", "Jul", "113000", "0", "360"),
    ("2024", "Aug", "108000", "10", "330"),
    ("2024", "Sep", "93000", "45", "230"),
    ("2024", "Oct", "86000", "130", "120"),
    ("2024", "Nov", "100000", "290", "45"),
    ("2024", "Dec", "116000", "430", "15"),
];

pub const SAMPLE_AREA: &str = "10000";

pub fn sample_observations() -> Vec<RawObservation> {
    SAMPLE_ROWS
        .iter()
        .map(|(year, month, energy, hdd, cdd)| {
            RawObservation::new(year, month, energy, hdd, cdd)
        })
        .collect()
}

pub fn sample_input() -> AnalysisInput {
    AnalysisInput {
        settings: AnalysisSettings::new(
            SAMPLE_AREA,
            AreaUnit::SquareMetres,
            EnergyUnit::KilowattHours,
        ),
        observations: sample_observations(),
    }
}
