use anyhow::anyhow;
use csv::{ReaderBuilder as CsvReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use std::io::{BufReader, Read};

pub fn ingest_for_processing(json: impl Read) -> Result<AnalysisInput, anyhow::Error> {
    serde_json::from_reader(BufReader::new(json))
        .map_err(|err| anyhow!("Could not parse analysis input: {err}"))
}

/// Reads observation rows from CSV with a `year,month,energy,hdd,cdd` header. All cells are
/// kept as text; numeric validation happens later so that bad cells drop a row rather than
/// failing the whole file.
pub fn read_observations_csv(csv: impl Read) -> anyhow::Result<Vec<RawObservation>> {
    let mut reader = CsvReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv);

    Ok(reader
        .deserialize::<RawObservation>()
        .collect::<Result<_, _>>()?)
}

/// A single month of user-entered data, unvalidated. Any other fields, such as a row `id` from an
/// editing front end, are ignored; rows are identified by their position.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct RawObservation {
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub energy: String,
    #[serde(default)]
    pub hdd: String,
    #[serde(default)]
    pub cdd: String,
}

impl RawObservation {
    pub fn new(year: &str, month: &str, energy: &str, hdd: &str, cdd: &str) -> Self {
        Self {
            year: year.into(),
            month: month.into(),
            energy: energy.into(),
            hdd: hdd.into(),
            cdd: cdd.into(),
        }
    }

    pub(crate) fn set_field(&mut self, field: ObservationField, value: String) {
        match field {
            ObservationField::Year => self.year = value,
            ObservationField::Month => self.month = value,
            ObservationField::Energy => self.energy = value,
            ObservationField::Hdd => self.hdd = value,
            ObservationField::Cdd => self.cdd = value,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationField {
    Year,
    Month,
    Energy,
    Hdd,
    Cdd,
}

#[derive(Clone, Copy, Debug, Default, Deserialize_enum_str, Eq, Hash, PartialEq, Serialize_enum_str)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum AreaUnit {
    #[default]
    #[serde(rename = "m²", alias = "m2")]
    SquareMetres,
    #[serde(rename = "ft²", alias = "ft2")]
    SquareFeet,
}

#[derive(Clone, Copy, Debug, Default, Deserialize_enum_str, Eq, Hash, PartialEq, Serialize_enum_str)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum EnergyUnit {
    #[default]
    #[serde(rename = "kWh")]
    KilowattHours,
    #[serde(rename = "GJ")]
    Gigajoules,
    #[serde(rename = "MWh")]
    MegawattHours,
    #[serde(rename = "MBtu")]
    MillionBtu,
}

/// Building-level settings captured alongside the monthly rows. The unit labels are carried
/// through to outputs unchanged; no conversion is ever performed.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub struct AnalysisSettings {
    /// Conditioned floor area, as entered.
    pub area: String,
    #[serde(default)]
    pub area_unit: AreaUnit,
    #[serde(default)]
    pub energy_unit: EnergyUnit,
}

impl AnalysisSettings {
    pub fn new(area: &str, area_unit: AreaUnit, energy_unit: EnergyUnit) -> Self {
        Self {
            area: area.into(),
            area_unit,
            energy_unit,
        }
    }

    /// Label for annual intensity figures, e.g. `kWh/m²/yr`.
    pub fn intensity_unit(&self) -> String {
        format!("{}/{}/yr", self.energy_unit, self.area_unit)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AnalysisInput {
    #[serde(flatten)]
    pub settings: AnalysisSettings,
    pub observations: Vec<RawObservation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    #[rstest]
    fn test_ingest_json_input() {
        let json = r#"{
            "area": "10000",
            "area_unit": "m²",
            "energy_unit": "MWh",
            "observations": [
                {"year": "2023", "month": "Jan", "energy": "120", "hdd": "450", "cdd": "10"}
            ]
        }"#;
        let input = ingest_for_processing(Cursor::new(json)).unwrap();

        assert_eq!(input.settings.area, "10000");
        assert_eq!(input.settings.area_unit, AreaUnit::SquareMetres);
        assert_eq!(input.settings.energy_unit, EnergyUnit::MegawattHours);
        assert_eq!(
            input.observations,
            vec![RawObservation::new("2023", "Jan", "120", "450", "10")]
        );
    }

    #[rstest]
    fn test_units_default_and_accept_ascii_aliases() {
        let json = r#"{"area": "500", "area_unit": "ft2", "observations": []}"#;
        let input = ingest_for_processing(Cursor::new(json)).unwrap();

        assert_eq!(input.settings.area_unit, AreaUnit::SquareFeet);
        assert_eq!(input.settings.energy_unit, EnergyUnit::KilowattHours);
        assert_eq!(input.settings.intensity_unit(), "kWh/ft²/yr");
    }

    #[rstest]
    fn test_ingest_rejects_unknown_energy_unit() {
        let json = r#"{"area": "500", "energy_unit": "therm", "observations": []}"#;
        assert!(ingest_for_processing(Cursor::new(json)).is_err());
    }

    #[rstest]
    fn test_read_observations_csv_keeps_bad_cells_as_text() {
        let csv = "year,month,energy,hdd,cdd\n2023, Jan ,120000,450,10\n2023,Feb,n/a,400,\n";
        let rows = read_observations_csv(Cursor::new(csv)).unwrap();

        assert_eq!(
            rows,
            vec![
                RawObservation::new("2023", "Jan", "120000", "450", "10"),
                RawObservation::new("2023", "Feb", "n/a", "400", ""),
            ]
        );
    }

    #[rstest]
    fn test_set_field_edits_only_that_field() {
        let mut row = RawObservation::default();
        row.set_field(ObservationField::Hdd, "42".into());

        assert_eq!(row, RawObservation::new("", "", "", "42", ""));
    }

    #[rstest]
    fn test_keyed_rows_are_ingested_in_order_ignoring_ids() {
        let json = r#"{
            "area": "100",
            "observations": [
                {"id": 7, "year": "2023", "month": "Feb", "energy": "90", "hdd": "8", "cdd": "1"},
                {"id": 3, "year": "2023", "month": "Jan", "energy": "100", "hdd": "10", "cdd": "0"}
            ]
        }"#;
        let input = ingest_for_processing(Cursor::new(json)).unwrap();

        assert_eq!(
            input.observations,
            vec![
                RawObservation::new("2023", "Feb", "90", "8", "1"),
                RawObservation::new("2023", "Jan", "100", "10", "0"),
            ]
        );
    }

    #[rstest]
    fn test_csv_id_column_is_ignored() {
        let csv = "id,year,month,energy,hdd,cdd\n12,2023,Jan,120000,450,10\n";
        let rows = read_observations_csv(Cursor::new(csv)).unwrap();

        assert_eq!(
            rows,
            vec![RawObservation::new("2023", "Jan", "120000", "450", "10")]
        );
    }
}
