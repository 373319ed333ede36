mod test_output {
    use crate::input::{AnalysisSettings, AreaUnit, EnergyUnit};
    use crate::output::{Output, SinkOutput};
    use crate::{run_analysis, run_analysis_from_csv, AnalysisFlags};
    use approx::assert_relative_eq;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::cell::RefCell;
    use std::io;
    use std::io::Write;
    use std::rc::Rc;

    /// Collects every written "file" in memory, keyed by `{location_key}.{extension}`.
    #[derive(Debug, Default)]
    struct MemoryOutput(Rc<RefCell<IndexMap<String, String>>>);

    impl MemoryOutput {
        fn file(&self, name: &str) -> String {
            self.0.borrow().get(name).cloned().unwrap_or_default()
        }

        fn file_names(&self) -> Vec<String> {
            self.0.borrow().keys().cloned().collect()
        }
    }

    impl Output for &MemoryOutput {
        fn writer_for_location_key(
            &self,
            location_key: &str,
            file_extension: &str,
        ) -> anyhow::Result<impl Write> {
            let name = format!("{location_key}.{file_extension}");
            self.0.borrow_mut().insert(name.clone(), String::new());
            Ok(MemoryFileWriter {
                files: self.0.clone(),
                name,
            })
        }
    }

    struct MemoryFileWriter {
        files: Rc<RefCell<IndexMap<String, String>>>,
        name: String,
    }

    impl Write for MemoryFileWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let utf8 = std::str::from_utf8(buf)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            self.files
                .borrow_mut()
                .entry(self.name.clone())
                .or_default()
                .push_str(utf8);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const SAMPLE_INPUT: &str = include_str!("../../demos/sample_input.json");
    const SAMPLE_CSV: &str = include_str!("../../demos/sample_observations.csv");

    #[fixture]
    fn output() -> MemoryOutput {
        MemoryOutput::default()
    }

    #[rstest]
    fn test_run_analysis_writes_three_files(output: MemoryOutput) {
        run_analysis(SAMPLE_INPUT.as_bytes(), &output, &AnalysisFlags::empty()).unwrap();

        assert_eq!(
            output.file_names(),
            vec!["normalised.csv", "annual.csv", "summary.csv"]
        );
    }

    #[rstest]
    fn test_normalised_file_has_headings_units_and_a_row_per_valid_month(output: MemoryOutput) {
        run_analysis(SAMPLE_INPUT.as_bytes(), &output, &AnalysisFlags::empty()).unwrap();

        let normalised = output.file("normalised.csv");
        let lines = normalised.lines().collect::<Vec<_>>();
        assert_eq!(
            lines[0],
            "Period,Total degree days,Actual energy,Normalised energy,Savings"
        );
        assert_eq!(lines[1], "[label],[degree days],[kWh],[kWh],[kWh]");
        assert_eq!(lines.len(), 2 + 24);
        assert!(lines[2].starts_with("Jan 2023,460,"));
    }

    #[rstest]
    fn test_annual_file_reports_each_year(output: MemoryOutput) {
        run_analysis(SAMPLE_INPUT.as_bytes(), &output, &AnalysisFlags::empty()).unwrap();

        let annual = output.file("annual.csv");
        let lines = annual.lines().collect::<Vec<_>>();
        assert_eq!(
            lines[0],
            "Year,Months,Annualisation factor,Actual EUI,Normalised EnPI"
        );
        assert_eq!(
            lines[1],
            "[label],[count],[ratio],[kWh/m²/yr],[kWh/m²/yr]"
        );
        assert!(lines[2].starts_with("2023,12,1,"));
        assert!(lines[3].starts_with("2024,12,1,"));
        assert_eq!(lines.len(), 4);
    }

    #[rstest]
    fn test_summary_file_lists_model_and_trend(output: MemoryOutput) {
        run_analysis(SAMPLE_INPUT.as_bytes(), &output, &AnalysisFlags::empty()).unwrap();

        let summary = output.file("summary.csv");
        let lines = summary.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Quantity,Value,Unit");
        assert_eq!(lines[1], "Conditioned area,10000,[m²]");
        assert!(lines.contains(&"Model,Energy = 147.69 × (HDD + CDD) + 52786,"));
        assert!(lines.contains(&"Baseline method,pooled months,"));
        assert!(lines.contains(&"Latest year,2024,[label]"));
        assert!(lines.contains(&"Trend,1.0% worse than baseline,"));
        assert_eq!(lines.last(), Some(&"Advisories,,"));
    }

    #[rstest]
    fn test_csv_input_matches_json_input() {
        let settings = AnalysisSettings::new("10000", AreaUnit::SquareMetres, EnergyUnit::KilowattHours);

        let from_csv = run_analysis_from_csv(
            SAMPLE_CSV.as_bytes(),
            &settings,
            SinkOutput,
            &AnalysisFlags::empty(),
        )
        .unwrap();
        let from_json =
            run_analysis(SAMPLE_INPUT.as_bytes(), SinkOutput, &AnalysisFlags::empty()).unwrap();

        assert_eq!(from_csv, from_json);
        assert_relative_eq!(from_csv.baseline_eui, 122.9, max_relative = 1e-6);
    }

    #[rstest]
    fn test_failed_analysis_writes_nothing(output: MemoryOutput) {
        let input = r#"{"area": "", "observations": []}"#;

        let result = run_analysis(input.as_bytes(), &output, &AnalysisFlags::empty());

        assert!(result.is_err());
        assert!(output.file_names().is_empty());
    }

    #[rstest]
    fn test_units_follow_settings(output: MemoryOutput) {
        let settings = AnalysisSettings::new("5000", AreaUnit::SquareFeet, EnergyUnit::Gigajoules);

        run_analysis_from_csv(
            SAMPLE_CSV.as_bytes(),
            &settings,
            &output,
            &AnalysisFlags::empty(),
        )
        .unwrap();

        let normalised = output.file("normalised.csv");
        assert_eq!(
            normalised.lines().nth(1),
            Some("[label],[degree days],[GJ],[GJ],[GJ]")
        );
        let annual = output.file("annual.csv");
        assert_eq!(
            annual.lines().nth(1),
            Some("[label],[count],[ratio],[GJ/ft²/yr],[GJ/ft²/yr]")
        );
    }
}
