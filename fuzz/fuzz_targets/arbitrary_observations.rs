#![no_main]

use energy_signature::compute;
use energy_signature::input::{AnalysisSettings, RawObservation};
use energy_signature::AnalysisFlags;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, bool, Vec<RawObservation>)| {
    let (area, annualised, observations) = input;
    let settings = AnalysisSettings {
        area,
        ..Default::default()
    };
    let flags = if annualised {
        AnalysisFlags::ANNUALISED_BASELINE
    } else {
        AnalysisFlags::empty()
    };

    if let Ok(results) = compute(&observations, &settings, &flags) {
        assert!(results.normalised.len() >= 12);
        assert_eq!(
            results.annual.iter().map(|year| year.months).sum::<usize>(),
            results.normalised.len()
        );
    }
});
