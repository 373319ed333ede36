#![no_main]

use energy_signature::output::Output;
use energy_signature::{run_analysis, AnalysisFlags};
use libfuzzer_sys::fuzz_target;
use std::io;
use std::io::{BufReader, Cursor, Write};

fuzz_target!(|data: &[u8]| {
    let _run = run_analysis(
        BufReader::new(Cursor::new(data)),
        WritingSinkOutput,
        &AnalysisFlags::empty(),
    );
});

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct WritingSinkOutput;

impl Output for WritingSinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        // not a no-op, so that fuzzing exercises the CSV writers
        false
    }
}
