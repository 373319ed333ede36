use energy_signature::output::Output;
use energy_signature::{run_analysis, AnalysisFlags};
use lambda_http::{run, service_fn, tracing, Body, Error, Request, RequestExt, Response};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::io;
use std::io::{ErrorKind, Write};
use std::str::from_utf8;
use std::sync::Arc;
use uuid::Uuid;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    let input = match event.body() {
        Body::Empty => &[][..],
        Body::Text(text) => text.as_bytes(),
        Body::Binary(bytes) => bytes.as_slice(),
    };

    let flags = flags_from_query(&event);
    let output = LambdaOutput::new();

    let resp = match run_analysis(input, &output, &flags) {
        Ok(results) => Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&json!({
                "results": results,
                "performance": results.performance(),
                "files": output.into_files(),
            }))?))
            .map_err(Box::new)?,
        Err(e) => Response::builder()
            .status(422)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&json!({"errors": [{"id": Uuid::new_v4(), "status": "422", "detail": e.to_string()}]}))?))
            .map_err(Box::new)?,
    };

    Ok(resp)
}

/// `?baseline=annualised` selects the annualised baseline.
fn flags_from_query(event: &Request) -> AnalysisFlags {
    let mut flags = AnalysisFlags::empty();
    if event
        .query_string_parameters_ref()
        .and_then(|params| params.first("baseline"))
        == Some("annualised")
    {
        flags.insert(AnalysisFlags::ANNUALISED_BASELINE);
    }
    flags
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    run(service_fn(function_handler)).await
}

/// Collects each output "file" as a string so that they can be returned in the response body,
/// keyed by `{location_key}.{file_extension}`.
#[derive(Debug)]
struct LambdaOutput(Arc<Mutex<Vec<(String, String)>>>);

impl LambdaOutput {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::with_capacity(3))))
    }

    fn into_files(self) -> Map<String, Value> {
        let files = std::mem::take(&mut *self.0.lock());
        files
            .into_iter()
            .map(|(name, contents)| (name, Value::String(contents)))
            .collect()
    }
}

impl Output for &LambdaOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let mut files = self.0.lock();
        files.push((format!("{location_key}.{file_extension}"), String::new()));
        Ok(FileLikeStringWriter {
            files: self.0.clone(),
            index: files.len() - 1,
        })
    }
}

/// Represents a writer for an individual "file".
struct FileLikeStringWriter {
    files: Arc<Mutex<Vec<(String, String)>>>,
    index: usize,
}

impl Write for FileLikeStringWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let utf8 = match from_utf8(buf) {
            Ok(utf8) => utf8,
            Err(_) => {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    "Tried to write out invalid UTF-8.",
                ));
            }
        };
        self.files.lock()[self.index].1.push_str(utf8);
        Ok(utf8.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
