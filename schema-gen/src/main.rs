use energy_signature::input::AnalysisInput;
use schemars::schema_for;

fn main() {
    let schema = schema_for!(AnalysisInput);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
