/// Scenario replay harness.
///
/// Loads a scenario JSON file, replays its operations through the engine
/// twice, checks both runs agree, and prints the announcement.
///
/// Usage: lineup_engine <scenario.json>...
/// Log level comes from RUST_LOG (e.g. RUST_LOG=lineup_engine=debug).

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use lineup_engine::scenario::Scenario;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: lineup_engine <scenario.json>...");
        return ExitCode::from(2);
    }

    let mut total = 0;
    let mut passed = 0;
    for path in &paths {
        total += 1;
        match run_one(path) {
            Ok(()) => passed += 1,
            Err(message) => {
                error!(%path, %message, "scenario failed");
                println!("[FAIL] {}: {}", path, message);
            }
        }
    }

    println!("\n===========================================");
    println!("Results: {}/{} scenarios replayed", passed, total);
    if passed == total {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_one(path: &str) -> Result<(), String> {
    let scenario = Scenario::load(path).map_err(|e| e.to_string())?;
    let first = scenario.run().map_err(|e| e.to_string())?;
    let second = scenario.run().map_err(|e| e.to_string())?;
    if first.state_hash != second.state_hash || first.announcement != second.announcement {
        return Err(format!(
            "determinism failure: run1={} run2={}",
            first.state_hash, second.state_hash
        ));
    }

    println!("[PASS] {}: hash={}", path, first.state_hash);
    for (op, outcome) in scenario.operations.iter().zip(&first.outcomes) {
        println!("  {:<26} {:?}", op.name(), outcome);
    }
    println!("--- display ---");
    println!("{}", first.announcement.display_text());
    println!("--- speech ---");
    println!("{}", first.announcement.speech_text());
    Ok(())
}
