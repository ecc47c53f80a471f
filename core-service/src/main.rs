//! Energy Theft Detection - CLI Entry Point
//!
//! Reads one JSON record per stdin line, prints one verdict per line.
//!
//! ```text
//! echo '{"Age":35,"Energy_Consumption":1500,...}' | energy-theft-core
//! ```

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use energy_theft_core::constants::{APP_NAME, APP_VERSION};
use energy_theft_core::logic::pipeline::get_stats;
use energy_theft_core::{ArtifactConfig, InferencePipeline, RawInput};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = ArtifactConfig::from_env();
    let pipeline = match InferencePipeline::load(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            log::error!("Startup aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("stdin read failed: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let output = RawInput::from_json(&line)
            .and_then(|input| pipeline.predict_input(input))
            .unwrap_or_else(|e| format!("❌ Rejected: {}", e));

        if writeln!(stdout, "{}", output).is_err() {
            // Downstream pipe closed
            break;
        }
    }

    let stats = get_stats();
    log::info!(
        "Done: {} predictions, {} abnormal, {} rejected",
        stats.predictions,
        stats.abnormal,
        stats.rejected
    );

    ExitCode::SUCCESS
}
