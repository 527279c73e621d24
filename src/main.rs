#![windows_subsystem = "windows"]
use std::io;
use std::process::ExitCode;

mod config;
mod error;
mod model;
mod protocol;
mod services;
mod telemetry;

use config::LogConfig;
use services::loader;

fn main() -> ExitCode {
    init_telemetry();

    let mut stdout = io::stdout().lock();

    let engine = match loader::boot(&mut stdout, loader::initialize) {
        Ok(engine) => engine,
        Err(err) => return err.exit_code(),
    };

    let stats = protocol::serve(io::stdin().lock(), &mut stdout, &engine);

    tracing::info!(
        answered = stats.answered,
        skipped = stats.skipped,
        "input closed, shutting down"
    );
    ExitCode::SUCCESS
}

/// Logging problems go to stderr and never stop the handshake.
fn init_telemetry() {
    let config = LogConfig::from_env().unwrap_or_else(|e| {
        eprintln!("ocr-core: {e}; using default logging");
        LogConfig::default()
    });

    if let Err(e) = telemetry::initialise(&config) {
        eprintln!("ocr-core: {e}");
    }
}
