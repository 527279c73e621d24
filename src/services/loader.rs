use std::io::Write;

use crate::config::EngineConfig;
use crate::error::StartupError;
use crate::model::response::Response;
use crate::protocol::codec;
use crate::services::tesseract::{self, TesseractEngine};

/// Reads the engine settings and brings up the Tesseract binding.
pub fn initialize() -> Result<TesseractEngine, StartupError> {
    initialize_with(|key| std::env::var(key).ok())
}

/// The executable is started once before the remaining settings are parsed, so a
/// missing engine is reported as such even when the configuration is also bad.
pub fn initialize_with<F>(lookup: F) -> Result<TesseractEngine, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let banner = tesseract::check_executable(&EngineConfig::command_from_lookup(&lookup))?;
    let config = EngineConfig::from_lookup(&lookup)?;
    TesseractEngine::from_banner(config, &banner)
}

/// Runs `init` once and performs the startup handshake on `out`.
///
/// Success writes `READY`; failure writes one `500` line. Nothing else is
/// written here, so `READY` is always the first protocol line on success.
pub fn boot<R, W, F>(out: &mut W, init: F) -> Result<R, StartupError>
where
    W: Write,
    F: FnOnce() -> Result<R, StartupError>,
{
    match init() {
        Ok(recognizer) => {
            if let Err(e) = codec::write_ready(out) {
                tracing::warn!(error = %e, "could not write readiness signal");
            }
            Ok(recognizer)
        }
        Err(err) => {
            tracing::error!(error = %err, "startup failed");
            if let Err(e) = codec::write_response(out, &Response::internal(err.to_string())) {
                tracing::warn!(error = %e, "could not report startup failure");
            }
            Err(err)
        }
    }
}
