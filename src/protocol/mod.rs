//! The request loop: one path per input line, one JSON reply per output line.

use std::io::{BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::model::request::Request;
use crate::model::response::Response;
use crate::services::Recognizer;

pub mod codec;

const PANIC_MSG: &str = "internal core error";

/// Counters reported when the loop ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub answered: usize,
    pub skipped: usize,
}

/// Handles one decoded request. Both arms are complete replies.
pub fn handle<R>(request: &Request, recognizer: &R) -> Result<Response, Response>
where
    R: Recognizer + ?Sized,
{
    let path = request.path();
    if !path.is_file() {
        return Err(Response::not_found(&request.path));
    }

    let recognition = recognizer.recognize(path).map_err(|e| {
        tracing::warn!(path = %request.path, error = %e, "recognition failed");
        Response::internal(e.to_string())
    })?;

    tracing::debug!(
        path = %request.path,
        fragments = recognition.fragments.len(),
        elapsed_ms = elapsed_ms(recognition.elapsed),
        "recognized"
    );

    Ok(recognition.into())
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Turns one raw input line into its reply, or `None` for a blank line.
///
/// Nothing raised while handling the line escapes: errors are already
/// replies and panics become a `500`.
pub fn answer<R>(line: &[u8], first_line: bool, recognizer: &R) -> Option<Response>
where
    R: Recognizer + ?Sized,
{
    let request = match Request::decode(line, first_line) {
        Ok(Some(request)) => request,
        Ok(None) => return None,
        Err(response) => return Some(response),
    };

    tracing::trace!(raw = %request.raw.trim_end(), "request");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handle(&request, recognizer)));

    Some(match outcome {
        Ok(Ok(response)) | Ok(Err(response)) => response,
        Err(_) => {
            tracing::error!(path = %request.path, "recognizer panicked");
            Response::internal(PANIC_MSG)
        }
    })
}

/// Serves requests until `input` reaches end-of-stream.
///
/// A read error ends the loop like end-of-stream does, and so does a failed
/// write, since either way the parent can no longer be talked to.
pub fn serve<B, W, R>(mut input: B, output: &mut W, recognizer: &R) -> LoopStats
where
    B: BufRead,
    W: Write,
    R: Recognizer + ?Sized,
{
    let mut stats = LoopStats::default();
    let mut line = Vec::with_capacity(256);
    let mut first_line = true;

    loop {
        line.clear();
        match input.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "input stream failed, shutting down");
                break;
            }
        }

        let is_first = std::mem::replace(&mut first_line, false);
        let Some(response) = answer(&line, is_first, recognizer) else {
            stats.skipped += 1;
            continue;
        };

        if let Err(e) = codec::write_response(output, &response) {
            tracing::warn!(error = %e, "output stream closed, shutting down");
            break;
        }
        stats.answered += 1;
    }

    stats
}
