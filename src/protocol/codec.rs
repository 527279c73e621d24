use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::model::response::Response;

pub const READY: &str = "READY";

const ENCODE_FAILED_LINE: &[u8] = b"{\"code\":500,\"msg\":\"failed to encode response\"}\n";

/// Compact JSON whose strings contain ASCII only; everything else becomes `\uXXXX`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;

        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            if start < i {
                writer.write_all(fragment[start..i].as_bytes())?;
            }
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }

        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serializes `value` into one newline-terminated, ASCII-only line.
pub fn encode_line<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::with_capacity(64);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Writes one response line and flushes so the waiting parent sees it at once.
pub fn write_response<W: Write>(out: &mut W, response: &Response) -> io::Result<()> {
    match encode_line(response) {
        Ok(line) => out.write_all(&line)?,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response");
            out.write_all(ENCODE_FAILED_LINE)?;
        }
    }
    out.flush()
}

pub fn write_ready<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{READY}")?;
    out.flush()
}
