use std::path::Path;

use encoding_rs::UTF_8;

use crate::model::response::Response;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A request line: the raw decoded text and the path it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub raw: String,
    pub path: String,
}

impl Request {
    /// Decodes one line read from the input stream.
    ///
    /// `Ok(None)` means the line was blank and must not be answered.
    /// `Err` already carries the reply for an undecodable line.
    pub fn decode(line: &[u8], first_line: bool) -> Result<Option<Request>, Response> {
        let bytes = if first_line {
            line.strip_prefix(&UTF8_BOM[..]).unwrap_or(line)
        } else {
            line
        };

        let raw = UTF_8
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or_else(|| Response::internal("request line is not valid UTF-8"))?
            .into_owned();

        let path = raw.trim();
        if path.is_empty() {
            return Ok(None);
        }

        let path = path.to_string();
        Ok(Some(Request { raw, path }))
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::lf(b"/tmp/a.png\n", "/tmp/a.png")]
    #[case::crlf(b"C:\\shots\\a.png\r\n", "C:\\shots\\a.png")]
    #[case::padded(b"  rel/a b.png \t\n", "rel/a b.png")]
    #[case::no_terminator(b"a.png", "a.png")]
    #[case::non_ascii("/tmp/スクショ.png\n".as_bytes(), "/tmp/スクショ.png")]
    fn trims_to_path(#[case] line: &[u8], #[case] expected: &str) {
        let req = Request::decode(line, false).unwrap().unwrap();
        assert_eq!(req.path, expected);
    }

    #[rstest]
    #[case(b"\n")]
    #[case(b"   \r\n")]
    #[case(b"\t \n")]
    #[case(b"")]
    fn blank_lines_are_skipped(#[case] line: &[u8]) {
        assert_eq!(Request::decode(line, false).unwrap(), None);
    }

    #[test]
    fn strips_bom_on_first_line_only() {
        let line = b"\xEF\xBB\xBFa.png\n";
        let first = Request::decode(line, true).unwrap().unwrap();
        assert_eq!(first.path, "a.png");

        let later = Request::decode(line, false).unwrap().unwrap();
        assert_eq!(later.path, "\u{feff}a.png");
    }

    #[test]
    fn invalid_utf8_is_answered_with_500() {
        let err = Request::decode(b"\xFF\xFEa.png\n", false).unwrap_err();
        assert_eq!(err.code, 500);
        assert_eq!(err.msg.as_deref(), Some("request line is not valid UTF-8"));
    }
}
