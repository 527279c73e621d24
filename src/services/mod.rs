pub mod loader;
pub mod tesseract;

use std::path::Path;

use crate::error::RecognizeError;
use crate::model::recognition::Recognition;

/// The OCR capability the request loop drives.
///
/// Implementations are built once at startup and only borrowed afterwards.
pub trait Recognizer {
    fn recognize(&self, path: &Path) -> Result<Recognition, RecognizeError>;
}
