//! Error types for the rehue library.

use std::io;
use thiserror::Error;

/// Result type alias for rehue operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during conversion.
///
/// Only a few failures are fatal for a conversion: the archive not being
/// a valid DOCX, the main document part missing, the body converter
/// raising, or (for the URL entry point) the download failing. Everything
/// else — unmatched color contexts, odd XML regions — is handled
/// best-effort and surfaced through logs, never through this type.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bytes are not a readable ZIP/DOCX archive.
    #[error("Cannot open archive: {0}")]
    ArchiveOpen(String),

    /// The archive opened but a required part is missing.
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// The body converter failed to produce HTML.
    #[error("Body conversion failed: {0}")]
    BodyConversion(String),

    /// URL entry point only: the fetch failed or returned an error status.
    #[error("Download failed: {0}")]
    Download(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ArchiveOpen(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
