pub mod docx;
pub mod pdf;

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{}: unsupported file type `{extension}`", .path.display())]
    Unsupported { path: PathBuf, extension: String },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: not valid UTF-8 text", .path.display())]
    Decode { path: PathBuf },
    #[error("{}: unreadable PDF: {reason}", .path.display())]
    Pdf { path: PathBuf, reason: String },
    #[error("{}: unreadable DOCX: {reason}", .path.display())]
    Docx { path: PathBuf, reason: String },
}

impl ExtractionError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// File formats we can pull text out of, keyed by declared extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extract(self, path: &Path) -> Result<String, ExtractionError> {
        match self {
            Self::PlainText => read_plain_text(path),
            Self::Pdf => pdf::extract(path),
            Self::Docx => docx::extract(path),
        }
    }
}

/// Extract raw text from `path`, treating it as `declared_extension`.
pub fn extract_text(path: &Path, declared_extension: &str) -> Result<String, ExtractionError> {
    match DocumentFormat::from_extension(declared_extension) {
        Some(format) => format.extract(path),
        None => Err(ExtractionError::Unsupported {
            path: path.to_path_buf(),
            extension: declared_extension.to_string(),
        }),
    }
}

fn read_plain_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| ExtractionError::Decode {
        path: path.to_path_buf(),
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
