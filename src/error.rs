use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FlipbookError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid autoplay interval: {0} ms")]
    InvalidInterval(u64),

    #[error("Not a document (expected an image directory or a .cbz archive): {0}")]
    NotADocument(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for FlipbookError {
    fn from(value: String) -> Self {
        Self::Other(value)
    }
}

pub type Result<T> = std::result::Result<T, FlipbookError>;
