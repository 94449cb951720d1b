use std::path::{Path, PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported pixel type {pixel_type} for {target}")]
    UnsupportedPixelType { pixel_type: String, target: String },
    #[error("volume has no samples")]
    EmptyVolume,
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("could not read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("invalid MRC file {}: {source}", path.display())]
    InvalidMrc { path: PathBuf, source: ::mrc::Error },
    #[error("could not write {}: {source}", path.display())]
    WriteFailure { path: PathBuf, source: BoxError },
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("{0}")]
    General(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Wrapped(BoxError),
}

impl Error {
    pub fn general(message: impl Into<String>) -> Self {
        Self::General(message.into())
    }

    pub fn wrap(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Wrapped(Box::new(error))
    }

    pub fn unsupported(pixel_type: impl ToString, target: impl Into<String>) -> Self {
        Self::UnsupportedPixelType {
            pixel_type: pixel_type.to_string(),
            target: target.into(),
        }
    }

    /// Classify an I/O failure on an input path.
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path.to_path_buf())
        } else {
            Self::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn write(path: &Path, source: impl Into<BoxError>) -> Self {
        Self::WriteFailure {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}
