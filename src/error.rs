//! Error types shared across the crate.
//!
//! Only two things can go wrong and both are terminal: the graphics
//! environment cannot be brought up, or the mesh cannot be loaded. Nothing
//! retries; the error is logged once and returned to the caller of
//! [`run`](crate::run).

use std::path::PathBuf;

/// Convenience alias used by every fallible function in the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error returned by the application entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The window, surface, adapter or device could not be created.
    #[error("graphics environment unavailable: {0}")]
    EnvironmentUnavailable(String),
    /// The mesh failed to load or its index list is malformed.
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),
}

impl Error {
    pub(crate) fn environment(what: impl std::fmt::Display) -> Self {
        Error::EnvironmentUnavailable(what.to_string())
    }
}

/// Reasons a mesh can fail to load or assemble.
#[derive(Debug, thiserror::Error)]
pub enum AssetLoadError {
    /// The mesh file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file was read but its contents are not valid geometry.
    #[error("parse error: {0}")]
    Parse(String),
    /// File format could not be determined from the extension.
    #[error("unknown mesh format: '{0}'")]
    UnknownFormat(String),
    /// An index points past the end of the point array.
    #[error("index {index} at position {position} is out of range ({point_count} points)")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        point_count: usize,
    },
    /// The index list does not describe whole triangles.
    #[error("index list of length {index_count} is not a whole number of triangles")]
    IncompleteTriangle { index_count: usize },
}
