//! Error types for the generator.

use std::path::PathBuf;

use bundlefs_codec::EncodeError;
use bundlefs_tree::TreeError;

/// Errors raised while bundling a directory or emitting source.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The target package identifier was not configured.
    #[error("package identifier is required")]
    MissingPackage,

    /// The configured package identifier is not a valid Rust identifier.
    #[error("invalid package identifier {name:?}")]
    InvalidPackage { name: String },

    /// The bundle source path is not a directory.
    #[error("'{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// A file name under the source directory is not valid UTF-8 and
    /// cannot become a node name.
    #[error("file name '{}' is not valid UTF-8", path.display())]
    InvalidFileName { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}
