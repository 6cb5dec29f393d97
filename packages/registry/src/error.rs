//! Error types for registry operations.

use bundlefs_codec::DecodeError;
use bundlefs_tree::{Path, TreeError};

/// Errors raised by registry operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The path is absent from the merged tree.
    ///
    /// This is a normal, expected outcome - callers probing for optional
    /// assets handle it rather than treating it as a defect.
    #[error("resource not found: '{path}'")]
    NotFound { path: Path },

    /// A directory operation was applied to a file node.
    #[error("not a directory: '{path}'")]
    NotADirectory { path: Path },

    /// The bundle body could not be decoded; nothing was merged.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A tree invariant was violated while merging.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlefs_tree::path;

    #[test]
    fn error_display() {
        let e = Error::NotFound {
            path: path!("does/not/exist"),
        };
        assert!(format!("{}", e).contains("does/not/exist"));

        let e = Error::NotADirectory {
            path: path!("message.txt"),
        };
        assert!(format!("{}", e).contains("message.txt"));
    }

    #[test]
    fn decode_error_passes_through_unchanged() {
        let e = Error::from(DecodeError::Truncated);
        assert!(matches!(e, Error::Decode(DecodeError::Truncated)));
    }
}
