//! Error types for bundle encoding and decoding.

use bundlefs_tree::TreeError;

/// Errors raised while decoding a bundle body.
///
/// Decoding never partially applies: on any of these the caller discards
/// the partial tree and no registry state has been touched.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// The body is not a valid gzip stream.
    #[error("bundle body is not a valid gzip stream: {0}")]
    Compression(#[source] std::io::Error),

    /// The serialized tree ended before a field was complete.
    #[error("unexpected end of bundle data")]
    Truncated,

    /// A variable-width length field does not fit in 64 bits.
    #[error("length field overflows 64 bits")]
    VarintOverflow,

    /// A kind flag byte is neither the file nor the directory marker.
    #[error("invalid node kind flag {kind:#04x}")]
    InvalidKind { kind: u8 },

    /// A node name is not valid UTF-8.
    #[error("node name is not valid UTF-8")]
    InvalidUtf8,

    /// A node name is empty or contains the path separator.
    #[error("invalid node name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Two siblings share a name.
    #[error("duplicate sibling name '{name}'")]
    DuplicateName { name: String },

    /// The top-level node is not a directory.
    #[error("bundle root is not a directory")]
    RootNotDirectory,

    /// Bytes remain after the root node was fully decoded.
    #[error("{0} trailing bytes after root node")]
    TrailingBytes(usize),
}

impl From<TreeError> for DecodeError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::InvalidName { name, reason } => DecodeError::InvalidName { name, reason },
            TreeError::DuplicateChild { name } => DecodeError::DuplicateName { name },
            TreeError::NotADirectory { name } => DecodeError::InvalidName {
                name,
                reason: "children under a file node",
            },
        }
    }
}

/// Errors raised while encoding a tree into a bundle body.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    /// Only directory-rooted trees are encodable.
    #[error("bundle root must be a directory")]
    RootNotDirectory,

    /// The compressor failed.
    #[error("compression failed: {0}")]
    Io(#[from] std::io::Error),
}
