//! Error types for tree construction and mutation.

/// Errors raised when building or mutating the node tree.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A node name is empty or contains the path separator.
    #[error("invalid node name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A directory already has a child with this name.
    #[error("duplicate child '{name}'")]
    DuplicateChild { name: String },

    /// A child was inserted under a file node.
    #[error("'{name}' is not a directory")]
    NotADirectory { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = TreeError::InvalidName {
            name: "a/b".to_string(),
            reason: "contains path separator",
        };
        assert!(format!("{}", e).contains("a/b"));
        assert!(format!("{}", e).contains("separator"));

        let e = TreeError::DuplicateChild {
            name: "logo.png".to_string(),
        };
        assert!(format!("{}", e).contains("logo.png"));
    }
}
