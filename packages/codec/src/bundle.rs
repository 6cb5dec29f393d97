//! The bundle transport type.

use bytes::Bytes;

/// A named, compressed snapshot of a directory tree.
///
/// The body is opaque input at runtime: it is produced by the offline
/// generator and decoded exactly once when the bundle is registered. The
/// name exists for diagnostics only and never affects path resolution.
#[derive(Debug, Clone)]
pub struct Bundle {
    name: String,
    body: Bytes,
}

impl Bundle {
    pub fn new(name: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Bundle {
            name: name.into(),
            body: body.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
