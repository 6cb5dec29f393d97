//! File handles over node content.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use crate::Node;

/// Handle misuse errors, surfaced as the source of an `std::io::Error`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// Read or write on a handle after `close()`.
    #[error("resource handle is closed")]
    Closed,

    /// Write through a handle bound to a directory node.
    #[error("'{name}' is a directory, not a file")]
    NotAFile { name: String },

    /// Seek that would land before the start of the content.
    #[error("seek to negative offset {offset}")]
    NegativeOffset { offset: i64 },
}

impl From<HandleError> for io::Error {
    fn from(e: HandleError) -> Self {
        let kind = match e {
            HandleError::Closed => io::ErrorKind::Other,
            HandleError::NotAFile { .. } => io::ErrorKind::InvalidInput,
            HandleError::NegativeOffset { .. } => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, e)
    }
}

/// A transient read/write/seek handle bound to one node's content.
///
/// Every open produces a fresh handle with its own cursor; any number of
/// handles may reference the same node concurrently. Each read or write
/// holds the node's lock only for that single operation, so a long-lived
/// reader never blocks a writer beyond one operation's duration.
///
/// Closing discards the cursor; the node's content persists for subsequent
/// opens. Handles bound to directory nodes read as immediately
/// end-of-content and reject writes.
#[derive(Debug)]
pub struct ResourceFile {
    node: Arc<Node>,
    cursor: u64,
    closed: bool,
}

impl ResourceFile {
    /// Create a handle over `node` with the cursor at the start.
    pub fn new(node: Arc<Node>) -> Self {
        ResourceFile {
            node,
            cursor: 0,
            closed: false,
        }
    }

    /// The node this handle is bound to.
    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release the handle. Idempotent: closing twice is not an error.
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn check_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(HandleError::Closed.into());
        }
        Ok(())
    }
}

impl Read for ResourceFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_open()?;
        let n = self.node.read_at(self.cursor, buf);
        self.cursor += n as u64;
        Ok(n)
    }
}

impl Write for ResourceFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_open()?;
        if self.node.is_dir() {
            return Err(HandleError::NotAFile {
                name: self.node.name().to_string(),
            }
            .into());
        }
        let n = self.node.write_at(self.cursor, buf);
        self.cursor += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check_open()
    }
}

impl Seek for ResourceFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.check_open()?;
        let target: i128 = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.cursor as i128 + delta as i128,
            SeekFrom::End(delta) => self.node.len() as i128 + delta as i128,
        };
        if target < 0 {
            return Err(HandleError::NegativeOffset {
                offset: target as i64,
            }
            .into());
        }
        self.cursor = target as u64;
        Ok(self.cursor)
    }
}
