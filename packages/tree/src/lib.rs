//! bundlefs tree: the in-memory node tree and file handles.
//!
//! This is the semantic core of bundlefs. A `Node` is one file or directory
//! entry in the virtual tree; a `ResourceFile` is a per-open cursor handle
//! over one node's content, implementing `std::io::{Read, Write, Seek}`.
//!
//! Every node guards its own mutable state (content bytes for files, the
//! child list for directories) with a reader/writer lock, so unrelated reads
//! and writes never contend and concurrent handles on the same node
//! interleave safely.
//!
//! # Example
//!
//! ```rust
//! use std::io::Read;
//! use bundlefs_tree::{Metadata, Node, ResourceFile, path};
//!
//! let root = Node::root(Metadata::DIR_DEFAULT);
//! let docs = Node::dir("docs", Metadata::DIR_DEFAULT).unwrap();
//! docs.insert_child(Node::file("readme.md", Metadata::FILE_DEFAULT, "hello").unwrap())
//!     .unwrap();
//! root.insert_child(docs).unwrap();
//!
//! let node = root.lookup(&path!("docs/readme.md")).unwrap();
//! let mut file = ResourceFile::new(node);
//! let mut out = String::new();
//! file.read_to_string(&mut out).unwrap();
//! assert_eq!(out, "hello");
//! ```

pub use bytes::Bytes;

mod error;
mod node;
mod path;
mod resource;

pub use error::TreeError;
pub use node::{Metadata, Node, NodeKind};
pub use path::Path;
pub use resource::{HandleError, ResourceFile};
