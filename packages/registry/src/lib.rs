//! bundlefs registry: merging bundles into one addressable tree.
//!
//! A `Registry` accepts bundles contributed at program start - typically
//! from several independently compiled components - and merges their trees
//! into a single namespace with deterministic path resolution. Directories
//! merge by union; on any other collision the last registration wins, which
//! lets one component deliberately override another's default asset.
//!
//! # Example
//!
//! ```rust
//! use std::io::Read;
//! use bundlefs_codec::{encode, Bundle};
//! use bundlefs_registry::Registry;
//! use bundlefs_tree::{path, Metadata, Node};
//!
//! let root = Node::root(Metadata::DIR_DEFAULT);
//! root.insert_child(Node::file("motd.txt", Metadata::FILE_DEFAULT, "welcome").unwrap())
//!     .unwrap();
//! let bundle = Bundle::new("assets", encode(&root).unwrap());
//!
//! let registry = Registry::new();
//! registry.register(&bundle).unwrap();
//!
//! let mut file = registry.open(&path!("motd.txt")).unwrap();
//! let mut out = String::new();
//! file.read_to_string(&mut out).unwrap();
//! assert_eq!(out, "welcome");
//! ```

mod dir;
mod error;
mod registry;

pub use dir::{Dir, DirEntry};
pub use error::Error;
pub use registry::{MergeOutcome, Registry};
