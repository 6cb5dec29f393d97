//! bundlefs codec: the compact bundle format.
//!
//! A bundle is a named, gzip-compressed, serialized snapshot of a directory
//! tree, produced once at build time and decoded into the node tree at
//! program start. The serialization is depth-first pre-order with
//! variable-width length fields, so decoding is a single forward pass with
//! no backward seeks.
//!
//! Per node: a one-byte kind flag, LEB128 name length plus name bytes, a
//! 64-bit little-endian modification time, 32-bit little-endian permission
//! bits, then the kind-specific payload - content length and bytes for
//! files, child count and recursively encoded children for directories.
//! The root is always a directory node.
//!
//! # Example
//!
//! ```rust
//! use bundlefs_codec::{decode, encode, Bundle};
//! use bundlefs_tree::{path, Metadata, Node};
//!
//! let root = Node::root(Metadata::DIR_DEFAULT);
//! root.insert_child(Node::file("message.txt", Metadata::FILE_DEFAULT, "hi").unwrap())
//!     .unwrap();
//!
//! let bundle = Bundle::new("assets", encode(&root).unwrap());
//! let decoded = decode(&bundle).unwrap();
//! assert_eq!(&decoded.lookup(&path!("message.txt")).unwrap().content()[..], b"hi");
//! ```

mod bundle;
mod error;
mod wire;

pub use bundle::Bundle;
pub use error::{DecodeError, EncodeError};
pub use wire::{decode, encode};
