//! bundlefs: embedded static resources behind a filesystem-like API.
//!
//! A build-time generator snapshots a directory tree into a compressed
//! bundle and emits source that registers it here at program start. Any
//! number of independently compiled components can contribute bundles;
//! they merge into one process-wide tree, and application code reads and
//! writes resources through handles that behave like ordinary files.
//!
//! This crate is the facade: the package-level operations delegate to a
//! process-wide [`Registry`] constructed on first use. The layers beneath
//! it - `bundlefs-tree`, `bundlefs-codec`, `bundlefs-registry` - are
//! re-exported so applications and generated code depend on this crate
//! alone.
//!
//! # Example
//!
//! ```rust
//! use std::io::Read;
//! use bundlefs::{Bundle, Metadata, Node};
//!
//! // Generated registration code does this with embedded bytes:
//! let tree = Node::root(Metadata::DIR_DEFAULT);
//! tree.insert_child(Node::file("message.txt", Metadata::FILE_DEFAULT, "hello").unwrap())
//!     .unwrap();
//! bundlefs::add_resource(Bundle::new("demo", bundlefs::encode(&tree).unwrap())).unwrap();
//!
//! // Application code opens resources like files:
//! let mut file = bundlefs::open("message.txt").unwrap();
//! let mut out = String::new();
//! file.read_to_string(&mut out).unwrap();
//! assert_eq!(out, "hello");
//! # bundlefs::reset();
//! ```

pub use bundlefs_codec::{decode, encode, Bundle, DecodeError, EncodeError};
pub use bundlefs_registry::{Dir, DirEntry, Error, MergeOutcome, Registry};
pub use bundlefs_tree::{
    path, HandleError, Metadata, Node, NodeKind, Path, ResourceFile, TreeError,
};

lazy_static::lazy_static! {
    /// The process-wide registry, constructed on first use.
    static ref REGISTRY: Registry = Registry::new();
}

/// Register a bundle with the process-wide registry.
///
/// This is the entry point generated startup code calls once per embedded
/// bundle. Safe under concurrent invocation; once it returns, the bundle's
/// content is visible to `open` on every thread.
pub fn add_resource(bundle: Bundle) -> Result<MergeOutcome, Error> {
    REGISTRY.register(&bundle)
}

/// Open the resource at `path` for reading and writing.
pub fn open(path: &str) -> Result<ResourceFile, Error> {
    REGISTRY.open(&Path::parse(path))
}

/// A directory-listable view of the merged tree, scoped to `prefix`.
///
/// Pass `""` or `"/"` for the whole tree. The returned view is suitable as
/// the root of a generic static-content server.
pub fn root(prefix: &str) -> Result<Dir, Error> {
    REGISTRY.root(&Path::parse(prefix))
}

/// Discard all registered content.
///
/// Intended for tests that need isolation between runs; production code
/// has no reason to call this.
pub fn reset() {
    REGISTRY.reset()
}
