//! bundlefs HTTP adapter: serve a directory view as static content.
//!
//! The one contract here is exposing a merged tree (or a subtree) as a
//! directory-listable root. `ResourceServer` turns request paths into
//! complete `http::Response` values - file bytes with guessed mime types,
//! directory indexes, plain-text 404s - and leaves listening, routing and
//! transport to whatever server the application already runs.
//!
//! # Example
//!
//! ```rust
//! use bundlefs_http::ResourceServer;
//! use bundlefs_registry::Dir;
//! use bundlefs_tree::{Metadata, Node};
//!
//! let root = Node::dir("website", Metadata::DIR_DEFAULT).unwrap();
//! root.insert_child(Node::file("hello.txt", Metadata::FILE_DEFAULT, "hi").unwrap())
//!     .unwrap();
//!
//! let server = ResourceServer::new(Dir::new(root).unwrap());
//! let response = server.respond("hello.txt").unwrap();
//! assert_eq!(response.status(), 200);
//! assert_eq!(&response.body()[..], b"hi");
//! ```

mod error;
mod server;

pub use error::Error;
pub use server::ResourceServer;
