//! bundlefs generator: embed a directory tree as a registered bundle.
//!
//! This is the offline half of bundlefs. [`Bundler`] walks a real
//! directory into the compact bundle format; [`Generator`] emits a Rust
//! source module holding the compressed bytes and a `register()` function
//! that hands them to `bundlefs::add_resource` at program start.
//!
//! Output goes through the [`FileSystem`] capability - exactly
//! open-for-write, read and stat - so tests substitute [`MemFileSystem`]
//! and never touch the disk. The runtime crates have no dependency on any
//! of this.

mod bundler;
mod error;
mod fsys;
mod generator;

pub use bundler::Bundler;
pub use error::Error;
pub use fsys::{FileInfo, FileSystem, MemFileSystem, OsFileSystem};
pub use generator::{Generator, GeneratorConfig};
