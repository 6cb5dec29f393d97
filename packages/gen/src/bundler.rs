//! Walking a source directory into an encoded bundle.

use std::path::Path as StdPath;

use walkdir::WalkDir;

use bundlefs_codec::{encode, Bundle};
use bundlefs_tree::{Metadata, Node, Path};

use crate::{Error, FileSystem};

/// Builds bundles by walking a real directory tree.
///
/// Enumeration is sorted so the same directory always produces the same
/// bundle bytes; content and metadata are taken through the
/// [`FileSystem`] capability.
pub struct Bundler<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> Bundler<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Bundler { fs }
    }

    /// Snapshot the directory at `dir` into a bundle named `name`.
    pub fn bundle(&self, dir: &StdPath, name: &str) -> Result<Bundle, Error> {
        let info = self.fs.stat(dir)?;
        if !info.is_dir {
            return Err(Error::NotADirectory {
                path: dir.to_path_buf(),
            });
        }
        let root = Node::root(Metadata {
            mode: info.mode,
            modified: info.modified,
        });

        // Pre-order traversal: every parent is visited before its children.
        for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(dir)
                .expect("walkdir yields paths under the walk root");

            let name = rel
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| Error::InvalidFileName {
                    path: entry.path().to_path_buf(),
                })?;
            let parent_path = Path::from_components(
                rel.parent()
                    .map(components_of)
                    .transpose()?
                    .unwrap_or_default(),
            );
            let parent = root
                .lookup(&parent_path)
                .expect("pre-order walk visits parents before children");

            let info = self.fs.stat(entry.path())?;
            let meta = Metadata {
                mode: info.mode,
                modified: info.modified,
            };
            let node = if entry.file_type().is_dir() {
                Node::dir(name, meta)?
            } else {
                Node::file(name, meta, self.fs.read(entry.path())?)?
            };
            parent.insert_child(node)?;
        }

        log::debug!("bundled '{}' from {}", name, dir.display());
        Ok(Bundle::new(name, encode(&root)?))
    }
}

fn components_of(path: &StdPath) -> Result<Vec<&str>, Error> {
    path.iter()
        .map(|c| {
            c.to_str().ok_or_else(|| Error::InvalidFileName {
                path: path.to_path_buf(),
            })
        })
        .collect()
}
