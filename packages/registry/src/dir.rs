//! Directory views: a listable window onto one subtree.

use std::sync::Arc;

use serde::Serialize;

use bundlefs_tree::{Node, NodeKind, Path, ResourceFile};

use crate::Error;

/// A directory-listable view scoped to one subtree of the merged tree.
///
/// All paths taken by its methods are relative to the view's root; nothing
/// outside the subtree is reachable through it.
#[derive(Clone)]
pub struct Dir {
    node: Arc<Node>,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
    /// Content length in bytes; 0 for directories.
    pub size: u64,
    /// Permission bits.
    pub mode: u32,
    /// Modification time as unix seconds.
    pub modified: i64,
}

impl DirEntry {
    fn of(node: &Node) -> DirEntry {
        DirEntry {
            name: node.name().to_string(),
            kind: node.kind(),
            size: node.len(),
            mode: node.metadata().mode,
            modified: node.metadata().modified,
        }
    }
}

impl Dir {
    /// Wrap a directory node. Fails on file nodes.
    pub fn new(node: Arc<Node>) -> Result<Dir, Error> {
        if !node.is_dir() {
            return Err(Error::NotADirectory {
                path: Path::parse(node.name()),
            });
        }
        Ok(Dir { node })
    }

    /// The directory node backing this view.
    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    /// Resolve a relative path inside the view.
    pub fn lookup(&self, rel: &Path) -> Option<Arc<Node>> {
        self.node.lookup(rel)
    }

    /// Open a resource relative to the view's root.
    pub fn open(&self, rel: &Path) -> Result<ResourceFile, Error> {
        let node = self
            .node
            .lookup(rel)
            .ok_or_else(|| Error::NotFound { path: rel.clone() })?;
        Ok(ResourceFile::new(node))
    }

    /// Narrow the view to a subdirectory.
    pub fn subdir(&self, rel: &Path) -> Result<Dir, Error> {
        let node = self
            .node
            .lookup(rel)
            .ok_or_else(|| Error::NotFound { path: rel.clone() })?;
        if !node.is_dir() {
            return Err(Error::NotADirectory { path: rel.clone() });
        }
        Ok(Dir { node })
    }

    /// Direct children of the view's root, in insertion order.
    pub fn entries(&self) -> Vec<DirEntry> {
        self.node
            .children()
            .iter()
            .map(|child| DirEntry::of(child))
            .collect()
    }

    /// Direct children of the directory at `rel`.
    pub fn entries_at(&self, rel: &Path) -> Result<Vec<DirEntry>, Error> {
        Ok(self.subdir(rel)?.entries())
    }
}
