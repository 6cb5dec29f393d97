//! Nodes: file and directory entries in the virtual tree.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Path, TreeError};

/// Whether a node is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Dir,
}

/// Fixed per-node metadata captured when the node is built or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Permission bits, in the usual octal convention.
    pub mode: u32,
    /// Modification time as unix seconds.
    pub modified: i64,
}

impl Metadata {
    /// Default metadata for file nodes built without a real source.
    pub const FILE_DEFAULT: Metadata = Metadata {
        mode: 0o644,
        modified: 0,
    };

    /// Default metadata for directory nodes built without a real source.
    pub const DIR_DEFAULT: Metadata = Metadata {
        mode: 0o755,
        modified: 0,
    };
}

/// One entry in the virtual tree.
///
/// A node's name, kind and metadata are fixed at construction. Its mutable
/// state - content bytes for files, the child list for directories - sits
/// behind a per-node reader/writer lock, so unrelated subtrees never
/// contend and concurrent handles on one node interleave safely.
///
/// Invariants: sibling names are unique, names never contain the path
/// separator, file nodes never have children, directory nodes never have
/// content. Only the synthetic root (see [`Node::root`]) has an empty name.
#[derive(Debug)]
pub struct Node {
    name: String,
    kind: NodeKind,
    meta: Metadata,
    state: RwLock<NodeState>,
}

#[derive(Debug, Default)]
struct NodeState {
    content: Vec<u8>,
    children: Vec<Arc<Node>>,
}

impl Node {
    /// Build a file node with the given content.
    pub fn file(
        name: impl Into<String>,
        meta: Metadata,
        content: impl Into<Vec<u8>>,
    ) -> Result<Arc<Node>, TreeError> {
        let name = name.into();
        Self::validate_name(&name)?;
        Ok(Arc::new(Node {
            name,
            kind: NodeKind::File,
            meta,
            state: RwLock::new(NodeState {
                content: content.into(),
                children: Vec::new(),
            }),
        }))
    }

    /// Build an empty directory node.
    pub fn dir(name: impl Into<String>, meta: Metadata) -> Result<Arc<Node>, TreeError> {
        let name = name.into();
        Self::validate_name(&name)?;
        Ok(Arc::new(Node {
            name,
            kind: NodeKind::Dir,
            meta,
            state: RwLock::new(NodeState::default()),
        }))
    }

    /// Build the synthetic root directory.
    ///
    /// The root is the only node with an empty name; it never appears as a
    /// child of another node.
    pub fn root(meta: Metadata) -> Arc<Node> {
        Arc::new(Node {
            name: String::new(),
            kind: NodeKind::Dir,
            meta,
            state: RwLock::new(NodeState::default()),
        })
    }

    fn validate_name(name: &str) -> Result<(), TreeError> {
        if name.is_empty() {
            return Err(TreeError::InvalidName {
                name: name.to_string(),
                reason: "empty name",
            });
        }
        if name.contains('/') {
            return Err(TreeError::InvalidName {
                name: name.to_string(),
                reason: "contains path separator",
            });
        }
        Ok(())
    }

    // A poisoned lock only means another thread panicked mid-operation;
    // the byte buffers are still structurally valid, so recover the guard.
    fn read_state(&self) -> RwLockReadGuard<'_, NodeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, NodeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Dir
    }

    pub fn metadata(&self) -> Metadata {
        self.meta
    }

    /// Content length in bytes. Always 0 for directories.
    pub fn len(&self) -> u64 {
        self.read_state().content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the node's content. Empty for directories.
    pub fn content(&self) -> Bytes {
        Bytes::copy_from_slice(&self.read_state().content)
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<Arc<Node>> {
        self.read_state()
            .children
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    /// Direct children in insertion order.
    pub fn children(&self) -> Vec<Arc<Node>> {
        self.read_state().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.read_state().children.len()
    }

    /// Append a child, keeping sibling names unique.
    pub fn insert_child(&self, child: Arc<Node>) -> Result<(), TreeError> {
        if !self.is_dir() {
            return Err(TreeError::NotADirectory {
                name: self.name.clone(),
            });
        }
        let mut state = self.write_state();
        if state.children.iter().any(|c| c.name == child.name) {
            return Err(TreeError::DuplicateChild {
                name: child.name.clone(),
            });
        }
        state.children.push(child);
        Ok(())
    }

    /// Replace the child sharing the new child's name, or append if absent.
    ///
    /// Returns the displaced node, if any. Existing handles on a displaced
    /// node keep reading its old content; only later lookups see the
    /// replacement.
    pub fn replace_child(&self, child: Arc<Node>) -> Result<Option<Arc<Node>>, TreeError> {
        if !self.is_dir() {
            return Err(TreeError::NotADirectory {
                name: self.name.clone(),
            });
        }
        let mut state = self.write_state();
        match state.children.iter().position(|c| c.name == child.name) {
            Some(i) => Ok(Some(std::mem::replace(&mut state.children[i], child))),
            None => {
                state.children.push(child);
                Ok(None)
            }
        }
    }

    /// Remove all children. No-op on file nodes.
    pub fn clear_children(&self) {
        self.write_state().children.clear();
    }

    /// Resolve a descendant by relative path.
    ///
    /// Descends component-by-component; each ancestor's lock is taken only
    /// for the single child lookup, never across the whole traversal.
    /// The empty path resolves to this node itself.
    pub fn lookup(self: &Arc<Self>, path: &Path) -> Option<Arc<Node>> {
        let mut current = Arc::clone(self);
        for component in path.iter() {
            let next = current.child(component)?;
            current = next;
        }
        Some(current)
    }

    /// Copy content starting at `pos` into `buf`, returning the bytes copied.
    pub(crate) fn read_at(&self, pos: u64, buf: &mut [u8]) -> usize {
        let state = self.read_state();
        let len = state.content.len() as u64;
        if pos >= len {
            return 0;
        }
        let start = pos as usize;
        let n = buf.len().min(state.content.len() - start);
        buf[..n].copy_from_slice(&state.content[start..start + n]);
        n
    }

    /// Write `data` at `pos`, overwriting in place and growing the content
    /// when the write extends past the current length. A seek gap beyond
    /// the old end is zero-filled.
    pub(crate) fn write_at(&self, pos: u64, data: &[u8]) -> usize {
        let mut state = self.write_state();
        let start = pos as usize;
        let end = start + data.len();
        if end > state.content.len() {
            state.content.resize(end, 0);
        }
        state.content[start..end].copy_from_slice(data);
        data.len()
    }
}

impl PartialEq for Node {
    /// Structural equality over the whole subtree: name, kind, metadata,
    /// content bytes and children (in order).
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name || self.kind != other.kind || self.meta != other.meta {
            return false;
        }
        let a = self.read_state();
        let b = other.read_state();
        a.content == b.content
            && a.children.len() == b.children.len()
            && a.children
                .iter()
                .zip(b.children.iter())
                .all(|(x, y)| x == y)
    }
}

impl Eq for Node {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    fn sample_tree() -> Arc<Node> {
        let root = Node::root(Metadata::DIR_DEFAULT);
        let site = Node::dir("site", Metadata::DIR_DEFAULT).unwrap();
        site.insert_child(Node::file("index.html", Metadata::FILE_DEFAULT, "<html>").unwrap())
            .unwrap();
        site.insert_child(Node::file("style.css", Metadata::FILE_DEFAULT, "body{}").unwrap())
            .unwrap();
        root.insert_child(site).unwrap();
        root.insert_child(Node::file("message.txt", Metadata::FILE_DEFAULT, "hi").unwrap())
            .unwrap();
        root
    }

    #[test]
    fn build_and_lookup() {
        let root = sample_tree();
        let node = root.lookup(&path!("site/index.html")).unwrap();
        assert_eq!(node.name(), "index.html");
        assert_eq!(node.kind(), NodeKind::File);
        assert_eq!(&node.content()[..], b"<html>");
    }

    #[test]
    fn empty_path_resolves_to_self() {
        let root = sample_tree();
        let node = root.lookup(&path!("")).unwrap();
        assert!(Arc::ptr_eq(&root, &node));
    }

    #[test]
    fn lookup_missing_returns_none() {
        let root = sample_tree();
        assert!(root.lookup(&path!("does/not/exist")).is_none());
        // Traversal through a file dead-ends the same way.
        assert!(root.lookup(&path!("message.txt/child")).is_none());
    }

    #[test]
    fn children_keep_insertion_order() {
        let root = sample_tree();
        let site = root.lookup(&path!("site")).unwrap();
        let children = site.children();
        let names: Vec<&str> = children.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["index.html", "style.css"]);
    }

    #[test]
    fn invalid_names_rejected() {
        assert!(matches!(
            Node::file("", Metadata::FILE_DEFAULT, "x"),
            Err(TreeError::InvalidName { .. })
        ));
        assert!(matches!(
            Node::dir("a/b", Metadata::DIR_DEFAULT),
            Err(TreeError::InvalidName { .. })
        ));
    }

    #[test]
    fn duplicate_sibling_rejected() {
        let dir = Node::dir("d", Metadata::DIR_DEFAULT).unwrap();
        dir.insert_child(Node::file("a", Metadata::FILE_DEFAULT, "1").unwrap())
            .unwrap();
        let err = dir
            .insert_child(Node::file("a", Metadata::FILE_DEFAULT, "2").unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::DuplicateChild {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn insert_under_file_rejected() {
        let file = Node::file("f", Metadata::FILE_DEFAULT, "x").unwrap();
        let err = file
            .insert_child(Node::file("a", Metadata::FILE_DEFAULT, "1").unwrap())
            .unwrap_err();
        assert!(matches!(err, TreeError::NotADirectory { .. }));
    }

    #[test]
    fn replace_child_swaps_and_reports_old() {
        let dir = Node::dir("d", Metadata::DIR_DEFAULT).unwrap();
        dir.insert_child(Node::file("a", Metadata::FILE_DEFAULT, "old").unwrap())
            .unwrap();
        let old = dir
            .replace_child(Node::file("a", Metadata::FILE_DEFAULT, "new").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(&old.content()[..], b"old");
        assert_eq!(&dir.child("a").unwrap().content()[..], b"new");
        assert_eq!(dir.child_count(), 1);
    }

    #[test]
    fn replace_child_appends_when_absent() {
        let dir = Node::dir("d", Metadata::DIR_DEFAULT).unwrap();
        assert!(dir
            .replace_child(Node::file("a", Metadata::FILE_DEFAULT, "x").unwrap())
            .unwrap()
            .is_none());
        assert_eq!(dir.child_count(), 1);
    }

    #[test]
    fn write_at_grows_and_zero_fills() {
        let file = Node::file("f", Metadata::FILE_DEFAULT, "ab").unwrap();
        assert_eq!(file.write_at(4, b"cd"), 2);
        assert_eq!(&file.content()[..], b"ab\0\0cd");
        assert_eq!(file.len(), 6);
    }

    #[test]
    fn write_at_overwrites_in_place() {
        let file = Node::file("f", Metadata::FILE_DEFAULT, "abcdef").unwrap();
        file.write_at(2, b"XY");
        assert_eq!(&file.content()[..], b"abXYef");
        assert_eq!(file.len(), 6);
    }

    #[test]
    fn read_at_past_end_returns_zero() {
        let file = Node::file("f", Metadata::FILE_DEFAULT, "abc").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(file.read_at(3, &mut buf), 0);
        assert_eq!(file.read_at(100, &mut buf), 0);
        assert_eq!(file.read_at(1, &mut buf), 2);
        assert_eq!(&buf[..2], b"bc");
    }

    #[test]
    fn structural_equality() {
        assert_eq!(sample_tree(), sample_tree());

        let other = sample_tree();
        other
            .lookup(&path!("message.txt"))
            .unwrap()
            .write_at(0, b"HI");
        assert_ne!(sample_tree(), other);
    }

    #[test]
    fn clear_children_empties_directory() {
        let root = sample_tree();
        root.clear_children();
        assert_eq!(root.child_count(), 0);
        assert!(root.lookup(&path!("site")).is_none());
    }

    #[test]
    fn directories_have_no_content() {
        let dir = Node::dir("d", Metadata::DIR_DEFAULT).unwrap();
        assert_eq!(dir.len(), 0);
        assert!(dir.content().is_empty());
    }
}
