//! The registry: bundle registration and path resolution.

use std::sync::{Arc, Mutex, PoisonError};

use bundlefs_codec::{decode, Bundle};
use bundlefs_tree::{Metadata, Node, Path, ResourceFile};

use crate::{Dir, Error};

/// What one `register` call did to the merged tree.
///
/// Replacements are informational, not errors: overriding another bundle's
/// asset is a supported use case.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Name of the registered bundle, for diagnostics.
    pub bundle: String,
    /// Number of nodes newly inserted.
    pub added: usize,
    /// Paths where an existing node was displaced (last registration wins).
    pub replaced: Vec<Path>,
}

/// Process-wide mutable state holding the merged trees of all bundles
/// registered so far.
///
/// The registry is empty at construction, grows monotonically through
/// [`register`](Registry::register), and stays valid for the whole process
/// lifetime; [`reset`](Registry::reset) exists so tests can return it to
/// the empty state.
///
/// Concurrency: decoding happens before the merge lock is taken, so no
/// expensive work runs while holding it. Concurrent registrations
/// serialize on the merge lock; `open` and subsequent handle operations
/// take only per-node locks and never contend with it. Once `register`
/// returns, any later `open` on any thread observes the merged content.
pub struct Registry {
    root: Arc<Node>,
    merge_lock: Mutex<()>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry {
            root: Node::root(Metadata::DIR_DEFAULT),
            merge_lock: Mutex::new(()),
        }
    }

    /// Decode a bundle and merge its tree into the merged root.
    ///
    /// Directories merge by union, recursively. Any other collision - file
    /// over file, file over directory, directory over file - replaces the
    /// existing node and is reported through [`MergeOutcome::replaced`].
    /// On a decode error nothing is merged.
    pub fn register(&self, bundle: &Bundle) -> Result<MergeOutcome, Error> {
        let incoming = decode(bundle)?;

        let _guard = self
            .merge_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut outcome = MergeOutcome {
            bundle: bundle.name().to_string(),
            ..MergeOutcome::default()
        };
        merge_dir(&self.root, &incoming, &Path::default(), &mut outcome)?;
        log::debug!(
            "registered bundle '{}': {} added, {} replaced",
            outcome.bundle,
            outcome.added,
            outcome.replaced.len()
        );
        Ok(outcome)
    }

    /// Resolve a path to a fresh handle on its node.
    pub fn open(&self, path: &Path) -> Result<ResourceFile, Error> {
        let node = self
            .root
            .lookup(path)
            .ok_or_else(|| Error::NotFound { path: path.clone() })?;
        Ok(ResourceFile::new(node))
    }

    /// A directory-listable view scoped to the subtree at `prefix`.
    ///
    /// The view never leaks the rest of the namespace, so it can be handed
    /// to a generic static-content server as its root.
    pub fn root(&self, prefix: &Path) -> Result<Dir, Error> {
        let node = self.root.lookup(prefix).ok_or_else(|| Error::NotFound {
            path: prefix.clone(),
        })?;
        Dir::new(node)
    }

    /// Discard all registered content, returning to the empty state.
    ///
    /// Intended for tests that need isolation between runs; production
    /// code has no reason to call this.
    pub fn reset(&self) {
        let _guard = self
            .merge_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.root.clear_children();
        log::debug!("registry reset");
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_dir(
    dst: &Arc<Node>,
    src: &Arc<Node>,
    at: &Path,
    outcome: &mut MergeOutcome,
) -> Result<(), Error> {
    for child in src.children() {
        let path = at.child(child.name());
        match dst.child(child.name()) {
            Some(existing) if existing.is_dir() && child.is_dir() => {
                merge_dir(&existing, &child, &path, outcome)?;
            }
            Some(_) => {
                dst.replace_child(child)?;
                outcome.replaced.push(path);
            }
            None => {
                dst.insert_child(child)?;
                outcome.added += 1;
            }
        }
    }
    Ok(())
}
