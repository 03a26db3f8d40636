//! Recursive traversal of stored trees.

use arbor_store::ObjectStore;
use arbor_types::ObjectId;
use tracing::debug;

use crate::entry::TreeEntry;
use crate::error::TreeResult;
use crate::tree::Tree;

/// Visit every entry reachable from `root`, depth-first in canonical order.
///
/// The visitor receives the slash-joined path of each entry. Directories are
/// visited before their contents; submodules are reported but not entered.
pub fn walk<S, F>(store: &S, root: &ObjectId, mut visitor: F) -> TreeResult<()>
where
    S: ObjectStore + ?Sized,
    F: FnMut(&str, &TreeEntry),
{
    let tree = Tree::load(store, root)?;
    walk_inner(store, &tree, "", &mut visitor)
}

fn walk_inner<S, F>(store: &S, tree: &Tree, prefix: &str, visitor: &mut F) -> TreeResult<()>
where
    S: ObjectStore + ?Sized,
    F: FnMut(&str, &TreeEntry),
{
    for entry in tree {
        let path = join(prefix, entry.name());
        visitor(&path, entry);
        if entry.is_directory() {
            debug!(path = %path, id = %entry.id(), "descending into subtree");
            let subtree = Tree::load(store, &entry.id())?;
            walk_inner(store, &subtree, &path, visitor)?;
        }
    }
    Ok(())
}

/// Resolve a slash-separated path below `root`.
///
/// Returns `None` when a component is missing or an intermediate component
/// is not a directory. Empty components (`a//b`, a trailing `/`) are ignored.
pub fn find_path<S>(store: &S, root: &ObjectId, path: &str) -> TreeResult<Option<TreeEntry>>
where
    S: ObjectStore + ?Sized,
{
    let mut components = path.split('/').filter(|c| !c.is_empty()).peekable();
    let mut tree = Tree::load(store, root)?;

    while let Some(component) = components.next() {
        let Some(entry) = tree.get_by_name(component) else {
            return Ok(None);
        };
        if components.peek().is_none() {
            return Ok(Some(entry.clone()));
        }
        if !entry.is_directory() {
            return Ok(None);
        }
        let next = entry.id();
        tree = Tree::load(store, &next)?;
    }
    Ok(None)
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}
