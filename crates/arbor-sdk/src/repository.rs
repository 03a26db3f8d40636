use std::sync::Arc;

use arbor_store::{Blob, InMemoryObjectStore, ObjectStore, StoreConfig};
use arbor_tree::{Tree, TreeEntry};
use arbor_types::ObjectId;
use tokio::runtime::Handle;
use tokio::task::{self, JoinHandle};
use tracing::debug;

use crate::error::{SdkError, SdkResult};
use crate::selector::EntrySelector;

/// High-level Arbor API over a shared object store.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct Arbor {
    store: Arc<dyn ObjectStore>,
}

impl Arbor {
    /// Open over a fresh in-memory store with the default configuration.
    pub fn in_memory() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Open over a fresh in-memory store.
    pub fn with_config(config: StoreConfig) -> Self {
        Self::with_store(Arc::new(InMemoryObjectStore::with_config(config)))
    }

    /// Open over an existing store.
    pub fn with_store(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    // ---- Content operations ----

    pub fn write_blob(&self, data: &[u8]) -> SdkResult<ObjectId> {
        let blob = Blob::new(data.to_vec());
        let id = self.store.write(&blob.to_stored_object())?;
        Ok(id)
    }

    pub fn read_blob(&self, id: &ObjectId) -> SdkResult<Vec<u8>> {
        let obj = self
            .store
            .read(id)?
            .ok_or(SdkError::ObjectNotFound(*id))?;
        let blob = Blob::from_stored_object(&obj)?;
        Ok(blob.data)
    }

    // ---- Tree operations (blocking) ----

    /// A new, empty, unsaved tree.
    pub fn create_tree(&self) -> Tree {
        Tree::new()
    }

    pub fn get_tree(&self, id: &ObjectId) -> SdkResult<Tree> {
        Ok(Tree::load(self.store.as_ref(), id)?)
    }

    pub fn save_tree(&self, tree: &mut Tree) -> SdkResult<ObjectId> {
        Ok(tree.save(self.store.as_ref())?)
    }

    /// Visit every entry below `root`; see [`arbor_tree::walk`].
    pub fn walk_tree<F>(&self, root: &ObjectId, visitor: F) -> SdkResult<()>
    where
        F: FnMut(&str, &TreeEntry),
    {
        Ok(arbor_tree::walk(self.store.as_ref(), root, visitor)?)
    }

    pub fn find_path(&self, root: &ObjectId, path: &str) -> SdkResult<Option<TreeEntry>> {
        Ok(arbor_tree::find_path(self.store.as_ref(), root, path)?)
    }

    // ---- Tree operations (async) ----

    /// Load a tree, running the store read on the blocking pool.
    pub async fn get_tree_async(&self, id: ObjectId) -> SdkResult<Tree> {
        let store = Arc::clone(&self.store);
        let tree = task::spawn_blocking(move || Tree::load(store.as_ref(), &id)).await??;
        Ok(tree)
    }

    /// Save a tree, running the store write on the blocking pool.
    ///
    /// `tree` is only updated once the write has succeeded. If the future is
    /// dropped first, the tree keeps its previous state.
    pub async fn save_tree_async(&self, tree: &mut Tree) -> SdkResult<ObjectId> {
        let pending = tree.prepare_save()?;
        let store = Arc::clone(&self.store);
        let (pending, written) = task::spawn_blocking(move || {
            let written = store.write(pending.object());
            (pending, written)
        })
        .await?;
        Ok(tree.complete_save(pending, written)?)
    }

    // ---- Tree operations (callback) ----
    //
    // Each `*_with` method spawns on the current Tokio runtime and returns
    // its handle. Without a runtime the callback runs immediately with
    // `SdkError::NoRuntime` and `None` is returned.

    /// Create an empty tree and hand it to `callback`.
    pub fn create_tree_with<F>(&self, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(SdkResult<Tree>) + Send + 'static,
    {
        let runtime = match current_runtime() {
            Ok(runtime) => runtime,
            Err(err) => {
                callback(Err(err));
                return None;
            }
        };
        Some(runtime.spawn(async move { callback(Ok(Tree::new())) }))
    }

    /// Load a tree in the background and hand the result to `callback`.
    pub fn get_tree_with<F>(&self, id: ObjectId, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(SdkResult<Tree>) + Send + 'static,
    {
        let runtime = match current_runtime() {
            Ok(runtime) => runtime,
            Err(err) => {
                callback(Err(err));
                return None;
            }
        };
        let arbor = self.clone();
        Some(runtime.spawn(async move {
            let result = arbor.get_tree_async(id).await;
            debug!(id = %id, ok = result.is_ok(), "background load finished");
            callback(result);
        }))
    }

    /// Save a tree in the background. The callback gets the tree back
    /// together with the outcome.
    pub fn save_tree_with<F>(&self, mut tree: Tree, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Tree, SdkResult<ObjectId>) + Send + 'static,
    {
        let runtime = match current_runtime() {
            Ok(runtime) => runtime,
            Err(err) => {
                callback(tree, Err(err));
                return None;
            }
        };
        let arbor = self.clone();
        Some(runtime.spawn(async move {
            let result = arbor.save_tree_async(&mut tree).await;
            debug!(ok = result.is_ok(), "background save finished");
            callback(tree, result);
        }))
    }

    /// [`Tree::add_entry`] in callback form. The callback receives a copy of
    /// the added entry.
    pub fn add_entry_with<F>(
        &self,
        tree: Tree,
        id: ObjectId,
        name: impl Into<String>,
        attributes: u32,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Tree, SdkResult<TreeEntry>) + Send + 'static,
    {
        let name = name.into();
        run_on_tree(
            tree,
            move |tree| Ok(tree.add_entry(id, name, attributes)?.clone()),
            callback,
        )
    }

    /// [`Tree::remove_entry`] in callback form.
    pub fn remove_entry_with<F>(
        &self,
        tree: Tree,
        key: impl Into<EntrySelector>,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Tree, SdkResult<TreeEntry>) + Send + 'static,
    {
        let key = key.into();
        run_on_tree(
            tree,
            move |tree| Ok(tree.remove_entry(key.as_key())?),
            callback,
        )
    }

    /// [`Tree::get_entry`] in callback form.
    pub fn get_entry_with<F>(
        &self,
        tree: Tree,
        key: impl Into<EntrySelector>,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Tree, SdkResult<Option<TreeEntry>>) + Send + 'static,
    {
        let key = key.into();
        run_on_tree(
            tree,
            move |tree| Ok(tree.get_entry(key.as_key()).cloned()),
            callback,
        )
    }

    /// [`Tree::clear`] in callback form.
    pub fn clear_tree_with<F>(&self, tree: Tree, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Tree, SdkResult<()>) + Send + 'static,
    {
        run_on_tree(
            tree,
            |tree| {
                tree.clear();
                Ok(())
            },
            callback,
        )
    }
}

fn current_runtime() -> SdkResult<Handle> {
    Handle::try_current().map_err(|_| SdkError::NoRuntime)
}

/// Run a synchronous tree operation as a task and pass the tree and the
/// outcome to `callback`.
fn run_on_tree<T, Op, F>(mut tree: Tree, op: Op, callback: F) -> Option<JoinHandle<()>>
where
    T: Send + 'static,
    Op: FnOnce(&mut Tree) -> SdkResult<T> + Send + 'static,
    F: FnOnce(Tree, SdkResult<T>) + Send + 'static,
{
    let runtime = match current_runtime() {
        Ok(runtime) => runtime,
        Err(err) => {
            callback(tree, Err(err));
            return None;
        }
    };
    Some(runtime.spawn(async move {
        let result = op(&mut tree);
        callback(tree, result);
    }))
}

impl Default for Arbor {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for Arbor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbor").finish_non_exhaustive()
    }
}
