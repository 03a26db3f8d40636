use std::cmp::Ordering;
use std::fmt;

use arbor_store::{ObjectKind, ObjectStore, StoreError, StoreResult, StoredObject};
use arbor_types::ObjectId;
use tracing::debug;

use crate::codec;
use crate::entry::{canonical_cmp, TreeEntry};
use crate::error::{InvalidEntryReason, TreeError, TreeResult};
use crate::handle::EntryMut;

/// Where a tree stands relative to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Never persisted.
    Unsaved,
    /// The entries are exactly the content of this stored object.
    Saved(ObjectId),
    /// Persisted as this id once, but modified since. The id is only a label
    /// for the last saved state; it does not describe the current entries.
    Stale(ObjectId),
}

impl Identity {
    /// The id of the current entries, if they are persisted.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Self::Saved(id) => Some(*id),
            Self::Unsaved | Self::Stale(_) => None,
        }
    }

    /// The id of the most recent save or load, even if stale.
    pub fn last_saved(&self) -> Option<ObjectId> {
        match self {
            Self::Saved(id) | Self::Stale(id) => Some(*id),
            Self::Unsaved => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        !matches!(self, Self::Saved(_))
    }

    fn invalidate(self) -> Self {
        match self {
            Self::Saved(id) => Self::Stale(id),
            other => other,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsaved => f.write_str("unsaved"),
            Self::Saved(id) => write!(f, "{id}"),
            Self::Stale(id) => write!(f, "{id} (modified)"),
        }
    }
}

/// Addresses an entry either by position or by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKey<'a> {
    Index(usize),
    Name(&'a str),
}

impl From<usize> for EntryKey<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<'a> From<&'a str> for EntryKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for EntryKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

/// A directory listing: entries kept in canonical order, plus the tree's
/// identity in the object store.
///
/// A `Tree` has no internal synchronization; share it across threads only
/// behind a lock of the caller's choosing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    identity: Identity,
    entries: Vec<TreeEntry>,
}

/// A tree encoded for storage, waiting for the store write to finish.
///
/// Produced by [`Tree::prepare_save`] and consumed by
/// [`Tree::complete_save`]; adapters that run the write elsewhere (another
/// thread, a runtime) hold it in between.
#[derive(Debug)]
pub struct PendingSave {
    object: StoredObject,
    id: ObjectId,
}

impl PendingSave {
    /// The object to hand to the store.
    pub fn object(&self) -> &StoredObject {
        &self.object
    }

    /// The id the store is expected to return.
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Tree {
    /// Create an empty, unsaved tree.
    pub fn new() -> Self {
        Self {
            identity: Identity::Unsaved,
            entries: Vec::new(),
        }
    }

    /// Load the tree stored under `id`.
    ///
    /// The store is trusted to hand back the content `id` names; the tree
    /// adopts `id` without rehashing.
    pub fn load<S>(store: &S, id: &ObjectId) -> TreeResult<Self>
    where
        S: ObjectStore + ?Sized,
    {
        let object = store
            .read(id)
            .map_err(|source| TreeError::StoreRead { id: *id, source })?
            .ok_or(TreeError::ObjectNotFound(*id))?;
        let tree = Self::from_stored_object(*id, &object)?;
        debug!(id = %id, entries = tree.len(), "loaded tree");
        Ok(tree)
    }

    /// Decode an object already fetched from a store under `id`.
    pub fn from_stored_object(id: ObjectId, object: &StoredObject) -> TreeResult<Self> {
        if object.kind != ObjectKind::Tree {
            return Err(TreeError::WrongObjectType {
                id,
                actual: object.kind,
            });
        }
        let entries =
            codec::decode(&object.data).map_err(|source| TreeError::CorruptObject { id, source })?;
        Ok(Self {
            identity: Identity::Saved(id),
            entries,
        })
    }

    /// Decode canonical tree bytes that did not come from a store.
    ///
    /// The result is unsaved: nothing vouches that these bytes are stored.
    pub fn from_bytes(data: &[u8]) -> TreeResult<Self> {
        Ok(Self {
            identity: Identity::Unsaved,
            entries: codec::decode(data)?,
        })
    }

    /// The tree's identity state.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// The id of the current entries, or `None` if they are not persisted.
    pub fn id(&self) -> Option<ObjectId> {
        self.identity.object_id()
    }

    /// Has the tree changed since it was last saved or loaded?
    pub fn is_dirty(&self) -> bool {
        self.identity.is_dirty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in canonical order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TreeEntry> {
        self.entries.iter()
    }

    /// Entry at `index` in canonical order.
    pub fn get(&self, index: usize) -> Option<&TreeEntry> {
        self.entries.get(index)
    }

    /// Entry named `name`, whatever its mode.
    pub fn get_by_name(&self, name: &str) -> Option<&TreeEntry> {
        self.position_of(name).map(|i| &self.entries[i])
    }

    /// Entry by index or name. Absent entries are `None`, never an error.
    pub fn get_entry<'k>(&self, key: impl Into<EntryKey<'k>>) -> Option<&TreeEntry> {
        match key.into() {
            EntryKey::Index(index) => self.get(index),
            EntryKey::Name(name) => self.get_by_name(name),
        }
    }

    /// Position of the entry named `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        // A name sorts as itself for non-directories and as `name/` for
        // directories; try both slots.
        [false, true].into_iter().find_map(|as_dir| {
            self.search(name, as_dir)
                .ok()
                .filter(|&i| self.entries[i].is_directory() == as_dir)
        })
    }

    /// Mutable handle on an entry. Edits made through it mark the tree dirty
    /// and keep the entries in canonical order.
    pub fn entry_mut<'k>(&mut self, key: impl Into<EntryKey<'k>>) -> Option<EntryMut<'_>> {
        let index = match key.into() {
            EntryKey::Index(index) => (index < self.entries.len()).then_some(index)?,
            EntryKey::Name(name) => self.position_of(name)?,
        };
        Some(EntryMut::new(self, index))
    }

    /// Add an entry from raw attribute bits.
    ///
    /// Fails with `InvalidEntry` for a bad name, unrecognized attributes, or a
    /// name that is already present; existing entries are never replaced.
    pub fn add_entry(
        &mut self,
        id: ObjectId,
        name: impl Into<String>,
        attributes: u32,
    ) -> TreeResult<&TreeEntry> {
        let entry = TreeEntry::new(id, name, attributes)?;
        self.insert(entry)
    }

    /// Add a pre-built entry. Same rules as [`Tree::add_entry`].
    pub fn insert(&mut self, entry: TreeEntry) -> TreeResult<&TreeEntry> {
        if self.position_of(entry.name()).is_some() {
            return Err(TreeError::invalid_entry(
                entry.name(),
                InvalidEntryReason::DuplicateName,
            ));
        }
        let index = match self.search(entry.name(), entry.is_directory()) {
            Ok(i) | Err(i) => i,
        };
        self.entries.insert(index, entry);
        self.touch();
        Ok(&self.entries[index])
    }

    /// Remove an entry by index or name, returning it.
    pub fn remove_entry<'k>(&mut self, key: impl Into<EntryKey<'k>>) -> TreeResult<TreeEntry> {
        let index = match key.into() {
            EntryKey::Index(index) => {
                if index >= self.entries.len() {
                    return Err(TreeError::IndexOutOfRange {
                        index: i64::try_from(index).unwrap_or(i64::MAX),
                        len: self.entries.len(),
                    });
                }
                index
            }
            EntryKey::Name(name) => self
                .position_of(name)
                .ok_or_else(|| TreeError::EntryNotFound(name.to_owned()))?,
        };
        let removed = self.entries.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Remove by a signed index, for callers whose indices may be negative.
    pub fn remove_entry_at(&mut self, index: i64) -> TreeResult<TreeEntry> {
        let out_of_range = || TreeError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        };
        let index = usize::try_from(index).map_err(|_| out_of_range())?;
        self.remove_entry(index)
    }

    /// Remove every entry.
    ///
    /// Clearing an already-empty tree changes nothing. Otherwise the tree
    /// becomes dirty; a previously saved id survives only as a stale label
    /// and the next [`Tree::save`] fails with `EmptyTree`.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.touch();
    }

    /// Canonical encoding of the current entries.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode(&self.entries)
    }

    /// The id [`Tree::save`] would assign, without touching any store.
    pub fn compute_id(&self) -> TreeResult<ObjectId> {
        Ok(self.prepare_save()?.id)
    }

    /// Encode the tree for storage. Fails with `EmptyTree` if there are no
    /// entries.
    pub fn prepare_save(&self) -> TreeResult<PendingSave> {
        if self.entries.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        let object = StoredObject::new(ObjectKind::Tree, self.to_bytes());
        let id = object.compute_id();
        Ok(PendingSave { object, id })
    }

    /// Apply the outcome of writing `pending` to a store.
    ///
    /// The tree adopts the new id only if the write succeeded and the store
    /// agrees on the id. The tree must not have been modified since
    /// `prepare_save`.
    pub fn complete_save(
        &mut self,
        pending: PendingSave,
        written: StoreResult<ObjectId>,
    ) -> TreeResult<ObjectId> {
        let id = written.map_err(TreeError::StoreWrite)?;
        if id != pending.id {
            return Err(TreeError::StoreWrite(StoreError::HashMismatch {
                id,
                expected: pending.id.to_hex(),
                computed: id.to_hex(),
            }));
        }
        self.identity = Identity::Saved(id);
        debug!(id = %id, entries = self.len(), "saved tree");
        Ok(id)
    }

    /// Encode, hash and write the tree, then adopt the resulting id.
    ///
    /// An empty tree fails with `EmptyTree` before the store is called.
    /// Saving content the store already holds succeeds without duplication.
    pub fn save<S>(&mut self, store: &S) -> TreeResult<ObjectId>
    where
        S: ObjectStore + ?Sized,
    {
        let pending = self.prepare_save()?;
        let written = store.write(pending.object());
        self.complete_save(pending, written)
    }

    /// Called after `entries[index]` was edited in place: restores canonical
    /// order and returns the entry's new index.
    pub(crate) fn entry_changed(&mut self, index: usize) -> usize {
        let entry = self.entries.remove(index);
        let new_index = match self.search(entry.name(), entry.is_directory()) {
            Ok(i) | Err(i) => i,
        };
        self.entries.insert(new_index, entry);
        self.touch();
        new_index
    }

    pub(crate) fn entry_at_mut(&mut self, index: usize) -> &mut TreeEntry {
        &mut self.entries[index]
    }

    fn touch(&mut self) {
        self.identity = self.identity.invalidate();
    }

    fn search(&self, name: &str, as_dir: bool) -> Result<usize, usize> {
        self.entries.binary_search_by(|probe| -> Ordering {
            canonical_cmp(probe.name(), probe.is_directory(), name, as_dir)
        })
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a TreeEntry;
    type IntoIter = std::slice::Iter<'a, TreeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Build a tree from entries in any order. Fails on duplicate names.
impl TryFrom<Vec<TreeEntry>> for Tree {
    type Error = TreeError;

    fn try_from(entries: Vec<TreeEntry>) -> TreeResult<Self> {
        let mut tree = Tree::new();
        for entry in entries {
            tree.insert(entry)?;
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::EntryMode;
    use arbor_store::{Blob, InMemoryObjectStore, StoreConfig};
    use proptest::prelude::*;

    const EMPTY_BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";
    const TEST_TREE: &str = "f05af273ba36fe5176e5eaab349661a56b3d27a0";

    fn empty_blob() -> ObjectId {
        ObjectId::from_hex(EMPTY_BLOB).unwrap()
    }

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 20])
    }

    fn names(tree: &Tree) -> Vec<&str> {
        tree.iter().map(|e| e.name()).collect()
    }

    fn sample_tree() -> Tree {
        let mut tree = Tree::new();
        tree.add_entry(id(1), "README.md", 0o100644).unwrap();
        tree.add_entry(id(2), "src", 0o040000).unwrap();
        tree.add_entry(id(3), "run.sh", 0o100755).unwrap();
        tree
    }

    // -----------------------------------------------------------------------
    // Creation and lookup
    // -----------------------------------------------------------------------

    #[test]
    fn new_tree_is_empty_and_unsaved() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.identity(), Identity::Unsaved);
        assert!(tree.id().is_none());
        assert!(tree.is_dirty());
    }

    #[test]
    fn lookups_by_index_and_name() {
        let tree = sample_tree();
        assert_eq!(names(&tree), vec!["README.md", "run.sh", "src"]);
        assert_eq!(tree.get_entry(0).unwrap().name(), "README.md");
        assert_eq!(tree.get_entry("src").unwrap().id(), id(2));
        assert_eq!(tree.get_by_name("run.sh").unwrap().mode(), EntryMode::Executable);
        assert_eq!(tree.position_of("src"), Some(2));
    }

    #[test]
    fn absent_lookups_return_none() {
        let tree = sample_tree();
        assert!(tree.get_entry(tree.len()).is_none());
        assert!(tree.get_entry(usize::MAX).is_none());
        assert!(tree.get_entry("foo.bar.i.dont.exist").is_none());
        assert!(tree.get_entry("").is_none());
        assert!(Tree::new().get_entry(0).is_none());
    }

    // -----------------------------------------------------------------------
    // Adding entries
    // -----------------------------------------------------------------------

    #[test]
    fn add_entry_returns_new_entry() {
        let mut tree = Tree::new();
        let entry = tree.add_entry(empty_blob(), "test", 0o100644).unwrap();
        assert_eq!(entry.id(), empty_blob());
        assert_eq!(entry.name(), "test");
        assert_eq!(entry.attributes(), 0o100644);
        assert_eq!(tree.len(), 1);

        let entry = tree.get_entry(0).unwrap();
        assert_eq!(entry.name(), "test");
    }

    #[test]
    fn add_entry_rejects_invalid_input() {
        let mut tree = Tree::new();
        assert!(matches!(
            tree.add_entry(empty_blob(), "", 0o100644),
            Err(TreeError::InvalidEntry { .. })
        ));
        assert!(matches!(
            tree.add_entry(empty_blob(), "a/b", 0o100644),
            Err(TreeError::InvalidEntry { .. })
        ));
        assert!(matches!(
            tree.add_entry(empty_blob(), "test", 1),
            Err(TreeError::InvalidEntry {
                reason: InvalidEntryReason::UnknownMode(1),
                ..
            })
        ));
        assert!(tree.is_empty());
        assert_eq!(tree.identity(), Identity::Unsaved);
    }

    #[test]
    fn duplicate_names_are_rejected_not_overwritten() {
        let mut tree = Tree::new();
        tree.add_entry(id(1), "foo", 0o100644).unwrap();

        let err = tree.add_entry(id(2), "foo", 0o100644).unwrap_err();
        assert!(matches!(
            err,
            TreeError::InvalidEntry {
                reason: InvalidEntryReason::DuplicateName,
                ..
            }
        ));
        // same name as a directory is still a duplicate
        assert!(tree.add_entry(id(3), "foo", 0o040000).is_err());

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get_entry("foo").unwrap().id(), id(1));
    }

    #[test]
    fn duplicate_directory_name_is_found() {
        let mut tree = Tree::new();
        tree.add_entry(id(1), "foo", 0o040000).unwrap();
        tree.add_entry(id(2), "foo.txt", 0o100644).unwrap();
        assert!(tree.add_entry(id(3), "foo", 0o100644).is_err());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn entries_stay_in_canonical_order() {
        let mut tree = Tree::new();
        tree.add_entry(id(1), "foo0", 0o100644).unwrap();
        tree.add_entry(id(2), "foo", 0o040000).unwrap();
        tree.add_entry(id(3), "foo.txt", 0o100644).unwrap();
        tree.add_entry(id(4), "Zebra", 0o100644).unwrap();
        tree.add_entry(id(5), "foo-bar", 0o120000).unwrap();
        assert_eq!(names(&tree), vec!["Zebra", "foo-bar", "foo.txt", "foo", "foo0"]);
    }

    // -----------------------------------------------------------------------
    // Removing and clearing
    // -----------------------------------------------------------------------

    #[test]
    fn remove_by_index_and_name() {
        let mut tree = sample_tree();
        let removed = tree.remove_entry(0).unwrap();
        assert_eq!(removed.name(), "README.md");
        let removed = tree.remove_entry("src").unwrap();
        assert_eq!(removed.id(), id(2));
        assert_eq!(names(&tree), vec!["run.sh"]);
    }

    #[test]
    fn remove_out_of_range() {
        let mut tree = sample_tree();
        assert!(matches!(
            tree.remove_entry(3),
            Err(TreeError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            tree.remove_entry_at(-1),
            Err(TreeError::IndexOutOfRange { index: -1, len: 3 })
        ));
        assert!(matches!(
            Tree::new().remove_entry_at(-1),
            Err(TreeError::IndexOutOfRange { index: -1, len: 0 })
        ));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.remove_entry_at(2).unwrap().name(), "src");
    }

    #[test]
    fn remove_missing_name() {
        let mut tree = Tree::new();
        let err = tree.remove_entry("foo.i.dont.exist").unwrap_err();
        assert!(matches!(err, TreeError::EntryNotFound(name) if name == "foo.i.dont.exist"));
    }

    #[test]
    fn clear_saved_tree_keeps_stale_label_only() {
        let store = InMemoryObjectStore::new();
        let mut tree = Tree::new();
        tree.add_entry(id(9), "syncclearingtest", 0o100644).unwrap();
        let saved = tree.save(&store).unwrap();

        tree.clear();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.identity(), Identity::Stale(saved));
        assert_eq!(tree.identity().last_saved(), Some(saved));
        assert!(tree.id().is_none());

        let before = store.len();
        assert!(matches!(tree.save(&store), Err(TreeError::EmptyTree)));
        assert_eq!(store.len(), before);
        // the failed save changes nothing
        assert_eq!(tree.identity(), Identity::Stale(saved));
    }

    #[test]
    fn clear_on_empty_tree_is_a_no_op() {
        let mut tree = Tree::new();
        tree.clear();
        assert_eq!(tree.identity(), Identity::Unsaved);

        let store = InMemoryObjectStore::new();
        let empty_tree_id = store
            .write(&StoredObject::new(ObjectKind::Tree, Vec::new()))
            .unwrap();
        let mut loaded = Tree::load(&store, &empty_tree_id).unwrap();
        loaded.clear();
        assert_eq!(loaded.identity(), Identity::Saved(empty_tree_id));
    }

    // -----------------------------------------------------------------------
    // Saving
    // -----------------------------------------------------------------------

    #[test]
    fn save_produces_git_compatible_id() {
        let store = InMemoryObjectStore::new();
        let mut tree = Tree::new();
        tree.add_entry(empty_blob(), "test", 0o100644).unwrap();

        let saved = tree.save(&store).unwrap();
        assert_eq!(saved.to_hex(), TEST_TREE);
        assert_eq!(tree.id(), Some(saved));
        assert!(!tree.is_dirty());
        assert!(store.exists(&saved).unwrap());

        // then deleting the entry again leaves an unsaveable tree
        tree.remove_entry(0).unwrap();
        assert_eq!(tree.len(), 0);
        assert!(matches!(tree.save(&store), Err(TreeError::EmptyTree)));
    }

    #[test]
    fn saving_an_empty_tree_never_writes() {
        let store = InMemoryObjectStore::new();
        let mut tree = Tree::new();
        assert!(matches!(tree.save(&store), Err(TreeError::EmptyTree)));
        assert!(store.is_empty());
        assert!(matches!(tree.compute_id(), Err(TreeError::EmptyTree)));
    }

    #[test]
    fn save_is_idempotent() {
        let store = InMemoryObjectStore::new();
        let mut tree = sample_tree();
        let first = tree.save(&store).unwrap();
        let second = tree.save(&store).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn compute_id_matches_save() {
        let store = InMemoryObjectStore::new();
        let mut tree = sample_tree();
        let predicted = tree.compute_id().unwrap();
        assert!(tree.id().is_none());
        assert_eq!(tree.save(&store).unwrap(), predicted);
    }

    #[test]
    fn failed_write_leaves_tree_untouched() {
        let store = InMemoryObjectStore::with_config(StoreConfig::read_only());
        let mut tree = sample_tree();
        let err = tree.save(&store).unwrap_err();
        assert!(matches!(err, TreeError::StoreWrite(StoreError::ReadOnly)));
        assert_eq!(tree.identity(), Identity::Unsaved);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn mismatched_store_id_is_rejected() {
        let mut tree = sample_tree();
        let pending = tree.prepare_save().unwrap();
        let err = tree.complete_save(pending, Ok(id(0xaa))).unwrap_err();
        assert!(matches!(
            err,
            TreeError::StoreWrite(StoreError::HashMismatch { .. })
        ));
        assert_eq!(tree.identity(), Identity::Unsaved);
    }

    #[test]
    fn mutation_after_save_makes_id_stale() {
        let store = InMemoryObjectStore::new();
        let mut tree = sample_tree();
        let saved = tree.save(&store).unwrap();

        tree.add_entry(id(4), "new", 0o100644).unwrap();
        assert_eq!(tree.identity(), Identity::Stale(saved));
        assert!(tree.id().is_none());

        let resaved = tree.save(&store).unwrap();
        assert_ne!(resaved, saved);
        assert_eq!(tree.identity(), Identity::Saved(resaved));
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    #[test]
    fn load_round_trips_saved_entries() {
        let store = InMemoryObjectStore::new();
        let mut tree = sample_tree();
        let saved = tree.save(&store).unwrap();

        let loaded = Tree::load(&store, &saved).unwrap();
        assert_eq!(loaded.entries(), tree.entries());
        assert_eq!(loaded.identity(), Identity::Saved(saved));
        assert_eq!(loaded, tree);
    }

    #[test]
    fn load_missing_object() {
        let store = InMemoryObjectStore::new();
        let missing = Blob::new(b"foo".to_vec()).id();
        assert!(matches!(
            Tree::load(&store, &missing),
            Err(TreeError::ObjectNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn load_non_tree_object() {
        let store = InMemoryObjectStore::new();
        let commit = store
            .write(&StoredObject::new(ObjectKind::Commit, b"tree 4b825dc\n".to_vec()))
            .unwrap();
        let err = Tree::load(&store, &commit).unwrap_err();
        assert!(matches!(
            err,
            TreeError::WrongObjectType {
                actual: ObjectKind::Commit,
                ..
            }
        ));
    }

    #[test]
    fn load_corrupt_tree() {
        let store = InMemoryObjectStore::new();
        let bogus = store
            .write(&StoredObject::new(ObjectKind::Tree, b"100644 broken".to_vec()))
            .unwrap();
        let err = Tree::load(&store, &bogus).unwrap_err();
        assert!(matches!(err, TreeError::CorruptObject { id, .. } if id == bogus));
    }

    #[test]
    fn load_surfaces_store_failures() {
        let store = InMemoryObjectStore::new();
        let claimed = id(0x42);
        store.insert_unchecked(claimed, StoredObject::new(ObjectKind::Tree, Vec::new()));
        assert!(matches!(
            Tree::load(&store, &claimed),
            Err(TreeError::StoreRead {
                source: StoreError::HashMismatch { .. },
                ..
            })
        ));
    }

    #[test]
    fn works_through_trait_objects() {
        let store: Box<dyn ObjectStore> = Box::new(InMemoryObjectStore::new());
        let mut tree = sample_tree();
        let saved = tree.save(store.as_ref()).unwrap();
        assert_eq!(Tree::load(store.as_ref(), &saved).unwrap().len(), 3);
    }

    // -----------------------------------------------------------------------
    // Bytes and conversions
    // -----------------------------------------------------------------------

    #[test]
    fn from_bytes_is_unsaved() {
        let tree = sample_tree();
        let decoded = Tree::from_bytes(&tree.to_bytes()).unwrap();
        assert_eq!(decoded.entries(), tree.entries());
        assert_eq!(decoded.identity(), Identity::Unsaved);
        assert!(matches!(
            Tree::from_bytes(b"garbage"),
            Err(TreeError::Decode(_))
        ));
    }

    #[test]
    fn try_from_sorts_and_rejects_duplicates() {
        let entries = vec![
            TreeEntry::new(id(1), "b", 0o100644).unwrap(),
            TreeEntry::new(id(2), "a", 0o100644).unwrap(),
        ];
        let tree = Tree::try_from(entries).unwrap();
        assert_eq!(names(&tree), vec!["a", "b"]);

        let dupes = vec![
            TreeEntry::new(id(1), "a", 0o100644).unwrap(),
            TreeEntry::new(id(2), "a", 0o040000).unwrap(),
        ];
        assert!(Tree::try_from(dupes).is_err());
    }

    #[test]
    fn malformed_ids_convert_into_tree_errors() {
        fn add_hex(tree: &mut Tree, hex: &str, name: &str) -> TreeResult<()> {
            tree.add_entry(ObjectId::from_hex(hex)?, name, 0o100644)?;
            Ok(())
        }
        let mut tree = Tree::new();
        assert!(matches!(
            add_hex(&mut tree, "not-hex", "a"),
            Err(TreeError::MalformedId(_))
        ));
        assert!(matches!(
            add_hex(&mut tree, "abcd", "a"),
            Err(TreeError::MalformedId(_))
        ));
        add_hex(&mut tree, &EMPTY_BLOB.to_uppercase(), "a").unwrap();
        assert_eq!(tree.get(0).unwrap().id(), empty_blob());
    }

    #[test]
    fn identity_display() {
        assert_eq!(Identity::Unsaved.to_string(), "unsaved");
        assert_eq!(Identity::Saved(empty_blob()).to_string(), EMPTY_BLOB);
        assert!(Identity::Stale(empty_blob()).to_string().ends_with("(modified)"));
    }

    // -----------------------------------------------------------------------
    // Content addressing
    // -----------------------------------------------------------------------

    fn arb_entries() -> impl Strategy<Value = Vec<(String, u8, usize)>> {
        proptest::collection::btree_map("[a-z0-9._-]{1,8}", (any::<u8>(), 0usize..5), 1..12)
            .prop_filter("reserved names", |m| !m.contains_key(".") && !m.contains_key(".."))
            .prop_map(|m| m.into_iter().map(|(n, (b, k))| (n, b, k)).collect())
    }

    fn build(entries: &[(String, u8, usize)]) -> Tree {
        let mut tree = Tree::new();
        for (name, byte, mode) in entries {
            let mode = EntryMode::ALL[*mode];
            tree.add_entry(id(*byte), name.clone(), mode.mode_bits()).unwrap();
        }
        tree
    }

    proptest! {
        #[test]
        fn insertion_order_does_not_change_id(
            entries in arb_entries(),
            seed in any::<u64>(),
        ) {
            let forward = build(&entries);
            let mut shuffled = entries.clone();
            // deterministic shuffle driven by the seed
            let n = shuffled.len();
            for i in 0..n {
                let j = (seed.rotate_left(i as u32) as usize) % n;
                shuffled.swap(i, j);
            }
            let backward = build(&shuffled);

            prop_assert_eq!(forward.to_bytes(), backward.to_bytes());
            prop_assert_eq!(forward.compute_id().unwrap(), backward.compute_id().unwrap());
        }

        #[test]
        fn saved_trees_load_back_identically(entries in arb_entries()) {
            let store = InMemoryObjectStore::new();
            let mut tree = build(&entries);
            let saved = tree.save(&store).unwrap();
            let loaded = Tree::load(&store, &saved).unwrap();
            prop_assert_eq!(loaded.entries(), tree.entries());
            for w in loaded.entries().windows(2) {
                prop_assert_eq!(w[0].canonical_cmp(&w[1]), Ordering::Less);
            }
        }
    }
}
