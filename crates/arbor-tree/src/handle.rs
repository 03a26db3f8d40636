use arbor_types::ObjectId;

use crate::entry::{validate_name, TreeEntry};
use crate::error::{InvalidEntryReason, TreeError, TreeResult};
use crate::mode::EntryMode;
use crate::tree::Tree;

/// Mutable access to one entry of a [`Tree`].
///
/// Every successful edit marks the tree dirty and moves the entry to its
/// canonical position; [`EntryMut::index`] follows it. A failed edit leaves
/// both the entry and the tree untouched.
#[derive(Debug)]
pub struct EntryMut<'a> {
    tree: &'a mut Tree,
    index: usize,
}

impl<'a> EntryMut<'a> {
    pub(crate) fn new(tree: &'a mut Tree, index: usize) -> Self {
        Self { tree, index }
    }

    /// Current state of the entry.
    pub fn get(&self) -> &TreeEntry {
        &self.tree.entries()[self.index]
    }

    /// Current position of the entry in the tree.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_id(&mut self, id: ObjectId) -> &mut Self {
        self.tree.entry_at_mut(self.index).set_id(id);
        self.changed()
    }

    /// Rename the entry. Fails if the name is invalid or taken by another
    /// entry in the same tree.
    pub fn set_name(&mut self, name: impl Into<String>) -> TreeResult<&mut Self> {
        let name = name.into();
        validate_name(&name)?;
        if let Some(other) = self.tree.position_of(&name) {
            if other != self.index {
                return Err(TreeError::invalid_entry(
                    name,
                    InvalidEntryReason::DuplicateName,
                ));
            }
        }
        self.tree.entry_at_mut(self.index).set_name(name)?;
        Ok(self.changed())
    }

    /// Change the entry's raw attribute bits.
    pub fn set_attributes(&mut self, attributes: u32) -> TreeResult<&mut Self> {
        self.tree.entry_at_mut(self.index).set_attributes(attributes)?;
        Ok(self.changed())
    }

    pub fn set_mode(&mut self, mode: EntryMode) -> &mut Self {
        self.tree.entry_at_mut(self.index).set_mode(mode);
        self.changed()
    }

    fn changed(&mut self) -> &mut Self {
        self.index = self.tree.entry_changed(self.index);
        self
    }
}
