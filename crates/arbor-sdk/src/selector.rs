use arbor_tree::EntryKey;

/// Owned form of [`EntryKey`], for operations that outlive the caller's
/// borrow (callbacks running on a runtime).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntrySelector {
    Index(usize),
    Name(String),
}

impl EntrySelector {
    pub fn as_key(&self) -> EntryKey<'_> {
        match self {
            Self::Index(index) => EntryKey::Index(*index),
            Self::Name(name) => EntryKey::Name(name),
        }
    }
}

impl From<usize> for EntrySelector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for EntrySelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for EntrySelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}
