//! The ordered list of input PDFs for one merge request.
//!
//! A selection is an explicit value handed to the merger, not shared state:
//! each "choose files" gesture builds a fresh list (or replaces an existing
//! one wholesale) and the merge only reads it.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One selected input: a display name plus the path it was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    display_name: String,
    path: PathBuf,
}

impl SelectionEntry {
    /// Create an entry with an explicit display name.
    pub fn new(display_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            path: path.into(),
        }
    }

    /// Create an entry whose display name is the path's final component.
    ///
    /// Fails with [`Error::UnresolvedName`] when the path has no file name
    /// (e.g. `/` or a path ending in `..`).
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let display_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToString::to_string)
            .ok_or_else(|| Error::UnresolvedName(path.clone()))?;

        Ok(Self { display_name, path })
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Ordered, possibly-duplicated list of selected inputs.
///
/// Order is selection order; duplicates are allowed and duplicate a file's
/// pages in the output.
#[derive(Debug, Clone, Default)]
pub struct SourceSelection {
    entries: Vec<SelectionEntry>,
}

impl SourceSelection {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a selection from paths, resolving each display name.
    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let entries = paths
            .into_iter()
            .map(SelectionEntry::from_path)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Replace the whole selection with a new one.
    ///
    /// A new "choose files" gesture never accumulates onto a previous one.
    pub fn replace(&mut self, entries: impl IntoIterator<Item = SelectionEntry>) {
        self.entries.clear();
        self.entries.extend(entries);
    }

    pub fn push(&mut self, entry: SelectionEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectionEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a SourceSelection {
    type Item = &'a SelectionEntry;
    type IntoIter = std::slice::Iter<'a, SelectionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
