//! The edit journal records committed section text.
//!
//! Each commit becomes an [`EditRecord`]. A [`FileJournal`] appends records to disk as
//! newline-delimited JSON so an external process can replay them; a [`MemoryJournal`]
//! keeps them for the session and can be dumped as an [`EditLog`] on exit.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of journaled edit.
pub enum EditAction {
    /// Content was committed to a section.
    Add,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One journaled edit.
pub struct EditRecord {
    /// What happened.
    pub action: EditAction,
    /// Section that received the content.
    pub section_id: String,
    /// The committed text.
    pub content: String,
}

impl EditRecord {
    #[must_use]
    /// Record for text committed to `section_id`.
    pub fn add(section_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            action: EditAction::Add,
            section_id: section_id.into(),
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Serialisable collection of the session's edits.
pub struct EditLog {
    /// Records in commit order.
    pub edits: Vec<EditRecord>,
}

/// Receiver of edit records.
pub trait EditJournal {
    /// Stores `record`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    fn record(&mut self, record: EditRecord) -> Result<()>;
}

/// Appends records to a file, one JSON object per line.
pub struct FileJournal {
    path: PathBuf,
}

impl FileJournal {
    #[must_use]
    /// Journal backed by `path`; the file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    /// Location of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record back from the journal file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a valid record.
    pub fn read_all(&self) -> Result<EditLog> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let edits = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(EditLog { edits })
    }
}

impl EditJournal for FileJournal {
    fn record(&mut self, record: EditRecord) -> Result<()> {
        let line = serde_json::to_string(&record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        writeln!(file, "{line}").map_err(|e| Error::io(&self.path, e))
    }
}

#[derive(Clone, Debug, Default)]
/// Keeps records in memory. Clones share the same log.
pub struct MemoryJournal {
    log: Rc<RefCell<EditLog>>,
}

impl MemoryJournal {
    #[must_use]
    /// Empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    /// Snapshot of everything recorded so far.
    pub fn log(&self) -> EditLog {
        self.log.borrow().clone()
    }
}

impl EditJournal for MemoryJournal {
    fn record(&mut self, record: EditRecord) -> Result<()> {
        self.log.borrow_mut().edits.push(record);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/journal.rs"]
mod tests;
