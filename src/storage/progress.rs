//! Progress log operations on threads.
//!
//! Entries are appended in chronological order and listed newest first.

use super::{Store, generate_id};
use crate::Result;
use crate::models::{ProgressEntry, now_timestamp};
use tracing::info;

impl Store {
    /// Append a progress note to a thread.
    ///
    /// `timestamp` is stored as given and defaults to now. Returns `None` if
    /// the thread does not exist.
    pub fn add_progress(
        &self,
        thread_id: &str,
        note: &str,
        timestamp: Option<&str>,
    ) -> Result<Option<ProgressEntry>> {
        let mut doc = self.load()?;
        let Some(thread) = doc.thread_mut(thread_id) else {
            return Ok(None);
        };

        let entry = ProgressEntry {
            id: generate_id(),
            timestamp: timestamp.map_or_else(now_timestamp, str::to_string),
            note: note.to_string(),
        };
        thread.progress.push(entry.clone());
        thread.touch();

        self.save(&doc)?;
        info!(thread_id, progress_id = %entry.id, "added progress");
        Ok(Some(entry))
    }

    /// List a thread's progress, most recently appended first.
    ///
    /// A positive `limit` keeps only that many of the newest entries.
    /// An unknown thread yields an empty list.
    pub fn list_progress(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ProgressEntry>> {
        let doc = self.load()?;
        let Some(thread) = doc.thread(thread_id) else {
            return Ok(Vec::new());
        };

        let newest_first = thread.progress.iter().rev().cloned();
        Ok(match limit {
            Some(limit) if limit > 0 => newest_first.take(limit).collect(),
            _ => newest_first.collect(),
        })
    }

    /// Replace the note text of a progress entry.
    pub fn edit_progress(
        &self,
        thread_id: &str,
        progress_id: &str,
        note: &str,
    ) -> Result<Option<ProgressEntry>> {
        let mut doc = self.load()?;
        let Some(thread) = doc.thread_mut(thread_id) else {
            return Ok(None);
        };
        let Some(entry) = thread.progress.iter_mut().find(|p| p.id == progress_id) else {
            return Ok(None);
        };

        entry.note = note.to_string();
        let edited = entry.clone();
        thread.touch();

        self.save(&doc)?;
        info!(thread_id, progress_id, "edited progress");
        Ok(Some(edited))
    }

    /// Remove a progress entry. Returns whether it existed.
    pub fn delete_progress(&self, thread_id: &str, progress_id: &str) -> Result<bool> {
        let mut doc = self.load()?;
        let Some(thread) = doc.thread_mut(thread_id) else {
            return Ok(false);
        };
        let Some(index) = thread.progress.iter().position(|p| p.id == progress_id) else {
            return Ok(false);
        };

        thread.progress.remove(index);
        thread.touch();

        self.save(&doc)?;
        info!(thread_id, progress_id, "deleted progress");
        Ok(true)
    }
}
