use tracing::{debug, info, warn};

use super::cursor::Cursor;
use super::dedup::filter_unsaved;
use crate::db::ExerciseStore;
use crate::error::{StoreError, StoreResult};
use crate::models::ExerciseRecord;

/// What `save_if_absent` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

/// The only writer of the record store. Every mutation is followed by a full
/// reload, so `saved()` always matches what a fresh `list_all` would return,
/// and the cursor is re-validated against that snapshot before returning.
///
/// If a write lands but the reload after it fails, the mirror is marked
/// stale. `is_stale` reports it and the next mutation or `reload` re-reads
/// the store before doing anything else.
pub struct ExerciseLibrary {
    store: ExerciseStore,
    saved: Vec<ExerciseRecord>,
    ids: Vec<i64>,
    cursor: Cursor,
    stale: bool,
}

impl ExerciseLibrary {
    /// Take ownership of the store and load the initial snapshot.
    pub fn open(store: ExerciseStore) -> StoreResult<Self> {
        let mut library = Self {
            store,
            saved: Vec::new(),
            ids: Vec::new(),
            cursor: Cursor::Empty,
            stale: false,
        };
        library.refresh()?;
        library.cursor = Cursor::for_len(library.saved.len());
        info!(saved = library.saved.len(), "loaded saved exercises");
        Ok(library)
    }

    /// Re-read the store, e.g. when a view becomes active.
    pub fn reload(&mut self) -> StoreResult<&[ExerciseRecord]> {
        self.refresh()?;
        self.cursor = self.cursor.clamp(self.saved.len());
        Ok(&self.saved)
    }

    /// Save `record` unless something with the same name is already saved.
    /// Saving twice is not an error; the second call just reports
    /// `AlreadySaved` and writes nothing.
    pub fn save_if_absent(&mut self, record: &ExerciseRecord) -> StoreResult<SaveOutcome> {
        self.refresh()?;
        if self.saved.iter().any(|saved| saved.name == record.name) {
            debug!(name = %record.name, "already saved, skipping insert");
            self.cursor = self.cursor.clamp(self.saved.len());
            return Ok(SaveOutcome::AlreadySaved);
        }

        self.store.insert(record)?;
        self.refresh_after_write()?;
        self.cursor = self.cursor.clamp(self.saved.len());
        info!(name = %record.name, saved = self.saved.len(), "saved exercise");
        Ok(SaveOutcome::Saved)
    }

    /// Delete every record named `name` and return the re-validated cursor.
    /// Removing a name that is not saved still reloads but changes nothing.
    pub fn remove(&mut self, name: &str) -> StoreResult<Cursor> {
        if self.stale {
            self.refresh()?;
            self.cursor = self.cursor.clamp(self.saved.len());
        }
        let removed_before = match self.cursor.index() {
            Some(current) => self.saved[..current.min(self.saved.len())]
                .iter()
                .filter(|saved| saved.name == name)
                .count(),
            None => 0,
        };

        let deleted = self.store.delete(name)?;
        self.refresh_after_write()?;
        self.cursor = self.cursor.after_removal(removed_before, self.saved.len());
        info!(name, deleted, saved = self.saved.len(), cursor = ?self.cursor, "removed exercise");
        Ok(self.cursor)
    }

    /// Remove whatever the cursor points at. Returns the removed record, or
    /// `None` when nothing is saved.
    pub fn remove_current(&mut self) -> StoreResult<Option<ExerciseRecord>> {
        let Some(current) = self.current().cloned() else {
            return Ok(None);
        };
        self.remove(&current.name)?;
        Ok(Some(current))
    }

    /// Overwrite the record with row id `id`. Renaming onto a name that
    /// another row already uses is refused so the saved set stays unique.
    pub fn update(&mut self, id: i64, record: &ExerciseRecord) -> StoreResult<()> {
        self.refresh()?;
        let clash = self
            .ids
            .iter()
            .zip(&self.saved)
            .any(|(other_id, saved)| *other_id != id && saved.name == record.name);
        if clash {
            return Err(StoreError::DuplicateKey(record.name.clone()));
        }

        self.store.update(id, record)?;
        self.refresh_after_write()?;
        self.cursor = self.cursor.clamp(self.saved.len());
        info!(id, name = %record.name, "updated exercise");
        Ok(())
    }

    pub fn saved(&self) -> &[ExerciseRecord] {
        &self.saved
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The record under the cursor.
    pub fn current(&self) -> Option<&ExerciseRecord> {
        self.cursor.index().and_then(|idx| self.saved.get(idx))
    }

    /// Row id of the record under the cursor, for `update`.
    pub fn current_id(&self) -> Option<i64> {
        self.cursor.index().and_then(|idx| self.ids.get(idx).copied())
    }

    pub fn previous(&mut self) -> Cursor {
        self.cursor = self.cursor.previous();
        self.cursor
    }

    pub fn next(&mut self) -> Cursor {
        self.cursor = self.cursor.next(self.saved.len());
        self.cursor
    }

    /// Search results that are not saved yet, against the current mirror.
    pub fn unsaved(&self, candidates: &[ExerciseRecord]) -> Vec<ExerciseRecord> {
        filter_unsaved(candidates, &self.saved)
    }

    /// True when a write succeeded but the mirror could not be re-read.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Read-only view of the underlying store. Writes go through the
    /// library; the store's mutators need `&mut`.
    ///
    /// ```compile_fail
    /// use exercise_guide::{ExerciseLibrary, ExerciseRecord, ExerciseStore};
    ///
    /// let store = ExerciseStore::open_in_memory(false).unwrap();
    /// let library = ExerciseLibrary::open(store).unwrap();
    /// library.store().insert(&ExerciseRecord::default()).unwrap();
    /// ```
    pub fn store(&self) -> &ExerciseStore {
        &self.store
    }

    fn refresh(&mut self) -> StoreResult<()> {
        let rows = self.store.list_rows()?;
        let (ids, saved): (Vec<i64>, Vec<ExerciseRecord>) =
            rows.into_iter().map(|row| (row.id, row.record)).unzip();
        self.ids = ids;
        self.saved = saved;
        self.stale = false;
        Ok(())
    }

    fn refresh_after_write(&mut self) -> StoreResult<()> {
        self.refresh().inspect_err(|err| {
            self.stale = true;
            warn!(error = %err, "store changed but the saved set could not be re-read");
        })
    }
}
