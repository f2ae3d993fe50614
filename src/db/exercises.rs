use rusqlite::{params, Error as SqlError, ErrorCode, Row};
use tracing::debug;

use super::connection::ExerciseStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{ExerciseRecord, StoredExercise};

impl ExerciseStore {
    /// Append one row for `record` and return its id. The plain schema accepts
    /// duplicate names; keeping the saved set unique is the coordinator's job
    /// unless strict mode put a unique index in place.
    pub fn insert(&mut self, record: &ExerciseRecord) -> StoreResult<i64> {
        self.conn
            .execute(
                "INSERT INTO SavedExercises (name, type, muscle, equipment, difficulty, instructions)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.name,
                    record.kind,
                    record.muscle,
                    record.equipment,
                    record.difficulty,
                    record.instructions,
                ],
            )
            .map_err(|err| map_unique_constraint(err, &record.name, "insert an exercise"))?;

        let id = self.conn.last_insert_rowid();
        debug!(id, name = %record.name, "inserted exercise");
        Ok(id)
    }

    /// Overwrite every field of the row with the given id.
    pub fn update(&mut self, id: i64, record: &ExerciseRecord) -> StoreResult<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE SavedExercises
                 SET name = ?1, type = ?2, muscle = ?3, equipment = ?4, difficulty = ?5,
                     instructions = ?6
                 WHERE id = ?7",
                params![
                    record.name,
                    record.kind,
                    record.muscle,
                    record.equipment,
                    record.difficulty,
                    record.instructions,
                    id,
                ],
            )
            .map_err(|err| map_unique_constraint(err, &record.name, "update an exercise"))?;

        if updated == 0 {
            Err(StoreError::NotFound(id))
        } else {
            debug!(id, name = %record.name, "updated exercise");
            Ok(())
        }
    }

    /// Remove every row named `name`. Returns how many rows went away; zero
    /// is a normal outcome, not an error.
    pub fn delete(&mut self, name: &str) -> StoreResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM SavedExercises WHERE name = ?1", params![name])
            .map_err(StoreError::during("delete an exercise"))?;

        debug!(name, deleted, "deleted exercise rows");
        Ok(deleted)
    }

    /// The whole saved set in storage order.
    pub fn list_all(&self) -> StoreResult<Vec<ExerciseRecord>> {
        Ok(self
            .list_rows()?
            .into_iter()
            .map(|stored| stored.record)
            .collect())
    }

    /// Same as [`list_all`](Self::list_all) but keeps the row ids.
    pub fn list_rows(&self) -> StoreResult<Vec<StoredExercise>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, type, muscle, equipment, difficulty, instructions
                 FROM SavedExercises
                 ORDER BY id",
            )
            .map_err(StoreError::during("prepare the saved exercises query"))?;

        let mut rows = stmt
            .query([])
            .map_err(StoreError::during("load saved exercises"))?;

        let mut saved = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(StoreError::during("read a saved exercise row"))?
        {
            saved.push(read_stored(row)?);
        }

        Ok(saved)
    }

    /// Cheap membership probe by exact name.
    pub fn contains(&self, name: &str) -> StoreResult<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM SavedExercises WHERE name = ?1)",
                params![name],
                |row| row.get(0),
            )
            .map_err(StoreError::during("check for a saved exercise"))
    }
}

/// Hydrate one row. NULL text columns read as empty strings; anything that is
/// not text at all is reported as a malformed row.
fn read_stored(row: &Row<'_>) -> StoreResult<StoredExercise> {
    let id: i64 = row
        .get(0)
        .map_err(StoreError::during("read a saved exercise id"))?;
    let text = |idx: usize| -> StoreResult<String> {
        row.get::<_, Option<String>>(idx)
            .map(Option::unwrap_or_default)
            .map_err(|source| StoreError::MalformedRow { id, source })
    };

    Ok(StoredExercise {
        id,
        record: ExerciseRecord {
            name: text(1)?,
            kind: text(2)?,
            muscle: text(3)?,
            equipment: text(4)?,
            difficulty: text(5)?,
            instructions: text(6)?,
        },
    })
}

/// Constraint violations can only come from the strict-mode unique index, so
/// they become `DuplicateKey`. Everything else is an unavailable store.
fn map_unique_constraint(err: SqlError, name: &str, operation: &'static str) -> StoreError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        StoreError::DuplicateKey(name.to_string())
    } else {
        StoreError::during(operation)(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(name: &str) -> ExerciseRecord {
        ExerciseRecord {
            name: name.to_string(),
            kind: "strength".to_string(),
            muscle: "chest".to_string(),
            equipment: "body_only".to_string(),
            difficulty: "beginner".to_string(),
            instructions: "Lower yourself. Push back up.".to_string(),
        }
    }

    #[test]
    fn insert_then_list_keeps_insertion_order() {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        store.insert(&exercise("Push-up")).unwrap();
        store.insert(&exercise("Dips")).unwrap();
        store.insert(&exercise("Bench Press")).unwrap();

        let names: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Push-up", "Dips", "Bench Press"]);
    }

    #[test]
    fn list_all_round_trips_every_field() {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        let record = exercise("Push-up");
        store.insert(&record).unwrap();
        assert_eq!(store.list_all().unwrap(), vec![record]);
    }

    #[test]
    fn plain_schema_allows_duplicate_rows() {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        store.insert(&exercise("Push-up")).unwrap();
        store.insert(&exercise("Push-up")).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn strict_mode_reports_duplicate_key() {
        let mut store = ExerciseStore::open_in_memory(true).unwrap();
        store.insert(&exercise("Push-up")).unwrap();
        let err = store.insert(&exercise("Push-up")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref name) if name == "Push-up"));
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_all_matching_rows() {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        store.insert(&exercise("Push-up")).unwrap();
        store.insert(&exercise("Dips")).unwrap();
        store.insert(&exercise("Push-up")).unwrap();

        assert_eq!(store.delete("Push-up").unwrap(), 2);
        let remaining = store.list_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Dips");
    }

    #[test]
    fn delete_missing_name_is_a_no_op() {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        store.insert(&exercise("Dips")).unwrap();
        assert_eq!(store.delete("push-up").unwrap(), 0);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn update_overwrites_all_fields() {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        let id = store.insert(&exercise("Push-up")).unwrap();

        let replacement = ExerciseRecord {
            name: "Diamond Push-up".into(),
            kind: "plyometrics".into(),
            muscle: "triceps".into(),
            equipment: "none".into(),
            difficulty: "intermediate".into(),
            instructions: "Hands together.".into(),
        };
        store.update(id, &replacement).unwrap();

        let rows = store.list_rows().unwrap();
        assert_eq!(rows, vec![StoredExercise { id, record: replacement }]);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        let err = store.update(42, &exercise("Push-up")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[test]
    fn contains_is_case_sensitive() {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        store.insert(&exercise("Push-up")).unwrap();
        assert!(store.contains("Push-up").unwrap());
        assert!(!store.contains("push-up").unwrap());
    }

    #[test]
    fn null_columns_read_as_empty_strings() {
        let store = ExerciseStore::open_in_memory(false).unwrap();
        store
            .conn
            .execute("INSERT INTO SavedExercises (name) VALUES ('Plank')", [])
            .unwrap();

        let saved = store.list_all().unwrap();
        assert_eq!(saved[0].name, "Plank");
        assert!(saved[0].instructions.is_empty());
    }

    #[test]
    fn non_text_column_is_malformed() {
        let store = ExerciseStore::open_in_memory(false).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO SavedExercises (name, type) VALUES ('Plank', X'00FF')",
                [],
            )
            .unwrap();

        let err = store.list_all().unwrap_err();
        assert!(matches!(err, StoreError::MalformedRow { .. }));
    }

    #[test]
    fn dropped_table_surfaces_unavailable() {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        store.conn.execute("DROP TABLE SavedExercises", []).unwrap();

        assert!(matches!(
            store.list_all().unwrap_err(),
            StoreError::Unavailable { .. }
        ));
        assert!(matches!(
            store.insert(&exercise("Push-up")).unwrap_err(),
            StoreError::Unavailable { .. }
        ));
    }
}
