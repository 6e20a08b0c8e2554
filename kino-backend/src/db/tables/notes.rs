//! Database operations for the notes table
//!
//! Every query is scoped by `user_id`; there is no way to read or delete a
//! note without naming its owner.

use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::db::{Database, StoreError};
use crate::models::Note;

impl Database {
    /// Create a note owned by `user_id`
    pub fn create_note(&self, user_id: &str, content: &str) -> Result<Note, StoreError> {
        if user_id.is_empty() || content.is_empty() {
            return Err(StoreError::Validation(
                "user_id and content are required".to_string(),
            ));
        }

        let conn = self.conn()?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO notes (user_id, content, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, content, created_at.to_rfc3339()],
        )?;

        Ok(Note {
            id: conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            created_at,
        })
    }

    /// List all notes owned by `user_id`, oldest first
    pub fn list_notes(&self, user_id: &str) -> Result<Vec<Note>, StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::Validation("user_id is required".to_string()));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, content, created_at FROM notes WHERE user_id = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            let created_at_str: String = row.get(3)?;
            let created_at = DateTime::parse_from_rfc3339(&created_at_str)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Utc);

            Ok(Note {
                id: row.get(0)?,
                user_id: row.get(1)?,
                content: row.get(2)?,
                created_at,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete a note if it exists and belongs to `user_id`.
    /// Returns false when there was no such note for this owner.
    pub fn delete_note(&self, user_id: &str, note_id: i64) -> Result<bool, StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::Validation("user_id is required".to_string()));
        }

        let conn = self.conn()?;
        let count = conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
            params![note_id, user_id],
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open(dir: &tempfile::TempDir) -> Database {
        let db_path = dir.path().join("test.db");
        Database::new(db_path.to_str().unwrap(), 2).expect("Failed to create database")
    }

    #[test]
    fn test_create_and_list_notes() {
        let dir = tempdir().unwrap();
        let db = open(&dir);

        let first = db.create_note("user-a", "buy milk").expect("Failed to create note");
        let second = db.create_note("user-a", "call mom").expect("Failed to create note");
        assert!(second.id > first.id);
        assert_eq!(first.user_id, "user-a");

        let notes = db.list_notes("user-a").expect("Failed to list notes");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0], first);
        assert_eq!(notes[1].content, "call mom");
    }

    #[test]
    fn test_notes_are_isolated_per_user() {
        let dir = tempdir().unwrap();
        let db = open(&dir);

        db.create_note("user-a", "secret plan").unwrap();
        db.create_note("user-b", "grocery list").unwrap();

        let notes = db.list_notes("user-b").unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "grocery list");
        assert!(db.list_notes("user-c").unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        let dir = tempdir().unwrap();
        let db = open(&dir);

        let err = db.create_note("", "content").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(err.to_string(), "user_id and content are required");

        assert!(matches!(
            db.create_note("user-a", ""),
            Err(StoreError::Validation(_))
        ));
        assert!(db.list_notes("user-a").unwrap().is_empty());
    }

    #[test]
    fn test_list_rejects_empty_user() {
        let dir = tempdir().unwrap();
        let db = open(&dir);

        let err = db.list_notes("").unwrap_err();
        assert_eq!(err.to_string(), "user_id is required");
    }

    #[test]
    fn test_delete_only_owned_note() {
        let dir = tempdir().unwrap();
        let db = open(&dir);

        let note = db.create_note("user-a", "keep me").unwrap();

        assert!(!db.delete_note("user-b", note.id).unwrap());
        assert_eq!(db.list_notes("user-a").unwrap().len(), 1);

        assert!(db.delete_note("user-a", note.id).unwrap());
        assert!(!db.delete_note("user-a", note.id).unwrap());
        assert!(db.list_notes("user-a").unwrap().is_empty());
    }
}
