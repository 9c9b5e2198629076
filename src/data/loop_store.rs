//! Loop data access object

use super::models::{ExperienceLevel, Language, Loop, LoopDraft};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Data access object for Loop operations.
///
/// Loops are written once and read many times; the only mutation the store
/// supports is the explanation write. There is no update-in-place and no
/// delete.
#[derive(Clone)]
pub struct LoopStore {
    conn: Arc<Mutex<Connection>>,
}

impl LoopStore {
    /// Create a new LoopStore
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Persist a draft, assigning the identifier and creation timestamp.
    ///
    /// The timestamp is taken while holding the connection lock, so
    /// `created_at` is non-decreasing across records created by this
    /// process. Returns the full persisted record; its id is usable
    /// immediately for retrieval.
    pub fn create(&self, draft: &LoopDraft) -> SqliteResult<Loop> {
        let conn = self.conn.lock().unwrap();
        let record = Loop {
            id: Uuid::new_v4(),
            user_id: draft.user_id.clone(),
            prompt: draft.prompt.clone(),
            language: draft.language,
            code: draft.code.clone(),
            explanation: draft.explanation.clone(),
            experience_level: draft.experience_level,
            parent_loop_id: draft.parent_loop_id,
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO loops (id, user_id, prompt, language, code, explanation, experience_level, parent_loop_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id.to_string(),
                record.user_id,
                record.prompt,
                record.language.as_str(),
                record.code,
                record.explanation,
                record.experience_level.map(|level| level.as_str()),
                record.parent_loop_id.map(|id| id.to_string()),
                record.created_at.to_rfc3339(),
            ],
        )?;

        Ok(record)
    }

    /// Get a loop by ID. No ownership check is performed at this layer.
    pub fn get_by_id(&self, id: Uuid) -> SqliteResult<Option<Loop>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, prompt, language, code, explanation, experience_level, parent_loop_id, created_at
             FROM loops WHERE id = ?1",
        )?;

        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_loop(row)?))
        } else {
            Ok(None)
        }
    }

    /// Get all loops owned by a user, most recent first.
    ///
    /// Ties in created_at have store-determined relative order. An owner
    /// with zero loops yields an empty vec.
    pub fn list_by_owner(&self, user_id: &str) -> SqliteResult<Vec<Loop>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, prompt, language, code, explanation, experience_level, parent_loop_id, created_at
             FROM loops WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;

        let loops = stmt
            .query_map(params![user_id], Self::row_to_loop)?
            .collect::<SqliteResult<Vec<Loop>>>()?;

        Ok(loops)
    }

    /// Count loops owned by a user.
    pub fn count_by_owner(&self, user_id: &str) -> SqliteResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM loops WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Write the explanation for a loop, overwriting any previous one.
    ///
    /// This is the single mutation the store permits after creation.
    /// Returns false when no record with that id exists.
    pub fn set_explanation(&self, id: Uuid, explanation: &str) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE loops SET explanation = ?2 WHERE id = ?1",
            params![id.to_string(), explanation],
        )?;
        Ok(updated > 0)
    }

    /// Convert a database row to a Loop
    fn row_to_loop(row: &rusqlite::Row) -> SqliteResult<Loop> {
        let id_str: String = row.get(0)?;
        let language_str: String = row.get(3)?;
        let experience_level_raw: Option<String> = row.get(6)?;
        let parent_raw: Option<String> = row.get(7)?;
        let created_at_str: String = row.get(8)?;

        let id = Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let language = Language::from_str(&language_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
        })?;
        let experience_level = experience_level_raw
            .as_deref()
            .and_then(|value| ExperienceLevel::from_str(value).ok());
        // Lineage is non-owning; an unparseable parent reference degrades to
        // a root loop rather than failing the read.
        let parent_loop_id = parent_raw
            .as_deref()
            .and_then(|value| Uuid::parse_str(value).ok());
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    8,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(Loop {
            id,
            user_id: row.get(1)?,
            prompt: row.get(2)?,
            language,
            code: row.get(4)?,
            explanation: row.get(5)?,
            experience_level,
            parent_loop_id,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Database;
    use tempfile::tempdir;

    fn setup_db() -> (tempfile::TempDir, Database, LoopStore) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db")).unwrap();
        let store = LoopStore::new(db.connection());
        (dir, db, store)
    }

    fn hello_world_draft(user_id: &str) -> LoopDraft {
        LoopDraft::new(
            user_id,
            "Write a hello world",
            Language::Python,
            "print('hello')",
        )
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let (_dir, _db, store) = setup_db();
        let draft = hello_world_draft("u1");

        let created = store.create(&draft).unwrap();
        let fetched = store.get_by_id(created.id).unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.user_id, "u1");
        assert_eq!(fetched.prompt, "Write a hello world");
        assert_eq!(fetched.language, Language::Python);
        assert_eq!(fetched.code, "print('hello')");
        assert!(fetched.explanation.is_none());
        assert!(fetched.parent_loop_id.is_none());
    }

    #[test]
    fn test_get_unknown_id_is_none() {
        let (_dir, _db, store) = setup_db();
        assert!(store.get_by_id(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_list_by_owner_filters_and_orders() {
        let (_dir, _db, store) = setup_db();

        let first = store.create(&hello_world_draft("u1")).unwrap();
        let second = store
            .create(&LoopDraft::new(
                "u1",
                "Add a greeting name",
                Language::Python,
                "print(f'hello {name}')",
            ))
            .unwrap();
        store.create(&hello_world_draft("other")).unwrap();

        let loops = store.list_by_owner("u1").unwrap();
        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(|l| l.user_id == "u1"));
        // Most recent first
        assert_eq!(loops[0].id, second.id);
        assert_eq!(loops[1].id, first.id);
        assert!(loops[0].created_at >= loops[1].created_at);
    }

    #[test]
    fn test_list_unknown_owner_is_empty() {
        let (_dir, _db, store) = setup_db();
        assert!(store.list_by_owner("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_rapid_creates_get_distinct_ids() {
        let (_dir, _db, store) = setup_db();

        let a = store.create(&hello_world_draft("u1")).unwrap();
        let b = store.create(&hello_world_draft("u1")).unwrap();

        assert_ne!(a.id, b.id);
        let loops = store.list_by_owner("u1").unwrap();
        assert_eq!(loops.len(), 2);
    }

    #[test]
    fn test_fork_leaves_parent_unchanged() {
        let (_dir, _db, store) = setup_db();

        let parent = store.create(&hello_world_draft("u1")).unwrap();
        let child_draft = parent.fork_seed().into_draft(
            "u1",
            "Add a greeting name",
            Language::Python,
            "print(f'hello {name}')",
        );
        let child = store.create(&child_draft).unwrap();

        assert_eq!(child.parent_loop_id, Some(parent.id));
        assert_ne!(child.id, parent.id);

        let refetched = store.get_by_id(parent.id).unwrap().unwrap();
        assert_eq!(refetched, parent);
    }

    #[test]
    fn test_set_explanation_overwrites() {
        let (_dir, _db, store) = setup_db();
        let created = store.create(&hello_world_draft("u1")).unwrap();

        assert!(store.set_explanation(created.id, "first take").unwrap());
        assert!(store.set_explanation(created.id, "second take").unwrap());

        let fetched = store.get_by_id(created.id).unwrap().unwrap();
        assert_eq!(fetched.explanation.as_deref(), Some("second take"));
        // Everything else untouched
        assert_eq!(fetched.code, created.code);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[test]
    fn test_set_explanation_unknown_id() {
        let (_dir, _db, store) = setup_db();
        assert!(!store.set_explanation(Uuid::new_v4(), "nope").unwrap());
    }

    #[test]
    fn test_count_by_owner() {
        let (_dir, _db, store) = setup_db();
        store.create(&hello_world_draft("u1")).unwrap();
        store.create(&hello_world_draft("u1")).unwrap();
        store.create(&hello_world_draft("u2")).unwrap();

        assert_eq!(store.count_by_owner("u1").unwrap(), 2);
        assert_eq!(store.count_by_owner("u2").unwrap(), 1);
        assert_eq!(store.count_by_owner("u3").unwrap(), 0);
    }
}
