use crate::errors::{AppError, AppResult};
use crate::models::{NodeId, OutlineNode};
use crate::store::{generate_uid, ChildFilter, HostStore};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Outline store kept in a local SQLite database. Pages are root nodes with a
/// title; blocks are ordered by `position` under their parent.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Store(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::from)?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, db_path: Option<PathBuf>) -> AppResult<Self> {
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn find_page(&self, title: &str) -> AppResult<Option<NodeId>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id FROM nodes WHERE parent_id IS NULL AND title = ?1",
            [title],
            |row| row.get(0),
        )
        .optional()
        .map_err(AppError::from)
    }

    pub fn insert_page(&self, id: &NodeId, title: &str) -> AppResult<()> {
        let conn = self.lock()?;
        let exists: i64 = conn.query_row("SELECT COUNT(1) FROM nodes WHERE title = ?1", [title], |row| row.get(0))?;
        if exists > 0 {
            return Err(AppError::Store(format!("page {:?} already exists", title)));
        }
        conn.execute(
            "INSERT INTO nodes (id, parent_id, title, text, position, created_at)
             VALUES (?1, NULL, ?2, ?2, 0, ?3)",
            params![id, title, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn children(&self, parent: &NodeId, filter: &ChildFilter) -> AppResult<Vec<OutlineNode>> {
        let conn = self.lock()?;
        let (sql, needle) = match filter {
            ChildFilter::StartsWith(prefix) => (
                "SELECT id, text FROM nodes
                 WHERE parent_id = ?1 AND substr(text, 1, length(?2)) = ?2
                 ORDER BY position ASC",
                Some(prefix.as_str()),
            ),
            ChildFilter::Contains(needle) => (
                "SELECT id, text FROM nodes
                 WHERE parent_id = ?1 AND instr(text, ?2) > 0
                 ORDER BY position ASC",
                Some(needle.as_str()),
            ),
            ChildFilter::All => (
                "SELECT id, text FROM nodes WHERE parent_id = ?1 ORDER BY position ASC",
                None,
            ),
        };

        let mut stmt = conn.prepare(sql)?;
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<OutlineNode> {
            Ok(OutlineNode {
                id: row.get(0)?,
                text: row.get(1)?,
            })
        };
        let rows = match needle {
            Some(needle) => stmt.query_map(params![parent, needle], map_row)?.collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map(params![parent], map_row)?.collect::<Result<Vec<_>, _>>()?,
        };
        Ok(rows)
    }

    /// Inserts a block at `index` under `parent`, shifting later siblings.
    pub fn insert_child(&self, parent: &NodeId, id: &NodeId, text: &str, index: usize) -> AppResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let parent_exists: i64 = tx.query_row("SELECT COUNT(1) FROM nodes WHERE id = ?1", [parent], |row| row.get(0))?;
        if parent_exists == 0 {
            return Err(AppError::Store(format!("unknown parent {}", parent)));
        }
        let sibling_count: i64 =
            tx.query_row("SELECT COUNT(1) FROM nodes WHERE parent_id = ?1", [parent], |row| row.get(0))?;
        let position = (index as i64).min(sibling_count);

        tx.execute(
            "UPDATE nodes SET position = position + 1 WHERE parent_id = ?1 AND position >= ?2",
            params![parent, position],
        )?;
        tx.execute(
            "INSERT INTO nodes (id, parent_id, title, text, position, created_at)
             VALUES (?1, ?2, NULL, ?3, ?4, ?5)",
            params![id, parent, text, position, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn text_of(&self, id: &NodeId) -> AppResult<Option<String>> {
        let conn = self.lock()?;
        conn.query_row("SELECT text FROM nodes WHERE id = ?1", [id], |row| row.get(0))
            .optional()
            .map_err(AppError::from)
    }

    pub fn node_count(&self) -> AppResult<i64> {
        let conn = self.lock()?;
        Ok(conn.query_row("SELECT COUNT(1) FROM nodes", [], |row| row.get(0))?)
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl HostStore for SqliteStore {
    async fn find_page_by_title(&self, title: &str) -> AppResult<Option<NodeId>> {
        self.find_page(title)
    }

    async fn create_page(&self, id: &NodeId, title: &str) -> AppResult<()> {
        self.insert_page(id, title)
    }

    async fn query_children(&self, parent: &NodeId, filter: &ChildFilter) -> AppResult<Vec<OutlineNode>> {
        self.children(parent, filter)
    }

    async fn create_child(&self, parent: &NodeId, id: &NodeId, text: &str, index: usize) -> AppResult<()> {
        self.insert_child(parent, id, text, index)
    }

    fn generate_id(&self) -> NodeId {
        generate_uid()
    }
}
