//! SQLite-backed board persistence.
//!
//! # Responsibility
//! - Implement `BoardPersistence` over the migrated board schema.
//! - Keep SQL and column encoding inside the persistence boundary.
//!
//! # Invariants
//! - `save` replaces the stored board inside one transaction.
//! - Read paths reject malformed rows instead of masking them.

use crate::db::migrations::ensure_current;
use crate::db::{open_db, open_db_in_memory};
use crate::model::category::Category;
use crate::model::task::{Task, TaskPriority};
use crate::repo::snapshot::{BoardPersistence, BoardSnapshot, PersistError, PersistResult};
use chrono::NaiveDate;
use log::{debug, error};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Board persistence stored in one SQLite database.
pub struct SqliteBoardStore {
    conn: Mutex<Connection>,
}

impl SqliteBoardStore {
    /// Wraps an already migrated connection.
    pub fn try_new(conn: Connection) -> PersistResult<Self> {
        ensure_current(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> PersistResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }
}

impl BoardPersistence for SqliteBoardStore {
    fn load_all(&self) -> PersistResult<BoardSnapshot> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT uuid, name
             FROM categories
             ORDER BY position ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }

        let mut stmt = conn.prepare(
            "SELECT uuid, title, completed, due_date, category_uuid, priority, created_seq
             FROM tasks
             ORDER BY created_seq ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        let next_seq: i64 =
            conn.query_row("SELECT next_seq FROM board_meta WHERE id = 1;", [], |row| {
                row.get(0)
            })?;
        let next_seq = u64::try_from(next_seq).map_err(|_| {
            PersistError::InvalidData(format!("invalid next_seq `{next_seq}` in board_meta"))
        })?;

        debug!(
            "event=board_load module=repo status=ok categories={} tasks={}",
            categories.len(),
            tasks.len()
        );
        Ok(BoardSnapshot {
            categories,
            tasks,
            next_seq,
        })
    }

    fn save(&self, snapshot: &BoardSnapshot) -> PersistResult<()> {
        let started_at = Instant::now();
        let mut conn = self.conn.lock();
        let result = write_snapshot(&mut conn, snapshot);
        match &result {
            Ok(()) => debug!(
                "event=board_save module=repo status=ok duration_ms={} categories={} tasks={}",
                started_at.elapsed().as_millis(),
                snapshot.categories.len(),
                snapshot.tasks.len()
            ),
            Err(err) => error!(
                "event=board_save module=repo status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

fn write_snapshot(conn: &mut Connection, snapshot: &BoardSnapshot) -> PersistResult<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM tasks;", [])?;
    tx.execute("DELETE FROM categories;", [])?;

    for (position, category) in snapshot.categories.iter().enumerate() {
        tx.execute(
            "INSERT INTO categories (uuid, name, position) VALUES (?1, ?2, ?3);",
            params![
                category.id.to_string(),
                category.name.as_str(),
                position as i64
            ],
        )?;
    }

    for task in &snapshot.tasks {
        tx.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                completed,
                due_date,
                category_uuid,
                priority,
                created_seq
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.completed,
                task.due_date
                    .map(|date| date.format(DUE_DATE_FORMAT).to_string()),
                task.category_id.map(|id| id.to_string()),
                task.priority.map(TaskPriority::as_str),
                seq_to_db(task.created_seq)?,
            ],
        )?;
    }

    tx.execute(
        "UPDATE board_meta SET next_seq = ?1 WHERE id = 1;",
        [seq_to_db(snapshot.next_seq)?],
    )?;
    tx.commit()?;
    Ok(())
}

fn parse_category_row(row: &Row<'_>) -> PersistResult<Category> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "categories.uuid")?;
    Ok(Category::with_id(id, row.get::<_, String>("name")?))
}

fn parse_task_row(row: &Row<'_>) -> PersistResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "tasks.uuid")?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(PersistError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    let due_date = row
        .get::<_, Option<String>>("due_date")?
        .map(|value| {
            NaiveDate::parse_from_str(&value, DUE_DATE_FORMAT).map_err(|_| {
                PersistError::InvalidData(format!("invalid due date `{value}` in tasks.due_date"))
            })
        })
        .transpose()?;

    let category_id = row
        .get::<_, Option<String>>("category_uuid")?
        .map(|value| parse_uuid(&value, "tasks.category_uuid"))
        .transpose()?;

    let priority = row
        .get::<_, Option<String>>("priority")?
        .map(|value| {
            TaskPriority::parse(&value).ok_or_else(|| {
                PersistError::InvalidData(format!("invalid priority `{value}` in tasks.priority"))
            })
        })
        .transpose()?;

    let created_seq: i64 = row.get("created_seq")?;
    let created_seq = u64::try_from(created_seq).map_err(|_| {
        PersistError::InvalidData(format!(
            "invalid created_seq `{created_seq}` in tasks.created_seq"
        ))
    })?;

    Ok(Task {
        id,
        title: row.get("title")?,
        completed,
        due_date,
        category_id,
        priority,
        created_seq,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> PersistResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| PersistError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn seq_to_db(value: u64) -> PersistResult<i64> {
    i64::try_from(value)
        .map_err(|_| PersistError::InvalidData(format!("sequence value {value} exceeds storage range")))
}
