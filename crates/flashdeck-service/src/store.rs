use std::path::Path;
use std::sync::{Arc, Mutex};

use flashdeck_core::flashcard::{CardId, CardInput, Flashcard};
use rusqlite::{params, Connection, Row};

use crate::ServiceError;

/// Converts `rusqlite::Result<T>` into `Result<T, ServiceError>`.
trait SqliteResultExt<T> {
    fn to_service(self) -> Result<T, ServiceError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_service(self) -> Result<T, ServiceError> {
        self.map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

/// SQLite table of flashcards. Ids come from `AUTOINCREMENT`, so a deleted
/// id is never handed out again.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`, creating parent directories.
    pub fn open_path(path: &Path) -> Result<Self, ServiceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ServiceError::Internal(format!("create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path).to_service()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )
        .to_service()?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, ServiceError> {
        Self::init(Connection::open_in_memory().to_service()?)
    }

    fn init(conn: Connection) -> Result<Self, ServiceError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS flashcards (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                answer   TEXT NOT NULL,
                topic    TEXT NOT NULL DEFAULT 'General'
            );",
        )
        .to_service()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Connection) -> Result<T, ServiceError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ServiceError::Internal("card store lock poisoned".into()))?;
        f(&conn)
    }

    /// All cards, newest first.
    pub fn list(&self) -> Result<Vec<Flashcard>, ServiceError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, question, answer, topic FROM flashcards ORDER BY id DESC")
                .to_service()?;
            let cards = stmt
                .query_map([], row_to_card)
                .to_service()?
                .collect::<Result<Vec<_>, _>>()
                .to_service()?;
            Ok(cards)
        })
    }

    pub fn insert(&self, input: &CardInput) -> Result<Flashcard, ServiceError> {
        let topic = input.resolved_topic();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO flashcards (question, answer, topic) VALUES (?1, ?2, ?3)",
                params![input.question, input.answer, topic],
            )
            .to_service()?;
            Ok(Flashcard {
                id: conn.last_insert_rowid(),
                question: input.question.clone(),
                answer: input.answer.clone(),
                topic: Some(topic),
            })
        })
    }

    pub fn update(&self, id: CardId, input: &CardInput) -> Result<Flashcard, ServiceError> {
        let topic = input.resolved_topic();
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE flashcards SET question = ?1, answer = ?2, topic = ?3 WHERE id = ?4",
                    params![input.question, input.answer, topic, id],
                )
                .to_service()?;
            if changed == 0 {
                return Err(ServiceError::NotFound(format!("flashcard {id}")));
            }
            Ok(Flashcard {
                id,
                question: input.question.clone(),
                answer: input.answer.clone(),
                topic: Some(topic),
            })
        })
    }

    pub fn delete(&self, id: CardId) -> Result<(), ServiceError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM flashcards WHERE id = ?1", params![id])
                .to_service()?;
            if changed == 0 {
                return Err(ServiceError::NotFound(format!("flashcard {id}")));
            }
            Ok(())
        })
    }
}

fn row_to_card(row: &Row) -> rusqlite::Result<Flashcard> {
    Ok(Flashcard {
        id: row.get("id")?,
        question: row.get("question")?,
        answer: row.get("answer")?,
        topic: row.get("topic")?,
    })
}
