use crate::{Document, DocumentKind, Store, StoreError, decode, encode};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use txmatch_types::{TestRunId, Transaction};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
     kind TEXT NOT NULL,
     id TEXT NOT NULL,
     run_id TEXT,
     body TEXT NOT NULL,
     updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now')),
     PRIMARY KEY (kind, id)
   );
   CREATE INDEX IF NOT EXISTS documents_by_run ON documents (kind, run_id, id);";

/// SQLite-backed store. One connection, serialized behind a mutex.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`, including parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }

    fn query_bodies<D: Document>(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<D>, StoreError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (id, body) = row?;
            out.push(decode(&id, &body)?);
        }
        Ok(out)
    }
}

impl Store for SqliteStore {
    fn insert<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        let body = encode(doc)?;
        self.with_conn(|conn| {
            let changed = conn.execute(
                "INSERT INTO documents (kind, id, run_id, body)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(kind, id) DO NOTHING;",
                params![D::KIND.as_str(), doc.id(), doc.run_id(), body],
            )?;
            if changed == 0 {
                return Err(StoreError::Conflict {
                    kind: D::KIND,
                    id: doc.id().to_string(),
                });
            }
            Ok(())
        })
    }

    fn upsert<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        let body = encode(doc)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (kind, id, run_id, body, updated_at)
                 VALUES (?1, ?2, ?3, ?4, strftime('%s','now'))
                 ON CONFLICT(kind, id)
                 DO UPDATE SET
                   run_id = excluded.run_id,
                   body = excluded.body,
                   updated_at = excluded.updated_at;",
                params![D::KIND.as_str(), doc.id(), doc.run_id(), body],
            )?;
            Ok(())
        })
    }

    fn get<D: Document>(&self, id: &str) -> Result<Option<D>, StoreError> {
        self.with_conn(|conn| {
            let body: Option<String> = conn
                .query_row(
                    "SELECT body FROM documents WHERE kind = ?1 AND id = ?2 LIMIT 1;",
                    params![D::KIND.as_str(), id],
                    |row| row.get(0),
                )
                .optional()?;
            body.map(|b| decode(id, &b)).transpose()
        })
    }

    fn list<D: Document>(&self) -> Result<Vec<D>, StoreError> {
        self.with_conn(|conn| {
            Self::query_bodies(
                conn,
                "SELECT id, body FROM documents WHERE kind = ?1 ORDER BY id ASC;",
                params![D::KIND.as_str()],
            )
        })
    }

    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM documents WHERE kind = ?1 AND id = ?2;",
                params![D::KIND.as_str(), id],
            )?;
            Ok(changed > 0)
        })
    }

    fn transactions_for_run(&self, run: &TestRunId) -> Result<Vec<Transaction>, StoreError> {
        self.with_conn(|conn| {
            Self::query_bodies(
                conn,
                "SELECT id, body FROM documents
                 WHERE kind = ?1 AND run_id = ?2
                 ORDER BY id DESC;",
                params![DocumentKind::Transaction.as_str(), run.as_str()],
            )
        })
    }
}
