//! Per-user bot credential persistence.

use crate::migration::run_migrations;
use chrono::Utc;
use dashmap::DashMap;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};
use turbonet_types::error::{TurboNetError, TurboNetResult};

/// How long a writer waits on a locked database file before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Mapping from platform user id to an opaque bot credential.
///
/// `set` is an upsert with last-write-wins semantics. Implementations must be
/// safe to share across tasks.
pub trait CredentialStore: Send + Sync {
    /// Credential bound to `user_id`, if any.
    fn get(&self, user_id: &str) -> TurboNetResult<Option<String>>;

    /// Bind or re-bind `user_id` to `credential`.
    fn set(&self, user_id: &str, credential: &str) -> TurboNetResult<()>;
}

/// How many idle file connections the pool keeps for reuse.
const MAX_IDLE_CONNECTIONS: usize = 4;

/// Where a [`SqliteCredentialStore`] gets its connections.
enum Backing {
    /// Database file. Each operation checks out its own connection, so
    /// operations on different users run in parallel; SQLite's WAL and the
    /// busy timeout order the writers.
    File {
        path: PathBuf,
        idle: Mutex<Vec<Connection>>,
    },
    /// Private in-memory database. It exists only inside its one connection,
    /// so operations take turns on it.
    Memory(Mutex<Connection>),
}

/// Credential store backed by SQLite.
///
/// A lock is only held to check a pooled connection in or out, never while a
/// statement runs.
#[derive(Clone)]
pub struct SqliteCredentialStore {
    backing: Arc<Backing>,
}

fn storage_err(e: rusqlite::Error) -> TurboNetError {
    TurboNetError::Storage(e.to_string())
}

/// Open a connection to the database file with the store's pragmas applied.
fn open_connection(path: &Path) -> TurboNetResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags).map_err(storage_err)?;
    conn.busy_timeout(BUSY_TIMEOUT).map_err(storage_err)?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))
        .map_err(storage_err)?;
    Ok(conn)
}

impl SqliteCredentialStore {
    /// Open (or create) the database file at `path` and run migrations.
    pub fn open(path: &Path) -> TurboNetResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = open_connection(path)?;
        run_migrations(&conn).map_err(storage_err)?;
        info!(path = %path.display(), "Opened credential store");
        Ok(Self {
            backing: Arc::new(Backing::File {
                path: path.to_path_buf(),
                idle: Mutex::new(vec![conn]),
            }),
        })
    }

    /// Open a private in-memory database (tests, throwaway runs).
    pub fn open_in_memory() -> TurboNetResult<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        run_migrations(&conn).map_err(storage_err)?;
        Ok(Self {
            backing: Arc::new(Backing::Memory(Mutex::new(conn))),
        })
    }

    /// Run `op` on a connection of its own.
    fn with_conn<T>(
        &self,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> TurboNetResult<T> {
        match self.backing.as_ref() {
            Backing::Memory(conn) => {
                let conn = conn
                    .lock()
                    .map_err(|e| TurboNetError::Storage(e.to_string()))?;
                op(&conn).map_err(storage_err)
            }
            Backing::File { path, idle } => {
                let pooled = idle
                    .lock()
                    .map_err(|e| TurboNetError::Storage(e.to_string()))?
                    .pop();
                let conn = match pooled {
                    Some(conn) => conn,
                    None => {
                        debug!("Opening additional credential store connection");
                        open_connection(path)?
                    }
                };
                let result = op(&conn).map_err(storage_err);
                if let Ok(mut idle) = idle.lock() {
                    if idle.len() < MAX_IDLE_CONNECTIONS {
                        idle.push(conn);
                    }
                }
                result
            }
        }
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn get(&self, user_id: &str) -> TurboNetResult<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT credential FROM user_bind WHERE user_id = ?1",
                rusqlite::params![user_id],
                |row| row.get::<_, String>(0),
            )
            .optional()
        })
    }

    fn set(&self, user_id: &str, credential: &str) -> TurboNetResult<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_bind (user_id, credential, bound_at, updated_at) VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET credential = ?2, updated_at = ?3",
                rusqlite::params![user_id, credential, now],
            )
        })?;
        debug!(user = %user_id, "Credential upserted");
        Ok(())
    }
}

/// Credential store held in a sharded concurrent map.
///
/// Writers to different users usually land on different shards and never
/// contend; writers to the same user are serialized by the shard lock.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCredentialStore {
    entries: Arc<DashMap<String, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound users.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no user is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, user_id: &str) -> TurboNetResult<Option<String>> {
        Ok(self.entries.get(user_id).map(|entry| entry.value().clone()))
    }

    fn set(&self, user_id: &str, credential: &str) -> TurboNetResult<()> {
        self.entries
            .insert(user_id.to_string(), credential.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backends() -> Vec<Box<dyn CredentialStore>> {
        vec![
            Box::new(SqliteCredentialStore::open_in_memory().unwrap()),
            Box::new(InMemoryCredentialStore::new()),
        ]
    }

    #[test]
    fn test_get_missing() {
        for store in backends() {
            assert_eq!(store.get("nobody").unwrap(), None);
        }
    }

    #[test]
    fn test_set_get() {
        for store in backends() {
            store.set("10001", "4861ae6c-c4f1").unwrap();
            assert_eq!(store.get("10001").unwrap().as_deref(), Some("4861ae6c-c4f1"));
        }
    }

    #[test]
    fn test_rebind_last_write_wins() {
        for store in backends() {
            store.set("10001", "k1").unwrap();
            store.set("10001", "k2").unwrap();
            assert_eq!(store.get("10001").unwrap().as_deref(), Some("k2"));
        }
    }

    #[test]
    fn test_users_are_independent() {
        for store in backends() {
            store.set("a", "ka").unwrap();
            store.set("b", "kb").unwrap();
            assert_eq!(store.get("a").unwrap().as_deref(), Some("ka"));
            assert_eq!(store.get("b").unwrap().as_deref(), Some("kb"));
        }
    }

    #[test]
    fn test_rebind_keeps_bound_at() {
        let store = SqliteCredentialStore::open_in_memory().unwrap();
        let bound_at = |store: &SqliteCredentialStore| -> (String, i64) {
            store
                .with_conn(|conn| {
                    conn.query_row(
                        "SELECT bound_at, (SELECT COUNT(*) FROM user_bind) FROM user_bind WHERE user_id = 'u'",
                        [],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                })
                .unwrap()
        };
        store.set("u", "k1").unwrap();
        let (first, _) = bound_at(&store);
        store.set("u", "k2").unwrap();
        let (second, count) = bound_at(&store);
        assert_eq!(second, first);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_file_store_reads_while_other_user_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteCredentialStore::open(&dir.path().join("t.db")).unwrap());
        store.set("b", "kb").unwrap();

        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let holder = {
            let store = store.clone();
            std::thread::spawn(move || {
                store
                    .with_conn(|conn| {
                        conn.query_row(
                            "SELECT credential FROM user_bind WHERE user_id = 'a'",
                            [],
                            |row| row.get::<_, String>(0),
                        )
                        .optional()?;
                        started_tx.send(()).unwrap();
                        release_rx.recv_timeout(Duration::from_secs(5)).unwrap();
                        Ok(())
                    })
                    .unwrap();
            })
        };

        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        // Completes while the operation for "a" still holds its connection.
        assert_eq!(store.get("b").unwrap().as_deref(), Some("kb"));
        store.set("c", "kc").unwrap();
        release_tx.send(()).unwrap();
        holder.join().unwrap();
        assert_eq!(store.get("c").unwrap().as_deref(), Some("kc"));
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("turbonet.db");
        {
            let store = SqliteCredentialStore::open(&path).unwrap();
            store.set("10001", "persisted").unwrap();
        }
        let store = SqliteCredentialStore::open(&path).unwrap();
        assert_eq!(store.get("10001").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let dir = tempfile::tempdir().unwrap();
        let sqlite = Arc::new(SqliteCredentialStore::open(&dir.path().join("c.db")).unwrap());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let sqlite = sqlite.clone();
            handles.push(std::thread::spawn(move || {
                let user = format!("user-{}", i % 4);
                let key = format!("key-{i}");
                store.set(&user, &key).unwrap();
                sqlite.set(&user, &key).unwrap();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 4);
        for i in 0..4 {
            let user = format!("user-{i}");
            assert!(store.get(&user).unwrap().is_some());
            assert!(sqlite.get(&user).unwrap().is_some());
        }
    }
}
