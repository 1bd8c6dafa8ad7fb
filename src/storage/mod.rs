mod db;
mod migrations;
mod queries;
mod types;

use std::io;
use std::path::PathBuf;

use rusqlite::Connection;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

pub use types::StoredSession;

use crate::api::UserProfile;
use crate::session::SessionStore;

pub enum StorageLocation {
    Path(PathBuf),
    #[cfg(test)]
    InMemory,
}

#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    Channel(String),
    Migration { version: i64, error: String },
    Corrupt(String),
    NoDbPathParent,
    IO(io::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Sqlite(e) => write!(f, "Database error: {}", e),
            StorageError::Channel(msg) => write!(f, "Channel error: {}", msg),
            StorageError::Migration { version, error } => {
                write!(f, "Migration {} failed: {}", version, error)
            }
            StorageError::Corrupt(msg) => write!(f, "Stored session is unreadable: {}", msg),
            StorageError::NoDbPathParent => write!(f, "db path did not have a parent dir"),
            StorageError::IO(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Sqlite(e)
    }
}

impl<T> From<mpsc::error::SendError<T>> for StorageError {
    fn from(e: mpsc::error::SendError<T>) -> Self {
        StorageError::Channel(e.to_string())
    }
}

impl From<oneshot::error::RecvError> for StorageError {
    fn from(e: oneshot::error::RecvError) -> Self {
        StorageError::Channel(e.to_string())
    }
}

pub(crate) enum StorageCommand {
    SaveSession {
        session: StoredSession,
        reply: oneshot::Sender<Result<(), StorageError>>,
    },
    LoadSession {
        reply: oneshot::Sender<Result<Option<StoredSession>, StorageError>>,
    },
    ClearSession {
        reply: oneshot::Sender<Result<(), StorageError>>,
    },
}

/// Handle to the SQLite worker thread. Cheap to clone.
#[derive(Clone)]
pub struct Storage {
    cmd_tx: mpsc::Sender<StorageCommand>,
}

impl Storage {
    pub fn open(location: StorageLocation) -> Result<Self, StorageError> {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);

        let conn = match location {
            StorageLocation::Path(path) => {
                let parent = path.parent().ok_or(StorageError::NoDbPathParent)?;
                if !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(StorageError::IO)?;
                }
                Connection::open(&path)?
            }
            #[cfg(test)]
            StorageLocation::InMemory => Connection::open_in_memory()?,
        };

        migrations::run_migrations(&conn)?;
        std::thread::spawn(move || {
            db::run_worker(conn, cmd_rx);
        });

        Ok(Self { cmd_tx })
    }

    pub async fn save_session(&self, session: StoredSession) -> Result<(), StorageError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(StorageCommand::SaveSession { session, reply: tx })
            .await?;
        rx.await?
    }

    pub async fn load_session(&self) -> Result<Option<StoredSession>, StorageError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(StorageCommand::LoadSession { reply: tx })
            .await?;
        rx.await?
    }

    pub async fn clear_session(&self) -> Result<(), StorageError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(StorageCommand::ClearSession { reply: tx })
            .await?;
        rx.await?
    }
}

impl SessionStore for Storage {
    async fn load(&self) -> Result<Option<UserProfile>, StorageError> {
        let Some(session) = self.load_session().await? else {
            return Ok(None);
        };
        debug!(saved_at = ?session.saved_at(), "restored session");
        Ok(Some(session.profile))
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.save_session(StoredSession::new(profile.clone())).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.clear_session().await
    }
}
