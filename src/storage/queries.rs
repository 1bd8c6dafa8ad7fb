use rusqlite::{Connection, OptionalExtension, params};

use super::StorageError;
use super::types::StoredSession;

/// Only one user is logged in at a time.
const CURRENT_SLOT: &str = "current";

pub fn save_session(conn: &Connection, session: &StoredSession) -> Result<(), StorageError> {
    let profile = serde_json::to_string(&session.profile)
        .map_err(|e| StorageError::Corrupt(e.to_string()))?;
    conn.execute(
        "INSERT INTO session (slot, profile, saved_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(slot) DO UPDATE SET
            profile = excluded.profile,
            saved_at = excluded.saved_at",
        params![CURRENT_SLOT, profile, session.saved_at],
    )?;
    Ok(())
}

pub fn load_session(conn: &Connection) -> Result<Option<StoredSession>, StorageError> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT profile, saved_at FROM session WHERE slot = ?1",
            params![CURRENT_SLOT],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((profile_json, saved_at)) = row else {
        return Ok(None);
    };
    let profile =
        serde_json::from_str(&profile_json).map_err(|e| StorageError::Corrupt(e.to_string()))?;
    Ok(Some(StoredSession { profile, saved_at }))
}

pub fn clear_session(conn: &Connection) -> Result<(), StorageError> {
    conn.execute("DELETE FROM session WHERE slot = ?1", params![CURRENT_SLOT])?;
    Ok(())
}
