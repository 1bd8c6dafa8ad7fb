use rusqlite::Connection;
use tracing::info;

use super::StorageError;

/// Ordered schema steps. The database's `user_version` records the last one
/// applied.
const MIGRATIONS: [(i64, &str); 1] = [(1, include_str!("sql/001_initial.sql"))];

const CURRENT_VERSION: i64 = MIGRATIONS[MIGRATIONS.len() - 1].0;

fn schema_version(conn: &Connection) -> Result<i64, StorageError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let applied = schema_version(conn)?;
    if applied >= CURRENT_VERSION {
        return Ok(());
    }

    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > applied) {
        let step = |conn: &Connection| -> rusqlite::Result<()> {
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()
        };
        step(conn).map_err(|e| StorageError::Migration {
            version,
            error: e.to_string(),
        })?;
        info!(version, "applied session schema migration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |r| r.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        run_migrations(&conn).unwrap();

        assert!(table_exists(&conn, "session"));
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn rerunning_skips_applied_steps() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO session (slot, profile, saved_at) VALUES ('current', '{}', 1)",
            [],
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM session", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn failed_step_is_reported_with_its_version() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE session (x INTEGER)").unwrap();

        let err = run_migrations(&conn).unwrap_err();

        assert!(matches!(err, StorageError::Migration { version: 1, .. }));
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }
}
