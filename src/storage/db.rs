use rusqlite::Connection;
use tokio::sync::mpsc;
use tracing::debug;

use super::StorageCommand;
use super::queries;

/// Serves storage commands on the calling thread until every sender is gone.
pub fn run_worker(conn: Connection, mut cmd_rx: mpsc::Receiver<StorageCommand>) {
    while let Some(cmd) = cmd_rx.blocking_recv() {
        match cmd {
            StorageCommand::SaveSession { session, reply } => {
                let result = queries::save_session(&conn, &session);
                let _ = reply.send(result);
            }
            StorageCommand::LoadSession { reply } => {
                let result = queries::load_session(&conn);
                let _ = reply.send(result);
            }
            StorageCommand::ClearSession { reply } => {
                let result = queries::clear_session(&conn);
                let _ = reply.send(result);
            }
        }
    }
    debug!("storage worker stopped");
}
