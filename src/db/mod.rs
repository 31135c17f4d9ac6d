use std::{
    path::{Path, PathBuf},
    sync::mpsc,
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

mod migrations;
mod repositories;

use migrations::run_migrations;

const WORKER_THREAD_NAME: &str = "vpd-monitor-db";

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

/// The SQLite connection, parked on a worker thread of its own.
///
/// There is exactly one owner: the durable sink. Dropping it stops the worker
/// and closes the connection, which rolls back any uncommitted unit of work.
pub struct Database {
    commands: mpsc::Sender<DbCommand>,
    worker: Option<JoinHandle<()>>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (commands, inbox) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let thread_path = db_path.clone();

        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || match open_connection(&thread_path) {
                Ok(conn) => {
                    if ready_tx.send(Ok(())).is_ok() {
                        serve(conn, inbox);
                    }
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database ready at {}", db_path.display());
        Ok(Self {
            commands,
            worker: Some(worker),
        })
    }

    /// Runs `task` against the connection on the worker thread.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.commands
            .send(DbCommand::Execute(Box::new(move |conn| {
                if reply_tx.send(task(conn)).is_err() {
                    error!("DB caller went away before the result arrived");
                }
            })))
            .map_err(|_| anyhow!("database worker is no longer running"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database worker stopped while running a task"))?
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        if self.commands.send(DbCommand::Shutdown).is_err() {
            error!("Database worker already gone at shutdown");
        }
        if let Err(panic) = worker.join() {
            error!("Database worker panicked: {panic:?}");
        }
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;

    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        error!("Failed to enable WAL mode: {err}");
    }

    run_migrations(&mut conn).context("failed to run database migrations")?;
    Ok(conn)
}

fn serve(mut conn: Connection, inbox: mpsc::Receiver<DbCommand>) {
    for command in inbox {
        match command {
            DbCommand::Execute(task) => task(&mut conn),
            DbCommand::Shutdown => break,
        }
    }
    info!("Database worker shutting down");
}
