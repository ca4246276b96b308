//! Durable id sequence.
//!
//! One worker thread owns the counter. Callers hand it a request over a
//! rendezvous channel and block until it answers. For every request the
//! worker bumps the counter, commits the new value to the `settings` bucket,
//! and only then replies, so an id is never seen by anyone before it is on
//! disk. A restart therefore always resumes above every id ever issued.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use bucketdb::Database;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::keys::{ID_KEY, SETTINGS_BUCKET};

/// Counter value assumed when the store has never issued an id.
pub(crate) const ID_BASELINE: u64 = 1000;

#[derive(Debug, Error)]
pub(crate) enum IdError {
    #[error("failed to persist id counter: {0}")]
    Persist(#[source] bucketdb::Error),

    #[error("stored id counter {0:?} is not a decimal number")]
    CorruptCounter(String),

    #[error("id generator has stopped")]
    WorkerClosed,

    #[error("failed to spawn id generator: {0}")]
    Spawn(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] bucketdb::Error),
}

struct IdRequest {
    responder: SyncSender<Result<u64, IdError>>,
}

pub(crate) struct IdGenerator {
    requests: Option<SyncSender<IdRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl IdGenerator {
    /// Load the persisted counter and start the worker thread.
    pub(crate) fn start(db: Database) -> Result<Self, IdError> {
        let last = load_counter(&db)?;
        Self::spawn(last, move |value| persist_counter(&db, value))
    }

    /// Start the worker at `last`, committing every new value through
    /// `persist` before it is handed out.
    fn spawn<P>(last: u64, persist: P) -> Result<Self, IdError>
    where
        P: FnMut(u64) -> bucketdb::Result<()> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::sync_channel(0);

        let worker = thread::Builder::new()
            .name("anyrss-id-generator".into())
            .spawn(move || worker_loop(last, request_rx, persist))?;

        info!(last_id = last, "id generator started");
        Ok(Self {
            requests: Some(request_tx),
            worker: Some(worker),
        })
    }

    /// Block until the worker has committed the next id, then return it.
    pub(crate) fn next_id(&self) -> Result<u64, IdError> {
        let requests = self.requests.as_ref().ok_or(IdError::WorkerClosed)?;
        let (responder, response) = mpsc::sync_channel(0);
        requests
            .send(IdRequest { responder })
            .map_err(|_| IdError::WorkerClosed)?;
        match response.recv() {
            Ok(result) => result,
            Err(_) => Err(IdError::WorkerClosed),
        }
    }

    /// Stop accepting requests and wait for the worker to exit.
    pub(crate) fn shutdown(&mut self) {
        self.requests.take();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for IdGenerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load_counter(db: &Database) -> Result<u64, IdError> {
    let stored = db.update(|tx| tx.bucket(SETTINGS_BUCKET)?.get(ID_KEY))?;
    match stored {
        None => Ok(ID_BASELINE),
        Some(raw) => {
            let text = String::from_utf8_lossy(&raw);
            text.trim()
                .parse()
                .map_err(|_| IdError::CorruptCounter(text.into_owned()))
        }
    }
}

fn persist_counter(db: &Database, value: u64) -> bucketdb::Result<()> {
    db.update(|tx| {
        tx.bucket(SETTINGS_BUCKET)?
            .put(ID_KEY, value.to_string().as_bytes())
    })
}

fn worker_loop(
    mut last: u64,
    requests: Receiver<IdRequest>,
    mut persist: impl FnMut(u64) -> bucketdb::Result<()>,
) {
    while let Ok(IdRequest { responder }) = requests.recv() {
        let next = last + 1;
        if let Err(err) = persist(next) {
            // Without a durable counter a later restart could hand out the
            // same id again, so stop serving altogether.
            error!(error = %err, next_id = next, "failed to persist id counter");
            let _ = responder.send(Err(IdError::Persist(err)));
            return;
        }
        last = next;
        // A requester that went away just leaves a gap in the sequence.
        let _ = responder.send(Ok(next));
    }
    debug!(last_id = last, "id generator stopped");
}
