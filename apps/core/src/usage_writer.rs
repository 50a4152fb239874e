use std::sync::mpsc;
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use crate::usage_store::{StoreError, UsageMap, UsagePersistence};

enum WriterCommand {
    Load(mpsc::Sender<Result<UsageMap, StoreError>>),
    Save(UsageMap),
    Flush(mpsc::Sender<()>),
}

/// Moves a persistence backend onto a dedicated writer thread. `save` queues a
/// snapshot and returns at once; failed writes are logged on the writer thread.
/// Dropping the writer waits for queued writes to finish.
pub struct BackgroundUsageWriter {
    sender: Mutex<Option<mpsc::Sender<WriterCommand>>>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for BackgroundUsageWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundUsageWriter")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl BackgroundUsageWriter {
    pub fn spawn(inner: Box<dyn UsagePersistence + Send>) -> Result<Self, StoreError> {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("quickglyph-usage-writer".into())
            .spawn(move || run_writer(inner, receiver))?;
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handle: Some(handle),
        })
    }

    /// Blocks until every save queued before this call has been attempted.
    pub fn flush(&self) -> Result<(), StoreError> {
        let (done, wait) = mpsc::channel();
        self.send(WriterCommand::Flush(done))?;
        wait.recv().map_err(|_| writer_gone())
    }

    fn send(&self, command: WriterCommand) -> Result<(), StoreError> {
        let sender = self.sender.lock().map_err(|_| writer_gone())?;
        sender
            .as_ref()
            .ok_or_else(writer_gone)?
            .send(command)
            .map_err(|_| writer_gone())
    }
}

impl UsagePersistence for BackgroundUsageWriter {
    fn load(&self) -> Result<UsageMap, StoreError> {
        let (reply, wait) = mpsc::channel();
        self.send(WriterCommand::Load(reply))?;
        wait.recv().map_err(|_| writer_gone())?
    }

    fn save(&self, records: &UsageMap) -> Result<(), StoreError> {
        self.send(WriterCommand::Save(records.clone()))
    }
}

impl Drop for BackgroundUsageWriter {
    fn drop(&mut self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("usage writer thread panicked");
            }
        }
    }
}

fn run_writer(inner: Box<dyn UsagePersistence + Send>, receiver: mpsc::Receiver<WriterCommand>) {
    for command in receiver {
        match command {
            WriterCommand::Load(reply) => {
                let _ = reply.send(inner.load());
            }
            WriterCommand::Save(records) => {
                if let Err(error) = inner.save(&records) {
                    log::warn!("usage save failed, keeping in-memory state: {error}");
                }
            }
            WriterCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    log::debug!("usage writer stopped");
}

fn writer_gone() -> StoreError {
    StoreError::Unavailable("usage writer stopped".into())
}
