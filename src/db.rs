//! Key-value storage and the task store built on top of it.
//!
//! Storage is a directory of JSON files, one file per slot. The task list
//! lives in a single slot and is always rewritten whole. Writes issued from
//! the UI go through a single background writer so they land in issue order
//! without blocking the render loop.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};

use crate::error::StoreError;
use crate::task::{assign_missing_ids, next_id, Task};

/// Slot holding the serialized task list.
pub const TASKS_KEY: &str = "tasks";

/// Slot holding the next unused task id.
pub const TASK_SEQ_KEY: &str = "task_seq";

/// A durable map from slot names to serialized strings.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. A slot that was never written is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a slot.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// File-backed storage: slot `k` lives at `<dir>/k.json`.
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileKv { dir: dir.into() }
    }

    /// Path of the file backing a slot.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(buf) => Ok(Some(buf)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { key: key.to_string(), source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let write_err = |source: io::Error| StoreError::Write { key: key.to_string(), source };
        fs::create_dir_all(&self.dir).map_err(write_err)?;

        // Atomic-ish write via temp + rename.
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(write_err)?;
        f.write_all(value.as_bytes()).map_err(write_err)?;
        f.flush().map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;
        Ok(())
    }
}

/// In-memory storage, used by tests and as a scratch store.
#[derive(Debug, Default)]
pub struct MemoryKv {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a high-water-mark counter slot. Absent or unreadable counters read as 0.
pub fn load_counter(kv: &dyn KeyValueStore, key: &str) -> u64 {
    match kv.get(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("event=counter_load module=store status=fallback key={key} reason=not_a_number");
            0
        }),
        Ok(None) => 0,
        Err(e) => {
            error!("event=counter_load module=store status=error key={key} error={e}");
            0
        }
    }
}

/// Completion handle for an asynchronous save.
///
/// Dropping the handle is fine; the write still happens. There is no ordering
/// guarantee relative to saves issued through other `TaskStore` instances.
#[derive(Debug)]
pub struct SaveHandle {
    rx: Receiver<Result<(), StoreError>>,
}

impl SaveHandle {
    fn ready(result: Result<(), StoreError>) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let _ = tx.send(result);
        SaveHandle { rx }
    }

    /// Block until the write has been applied and return its outcome.
    pub fn wait(self) -> Result<(), StoreError> {
        self.rx.recv().unwrap_or(Err(StoreError::WriterGone))
    }
}

struct WriteJob {
    key: String,
    payload: String,
    done: Sender<Result<(), StoreError>>,
}

/// Single-writer queue in front of a `KeyValueStore`.
///
/// Jobs are applied strictly in submission order. Dropping the writer closes
/// the queue and waits for the pending jobs to drain.
pub struct StoreWriter {
    tx: Option<Sender<WriteJob>>,
    worker: Option<JoinHandle<()>>,
}

impl StoreWriter {
    /// Start the writer thread.
    pub fn spawn(kv: Arc<dyn KeyValueStore>) -> io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<WriteJob>();
        let worker = thread::Builder::new()
            .name("todo-store-writer".to_string())
            .spawn(move || {
                for job in rx {
                    let result = kv.set(&job.key, &job.payload);
                    match &result {
                        Ok(()) => debug!(
                            "event=slot_write module=store status=ok key={} bytes={}",
                            job.key,
                            job.payload.len()
                        ),
                        Err(e) => error!(
                            "event=slot_write module=store status=error key={} error={}",
                            job.key, e
                        ),
                    }
                    let _ = job.done.send(result);
                }
            })?;

        Ok(StoreWriter {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    /// Queue a write of `payload` into `key`.
    pub fn submit(&self, key: &str, payload: String) -> SaveHandle {
        let (done, rx) = crossbeam_channel::bounded(1);
        let job = WriteJob {
            key: key.to_string(),
            payload,
            done,
        };
        match self.tx.as_ref().map(|tx| tx.send(job)) {
            Some(Ok(())) => SaveHandle { rx },
            _ => {
                error!("event=slot_write module=store status=error key={key} error=writer_gone");
                SaveHandle::ready(Err(StoreError::WriterGone))
            }
        }
    }
}

impl Drop for StoreWriter {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Persistence boundary for the task list.
pub struct TaskStore {
    kv: Arc<dyn KeyValueStore>,
    writer: StoreWriter,
}

impl TaskStore {
    /// Open a task store over `kv`, starting its background writer.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> io::Result<Self> {
        let writer = StoreWriter::spawn(Arc::clone(&kv))?;
        Ok(TaskStore { kv, writer })
    }

    /// Load the task list, treating every failure as "no tasks".
    pub fn load(&self) -> Vec<Task> {
        match self.try_load() {
            Ok(tasks) => {
                info!("event=tasks_load module=store status=ok count={}", tasks.len());
                tasks
            }
            Err(e) => {
                error!("event=tasks_load module=store status=error error={e}");
                Vec::new()
            }
        }
    }

    /// Load the task list, reporting failures.
    pub fn try_load(&self) -> Result<Vec<Task>, StoreError> {
        let Some(buf) = self.kv.get(TASKS_KEY)? else {
            return Ok(Vec::new());
        };
        let mut tasks: Vec<Task> = serde_json::from_str(&buf).map_err(|source| StoreError::Decode {
            key: TASKS_KEY.to_string(),
            source,
        })?;
        if assign_missing_ids(&mut tasks) {
            info!("event=legacy_ids_assigned module=store status=ok count={}", tasks.len());
        }
        Ok(tasks)
    }

    /// Next unused task id: past the stored high-water mark and past every
    /// id in `tasks`, so ids of deleted tasks are never handed out again.
    pub fn next_task_id(&self, tasks: &[Task]) -> u64 {
        load_counter(self.kv.as_ref(), TASK_SEQ_KEY).max(next_id(tasks))
    }

    /// Queue a write of the task id high-water mark.
    pub fn save_next_task_id(&self, next: u64) -> SaveHandle {
        self.writer.submit(TASK_SEQ_KEY, next.to_string())
    }

    /// Queue a full rewrite of the task list. Errors are logged by the writer.
    pub fn save(&self, tasks: &[Task]) -> SaveHandle {
        match encode(tasks) {
            Ok(payload) => self.writer.submit(TASKS_KEY, payload),
            Err(e) => {
                error!("event=tasks_save module=store status=error error={e}");
                SaveHandle::ready(Err(e))
            }
        }
    }
}

fn encode(tasks: &[Task]) -> Result<String, StoreError> {
    serde_json::to_string_pretty(tasks).map_err(|source| StoreError::Encode {
        key: TASKS_KEY.to_string(),
        source,
    })
}
