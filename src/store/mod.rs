use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context};
use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    CaseRecord, FeedbackEntry, FeedbackKey, FeedbackKind, FeedbackRequest, ResolvedFeedback,
    ResolvedVerdict,
};

const FEEDBACK_FILE: &str = "feedback.json";
const CASE_FILE_PREFIX: &str = "results_";
const LEGACY_CASE_FILE: &str = "results.json";

type StoreTask = Box<dyn FnOnce(&mut StoreState) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct StoreInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("Failed to send shutdown to store thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join store thread: {join_err:?}");
            }
        }
    }
}

/// All persisted state, owned by the store worker thread. Case records live
/// as one JSON document per property; feedback is a single append-only JSON
/// array with an incrementally maintained latest-entry index.
struct StoreState {
    data_dir: PathBuf,
    cases: BTreeMap<String, CaseRecord>,
    feedback: Vec<FeedbackEntry>,
    latest: HashMap<FeedbackKey, usize>,
}

impl StoreState {
    fn load(data_dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&data_dir).with_context(|| {
            format!("failed to create data directory {}", data_dir.display())
        })?;

        let mut case_files = Vec::new();
        for entry in std::fs::read_dir(&data_dir)
            .with_context(|| format!("failed to read data directory {}", data_dir.display()))?
        {
            let path = entry?.path();
            if is_case_file(&path) {
                case_files.push(path);
            }
        }
        // Deterministic load order; the legacy file goes first so a
        // per-property document for the same id wins.
        case_files.sort_by_key(|path| {
            let legacy = path.file_name().and_then(|n| n.to_str()) == Some(LEGACY_CASE_FILE);
            (!legacy, path.clone())
        });

        let mut cases = BTreeMap::new();
        for path in case_files {
            match read_case_file(&path) {
                Ok(case) => {
                    cases.insert(case.property_id.clone(), case);
                }
                Err(err) => {
                    warn!("Skipping unreadable case file {}: {err:#}", path.display());
                }
            }
        }

        let feedback_path = data_dir.join(FEEDBACK_FILE);
        let feedback: Vec<FeedbackEntry> = if feedback_path.exists() {
            let contents = std::fs::read_to_string(&feedback_path).with_context(|| {
                format!("failed to read feedback log {}", feedback_path.display())
            })?;
            match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Feedback log is unparseable, starting empty: {err}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut latest = HashMap::new();
        for (index, entry) in feedback.iter().enumerate() {
            latest.insert(entry.key(), index);
        }

        Ok(Self {
            data_dir,
            cases,
            feedback,
            latest,
        })
    }

    fn case_path(&self, property_id: &str) -> PathBuf {
        self.data_dir
            .join(format!("{CASE_FILE_PREFIX}{property_id}.json"))
    }

    fn persist_case(&self, case: &CaseRecord) -> anyhow::Result<()> {
        let path = self.case_path(&case.property_id);
        let serialized = serde_json::to_string_pretty(case)?;
        std::fs::write(&path, serialized)
            .with_context(|| format!("failed to write case record to {}", path.display()))
    }

    fn persist_feedback(&self) -> anyhow::Result<()> {
        let path = self.data_dir.join(FEEDBACK_FILE);
        let serialized = serde_json::to_string_pretty(&self.feedback)?;
        std::fs::write(&path, serialized)
            .with_context(|| format!("failed to write feedback log to {}", path.display()))
    }
}

fn is_case_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    path.is_file()
        && ((name.starts_with(CASE_FILE_PREFIX) && name.ends_with(".json"))
            || name == LEGACY_CASE_FILE)
}

fn read_case_file(path: &Path) -> anyhow::Result<CaseRecord> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn validate_property_id(property_id: &str) -> Result<()> {
    let well_formed = !property_id.is_empty()
        && property_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if well_formed {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "invalid property id '{property_id}'"
        )))
    }
}

/// Handle to the case/feedback store. Cloneable across tasks; all access is
/// funneled through one worker thread, so appends are atomic per entry and
/// concurrent reviewers cannot interleave partial writes.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
    data_dir: Arc<PathBuf>,
}

impl Store {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let dir_for_thread = data_dir.clone();

        let worker = thread::Builder::new()
            .name("realview-store".into())
            .spawn(move || {
                let mut state = match StoreState::load(dir_for_thread) {
                    Ok(state) => state,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err.context("failed to load store state")));
                        return;
                    }
                };

                if ready_tx.send(Ok(())).is_err() {
                    error!("Store initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => task(&mut state),
                        StoreCommand::Shutdown => break,
                    }
                }

                info!("Store thread shutting down");
            })
            .map_err(|err| Error::Storage(anyhow!("failed to spawn store worker thread: {err}")))?;

        ready_rx
            .recv()
            .map_err(|_| Error::Storage(anyhow!("store worker exited before signaling readiness")))?
            .map_err(Error::Storage)?;

        info!("Store initialized at {}", data_dir.display());

        Ok(Self {
            inner: Arc::new(StoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            data_dir: Arc::new(data_dir),
        })
    }

    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_path()
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut StoreState) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |state| {
            let result = task(state);
            if reply_tx.send(result).is_err() {
                error!("Store caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| Error::Storage(anyhow!("failed to send command to store thread: {err}")))?;

        reply_rx
            .await
            .map_err(|_| Error::Storage(anyhow!("store thread terminated unexpectedly")))?
    }

    /// Replace the stored case record for a property wholesale and persist
    /// it as one JSON document.
    pub async fn upsert_case(&self, case: CaseRecord) -> Result<()> {
        validate_property_id(&case.property_id)?;
        self.execute(move |state| {
            state.persist_case(&case)?;
            state.cases.insert(case.property_id.clone(), case);
            Ok(())
        })
        .await
    }

    pub async fn get_case(&self, property_id: &str) -> Result<Option<CaseRecord>> {
        let property_id = property_id.to_string();
        self.execute(move |state| Ok(state.cases.get(&property_id).cloned()))
            .await
    }

    pub async fn list_cases(&self) -> Result<Vec<CaseRecord>> {
        self.execute(|state| Ok(state.cases.values().cloned().collect()))
            .await
    }

    /// Validate and append one feedback entry, updating the latest-entry
    /// index. The append is all-or-nothing: a persistence failure leaves
    /// both the in-memory log and the on-disk log unchanged.
    pub async fn append_feedback(&self, request: FeedbackRequest) -> Result<FeedbackEntry> {
        self.execute(move |state| {
            let Some(case) = state.cases.get(&request.property_id) else {
                return Err(Error::Validation(format!(
                    "unknown property '{}'",
                    request.property_id
                )));
            };
            if case.image(&request.filename).is_none() {
                return Err(Error::Validation(format!(
                    "unknown image '{}' for property '{}'",
                    request.filename, request.property_id
                )));
            }

            let entry = FeedbackEntry {
                id: Uuid::new_v4().to_string(),
                property_id: request.property_id,
                filename: request.filename,
                submitted_at: Utc::now(),
                kind: request.kind,
            };

            let key = entry.key();
            let index = state.feedback.len();
            state.feedback.push(entry.clone());
            let previous = state.latest.insert(key.clone(), index);

            if let Err(err) = state.persist_feedback() {
                state.feedback.pop();
                match previous {
                    Some(previous_index) => state.latest.insert(key, previous_index),
                    None => state.latest.remove(&key),
                };
                return Err(Error::Storage(err));
            }

            Ok(entry)
        })
        .await
    }

    /// Full feedback log in insertion order.
    pub async fn list_feedback(&self) -> Result<Vec<FeedbackEntry>> {
        self.execute(|state| Ok(state.feedback.clone())).await
    }

    /// Current feedback state for one property under the latest-wins rule,
    /// served from the incremental index. Entries referencing images removed
    /// by a later pipeline run are kept as orphaned history and still
    /// resolve.
    pub async fn resolved_feedback(&self, property_id: &str) -> Result<ResolvedFeedback> {
        let property_id = property_id.to_string();
        self.execute(move |state| {
            if !state.cases.contains_key(&property_id) {
                return Err(Error::NotFound(format!("property '{property_id}'")));
            }

            let mut image_classifications = BTreeMap::new();
            let mut feature_verdicts = Vec::new();

            for (key, &index) in &state.latest {
                let entry = &state.feedback[index];
                if entry.property_id != property_id {
                    continue;
                }
                match (key, &entry.kind) {
                    (FeedbackKey::Image { filename, .. }, FeedbackKind::Image { classification }) => {
                        image_classifications.insert(filename.clone(), *classification);
                    }
                    (
                        FeedbackKey::Feature {
                            filename,
                            feature_id,
                            ..
                        },
                        FeedbackKind::Feature { verdict, .. },
                    ) => {
                        feature_verdicts.push(ResolvedVerdict {
                            filename: filename.clone(),
                            feature_id: *feature_id,
                            verdict: *verdict,
                        });
                    }
                    _ => {}
                }
            }

            feature_verdicts.sort_by(|a, b| {
                a.filename
                    .cmp(&b.filename)
                    .then_with(|| a.feature_id.cmp(&b.feature_id))
            });

            Ok(ResolvedFeedback {
                property_id,
                image_classifications,
                feature_verdicts,
            })
        })
        .await
    }

    /// Clear the whole feedback log. The on-disk log is rewritten in one
    /// write, so a failure leaves the previous log intact rather than
    /// truncated.
    pub async fn reset_feedback(&self) -> Result<()> {
        self.execute(|state| {
            let path = state.data_dir.join(FEEDBACK_FILE);
            std::fs::write(&path, "[]")
                .with_context(|| format!("failed to reset feedback log {}", path.display()))?;
            state.feedback.clear();
            state.latest.clear();
            Ok(())
        })
        .await
    }

    /// Consistent snapshot of all cases plus the feedback log, taken in one
    /// store operation so aggregation never sees a half-appended entry.
    pub async fn snapshot(&self) -> Result<(Vec<CaseRecord>, Vec<FeedbackEntry>)> {
        self.execute(|state| {
            Ok((
                state.cases.values().cloned().collect(),
                state.feedback.clone(),
            ))
        })
        .await
    }
}
