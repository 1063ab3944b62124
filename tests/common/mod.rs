#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossbeam_channel::{Receiver, Sender};

use rivalwatch::{
    CandidateAlert, InMemoryStateStore, MonitorConfig, MonitorService, Observation,
    ObservationProvider, ProviderError, Snapshot, StateStore, StorageError, StoredState,
};

/// One scripted provider reply.
pub enum Step {
    Reply(Vec<CandidateAlert>),
    Fail(ProviderError),
    /// Snapshot tagged with the wrong domain.
    WrongDomain,
    /// Snapshot whose GBP rating is NaN.
    NanRating,
    Sleep(Duration),
    Panic,
}

/// Provider that replays per-domain scripts.
///
/// Unscripted calls return a baseline candidate when there is no previous
/// snapshot and no candidates otherwise.
#[derive(Default)]
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<(String, bool)>>,
    observed: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, domain: &str, step: Step) {
        self.scripts
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push_back(step);
    }

    /// `(domain, had_previous)` per call, in order.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn snapshot_for(domain: &str, backlinks: u64) -> Snapshot {
    let mut snap = Snapshot::empty(domain, Utc::now());
    snap.estimated_backlinks = backlinks;
    snap
}

impl ObservationProvider for ScriptedProvider {
    fn observe(
        &self,
        domain: &str,
        previous: Option<&Snapshot>,
    ) -> Result<Observation, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((domain.to_string(), previous.is_some()));
        let n = self.observed.fetch_add(1, Ordering::SeqCst) as u64;
        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(domain)
            .and_then(VecDeque::pop_front);

        let candidates = match step {
            Some(Step::Reply(candidates)) => candidates,
            Some(Step::Fail(err)) => return Err(err),
            Some(Step::WrongDomain) => {
                return Ok(Observation {
                    snapshot: snapshot_for("someone-else.com", n),
                    candidates: vec![CandidateAlert::baseline()],
                })
            }
            Some(Step::NanRating) => {
                let mut snapshot = snapshot_for(domain, n);
                snapshot.gbp_data.rating = f64::NAN;
                return Ok(Observation {
                    snapshot,
                    candidates: vec![CandidateAlert::baseline()],
                });
            }
            Some(Step::Sleep(d)) => {
                thread::sleep(d);
                Vec::new()
            }
            Some(Step::Panic) => panic!("provider blew up"),
            None if previous.is_none() => vec![CandidateAlert::baseline()],
            None => Vec::new(),
        };

        Ok(Observation {
            snapshot: snapshot_for(domain, n),
            candidates,
        })
    }
}

/// Provider that parks inside `observe` until released, then replies with
/// `candidates`.
pub struct GateProvider {
    pub entered: Sender<String>,
    pub release: Receiver<()>,
    pub candidates: Vec<CandidateAlert>,
}

impl ObservationProvider for GateProvider {
    fn observe(
        &self,
        domain: &str,
        _previous: Option<&Snapshot>,
    ) -> Result<Observation, ProviderError> {
        self.entered.send(domain.to_string()).unwrap();
        self.release.recv().unwrap();
        Ok(Observation {
            snapshot: snapshot_for(domain, 0),
            candidates: self.candidates.clone(),
        })
    }
}

/// In-memory store that counts saves and can be told to fail them.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryStateStore,
    pub fail_saves: AtomicBool,
    pub saves: AtomicUsize,
}

impl StateStore for FlakyStore {
    fn load(&self) -> Result<Option<StoredState>, StorageError> {
        self.inner.load()
    }

    fn save(&self, state: &StoredState) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("disk full".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(state)
    }
}

pub fn quick_config() -> MonitorConfig {
    MonitorConfig::default().with_provider_timeout(Some(Duration::from_secs(5)))
}

pub fn service_with(provider: Arc<ScriptedProvider>) -> (MonitorService, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore::default());
    let service = MonitorService::open(store.clone(), provider, quick_config()).unwrap();
    (service, store)
}
