//! Monitoring orchestrator.
//!
//! `MonitorService` owns the in-memory aggregate and the store it is persisted
//! to. Every operator mutation clones the aggregate, applies the change,
//! persists the clone and only then swaps it in, so a failed write never
//! leaves memory claiming something storage does not have.
//!
//! A cycle reads the active competitors and a copy of the preferences up
//! front, observes each competitor with the state lock released, then merges
//! all outcomes into the current aggregate and persists once. Operator
//! mutations made while a cycle is observing are kept.
//!
//! A worker that outlives its timeout is kept until it finishes; the
//! competitor it is observing is not observed again in the meantime.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use chrono::Utc;
use crossbeam_channel::{bounded, RecvTimeoutError};
use tracing::{debug, info, warn};

use crate::alert::{Alert, AlertNormalizer};
use crate::domain::{DefaultDomainNormalizer, DomainNormalizer};
use crate::error::{MonitorError, MonitorResult, ProviderError, ValidationError};
use crate::preferences::{self, PreferenceKey, Preferences};
use crate::provider::{validate_observation, Observation, ObservationProvider};
use crate::snapshot::Snapshot;
use crate::state::StoredState;
use crate::storage::StateStore;

use super::config::MonitorConfig;
use super::report::{CompetitorOutcome, CycleReport};

/// Releases the single-cycle flag when dropped.
struct CycleGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> CycleGuard<'a> {
    fn acquire(running: &'a AtomicBool) -> MonitorResult<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MonitorError::CycleInProgress)?;
        Ok(Self { running })
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

enum Scope<'a> {
    All,
    Single(&'a str),
}

struct Target {
    domain: String,
    previous: Option<Snapshot>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Calls the provider, turning a panic into [`ProviderError::Panicked`].
fn observe_caught(
    provider: &dyn ObservationProvider,
    domain: &str,
    previous: Option<&Snapshot>,
) -> Result<Observation, ProviderError> {
    let caught = panic::catch_unwind(AssertUnwindSafe(|| provider.observe(domain, previous)));
    caught.unwrap_or_else(|payload| {
        Err(ProviderError::Panicked {
            message: panic_message(payload.as_ref()),
        })
    })
}

enum Pending {
    Observed {
        domain: String,
        snapshot: Snapshot,
        alerts: Vec<Alert>,
        suppressed: usize,
        baseline: bool,
    },
    Failed {
        domain: String,
        error: ProviderError,
    },
}

/// Drives monitoring cycles and operator mutations over one aggregate.
pub struct MonitorService {
    config: MonitorConfig,
    store: Arc<dyn StateStore>,
    provider: Arc<dyn ObservationProvider>,
    domains: Box<dyn DomainNormalizer>,
    normalizer: AlertNormalizer,
    state: Mutex<StoredState>,
    running: AtomicBool,
    stragglers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl std::fmt::Debug for MonitorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorService")
            .field("config", &self.config)
            .field("running", &self.running.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl MonitorService {
    /// Loads the aggregate from `store`, or starts from the default state if
    /// nothing has been persisted yet.
    ///
    /// # Errors
    /// - `Validation` if `config` is invalid
    /// - `Storage` if the persisted record cannot be read
    pub fn open(
        store: Arc<dyn StateStore>,
        provider: Arc<dyn ObservationProvider>,
        config: MonitorConfig,
    ) -> MonitorResult<Self> {
        let config = config.validate()?;
        let state = match store.load()? {
            Some(state) => {
                info!(
                    competitors = state.competitors.len(),
                    alerts = state.alerts.len(),
                    "loaded monitor state"
                );
                state
            }
            None => {
                info!("no persisted monitor state; starting fresh");
                StoredState::initial(Utc::now())
            }
        };

        Ok(Self {
            config,
            store,
            provider,
            domains: Box::new(DefaultDomainNormalizer),
            normalizer: AlertNormalizer::new(),
            state: Mutex::new(state),
            running: AtomicBool::new(false),
            stragglers: Mutex::new(HashMap::new()),
        })
    }

    /// Replaces the domain normalization collaborator.
    #[must_use]
    pub fn with_domain_normalizer(mut self, domains: impl DomainNormalizer + 'static) -> Self {
        self.domains = Box::new(domains);
        self
    }

    /// Returns a copy of the current aggregate.
    pub fn state(&self) -> MonitorResult<StoredState> {
        Ok(self.lock_state()?.clone())
    }

    /// Returns true while a cycle is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Adds a competitor. Returns false if the normalized domain already exists.
    ///
    /// # Errors
    /// - `Validation` if `domain` normalizes to nothing
    /// - `Storage` if persisting fails
    pub fn add_competitor(&self, domain: &str) -> MonitorResult<bool> {
        let normalized = self.normalize_domain(domain)?;
        let added = self.mutate(|state| state.add_competitor(&normalized))?;
        if added {
            info!(domain = %normalized, "competitor added");
        }
        Ok(added)
    }

    /// Removes a competitor. Absent domains are a no-op; past alerts are kept.
    pub fn remove_competitor(&self, domain: &str) -> MonitorResult<bool> {
        let normalized = self.domains.normalize(domain);
        let removed = self.mutate(|state| state.remove_competitor(&normalized))?;
        if removed {
            info!(domain = %normalized, "competitor removed");
        }
        Ok(removed)
    }

    /// Pauses or resumes monitoring for a competitor.
    ///
    /// Returns false if the competitor does not exist.
    pub fn set_competitor_active(&self, domain: &str, active: bool) -> MonitorResult<bool> {
        let normalized = self.domains.normalize(domain);
        self.mutate(|state| match state.competitor_mut(&normalized) {
            Some(competitor) => {
                competitor.active = active;
                true
            }
            None => false,
        })
    }

    /// Marks an alert as addressed. Unknown ids are a no-op.
    pub fn mark_addressed(&self, alert_id: &str) -> MonitorResult<bool> {
        let found = self.mutate(|state| state.alerts.mark_addressed(alert_id))?;
        if !found {
            debug!(alert_id, "mark_addressed on unknown alert id");
        }
        Ok(found)
    }

    /// Writes a preference toggle.
    pub fn set_preference(&self, key: PreferenceKey, value: bool) -> MonitorResult<()> {
        self.mutate(|state| state.preferences.set(key, value))?;
        debug!(key = %key, value, "preference updated");
        Ok(())
    }

    /// Writes a preference toggle by wire name (`monitorTitles`, ...).
    pub fn set_preference_named(&self, key: &str, value: bool) -> MonitorResult<()> {
        let key: PreferenceKey = key.parse()?;
        self.set_preference(key, value)
    }

    /// Runs a full cycle over every active competitor.
    ///
    /// Per-competitor failures are reported in the returned [`CycleReport`];
    /// only a persistence failure or a concurrent cycle makes this return
    /// `Err`.
    ///
    /// # Errors
    /// - `CycleInProgress` if another cycle is running
    /// - `Storage` if the final write fails (nothing from the cycle is kept)
    pub fn run_cycle(&self) -> MonitorResult<CycleReport> {
        self.run(Scope::All)
    }

    /// Checks a single competitor now, without stamping `lastFullCheck`.
    ///
    /// An unknown or inactive competitor yields an empty report.
    pub fn check_competitor(&self, domain: &str) -> MonitorResult<CycleReport> {
        let normalized = self.domains.normalize(domain);
        self.run(Scope::Single(&normalized))
    }

    fn run(&self, scope: Scope<'_>) -> MonitorResult<CycleReport> {
        let _guard = CycleGuard::acquire(&self.running)?;
        let started_at = Utc::now();

        let (prefs, targets) = self.plan(&scope)?;
        info!(competitors = targets.len(), "starting competitor check");

        let pending: Vec<Pending> = targets
            .into_iter()
            .map(|target| self.check_one(target, &prefs))
            .collect();

        let mut state = self.lock_state()?;
        let mut next = state.clone();
        let mut new_alerts: Vec<Alert> = Vec::new();
        let mut outcomes = Vec::with_capacity(pending.len());

        for item in pending {
            match item {
                Pending::Observed {
                    domain,
                    snapshot,
                    alerts,
                    suppressed,
                    baseline,
                } => {
                    let Some(competitor) = next.competitor_mut(&domain) else {
                        debug!(domain = %domain, "competitor removed mid-cycle; discarding");
                        outcomes.push(CompetitorOutcome::Discarded { domain });
                        continue;
                    };
                    competitor.record_snapshot(snapshot);

                    let accepted = alerts.len();
                    next.alerts.prepend(alerts.clone());
                    let mut batch = alerts;
                    batch.append(&mut new_alerts);
                    new_alerts = batch;

                    outcomes.push(CompetitorOutcome::Checked {
                        domain,
                        accepted,
                        suppressed,
                        baseline,
                    });
                }
                Pending::Failed { domain, error } => {
                    outcomes.push(CompetitorOutcome::Failed { domain, error });
                }
            }
        }

        let finished_at = Utc::now();
        if matches!(scope, Scope::All) {
            next.last_full_check = finished_at;
        }
        self.store.save(&next)?;
        *state = next;
        drop(state);

        let report = CycleReport {
            started_at,
            finished_at,
            new_alerts,
            outcomes,
        };
        info!(
            checked = report.checked_count(),
            failed = report.failed_count(),
            alerts = report.new_alerts.len(),
            "competitor check complete"
        );
        Ok(report)
    }

    fn plan(&self, scope: &Scope<'_>) -> MonitorResult<(Preferences, Vec<Target>)> {
        let state = self.lock_state()?;
        let targets = state
            .competitors
            .iter()
            .filter(|c| c.active)
            .filter(|c| match scope {
                Scope::All => true,
                Scope::Single(domain) => c.domain == *domain,
            })
            .map(|c| Target {
                domain: c.domain.clone(),
                previous: c.latest().cloned(),
            })
            .collect();
        Ok((state.preferences, targets))
    }

    fn check_one(&self, target: Target, prefs: &Preferences) -> Pending {
        let Target { domain, previous } = target;
        let baseline = previous.is_none();

        let observation = self
            .observe(&domain, previous)
            .and_then(|obs| validate_observation(&domain, &obs).map(|()| obs));

        match observation {
            Ok(observation) => {
                let alerts = self
                    .normalizer
                    .normalize(&domain, observation.candidates, Utc::now());
                let proposed = alerts.len();
                let alerts = preferences::filter(alerts, prefs);
                let suppressed = proposed - alerts.len();
                debug!(
                    domain = %domain,
                    accepted = alerts.len(),
                    suppressed,
                    "competitor observed"
                );
                Pending::Observed {
                    domain,
                    snapshot: observation.snapshot,
                    alerts,
                    suppressed,
                    baseline,
                }
            }
            Err(error) => {
                warn!(domain = %domain, error = %error, "competitor check failed; skipping");
                Pending::Failed { domain, error }
            }
        }
    }

    fn observe(
        &self,
        domain: &str,
        previous: Option<Snapshot>,
    ) -> Result<Observation, ProviderError> {
        let Some(timeout) = self.config.provider_timeout else {
            return observe_caught(self.provider.as_ref(), domain, previous.as_ref());
        };

        let mut stragglers = self
            .stragglers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let finished: Vec<String> = stragglers
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(key, _)| key.clone())
            .collect();
        for done in finished {
            if let Some(handle) = stragglers.remove(&done) {
                // Panics were already caught inside the worker.
                let _ = handle.join();
                debug!(domain = %done, "timed-out observation worker finished");
            }
        }
        if stragglers.contains_key(domain) {
            return Err(ProviderError::StillRunning);
        }

        let (tx, rx) = bounded::<Result<Observation, ProviderError>>(1);
        let provider = Arc::clone(&self.provider);
        let owned_domain = domain.to_string();
        let handle = thread::Builder::new()
            .name(format!("{}-{domain}", self.config.worker_thread_name))
            .spawn(move || {
                let _ = tx.send(observe_caught(
                    provider.as_ref(),
                    &owned_domain,
                    previous.as_ref(),
                ));
            })
            .map_err(|e| {
                ProviderError::transport(format!("failed to spawn observation worker: {e}"))
            })?;
        drop(stragglers);

        match rx.recv_timeout(timeout) {
            Ok(result) => {
                let _ = handle.join();
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(domain, "observation timed out; worker left running");
                self.stragglers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(domain.to_string(), handle);
                Err(ProviderError::Timeout {
                    duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                Err(ProviderError::Disconnected)
            }
        }
    }

    fn normalize_domain(&self, input: &str) -> MonitorResult<String> {
        let normalized = self.domains.normalize(input);
        if normalized.is_empty() {
            return Err(ValidationError::EmptyDomain {
                input: input.to_string(),
            }
            .into());
        }
        Ok(normalized)
    }

    fn mutate<T>(&self, apply: impl FnOnce(&mut StoredState) -> T) -> MonitorResult<T> {
        let mut state = self.lock_state()?;
        let mut next = state.clone();
        let out = apply(&mut next);
        self.store.save(&next)?;
        *state = next;
        Ok(out)
    }

    fn lock_state(&self) -> MonitorResult<MutexGuard<'_, StoredState>> {
        self.state
            .lock()
            .map_err(|_| MonitorError::internal("poisoned lock: monitor state"))
    }
}
