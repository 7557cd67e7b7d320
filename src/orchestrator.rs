//! Analysis Orchestrator
//!
//! Sequences geocoding, environment lookups and the heuristic into a run,
//! publishes each run's outcome atomically through a `watch` channel, and
//! owns the periodic refresh timer.
//!
//! Only one run may be in flight; a trigger that arrives while another run is
//! active is skipped with [`DeerGuideError::Busy`] and changes nothing.
//! `stop()` cancels the pending timer but lets an in-flight run finish and
//! publish. Dropping the last handle also ends the timer.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::DeerGuideConfig;
use crate::environment::EnvironmentDataClient;
use crate::error::FALLBACK_MESSAGE;
use crate::heuristic;
use crate::location_resolver::{GeocodeResolver, LocationInput, LocationParser};
use crate::models::{
    AnalysisResult, AnalysisState, Coordinate, MapView, RunOutcome, RunPhase, StatusReadout,
};
use crate::{DeerGuideError, Result};

/// Construction parameters for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub refresh_interval: Duration,
    pub default_address: String,
    pub default_coordinate: Coordinate,
}

impl OrchestratorSettings {
    pub fn from_config(config: &DeerGuideConfig) -> Result<Self> {
        Ok(Self {
            refresh_interval: Duration::from_secs(
                u64::from(config.analysis.refresh_interval_minutes) * 60,
            ),
            default_address: config.analysis.default_address.clone(),
            default_coordinate: Coordinate::new(
                config.analysis.default_latitude,
                config.analysis.default_longitude,
            )?,
        })
    }
}

/// Inbound command from the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    /// Free text: coordinates bypass geocoding, names replace the stored address
    Query(String),
    At(Coordinate),
    /// Geocode the stored address text
    Address,
}

/// What a run analyses, decided before the run guard is taken
#[derive(Debug)]
enum RunTarget {
    At(Coordinate),
    StoredAddress,
    /// Replaces the stored address once the run is admitted
    NewAddress(String),
}

struct RefreshTimer {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

struct Inner {
    resolver: Arc<dyn GeocodeResolver>,
    environment: Arc<dyn EnvironmentDataClient>,
    refresh_interval: Duration,
    address: RwLock<String>,
    running: AtomicBool,
    published: watch::Sender<AnalysisState>,
    timer: Mutex<Option<RefreshTimer>>,
}

/// Cheap to clone; clones share the same state and timer
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    inner: Arc<Inner>,
}

/// Clears the running flag when a run ends, including by panic
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AnalysisOrchestrator {
    pub fn new(
        resolver: Arc<dyn GeocodeResolver>,
        environment: Arc<dyn EnvironmentDataClient>,
        settings: OrchestratorSettings,
    ) -> Self {
        let (published, _) = watch::channel(AnalysisState::initial(settings.default_coordinate));
        Self {
            inner: Arc::new(Inner {
                resolver,
                environment,
                refresh_interval: settings.refresh_interval,
                address: RwLock::new(settings.default_address),
                running: AtomicBool::new(false),
                published,
                timer: Mutex::new(None),
            }),
        }
    }

    /// Receiver that observes every publish
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.inner.published.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> AnalysisState {
        self.inner.published.borrow().clone()
    }

    #[must_use]
    pub fn map_view(&self) -> MapView {
        self.inner.published.borrow().map_view()
    }

    #[must_use]
    pub fn status_readout(&self) -> StatusReadout {
        self.inner.published.borrow().status_readout()
    }

    #[must_use]
    pub fn address(&self) -> String {
        self.inner
            .address
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_address(&self, address: impl Into<String>) {
        *self
            .inner
            .address
            .write()
            .unwrap_or_else(PoisonError::into_inner) = address.into();
    }

    /// Whether the refresh timer is armed
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.task.is_finished())
    }

    /// Handle an inbound analyze command
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult> {
        match request {
            AnalysisRequest::Query(text) => match LocationParser::parse(&text)? {
                LocationInput::Coordinates(coords) => self.run(RunTarget::At(coords)).await,
                LocationInput::Name(name) => self.run(RunTarget::NewAddress(name)).await,
            },
            AnalysisRequest::At(coords) => self.run(RunTarget::At(coords)).await,
            AnalysisRequest::Address => self.run(RunTarget::StoredAddress).await,
        }
    }

    /// One resolve → fetch → compute → publish cycle.
    ///
    /// `None` geocodes the stored address. On failure the fallback message is
    /// published and the previous pins and center are kept.
    pub async fn run_analysis(&self, at: Option<Coordinate>) -> Result<AnalysisResult> {
        self.run(at.map_or(RunTarget::StoredAddress, RunTarget::At)).await
    }

    #[instrument(skip(self))]
    async fn run(&self, target: RunTarget) -> Result<AnalysisResult> {
        // a refused trigger must leave the stored address alone
        let Some(_guard) = RunGuard::acquire(&self.inner.running) else {
            warn!("Analysis already in progress, skipping trigger");
            return Err(DeerGuideError::Busy);
        };

        let at = match target {
            RunTarget::At(coords) => Some(coords),
            RunTarget::StoredAddress => None,
            RunTarget::NewAddress(name) => {
                self.set_address(name);
                None
            }
        };

        self.inner
            .published
            .send_modify(|state| state.phase = RunPhase::Running);
        let started = Instant::now();

        let outcome = match AssertUnwindSafe(self.execute(at)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(DeerGuideError::internal(panic_message(panic.as_ref()))),
        };

        match outcome {
            Ok(result) => {
                info!(
                    coords = %result.coords.format_coordinates(),
                    pins = result.pins.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Location analysis published"
                );
                self.publish_success(&result);
                Ok(result)
            }
            Err(e) => {
                error!(error = %e, "Location analysis failed");
                self.publish_failure();
                Err(e)
            }
        }
    }

    async fn execute(&self, at: Option<Coordinate>) -> Result<AnalysisResult> {
        let coords = match at {
            Some(coords) => coords,
            None => {
                let address = self.address();
                self.inner.resolver.resolve(&address).await?
            }
        };

        let environment = &self.inner.environment;
        let (weather, elevation) = tokio::try_join!(
            environment.fetch_weather(coords),
            environment.fetch_elevation(coords)
        )?;
        debug!(?weather, ?elevation, "Environment data fetched");

        let guidance = heuristic::compute(coords, &weather, elevation);
        Ok(AnalysisResult {
            coords,
            pins: guidance.pins,
            guidance_text: guidance.text,
            weather,
            elevation,
        })
    }

    fn publish_success(&self, result: &AnalysisResult) {
        self.inner.published.send_modify(|state| {
            state.center = result.coords;
            state.guidance_text = result.guidance_text.clone();
            state.latest = Some(result.clone());
            state.phase = RunPhase::Idle;
            state.last_outcome = Some(RunOutcome::Succeeded);
            state.updated_at = Some(Utc::now());
        });
    }

    fn publish_failure(&self) {
        self.inner.published.send_modify(|state| {
            state.guidance_text = FALLBACK_MESSAGE.to_string();
            state.phase = RunPhase::Idle;
            state.last_outcome = Some(RunOutcome::Failed);
            state.updated_at = Some(Utc::now());
        });
    }

    /// Immediate run at the current center, then arm the refresh timer
    pub async fn start(&self) {
        let center = self.inner.published.borrow().center;
        self.start_with(AnalysisRequest::At(center)).await;
    }

    /// Immediate run for `request`, then arm the refresh timer.
    /// The run's outcome is already published and logged.
    pub async fn start_with(&self, request: AnalysisRequest) {
        if let Err(e) = self.analyze(request).await {
            debug!(error = %e, "Initial analysis did not succeed");
        }
        self.arm_timer();
    }

    /// Cancel the refresh timer. Safe to call repeatedly or before `start`.
    pub fn stop(&self) {
        let timer = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(timer) = timer {
            // the task exits at its next wait; an in-flight run still publishes
            let _ = timer.stop.send(true);
            info!("Refresh timer stopped");
        }
    }

    fn arm_timer(&self) {
        let mut slot = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if slot.as_ref().is_some_and(|timer| !timer.task.is_finished()) {
            debug!("Refresh timer already armed");
            return;
        }

        let (stop, mut stop_rx) = watch::channel(false);
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let interval = self.inner.refresh_interval;

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(interval) => {}
                    _ = stop_rx.changed() => break,
                }
                if *stop_rx.borrow() {
                    break;
                }
                // the orchestrator was dropped without stop()
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let this = AnalysisOrchestrator { inner };

                let center = this.inner.published.borrow().center;
                debug!(center = %center.format_coordinates(), "Scheduled refresh");
                // outcome is published and logged by run_analysis
                let _ = this.run_analysis(Some(center)).await;
            }
        });

        info!(interval_secs = interval.as_secs(), "Refresh timer armed");
        *slot = Some(RefreshTimer { stop, task });
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "analysis run panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_default_config() {
        let settings = OrchestratorSettings::from_config(&DeerGuideConfig::default()).unwrap();
        assert_eq!(settings.refresh_interval, Duration::from_secs(3600));
        assert_eq!(settings.default_address, "High Point, NC");
        assert_eq!(
            settings.default_coordinate,
            Coordinate {
                lat: 35.9557,
                lon: -80.0053
            }
        );
    }

    #[test]
    fn test_run_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = RunGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(RunGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(RunGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
    }
}
