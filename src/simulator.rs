//! Event simulator: the timer-driven live feed.
//!
//! Each tick samples the activity window, may raise an urgent alert, and
//! may synthesize one request. [`EventSimulator`] makes the random draws;
//! the tick itself is one [`DashboardCommand::SimulatorTick`] sent through
//! the store's mailbox, so the three steps land as a single mutation.
//!
//! The loop follows the same lifecycle as other background tasks here: a
//! `watch` channel signals shutdown and [`SimulationHandle::stop`] awaits
//! the task and any manual tick in flight, so no tick is applied after it
//! returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::{MutexGuard, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::actor::AggregateHandle;
use crate::config::SimulationConfig;
use crate::dashboard::{Dashboard, DashboardCommand};
use crate::domain::location::Location;
use crate::domain::request::{Category, Priority, RequestInput};
use crate::error::{DashboardError, ExecuteError};

/// Actor name stamped on simulator commands.
pub const SIMULATOR_ACTOR: &str = "simulator";

/// Message of the synthesized urgent alert.
pub const URGENT_ALERT: &str = "New critical medical emergency reported in South Delhi";

/// `reportedBy` of synthesized requests.
pub const AUTO_REPORTER: &str = "auto-generated";

const CENTER: Location = Location::new(28.6, 77.2);
const LAT_SPREAD: f64 = 0.3;
const LNG_SPREAD: f64 = 0.5;

const AREAS: [&str; 7] = [
    "East Delhi",
    "West Delhi",
    "South Delhi",
    "North Delhi",
    "Gurgaon",
    "Noida",
    "Faridabad",
];

const DESCRIPTIONS: [&str; 5] = [
    "Urgent food assistance needed for elderly residents",
    "Medical supplies required for local clinic",
    "Clean water shortage affecting multiple families",
    "Temporary shelter needed due to structural damage",
    "Emergency evacuation assistance required",
];

// ---------------------------------------------------------------------------
// Tick planning
// ---------------------------------------------------------------------------

/// The random part of one tick, decided before it reaches the mailbox.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickPlan {
    /// Urgent notification message, if one fires.
    pub alert: Option<String>,
    /// Synthesized request, if one spawns.
    pub request: Option<RequestInput>,
}

/// Seeded source of tick plans.
///
/// Two simulators built from the same seed and probabilities produce the
/// same sequence of plans.
#[derive(Debug)]
pub struct EventSimulator {
    rng: StdRng,
    spawn_probability: f64,
    notify_probability: f64,
}

impl EventSimulator {
    /// Build from `config`. Without `random_seed` the RNG is seeded from OS
    /// entropy.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `config` is out of range, e.g. a probability
    /// outside `[0, 1]`.
    pub fn new(config: &SimulationConfig) -> Result<Self, DashboardError> {
        config.validate()?;
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            rng,
            spawn_probability: config.spawn_probability,
            notify_probability: config.notify_probability,
        })
    }

    /// Draw the next tick: alert roll first, then spawn roll.
    pub fn plan_tick(&mut self) -> TickPlan {
        let alert = self
            .rng
            .random_bool(self.notify_probability)
            .then(|| URGENT_ALERT.to_string());
        let request = if self.rng.random_bool(self.spawn_probability) {
            Some(self.synthesize())
        } else {
            None
        };
        TickPlan { alert, request }
    }

    fn synthesize(&mut self) -> RequestInput {
        let rng = &mut self.rng;
        let location = Location::new(
            CENTER.lat + (rng.random::<f64>() - 0.5) * LAT_SPREAD,
            CENTER.lng + (rng.random::<f64>() - 0.5) * LNG_SPREAD,
        );
        let category = Category::ALL[rng.random_range(0..Category::ALL.len())];
        let priority = Priority::ALL[rng.random_range(0..Priority::ALL.len())];
        let victim_count = rng.random_range(5..45);
        let area = AREAS[rng.random_range(0..AREAS.len())];
        let description = DESCRIPTIONS[rng.random_range(0..DESCRIPTIONS.len())];
        let contact = format!(
            "+91-{}",
            rng.random_range(1_000_000_000u64..10_000_000_000)
        );
        RequestInput {
            category: category.as_str().to_string(),
            priority: priority.as_str().to_string(),
            victim_count,
            area: area.to_string(),
            description: description.to_string(),
            contact,
            reported_by: AUTO_REPORTER.to_string(),
            location,
        }
    }
}

// ---------------------------------------------------------------------------
// Single-flight guard
// ---------------------------------------------------------------------------

/// What happened to a requested tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Applied,
    /// Another tick was still in flight.
    Skipped,
}

/// Lets at most one tick run at a time. Late arrivals are turned away, not
/// queued. Only [`drain`](TickGuard::drain) waits for the holder.
#[derive(Debug, Default)]
pub(crate) struct TickGuard {
    busy: tokio::sync::Mutex<()>,
}

pub(crate) struct TickPermit<'a> {
    _held: MutexGuard<'a, ()>,
}

impl TickGuard {
    pub(crate) fn try_acquire(&self) -> Option<TickPermit<'_>> {
        self.busy.try_lock().ok().map(|held| TickPermit { _held: held })
    }

    /// Wait until no tick is in flight.
    pub(crate) async fn drain(&self) {
        drop(self.busy.lock().await);
    }
}

// ---------------------------------------------------------------------------
// Running simulation
// ---------------------------------------------------------------------------

/// State shared by the timer loop and manual ticks.
#[derive(Debug)]
struct Ticker {
    simulator: Mutex<EventSimulator>,
    guard: TickGuard,
    stopped: AtomicBool,
    dashboard: AggregateHandle<Dashboard>,
}

impl Ticker {
    async fn tick(&self) -> Result<TickOutcome, ExecuteError<DashboardError>> {
        let Some(_permit) = self.guard.try_acquire() else {
            tracing::debug!("tick skipped, previous tick still in flight");
            return Ok(TickOutcome::Skipped);
        };
        // Checked under the permit so `stop` can drain ticks that got past it.
        if self.is_stopped() {
            return Err(ExecuteError::Domain(DashboardError::conflict(
                "simulation is stopped",
            )));
        }
        let plan = self
            .simulator
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .plan_tick();
        tracing::debug!(
            alert = plan.alert.is_some(),
            spawn = plan.request.is_some(),
            "simulator tick"
        );
        self.dashboard
            .execute(DashboardCommand::SimulatorTick(plan), SIMULATOR_ACTOR)
            .await?;
        Ok(TickOutcome::Applied)
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Handle to a running simulation.
///
/// Cloning is cheap; every clone controls the same loop.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Arc<tokio::sync::Mutex<Option<JoinHandle<()>>>>,
    ticker: Arc<Ticker>,
}

impl SimulationHandle {
    /// Start ticking every `config.tick_interval()`, first tick one period
    /// from now.
    pub(crate) fn start(
        config: &SimulationConfig,
        dashboard: AggregateHandle<Dashboard>,
    ) -> Result<Self, DashboardError> {
        let ticker = Arc::new(Ticker {
            simulator: Mutex::new(EventSimulator::new(config)?),
            guard: TickGuard::default(),
            stopped: AtomicBool::new(false),
            dashboard,
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let period = config.tick_interval();
        let task = tokio::spawn(run_simulation(Arc::clone(&ticker), period, shutdown_rx));
        tracing::info!(
            interval_ms = config.tick_interval_ms,
            seeded = config.random_seed.is_some(),
            "simulation started"
        );
        Ok(Self {
            shutdown_tx,
            task: Arc::new(tokio::sync::Mutex::new(Some(task))),
            ticker,
        })
    }

    /// Drive one tick now, sharing the loop's single-flight guard.
    ///
    /// # Errors
    ///
    /// * `Conflict` -- the simulation has been stopped.
    /// * [`ExecuteError::ActorGone`] -- the store's actor has exited.
    pub async fn tick_now(&self) -> Result<TickOutcome, ExecuteError<DashboardError>> {
        self.ticker.tick().await
    }

    /// Whether the timer loop is still running.
    pub fn is_running(&self) -> bool {
        !self.ticker.is_stopped() && !self.shutdown_tx.is_closed()
    }

    /// Cancel the timer and wait for the loop to exit.
    ///
    /// Ticks already in flight, timed or manual, complete first; every later
    /// tick through any clone of this handle is refused. Calling `stop`
    /// again is a no-op.
    pub async fn stop(&self) {
        self.ticker.stopped.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(true);
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "simulation task failed");
            }
            tracing::info!("simulation stopped");
        }
        self.ticker.guard.drain().await;
    }
}

async fn run_simulation(
    ticker: Arc<Ticker>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match ticker.tick().await {
                    Ok(_) => {}
                    Err(ExecuteError::ActorGone) => {
                        tracing::info!("dashboard actor gone, simulation exiting");
                        break;
                    }
                    Err(_) if ticker.is_stopped() => break,
                    Err(e) => tracing::warn!(error = %e, "simulator tick rejected"),
                }
            }
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::spawn_actor;
    use crate::clock::SystemClock;
    use crate::config::DashboardConfig;
    use crate::error::ErrorKind;

    fn config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            spawn_probability: 0.5,
            notify_probability: 0.5,
            ..SimulationConfig::default()
        }
        .with_seed(seed)
    }

    #[test]
    fn same_seed_same_plans() {
        let mut a = EventSimulator::new(&config(42)).unwrap();
        let mut b = EventSimulator::new(&config(42)).unwrap();
        let plans_a: Vec<_> = (0..50).map(|_| a.plan_tick()).collect();
        let plans_b: Vec<_> = (0..50).map(|_| b.plan_tick()).collect();
        assert_eq!(
            serde_json::to_vec(&plans_a).unwrap(),
            serde_json::to_vec(&plans_b).unwrap()
        );
    }

    #[test]
    fn synthesized_requests_stay_in_range() {
        let mut sim = EventSimulator::new(&SimulationConfig {
            spawn_probability: 1.0,
            notify_probability: 0.0,
            ..SimulationConfig::default().with_seed(7)
        })
        .unwrap();
        for _ in 0..200 {
            let plan = sim.plan_tick();
            assert!(plan.alert.is_none());
            let input = plan.request.expect("spawn probability is 1");
            assert!(input.validate().is_ok(), "invalid synthesized input: {input:?}");
            assert!((5..45).contains(&input.victim_count));
            assert!((input.location.lat - 28.6).abs() <= 0.15 + 1e-9);
            assert!((input.location.lng - 77.2).abs() <= 0.25 + 1e-9);
            assert!(AREAS.contains(&input.area.as_str()));
            assert!(DESCRIPTIONS.contains(&input.description.as_str()));
            assert_eq!(input.reported_by, AUTO_REPORTER);
            let digits = input.contact.strip_prefix("+91-").unwrap();
            assert_eq!(digits.len(), 10);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn zero_probabilities_plan_nothing() {
        let mut sim = EventSimulator::new(&SimulationConfig {
            spawn_probability: 0.0,
            notify_probability: 0.0,
            ..SimulationConfig::default()
        })
        .unwrap();
        assert_eq!(sim.plan_tick(), TickPlan::default());
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let err = EventSimulator::new(&SimulationConfig {
            notify_probability: 1.5,
            ..SimulationConfig::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Validation { field: "notifyProbability", .. }
        ));
        assert!(
            EventSimulator::new(&SimulationConfig {
                spawn_probability: -0.1,
                ..SimulationConfig::default()
            })
            .is_err()
        );
    }

    #[test]
    fn guard_is_single_flight() {
        let guard = TickGuard::default();
        let permit = guard.try_acquire().expect("first acquire succeeds");
        assert!(guard.try_acquire().is_none());
        drop(permit);
        assert!(guard.try_acquire().is_some());
    }

    /// A running simulation whose timer never fires during a test.
    fn running() -> (SimulationHandle, AggregateHandle<Dashboard>) {
        let dashboard = spawn_actor(
            Dashboard::new(&DashboardConfig::default()),
            Arc::new(SystemClock),
        );
        let config = SimulationConfig {
            tick_interval_ms: 3_600_000,
            spawn_probability: 1.0,
            notify_probability: 0.0,
            ..SimulationConfig::default()
        }
        .with_seed(3);
        let sim = SimulationHandle::start(&config, dashboard.clone()).unwrap();
        (sim, dashboard)
    }

    async fn ticks_applied(dashboard: &AggregateHandle<Dashboard>) -> (usize, usize) {
        dashboard
            .read(|d| (d.activity().len(), d.ledger().len()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn overlapping_ticks_apply_once() {
        let (sim, dashboard) = running();
        let (a, b) = tokio::join!(sim.tick_now(), sim.tick_now());
        let mut outcomes = [a.unwrap(), b.unwrap()];
        outcomes.sort_by_key(|o| *o == TickOutcome::Skipped);
        assert_eq!(outcomes, [TickOutcome::Applied, TickOutcome::Skipped]);
        assert_eq!(ticks_applied(&dashboard).await, (1, 1));
        sim.stop().await;
    }

    #[tokio::test]
    async fn stopped_simulation_refuses_ticks_from_every_clone() {
        let (sim, dashboard) = running();
        let other = sim.clone();
        assert_eq!(other.tick_now().await.unwrap(), TickOutcome::Applied);

        sim.stop().await;
        assert!(!other.is_running());
        let err = other.tick_now().await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
        assert_eq!(ticks_applied(&dashboard).await, (1, 1));

        other.stop().await;
    }

    #[tokio::test]
    async fn stop_lets_an_in_flight_tick_finish() {
        let (sim, dashboard) = running();
        let manual = sim.clone();
        // The tick is polled first, so it holds the permit when stop begins.
        let (outcome, counts) = tokio::join!(manual.tick_now(), async {
            sim.stop().await;
            ticks_applied(&dashboard).await
        });
        assert_eq!(outcome.unwrap(), TickOutcome::Applied);
        assert_eq!(counts, (1, 1));
        assert!(manual.tick_now().await.is_err());
        assert_eq!(ticks_applied(&dashboard).await, (1, 1));
    }
}
