mod walk;

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::constants::TICK_INTERVAL_MS;
use crate::logging;
use crate::model::{default_universe, Instrument};
use crate::quote::Quote;
use crate::sync::lock;

pub use walk::{DeltaSource, UniformWalk};
use walk::PriceBook;

pub type Observer = Arc<dyn Fn(&[Quote]) + Send + Sync>;

#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub universe: Vec<Instrument>,
    pub tick_interval: Duration,
    /// Fixed seed for a reproducible walk; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            universe: default_universe(),
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            seed: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShutdownSignal {
    None,
    Stop,
}

/// Shared random-walk price feed.
///
/// Cloning yields another handle onto the same walk, so every consumer sees
/// identical prices at any instant. Each tick updates every instrument,
/// builds one snapshot and hands it to every observer in registration order
/// before the next tick may start.
#[derive(Clone)]
pub struct PriceFeed {
    shared: Arc<Shared>,
}

struct Shared {
    universe: Vec<Instrument>,
    book: Mutex<PriceBook>,
    registry: Arc<Mutex<Registry>>,
    // Serializes ticks and first deliveries; never held by unsubscribe.
    dispatch: Mutex<()>,
    scheduler: Mutex<Option<Scheduler>>,
}

struct Scheduler {
    shutdown: watch::Sender<ShutdownSignal>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: Vec<(u64, Observer)>,
}

impl Registry {
    fn register(&mut self, observer: Observer) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    fn snapshot(&self) -> Vec<Observer> {
        self.observers
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }
}

impl PriceFeed {
    pub fn new<S>(universe: Vec<Instrument>, source: S) -> Self
    where
        S: DeltaSource + 'static,
    {
        let book = PriceBook::new(&universe, Box::new(source));
        Self {
            shared: Arc::new(Shared {
                universe,
                book: Mutex::new(book),
                registry: Arc::new(Mutex::new(Registry::default())),
                dispatch: Mutex::new(()),
                scheduler: Mutex::new(None),
            }),
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        let universe = config.universe.clone();
        match config.seed {
            Some(seed) => Self::new(universe, UniformWalk::seeded(seed)),
            None => Self::new(universe, UniformWalk::from_entropy()),
        }
    }

    pub fn universe(&self) -> &[Instrument] {
        &self.shared.universe
    }

    /// Current prices with zeroed change fields.
    pub fn current_stocks(&self) -> Vec<Quote> {
        lock(&self.shared.book).resting(&self.shared.universe)
    }

    pub fn ticks_elapsed(&self) -> u64 {
        lock(&self.shared.book).ticks()
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.shared.registry).observers.len()
    }

    /// Register an observer and hand it the current resting snapshot right away.
    ///
    /// Must not be called from inside an observer callback.
    pub fn subscribe<F>(&self, observer: F) -> FeedSubscription
    where
        F: Fn(&[Quote]) + Send + Sync + 'static,
    {
        let observer: Observer = Arc::new(observer);
        let _dispatch = lock(&self.shared.dispatch);
        let id = lock(&self.shared.registry).register(Arc::clone(&observer));
        let snapshot = self.current_stocks();
        observer(&snapshot);

        FeedSubscription {
            registry: Arc::downgrade(&self.shared.registry),
            id,
        }
    }

    /// Run one tick synchronously and return the delivered snapshot.
    ///
    /// Must not be called from inside an observer callback.
    pub fn tick(&self) -> Vec<Quote> {
        self.shared.tick()
    }

    /// Start the tick scheduler on the current tokio runtime.
    ///
    /// Returns `false` when a scheduler is already running; it is never restarted.
    pub fn start(&self, tick_interval: Duration) -> bool {
        let mut scheduler = lock(&self.shared.scheduler);
        if scheduler
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
        {
            return false;
        }

        let (shutdown, shutdown_rx) = watch::channel(ShutdownSignal::None);
        let task = tokio::spawn(run_ticker(
            Arc::downgrade(&self.shared),
            tick_interval,
            shutdown_rx,
        ));
        *scheduler = Some(Scheduler { shutdown, task });

        logging::info(
            "feed.start",
            "Price feed scheduler started",
            logging::metadata_from_pairs(&[
                ("interval_ms", json!(tick_interval.as_millis())),
                ("instruments", json!(self.shared.universe.len())),
            ]),
        );
        true
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared.scheduler)
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    /// Stop the scheduler and wait for its task to end. Observers stay registered.
    pub async fn stop(&self) {
        let scheduler = lock(&self.shared.scheduler).take();
        let Some(scheduler) = scheduler else {
            return;
        };

        let _ = scheduler.shutdown.send(ShutdownSignal::Stop);
        if let Err(err) = scheduler.task.await {
            logging::warn(
                "feed.stop",
                "Price feed scheduler ended abnormally",
                json!({ "error": err.to_string() }),
            );
        }
    }
}

impl Shared {
    fn tick(&self) -> Vec<Quote> {
        let _dispatch = lock(&self.dispatch);
        let snapshot = lock(&self.book).step(&self.universe);
        let observers = lock(&self.registry).snapshot();
        for observer in observers {
            observer(&snapshot);
        }
        snapshot
    }
}

/// Handle returned by [`PriceFeed::subscribe`]. Dropping it keeps the observer registered.
#[derive(Debug)]
pub struct FeedSubscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
}

impl FeedSubscription {
    /// Remove this observer. Later calls, calls after the feed is gone and
    /// calls made from inside a callback are all safe.
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => lock(&registry).remove(self.id),
            None => false,
        }
    }
}

async fn run_ticker(
    feed: Weak<Shared>,
    tick_interval: Duration,
    mut shutdown: watch::Receiver<ShutdownSignal>,
) {
    let mut ticker = time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first interval tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown.changed() => {
                match changed {
                    Ok(()) if *shutdown.borrow() == ShutdownSignal::None => continue,
                    _ => break,
                }
            }
        }

        let Some(shared) = feed.upgrade() else {
            break;
        };
        shared.tick();
    }

    logging::info_simple("feed.stop", "Price feed scheduler stopped");
}

pub mod testkit {
    use std::collections::VecDeque;

    use tokio::sync::mpsc;

    use super::*;

    /// Replays a fixed delta sequence, then holds prices flat.
    pub struct ScriptedDeltas {
        deltas: VecDeque<f64>,
    }

    impl ScriptedDeltas {
        pub fn new(deltas: impl IntoIterator<Item = f64>) -> Self {
            Self {
                deltas: deltas.into_iter().collect(),
            }
        }
    }

    impl DeltaSource for ScriptedDeltas {
        fn next_delta(&mut self) -> f64 {
            self.deltas.pop_front().unwrap_or(0.0)
        }
    }

    /// Run the scheduler until `count` ticked snapshots arrive, then stop it.
    ///
    /// The resting snapshot delivered on subscription is not counted.
    pub async fn collect_snapshots(
        feed: &PriceFeed,
        tick_interval: Duration,
        count: usize,
    ) -> Vec<Vec<Quote>> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Quote>>();
        let subscription = feed.subscribe(move |quotes| {
            let _ = tx.send(quotes.to_vec());
        });
        rx.recv().await;

        feed.start(tick_interval);
        let mut collected = Vec::with_capacity(count);
        while collected.len() < count {
            match rx.recv().await {
                Some(snapshot) => collected.push(snapshot),
                None => break,
            }
        }

        feed.stop().await;
        subscription.unsubscribe();
        collected
    }
}
