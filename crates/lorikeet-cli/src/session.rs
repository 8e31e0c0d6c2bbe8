//! A running session: a provider thread feeding a latch, and a render loop
//! that owns the controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use lorikeet_hal::LandmarkProvider;
use lorikeet_runtime::{
    BehaviorController, CommandLatch, GesturePipeline, PipelineStats, TickDriver, TickReport,
};
use lorikeet_types::LorikeetError;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::status::{Status, StatusPresenter};

pub type ProviderHandle = JoinHandle<Result<PipelineStats, LorikeetError>>;

/// Latest tick report, readable from other threads.
pub type Snapshot = Arc<Mutex<Option<TickReport>>>;

/// Start `provider` on its own thread, posting gestures into `latch` every
/// frame period until `shutdown` is set or the provider fails.
pub fn spawn_provider<P>(
    provider: P,
    cfg: &Config,
    latch: CommandLatch,
    shutdown: Arc<AtomicBool>,
    start: Instant,
) -> Result<ProviderHandle, LorikeetError>
where
    P: LandmarkProvider + 'static,
{
    let id = provider.id().to_string();
    let period = cfg.frame_period();
    let thresholds = cfg.classifier;

    thread::Builder::new()
        .name(format!("provider-{id}"))
        .spawn(move || {
            let mut pipeline = GesturePipeline::new(provider, thresholds);
            let mut sink = latch;
            info!(provider = pipeline.provider().id(), "landmark provider started");
            while !shutdown.load(Ordering::SeqCst) {
                pipeline.step(start.elapsed(), &mut sink)?;
                thread::sleep(period);
            }
            let stats = pipeline.stats();
            debug!(?stats, "landmark provider stopped");
            Ok(stats)
        })
        .map_err(|e| LorikeetError::ProviderFault {
            provider: id,
            details: format!("failed to start provider thread: {e}"),
        })
}

/// Render-side state of a session.
pub struct Session {
    controller: BehaviorController,
    driver: TickDriver,
    presenter: StatusPresenter,
    snapshot: Snapshot,
    tick_period: Duration,
    print_pose: bool,
    pose_every: u64,
}

impl Session {
    pub fn new(cfg: &Config) -> Self {
        Self {
            controller: BehaviorController::with_blend(cfg.blend_mode()),
            driver: TickDriver::default(),
            presenter: StatusPresenter::new(),
            snapshot: Arc::new(Mutex::new(None)),
            tick_period: cfg.tick_period(),
            print_pose: cfg.print_pose,
            pose_every: u64::from(cfg.pose_every.max(1)),
        }
    }

    /// A handle on the latch the render loop drains.
    pub fn latch(&self) -> CommandLatch {
        self.driver.latch().clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.snapshot)
    }

    /// Tick until `shutdown` is set, `stop_after` has elapsed, or the
    /// provider thread ends.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if it failed, or
    /// [`LorikeetError::Serialization`] if a pose line could not be encoded.
    pub fn run(
        &mut self,
        start: Instant,
        stop_after: Option<Duration>,
        shutdown: &AtomicBool,
        provider: ProviderHandle,
    ) -> Result<(), LorikeetError> {
        self.show(Status::Waiting);
        let mut provider = Some(provider);
        let mut next_tick = Instant::now();

        while !shutdown.load(Ordering::SeqCst) {
            let now = start.elapsed();
            if stop_after.is_some_and(|limit| now >= limit) {
                break;
            }
            if provider.as_ref().is_some_and(|h| h.is_finished())
                && let Some(handle) = provider.take()
            {
                self.finish_provider(handle)?;
            }

            self.tick(now)?;

            next_tick += self.tick_period;
            let wait = next_tick.saturating_duration_since(Instant::now());
            if wait.is_zero() {
                next_tick = Instant::now();
            } else {
                thread::sleep(wait);
            }
        }

        shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = provider {
            self.finish_provider(handle)?;
        }
        Ok(())
    }

    fn tick(&mut self, now: Duration) -> Result<(), LorikeetError> {
        let report = self.driver.tick(&mut self.controller, now);

        if let Some(symbol) = report.symbol {
            self.show(Status::Gesture(symbol));
        }
        if self.print_pose && report.tick % self.pose_every == 0 {
            let line = serde_json::to_string(&report)
                .map_err(|e| LorikeetError::Serialization(e.to_string()))?;
            println!("{line}");
        }

        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(report);
        Ok(())
    }

    fn finish_provider(&mut self, handle: ProviderHandle) -> Result<(), LorikeetError> {
        let result = handle.join().unwrap_or_else(|_| {
            Err(LorikeetError::ProviderFault {
                provider: "provider".to_string(),
                details: "provider thread panicked".to_string(),
            })
        });
        match result {
            Ok(stats) => {
                info!(
                    frames = stats.frames,
                    symbols = stats.symbols,
                    malformed = stats.malformed,
                    "landmark provider finished"
                );
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "landmark provider failed");
                self.show(Status::ProviderFailed);
                Err(e)
            }
        }
    }

    fn show(&mut self, status: Status) {
        if let Some(line) = self.presenter.update(status) {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorikeet_hal::{HandShape, ScriptedProvider};
    use lorikeet_types::{BehaviorState, HandSkeleton};

    struct Broken;

    impl LandmarkProvider for Broken {
        fn id(&self) -> &str {
            "broken"
        }

        fn next_frame(&mut self, _now: Duration) -> Result<Option<HandSkeleton>, LorikeetError> {
            Err(LorikeetError::ProviderFault {
                provider: "broken".to_string(),
                details: "no device".to_string(),
            })
        }
    }

    fn fast_config() -> Config {
        Config {
            tick_hz: 200,
            frame_hz: 200,
            ..Config::default()
        }
    }

    #[test]
    fn scripted_session_applies_gestures() {
        let cfg = fast_config();
        let mut session = Session::new(&cfg);
        let shutdown = Arc::new(AtomicBool::new(false));
        let start = Instant::now();
        let script = ScriptedProvider::new("t").then(0.0, HandShape::Open).build();
        let handle =
            spawn_provider(script, &cfg, session.latch(), Arc::clone(&shutdown), start).unwrap();

        session
            .run(start, Some(Duration::from_millis(300)), &shutdown, handle)
            .unwrap();

        assert_eq!(session.controller.state(), BehaviorState::Flying);
        let snap = (*session.snapshot().lock().unwrap()).expect("ticks ran");
        assert_eq!(snap.state, BehaviorState::Flying);
        assert!(shutdown.load(Ordering::SeqCst));
    }

    #[test]
    fn provider_fault_ends_the_session() {
        let cfg = fast_config();
        let mut session = Session::new(&cfg);
        let shutdown = Arc::new(AtomicBool::new(false));
        let start = Instant::now();
        let handle =
            spawn_provider(Broken, &cfg, session.latch(), Arc::clone(&shutdown), start).unwrap();

        let result = session.run(start, Some(Duration::from_secs(5)), &shutdown, handle);
        assert!(matches!(result, Err(LorikeetError::ProviderFault { .. })));
        assert_eq!(session.presenter.current(), Some(Status::ProviderFailed));
    }
}
