//! Animation Controller: Lifecycle state machine for an animated label.
//!
//! The controller owns the frames and at most one running animation. A run
//! is a coordination thread that watches the host's attachment and starts a
//! scheduler thread only while the host is attached:
//!
//! ```text
//!            start_animation                 attach edge
//!   ┌──────┐ ──────────────▶ ┌─────────┐ ───────────────▶ ┌─────────┐
//!   │ Idle │                 │ Waiting │                  │ Running │
//!   └──────┘ ◀────────────── └─────────┘ ◀─────────────── └─────────┘
//!       ▲     stop_animation               detach edge          │
//!       └───────────────────────────────────────────────────────┘
//!                              stop_animation
//! ```
//!
//! Every run carries a generation number. Stopping or restarting bumps the
//! generation under the frame lock, so a stale tick that wakes up late finds
//! a mismatch and does nothing. The run's cancel sender lives next to the
//! generation, so the same critical section that invalidates a run also
//! disconnects its threads.
//!
//! A coordinator must hold the controller's single ticker permit while its
//! scheduler is alive. A replacement run waits for the permit until the old
//! coordinator has joined its scheduler, even when the restart came from
//! inside a tick.

use super::monitor::AttachmentMonitor;
use super::scheduler::AnimationScheduler;
use crate::error::{AnimationError, Result};
use crate::frame::FrameSequence;
use crate::host::Host;
use crate::layout::Size;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, trace};

/// Tick interval of [`AnimationController::classic_spinner`].
pub const CLASSIC_SPINNER_INTERVAL: Duration = Duration::from_millis(150);

/// Frames of the classic spinning line.
pub const CLASSIC_SPINNER_FRAMES: [&str; 4] = ["-", "\\", "|", "/"];

/// Numbers controllers for thread names.
static CONTROLLER_NUMBER: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    /// Set on coordination and ticker threads.
    static ON_WORKER: Cell<bool> = const { Cell::new(false) };
}

fn mark_worker_thread() {
    ON_WORKER.with(|flag| flag.set(true));
}

fn on_worker_thread() -> bool {
    ON_WORKER.with(Cell::get)
}

/// Lifecycle state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationState {
    /// No monitor, no scheduler.
    #[default]
    Idle,
    /// Monitor armed, waiting for the host to attach.
    Waiting,
    /// Monitor armed and scheduler ticking.
    Running,
}

/// Configuration for a controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Prefix for worker thread names.
    ///
    /// Threads are named `<prefix>-<controller>-monitor` and
    /// `<prefix>-<controller>-ticker-<n>`.
    pub thread_name_prefix: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "animated-label".to_string(),
        }
    }
}

/// Frame data and state machine, guarded by one lock.
struct Inner {
    frames: FrameSequence,
    state: AnimationState,
    /// Interval of the current run, if any.
    interval: Option<Duration>,
    /// Bumped whenever a run starts or is torn down.
    generation: u64,
    /// Dropping this disconnects the current run's cancel channel.
    cancel: Option<Sender<()>>,
}

/// State shared between the controller and its worker threads.
struct Shared {
    inner: Mutex<Inner>,
    /// Non-owning: the host's lifetime is not ours to extend.
    host: Weak<dyn Host>,
    /// Scheduler threads currently alive.
    live_schedulers: AtomicUsize,
    /// Highest value `live_schedulers` has reached.
    peak_schedulers: AtomicUsize,
    thread_name_prefix: String,
    number: usize,
    ticker_number: AtomicUsize,
    /// One token; held by the coordinator whose scheduler is alive.
    permit_tx: Sender<()>,
    permit_rx: Receiver<()>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm a run at `interval` unless one is already armed at it.
    ///
    /// Returns the new generation, or `None` for a no-op.
    fn arm(&self, interval: Duration, cancel: Sender<()>) -> Option<u64> {
        let mut inner = self.lock();
        if inner.cancel.is_some() && inner.interval == Some(interval) {
            return None;
        }
        Some(self.begin(&mut inner, AnimationState::Waiting, Some(interval), Some(cancel)))
    }

    /// Cancel any run and go idle.
    fn disarm(&self) {
        let mut inner = self.lock();
        self.begin(&mut inner, AnimationState::Idle, None, None);
    }

    /// Start a new generation in `state`, cancelling the previous run.
    fn begin(
        &self,
        inner: &mut Inner,
        state: AnimationState,
        interval: Option<Duration>,
        cancel: Option<Sender<()>>,
    ) -> u64 {
        inner.generation = inner.generation.wrapping_add(1);
        inner.cancel = cancel;
        if inner.state != state {
            debug!(label = self.number, from = ?inner.state, to = ?state, "animation state change");
        }
        inner.state = state;
        inner.interval = interval;
        inner.generation
    }

    /// Move to `state` if `generation` is still current.
    fn transition(&self, generation: u64, state: AnimationState) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            return false;
        }
        debug!(label = self.number, from = ?inner.state, to = ?state, "animation state change");
        inner.state = state;
        if state == AnimationState::Idle {
            inner.interval = None;
            inner.cancel = None;
        }
        true
    }

    /// Wait for the ticker permit, or `None` if the run is cancelled first.
    fn acquire_ticker(&self, cancel: &Receiver<()>) -> Option<TickerPermit> {
        select! {
            recv(self.permit_rx) -> token => token.ok().map(|()| TickerPermit(self.permit_tx.clone())),
            recv(cancel) -> _ => None,
        }
    }

    /// Advance one frame for the run `generation` and render it.
    fn tick(&self, generation: u64) {
        let lines = {
            let mut inner = self.lock();
            if inner.generation != generation || inner.state != AnimationState::Running {
                return;
            }
            inner.frames.advance();
            trace!(label = self.number, frame = inner.frames.current_index(), "tick");
            inner.frames.current().to_vec()
        };
        self.render(&lines);
    }

    fn render(&self, lines: &[String]) {
        if let Some(host) = self.host.upgrade() {
            host.render_frame(lines);
        }
    }

    fn report_bounds(&self, size: Size) {
        if let Some(host) = self.host.upgrade() {
            host.report_preferred_bounds(size);
        }
    }

    fn monitor_thread_name(&self) -> String {
        format!("{}-{}-monitor", self.thread_name_prefix, self.number)
    }

    fn ticker_thread_name(&self) -> String {
        let n = self.ticker_number.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-ticker-{n}", self.thread_name_prefix, self.number)
    }

    /// Start a scheduler ticking for run `generation`.
    fn start_scheduler(self: &Arc<Self>, generation: u64, interval: Duration) -> Result<AnimationScheduler> {
        let shared = Arc::clone(self);
        let live = LiveScheduler::enter(Arc::clone(self));
        AnimationScheduler::start(interval, self.ticker_thread_name(), move || {
            let _live = &live;
            mark_worker_thread();
            shared.tick(generation);
        })
    }
}

/// Counts a scheduler as live for as long as its tick callback exists.
///
/// The callback is dropped when the ticker thread exits, so the count covers
/// the whole life of the thread.
struct LiveScheduler(Arc<Shared>);

impl LiveScheduler {
    fn enter(shared: Arc<Shared>) -> Self {
        let live = shared.live_schedulers.fetch_add(1, Ordering::SeqCst) + 1;
        shared.peak_schedulers.fetch_max(live, Ordering::SeqCst);
        Self(shared)
    }
}

impl Drop for LiveScheduler {
    fn drop(&mut self) {
        self.0.live_schedulers.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The right to keep a scheduler alive. Returned to the pool on drop.
struct TickerPermit(Sender<()>);

impl Drop for TickerPermit {
    fn drop(&mut self) {
        let _ = self.0.try_send(());
    }
}

/// Body of the coordination thread for run `generation`.
fn coordinate(shared: &Arc<Shared>, generation: u64, interval: Duration, cancel: Receiver<()>) {
    mark_worker_thread();
    let mut monitor = AttachmentMonitor::subscribe(shared.host.clone(), cancel.clone());
    debug!(
        label = shared.number,
        generation,
        initial = ?monitor.last_observed(),
        "animation armed"
    );

    loop {
        if monitor.wait_for_attach().is_err() {
            break;
        }
        let Some(permit) = shared.acquire_ticker(&cancel) else {
            break;
        };
        if !shared.transition(generation, AnimationState::Running) {
            break;
        }

        let mut scheduler = match shared.start_scheduler(generation, interval) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                error!(label = shared.number, "failed to start animation: {e}");
                shared.transition(generation, AnimationState::Idle);
                break;
            }
        };

        debug!(label = shared.number, generation, interval = ?scheduler.interval(), "ticking");
        let detached = monitor.wait_for_detach();
        scheduler.stop();
        drop(permit);
        if detached.is_err() {
            break;
        }
        if !shared.transition(generation, AnimationState::Waiting) {
            break;
        }
    }

    debug!(label = shared.number, generation, "animation disarmed");
}

/// A label that cycles through frames while its host is displayed.
///
/// All methods take `&self`; the controller may be shared between threads.
/// Dropping it stops the animation.
///
/// # Example
///
/// ```rust,ignore
/// use animated_label::{AnimationController, DisplayNode};
/// use std::sync::Arc;
///
/// let node = Arc::new(DisplayNode::new());
/// let spinner = AnimationController::classic_spinner(&node)?;
///
/// node.attach();  // ticking starts
/// node.detach();  // ticking stops, the monitor waits for the next attach
/// spinner.stop_animation();
/// ```
pub struct AnimationController {
    shared: Arc<Shared>,
    /// Coordination threads not yet joined, with their generation.
    coordinators: Mutex<Vec<(u64, JoinHandle<()>)>>,
}

impl AnimationController {
    /// Create an idle controller showing `first_frame`.
    ///
    /// The first frame is rendered and its bounds reported right away.
    pub fn new<H: Host + 'static>(host: &Arc<H>, first_frame: &str) -> Self {
        Self::with_config(host, first_frame, ControllerConfig::default())
    }

    /// Create an idle controller with custom configuration.
    pub fn with_config<H: Host + 'static>(
        host: &Arc<H>,
        first_frame: &str,
        config: ControllerConfig,
    ) -> Self {
        let weak: Weak<H> = Arc::downgrade(host);
        let host: Weak<dyn Host> = weak;
        let frames = FrameSequence::new(first_frame);
        let lines = frames.current().to_vec();
        let bounds = frames.bounds();
        let (permit_tx, permit_rx) = bounded(1);
        let _ = permit_tx.try_send(());

        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                frames,
                state: AnimationState::Idle,
                interval: None,
                generation: 0,
                cancel: None,
            }),
            host,
            live_schedulers: AtomicUsize::new(0),
            peak_schedulers: AtomicUsize::new(0),
            thread_name_prefix: config.thread_name_prefix,
            number: CONTROLLER_NUMBER.fetch_add(1, Ordering::Relaxed),
            ticker_number: AtomicUsize::new(0),
            permit_tx,
            permit_rx,
        });

        shared.report_bounds(bounds);
        shared.render(&lines);

        Self {
            shared,
            coordinators: Mutex::new(Vec::new()),
        }
    }

    /// Create the classic spinning line, ticking every 150ms.
    ///
    /// The animation is already started; it runs whenever `host` is attached.
    pub fn classic_spinner<H: Host + 'static>(host: &Arc<H>) -> Result<Self> {
        Self::classic_spinner_with_interval(host, CLASSIC_SPINNER_INTERVAL)
    }

    /// Create the classic spinning line with a custom interval.
    pub fn classic_spinner_with_interval<H: Host + 'static>(
        host: &Arc<H>,
        interval: Duration,
    ) -> Result<Self> {
        let spinner = Self::new(host, CLASSIC_SPINNER_FRAMES[0]);
        for frame in &CLASSIC_SPINNER_FRAMES[1..] {
            spinner.add_frame(frame);
        }
        spinner.start_animation(interval)?;
        Ok(spinner)
    }

    /// Append a frame. Legal in any state, including while ticking.
    pub fn add_frame(&self, text: &str) -> &Self {
        let bounds = {
            let mut inner = self.shared.lock();
            inner.frames.add_frame(text);
            inner.frames.bounds()
        };
        self.shared.report_bounds(bounds);
        self
    }

    /// Start animating at `interval` whenever the host is attached.
    ///
    /// Repeating a start with the same interval while armed is a no-op that
    /// keeps the frame position. A different interval replaces the run; the
    /// new run does not tick until the old scheduler has exited. This holds
    /// when called from inside a tick too.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::InvalidInterval`] for a zero interval (the
    /// controller is left untouched) and [`AnimationError::Spawn`] if the
    /// coordination thread cannot be created (the controller goes idle).
    pub fn start_animation(&self, interval: Duration) -> Result<&Self> {
        if interval.is_zero() {
            return Err(AnimationError::InvalidInterval);
        }

        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let Some(generation) = self.shared.arm(interval, cancel_tx) else {
            return Ok(self);
        };

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(self.shared.monitor_thread_name())
            .spawn(move || coordinate(&shared, generation, interval, cancel_rx));

        match spawned {
            Ok(coordinator) => {
                self.lock_coordinators().push((generation, coordinator));
                self.reap();
                Ok(self)
            }
            Err(e) => {
                self.shared.transition(generation, AnimationState::Idle);
                self.reap();
                Err(e.into())
            }
        }
    }

    /// Stop animating and return to [`AnimationState::Idle`].
    ///
    /// Safe in any state and from any thread, including from inside a tick.
    /// When this returns no further tick will be delivered. The frame
    /// position is kept for the next start.
    pub fn stop_animation(&self) -> &Self {
        self.shared.disarm();
        self.reap();
        self
    }

    /// Advance one frame and push it to the host, whatever the state.
    pub fn next_frame(&self) {
        let lines = {
            let mut inner = self.shared.lock();
            inner.frames.advance();
            inner.frames.current().to_vec()
        };
        self.shared.render(&lines);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AnimationState {
        self.shared.lock().state
    }

    /// Interval of the current run, if armed.
    pub fn interval(&self) -> Option<Duration> {
        self.shared.lock().interval
    }

    /// Index of the frame currently shown.
    pub fn current_frame(&self) -> usize {
        self.shared.lock().frames.current_index()
    }

    /// Lines of the frame currently shown.
    pub fn current_lines(&self) -> Vec<String> {
        self.shared.lock().frames.current().to_vec()
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.shared.lock().frames.len()
    }

    /// Size needed to show every frame without clipping.
    pub fn preferred_size(&self) -> Size {
        self.shared.lock().frames.preferred_size()
    }

    /// Scheduler threads currently alive for this controller.
    pub fn running_schedulers(&self) -> usize {
        self.shared.live_schedulers.load(Ordering::SeqCst)
    }

    /// Most scheduler threads ever alive at once for this controller.
    pub fn peak_schedulers(&self) -> usize {
        self.shared.peak_schedulers.load(Ordering::SeqCst)
    }

    fn lock_coordinators(&self) -> MutexGuard<'_, Vec<(u64, JoinHandle<()>)>> {
        self.coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Join every coordinator whose run has been cancelled.
    ///
    /// Skipped on worker threads: the coordinator may be waiting on the very
    /// ticker thread that is asking. Its handle is joined by a later call.
    fn reap(&self) {
        if on_worker_thread() {
            return;
        }
        let (current, armed) = {
            let inner = self.shared.lock();
            (inner.generation, inner.cancel.is_some())
        };
        let cancelled: Vec<JoinHandle<()>> = {
            let mut coordinators = self.lock_coordinators();
            let (cancelled, live) = coordinators
                .drain(..)
                .partition::<Vec<_>, _>(|(run, _)| *run < current || (!armed && *run == current));
            *coordinators = live;
            cancelled.into_iter().map(|(_, handle)| handle).collect()
        };
        for coordinator in cancelled {
            if coordinator.join().is_err() {
                error!(label = self.shared.number, "coordination thread panicked");
            }
        }
    }
}

impl Drop for AnimationController {
    fn drop(&mut self) {
        self.stop_animation();
    }
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("AnimationController")
            .field("state", &inner.state)
            .field("interval", &inner.interval)
            .field("frame", &inner.frames.current_index())
            .field("frames", &inner.frames.len())
            .finish_non_exhaustive()
    }
}
