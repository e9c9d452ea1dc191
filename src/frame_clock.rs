use std::time::Duration;

/// One display refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Serial of this tick, starting at 1.
    pub frame: u64,

    /// Monotonic timestamp of the refresh.
    pub time: Duration,
}

/// Longest step a single tick may integrate. Longer gaps (a stopped clock, a stalled host)
/// count as this much.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

impl FrameTick {
    /// Time since `last`, capped at [`MAX_FRAME_DELTA`]. Zero for the first tick of a run.
    pub fn delta_since(&self, last: Option<Duration>) -> Duration {
        last.map_or(Duration::ZERO, |last| {
            self.time.saturating_sub(last).min(MAX_FRAME_DELTA)
        })
    }
}

/// Delivers at most one [`FrameTick`] per display refresh while running.
///
/// The engine never blocks: it asks the clock for frames, returns, and resumes when the host
/// feeds it the next tick.
pub trait FrameClock {
    /// Idempotent.
    fn start(&mut self);

    /// Idempotent. No tick is produced after this returns until the next `start`.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Produce the tick for timestamp `now`, if running and `now` is a new refresh.
    fn poll(&mut self, now: Duration) -> Option<FrameTick>;
}

#[derive(Clone, Copy, Debug, Default)]
struct TickCounter {
    running: bool,
    frame: u64,
    last: Option<Duration>,
}

impl TickCounter {
    fn poll(&mut self, now: Duration) -> Option<FrameTick> {
        if !self.running {
            return None;
        }
        // Timestamps never go backwards, and a refresh is only delivered once.
        if self.last.is_some_and(|last| now <= last) {
            return None;
        }
        self.last = Some(now);
        self.frame += 1;
        Some(FrameTick {
            frame: self.frame,
            time: now,
        })
    }
}

/// A clock advanced by hand. Used headless and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualFrameClock {
    counter: TickCounter,
    now: Duration,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move time forward by `dt` and return the tick for the new time (if running).
    pub fn advance(&mut self, dt: Duration) -> Option<FrameTick> {
        self.now += dt;
        self.counter.poll(self.now)
    }
}

impl FrameClock for ManualFrameClock {
    fn start(&mut self) {
        self.counter.running = true;
    }

    fn stop(&mut self) {
        self.counter.running = false;
    }

    fn is_running(&self) -> bool {
        self.counter.running
    }

    fn poll(&mut self, now: Duration) -> Option<FrameTick> {
        self.now = self.now.max(now);
        self.counter.poll(now)
    }
}

/// Frame clock backed by an [`egui::Context`]: one tick per pass, and continuous repaints
/// requested for as long as the clock is running.
#[derive(Clone, Copy, Debug, Default)]
pub struct EguiFrameClock {
    counter: TickCounter,
}

impl EguiFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call once per pass, before feeding the engine.
    pub fn tick_from_ctx(&mut self, ctx: &egui::Context) -> Option<FrameTick> {
        let now = Duration::from_secs_f64(ctx.input(|i| i.time).max(0.0));
        let tick = self.poll(now);
        if self.counter.running {
            ctx.request_repaint();
        }
        tick
    }
}

impl FrameClock for EguiFrameClock {
    fn start(&mut self) {
        self.counter.running = true;
    }

    fn stop(&mut self) {
        self.counter.running = false;
    }

    fn is_running(&self) -> bool {
        self.counter.running
    }

    fn poll(&mut self, now: Duration) -> Option<FrameTick> {
        self.counter.poll(now)
    }
}
