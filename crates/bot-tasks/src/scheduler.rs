use std::time::{Duration, Instant};

/// Host side of cooperative suspension.
///
/// A leaf calls [`Scheduler::yield_now`] between two checks of shared state.
/// Control goes back to the host for one quantum and then returns to the same
/// call site, so the network side gets a chance to apply pending updates.
pub trait Scheduler: Send {
    /// Time elapsed since the scheduler was created.
    fn now(&self) -> Duration;

    fn yield_now(&mut self);

    fn quantum(&self) -> Duration;
}

/// Wall-clock scheduler: a yield sleeps the agent thread for one quantum.
#[derive(Debug, Clone)]
pub struct RealtimeScheduler {
    start: Instant,
    quantum: Duration,
}

impl RealtimeScheduler {
    pub fn new(quantum: Duration) -> Self {
        Self {
            start: Instant::now(),
            quantum,
        }
    }
}

impl Scheduler for RealtimeScheduler {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn yield_now(&mut self) {
        std::thread::sleep(self.quantum);
    }

    fn quantum(&self) -> Duration {
        self.quantum
    }
}

type YieldHook = Box<dyn FnMut(Duration) + Send>;

/// Simulated clock. Every yield advances time by exactly one quantum and then
/// runs the hook, which stands in for whatever the network thread would have
/// done meanwhile.
pub struct ManualScheduler {
    now: Duration,
    quantum: Duration,
    yields: u64,
    hook: Option<YieldHook>,
}

impl ManualScheduler {
    pub fn new(quantum: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            quantum,
            yields: 0,
            hook: None,
        }
    }

    /// Called after each yield with the new simulated time.
    pub fn on_yield(mut self, hook: impl FnMut(Duration) + Send + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn yields(&self) -> u64 {
        self.yields
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn yield_now(&mut self) {
        self.now += self.quantum;
        self.yields += 1;
        if let Some(hook) = self.hook.as_mut() {
            hook(self.now);
        }
    }

    fn quantum(&self) -> Duration {
        self.quantum
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now)
            .field("quantum", &self.quantum)
            .field("yields", &self.yields)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[test]
    fn manual_clock_advances_one_quantum_per_yield() {
        let seen = Arc::new(AtomicU64::new(0));
        let hook_seen = Arc::clone(&seen);
        let mut sched = ManualScheduler::new(Duration::from_millis(10))
            .on_yield(move |now| hook_seen.store(now.as_millis() as u64, Ordering::SeqCst));

        for _ in 0..3 {
            sched.yield_now();
        }
        assert_eq!(sched.now(), Duration::from_millis(30));
        assert_eq!(sched.yields(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 30);
    }

    #[test]
    fn realtime_yield_sleeps_at_least_one_quantum() {
        let mut sched = RealtimeScheduler::new(Duration::from_millis(2));
        let before = sched.now();
        sched.yield_now();
        assert!(sched.now() - before >= Duration::from_millis(2));
    }
}
