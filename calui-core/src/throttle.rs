//! Callback rate limiting.
//!
//! [`Throttle`] wraps a callback so it runs at most once per `limit`:
//!
//! - A call while idle runs the callback right away, then starts a cooldown.
//! - Calls during the cooldown are deferred. Only the latest one is kept, and
//!   each one re-arms the timer to fire `limit` after that call.
//! - When the deferred timer fires, the latest call runs if at least `limit`
//!   has passed since the last run. Otherwise it is dropped and nothing is
//!   re-armed until the next call comes in.
//!
//! At most one timer is outstanding per throttle. Timers are Tokio tasks, so
//! [`Throttle::invoke`] must be called from within a Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::Instant;

type Callback<A> = dyn Fn(A) + Send + Sync;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What an armed timer does when it fires.
enum TimerAction<A> {
    /// End the cooldown that follows an immediate run
    Release,
    /// Run the latest deferred call, if the interval has passed
    Trailing(A),
}

struct Timer {
    generation: u64,
    handle: AbortHandle,
}

#[derive(Default)]
struct State {
    cooling_down: bool,
    last_ran: Option<Instant>,
    timer: Option<Timer>,
    /// Bumped on every arm; a woken timer only acts if it is still current.
    generation: u64,
}

struct Shared<A> {
    limit: Duration,
    func: Box<Callback<A>>,
    state: Mutex<State>,
}

impl<A: Send + 'static> Shared<A> {
    /// Replace any outstanding timer with one that performs `action`.
    fn arm(self: &Arc<Self>, state: &mut State, action: TimerAction<A>) {
        if let Some(timer) = state.timer.take() {
            timer.handle.abort();
        }

        state.generation += 1;
        let generation = state.generation;
        let deadline = Instant::now() + self.limit;
        let shared = Arc::clone(self);

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            shared.fire(generation, action);
        })
        .abort_handle();

        state.timer = Some(Timer { generation, handle });
    }

    fn fire(&self, generation: u64, action: TimerAction<A>) {
        let mut state = lock(&self.state);

        // Superseded or cancelled after the sleep already completed
        if state.timer.as_ref().map(|t| t.generation) != Some(generation) {
            return;
        }
        state.timer = None;

        match action {
            TimerAction::Release => {
                tracing::trace!("throttle cooldown ended");
                state.cooling_down = false;
            }
            TimerAction::Trailing(args) => {
                let ready = state
                    .last_ran
                    .is_none_or(|last| last.elapsed() >= self.limit);

                if !ready {
                    tracing::debug!(
                        limit = ?self.limit,
                        "throttle dropped deferred call, interval not yet elapsed"
                    );
                    return;
                }

                drop(state);
                tracing::trace!("throttle running deferred call");
                (self.func)(args);

                let mut state = lock(&self.state);
                state.last_ran = Some(Instant::now());
                state.cooling_down = false;
            }
        }
    }
}

/// Returns the throttle to idle if the callback of an immediate run panics,
/// so the next call runs right away.
struct IdleOnPanic<'a> {
    state: &'a Mutex<State>,
}

impl Drop for IdleOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            lock(self.state).cooling_down = false;
        }
    }
}

/// Type-erased cancel entry point for [`Canceller`].
trait Cancel: Send + Sync {
    fn cancel(&self);
}

impl<A: Send> Cancel for Shared<A> {
    fn cancel(&self) {
        let mut state = lock(&self.state);
        if let Some(timer) = state.timer.take() {
            timer.handle.abort();
        }
        state.cooling_down = false;
    }
}

/// Rate-limited wrapper around a callback taking `A`.
///
/// Clones share the same timer and cooldown.
pub struct Throttle<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for Throttle<A> {
    fn clone(&self) -> Self {
        Throttle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: Send + 'static> Throttle<A> {
    pub fn new<F>(limit: Duration, func: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Throttle {
            shared: Arc::new(Shared {
                limit,
                func: Box::new(func),
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Run the callback now if idle, otherwise defer it as the latest call.
    ///
    /// An immediate run happens on the caller's stack before this returns,
    /// so a panic in the callback propagates to the caller.
    pub fn invoke(&self, args: A) {
        let mut state = lock(&self.shared.state);

        if state.cooling_down {
            tracing::trace!("throttle deferring call");
            self.shared.arm(&mut state, TimerAction::Trailing(args));
            return;
        }

        state.cooling_down = true;
        drop(state);

        tracing::trace!("throttle running call immediately");
        {
            let _idle_on_panic = IdleOnPanic {
                state: &self.shared.state,
            };
            (self.shared.func)(args);
        }

        let mut state = lock(&self.shared.state);
        state.last_ran = Some(Instant::now());
        state.cooling_down = true;
        // A re-entrant call from the callback may already have armed a deferred run
        if state.timer.is_none() {
            self.shared.arm(&mut state, TimerAction::Release);
        }
    }

    /// Drop any deferred call and return to idle, so the next call runs
    /// immediately. Safe to call at any time, including from the callback.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// A weak handle that can cancel this throttle from inside its own
    /// callback without keeping it alive.
    pub fn canceller(&self) -> Canceller {
        let shared: Arc<dyn Cancel> = self.shared.clone();
        Canceller {
            shared: Arc::downgrade(&shared),
        }
    }

    pub fn limit(&self) -> Duration {
        self.shared.limit
    }

    pub fn is_cooling_down(&self) -> bool {
        lock(&self.shared.state).cooling_down
    }

    /// Whether a timer (cooldown release or deferred call) is outstanding.
    pub fn has_pending(&self) -> bool {
        lock(&self.shared.state).timer.is_some()
    }
}

/// Wrap `func` so it runs at most once every `limit_ms` milliseconds.
pub fn throttle<A, F>(func: F, limit_ms: u64) -> Throttle<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Throttle::new(Duration::from_millis(limit_ms), func)
}

/// Cancels a [`Throttle`] if it still exists.
#[derive(Clone)]
pub struct Canceller {
    shared: Weak<dyn Cancel>,
}

impl Canceller {
    pub fn cancel(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.cancel();
        }
    }
}
