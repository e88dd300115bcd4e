//! Motion state controller — the trigger/debounce state machine.
//!
//! Two states:
//!
//! | State  | `motion_detected` | Reset timer |
//! |--------|-------------------|-------------|
//! | Idle   | `false`           | none        |
//! | Active | `true`            | running     |
//!
//! A trigger moves either state to Active and re-arms the timer; timer expiry
//! moves Active back to Idle. Triggers and expiries are serialized through
//! one mutex, and the subscriber is notified inside that critical section.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use motion_domain::sensor::{RepeaterTarget, RetriggerPolicy, SensorConfig};

use crate::ports::{RepeaterNotifier, StateSubscriber, TriggerHandler};
use crate::reset_timer::ResetTimer;

struct Inner {
    timer: ResetTimer,
    /// Bumped on every arming; an expiry only applies if it still matches.
    generation: u64,
    shut_down: bool,
}

/// State shared with the reset timer task.
struct Shared<S> {
    sensor: String,
    motion_detected: AtomicBool,
    inner: Mutex<Inner>,
    subscriber: S,
}

impl<S: StateSubscriber> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking subscriber must not wedge the sensor.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expire(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.shut_down || inner.generation != generation {
            return;
        }
        inner.timer.clear();
        self.motion_detected.store(false, Ordering::SeqCst);
        self.subscriber.on_state_change(false);
        tracing::debug!(sensor = %self.sensor, "motion reset");
    }
}

/// Owner of one sensor's motion state.
///
/// Generic over the subscriber that receives pushed state changes and the
/// notifier used for repeater fan-out, so the controller never knows which
/// adapters are plugged in.
pub struct MotionController<S, R> {
    shared: Arc<Shared<S>>,
    repeater: Arc<R>,
    repeaters: Arc<[RepeaterTarget]>,
    motion_timeout: Duration,
    retrigger_policy: RetriggerPolicy,
    shutdown_tx: watch::Sender<bool>,
}

impl<S, R> MotionController<S, R>
where
    S: StateSubscriber,
    R: RepeaterNotifier,
{
    /// Create a controller in the Idle state.
    pub fn new(config: &SensorConfig, subscriber: S, repeater: R) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                sensor: config.name().to_string(),
                motion_detected: AtomicBool::new(false),
                inner: Mutex::new(Inner {
                    timer: ResetTimer::new(),
                    generation: 0,
                    shut_down: false,
                }),
                subscriber,
            }),
            repeater: Arc::new(repeater),
            repeaters: config.repeaters().into(),
            motion_timeout: config.motion_timeout(),
            retrigger_policy: config.retrigger_policy(),
            shutdown_tx,
        }
    }

    /// Name of the sensor this controller drives.
    #[must_use]
    pub fn sensor(&self) -> &str {
        &self.shared.sensor
    }

    /// Current `motion_detected` value. Lock-free.
    #[must_use]
    pub fn get_state(&self) -> bool {
        let state = self.shared.motion_detected.load(Ordering::SeqCst);
        tracing::trace!(sensor = %self.shared.sensor, state, "motion state requested");
        state
    }

    /// Whether a reset is currently scheduled.
    #[must_use]
    pub fn reset_pending(&self) -> bool {
        self.shared.lock().timer.is_armed()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Motion was sensed: go Active, re-arm the reset timer, notify, and fan
    /// out to repeaters without waiting for them.
    ///
    /// Ignored after [`shutdown`](Self::shutdown).
    pub fn handle_trigger(&self) {
        {
            let mut inner = self.shared.lock();
            if inner.shut_down {
                tracing::debug!(sensor = %self.shared.sensor, "trigger ignored after shutdown");
                return;
            }

            let was_active = self.shared.motion_detected.swap(true, Ordering::SeqCst);
            inner.generation = inner.generation.wrapping_add(1);
            let generation = inner.generation;
            let shared = Arc::clone(&self.shared);
            inner
                .timer
                .rearm(self.motion_timeout, move || shared.expire(generation));

            if !was_active || self.retrigger_policy == RetriggerPolicy::Always {
                self.shared.subscriber.on_state_change(true);
            }
            tracing::debug!(
                sensor = %self.shared.sensor,
                retrigger = was_active,
                "motion detected"
            );
        }

        self.fan_out();
    }

    /// Cancel the pending reset and signal listeners to stop. Idempotent.
    pub fn shutdown(&self) {
        let cancelled = {
            let mut inner = self.shared.lock();
            if inner.shut_down {
                return;
            }
            inner.shut_down = true;
            inner.timer.cancel()
        };
        self.shutdown_tx.send_replace(true);
        tracing::info!(
            sensor = %self.shared.sensor,
            reset_cancelled = cancelled,
            "motion controller stopped"
        );
    }

    fn fan_out(&self) {
        for target in self.repeaters.iter() {
            let notifier = Arc::clone(&self.repeater);
            let target = target.clone();
            let sensor = self.shared.sensor.clone();
            tokio::spawn(async move {
                match notifier.notify(&target).await {
                    Ok(()) => {
                        tracing::debug!(sensor = %sensor, url = %target, "repeater request succeeded");
                    }
                    Err(err) => {
                        tracing::warn!(
                            sensor = %sensor,
                            host = target.host(),
                            error = %error_chain(&err),
                            "repeater request failed"
                        );
                    }
                }
            });
        }
    }
}

impl<S, R> TriggerHandler for MotionController<S, R>
where
    S: StateSubscriber,
    R: RepeaterNotifier,
{
    fn handle_trigger(&self) {
        MotionController::handle_trigger(self);
    }

    fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }
}

impl<S, R> Drop for MotionController<S, R> {
    fn drop(&mut self) {
        // The timer task holds a clone of `shared`; break the cycle.
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .timer
            .cancel();
    }
}

/// `outer: inner: innermost` rendering of an error and its sources.
fn error_chain(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
