//! Timer capability used by both sides of the protocol.
//!
//! Controllers never sleep. They ask the platform to schedule a typed timer
//! and expect the embedding event loop to hand it back through the
//! controller's `on_timer` once it is due.

use std::time::Duration;

/// Opaque handle identifying a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Schedules and cancels timers of kind `T`.
pub trait Scheduler<T> {
    /// Schedules `timer` to fire after `delay`.
    fn schedule(&mut self, delay: Duration, timer: T) -> TimerHandle;

    /// Cancels a timer. Cancelling an already fired or unknown handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}
