//! Background maintenance tasks
//!
//! Sweeps run as explicit tokio tasks owned by the server rather than
//! ambient timers, so shutdown and tests can cancel them deterministically.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle for a periodic background task. Aborts the task on drop.
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn a task invoking `tick` every `period`.
    pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        Self { handle }
    }

    /// Stop the task immediately.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
