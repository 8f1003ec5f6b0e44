//! # Shift State Signal
//!
//! One [`ShiftControl`] per shift owns the state; every worker, the order registry and the
//! load scheduler hold a [`ShiftSignal`] subscribed to it. Built on `tokio::sync::watch`,
//! so a worker parked in [`ShiftSignal::check_pause`] wakes as soon as the state leaves
//! `Paused`, and a worker in [`ShiftSignal::sleep`] is cut short by `Stopped`.

use super::error::ShiftError;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftState {
    Running,
    Paused,
    Stopped,
}

impl Display for ShiftState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ShiftState::Running => "running",
            ShiftState::Paused => "paused",
            ShiftState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Creates the control half and a first subscriber, starting in `Running`.
pub fn channel() -> (ShiftControl, ShiftSignal) {
    let (tx, rx) = watch::channel(ShiftState::Running);
    (ShiftControl { tx }, ShiftSignal { rx })
}

/// Writer side. `Stopped` is final: nothing moves the state out of it.
#[derive(Debug)]
pub struct ShiftControl {
    tx: watch::Sender<ShiftState>,
}

impl ShiftControl {
    pub fn state(&self) -> ShiftState {
        *self.tx.borrow()
    }

    /// `Running → Paused`. Returns whether the state changed.
    pub fn pause(&self) -> bool {
        self.transition(ShiftState::Running, ShiftState::Paused)
    }

    /// `Paused → Running`. Returns whether the state changed.
    pub fn resume(&self) -> bool {
        self.transition(ShiftState::Paused, ShiftState::Running)
    }

    pub fn stop(&self) {
        self.tx.send_replace(ShiftState::Stopped);
    }

    fn transition(&self, from: ShiftState, to: ShiftState) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        })
    }
}

/// Reader side. Cheap to clone; every method works on a private receiver clone, so the
/// signal can be shared behind `&self`.
#[derive(Debug, Clone)]
pub struct ShiftSignal {
    rx: watch::Receiver<ShiftState>,
}

impl ShiftSignal {
    /// A dropped control counts as `Stopped`.
    pub fn state(&self) -> ShiftState {
        match self.rx.has_changed() {
            Err(_) => ShiftState::Stopped,
            Ok(_) => *self.rx.borrow(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == ShiftState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state() == ShiftState::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == ShiftState::Stopped
    }

    /// Pause checkpoint. Returns at once while running, parks while paused, and fails
    /// with [`ShiftError::Stopped`] once the shift is over.
    pub async fn check_pause(&self) -> Result<(), ShiftError> {
        let mut rx = self.rx.clone();
        let running = match rx.wait_for(|state| *state != ShiftState::Paused).await {
            Ok(state) => *state == ShiftState::Running,
            Err(_) => false,
        };
        if running {
            Ok(())
        } else {
            Err(ShiftError::Stopped)
        }
    }

    /// Sleeps for `duration` unless the shift stops first.
    pub async fn sleep(&self, duration: Duration) -> Result<(), ShiftError> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {
                if self.is_stopped() {
                    Err(ShiftError::Stopped)
                } else {
                    Ok(())
                }
            }
            _ = self.stopped() => Err(ShiftError::Stopped),
        }
    }

    /// Resolves once the shift is stopped or the control is dropped.
    pub async fn stopped(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|state| *state == ShiftState::Stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_transitions_only_from_expected_state() {
        let (control, signal) = channel();
        assert!(!control.resume());
        assert!(control.pause());
        assert!(!control.pause());
        assert!(signal.is_paused());
        assert!(control.resume());
        control.stop();
        assert!(!control.pause());
        assert!(!control.resume());
        assert!(signal.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_pause_parks_until_resume() {
        let (control, signal) = channel();
        control.pause();

        let passed = Arc::new(AtomicBool::new(false));
        let flag = passed.clone();
        let worker = tokio::spawn(async move {
            signal.check_pause().await.unwrap();
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!passed.load(Ordering::SeqCst));

        control.resume();
        worker.await.unwrap();
        assert!(passed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_releases_paused_and_sleeping_workers() {
        let (control, signal) = channel();
        let sleeper = signal.clone();
        let sleeping = tokio::spawn(async move { sleeper.sleep(Duration::from_secs(60)).await });

        control.pause();
        let parked = tokio::spawn(async move { signal.check_pause().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        control.stop();

        assert_eq!(parked.await.unwrap(), Err(ShiftError::Stopped));
        assert_eq!(sleeping.await.unwrap(), Err(ShiftError::Stopped));
    }

    #[test]
    fn test_dropped_control_reads_as_stopped() {
        let (control, signal) = channel();
        drop(control);
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn test_check_pause_outcomes() {
        let (control, signal) = channel();
        assert_eq!(signal.check_pause().await, Ok(()));

        control.stop();
        assert_eq!(signal.check_pause().await, Err(ShiftError::Stopped));

        let (control, signal) = channel();
        control.pause();
        drop(control);
        assert_eq!(signal.check_pause().await, Err(ShiftError::Stopped));
    }
}
