use std::time::Duration;

use parking_lot::{Condvar, Mutex};

pub const MAX_SPEED: u8 = 100;

/// Speed and cancellation shared between a running winding and whoever drives
/// the interface. Share it behind an `Arc`; every setter wakes a suspended run.
#[derive(Debug)]
pub struct Control {
    state: Mutex<State>,
    signal: Condvar,
}

#[derive(Debug, Clone, Copy)]
struct State {
    speed: u8,
    cancelled: bool,
}

impl Default for Control {
    fn default() -> Self {
        Self::new(MAX_SPEED)
    }
}

impl Control {
    pub fn new(speed: u8) -> Self {
        Self {
            state: Mutex::new(State {
                speed: speed.min(MAX_SPEED),
                cancelled: false,
            }),
            signal: Condvar::new(),
        }
    }

    pub fn speed(&self) -> u8 {
        self.state.lock().speed
    }

    /// Takes effect at the next suspension point. `0` pauses.
    pub fn set_speed(&self, speed: u8) {
        self.state.lock().speed = speed.min(MAX_SPEED);
        self.signal.notify_all();
    }

    pub fn cancel(&self) {
        self.state.lock().cancelled = true;
        self.signal.notify_all();
    }

    /// Clears a previous [`Self::cancel`] so the control can drive another run.
    pub fn reset(&self) {
        self.state.lock().cancelled = false;
        self.signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// Pause between two steps at `speed`; `None` means wait until resumed.
    pub fn delay(speed: u8) -> Option<Duration> {
        match speed {
            0 => None,
            speed => {
                let millis = 500u64.saturating_sub(speed.min(MAX_SPEED) as u64 * 5).max(1);
                Some(Duration::from_millis(millis))
            }
        }
    }

    /// Suspension point run after every committed step.
    ///
    /// At speed `0` it blocks until the speed changes or the run is
    /// cancelled. Otherwise it sleeps for [`Self::delay`], returning early
    /// only on cancellation.
    pub fn suspend(&self) {
        let mut state = self.state.lock();
        if state.cancelled {
            return;
        }
        match Self::delay(state.speed) {
            None => {
                self.signal
                    .wait_while(&mut state, |state| state.speed == 0 && !state.cancelled);
            }
            Some(delay) => {
                self.signal
                    .wait_while_for(&mut state, |state| !state.cancelled, delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread, time::Instant};

    #[test]
    fn delay_is_linear_in_speed() {
        assert_eq!(Control::delay(0), None);
        assert_eq!(Control::delay(1), Some(Duration::from_millis(495)));
        assert_eq!(Control::delay(50), Some(Duration::from_millis(250)));
        assert_eq!(Control::delay(99), Some(Duration::from_millis(5)));
        assert_eq!(Control::delay(100), Some(Duration::from_millis(1)));
        assert_eq!(Control::delay(250), Some(Duration::from_millis(1)));
    }

    #[test]
    fn speed_is_clamped() {
        let control = Control::new(180);
        assert_eq!(control.speed(), MAX_SPEED);
        control.set_speed(0);
        assert_eq!(control.speed(), 0);
    }

    #[test]
    fn paused_run_resumes_on_speed_change() {
        let control = Arc::new(Control::new(0));
        let remote = control.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.set_speed(100);
        });
        let start = Instant::now();
        control.suspend();
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!control.is_cancelled());
        handle.join().unwrap();
    }

    #[test]
    fn paused_run_resumes_on_cancel() {
        let control = Arc::new(Control::new(0));
        let remote = control.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.cancel();
        });
        control.suspend();
        assert!(control.is_cancelled());
        handle.join().unwrap();
    }

    #[test]
    fn cancel_cuts_a_slow_delay_short() {
        let control = Arc::new(Control::new(1));
        let remote = control.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });
        let start = Instant::now();
        control.suspend();
        assert!(start.elapsed() < Duration::from_millis(450));
        handle.join().unwrap();
    }

    #[test]
    fn reset_clears_a_cancel() {
        let control = Control::new(42);
        control.cancel();
        control.reset();
        assert!(!control.is_cancelled());
        assert_eq!(control.speed(), 42);
    }

    #[test]
    fn cancelled_control_does_not_wait() {
        let control = Control::new(0);
        control.cancel();
        control.suspend();
    }
}
