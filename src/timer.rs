//! The countdown timers of the chip.
//!
//! Both timers count down by one every time the chipset executes a cycle, the pacing of those
//! cycles is entirely up to the caller.

/// Is called by the [`Timer`](Timer) as soon as the countdown is about to run out.
#[cfg_attr(test, mockall::automock)]
pub trait TimerCallback {
    /// Will be called once the timer ticks from `1` to `0`.
    fn handle(&mut self);
}

/// A callback that does nothing, used for the delay timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallback;

impl TimerCallback for NoCallback {
    fn handle(&mut self) {}
}

/// A callback that only reports the buzzer edge to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCallback;

impl TimerCallback for LogCallback {
    fn handle(&mut self) {
        log::warn!("BEEP!");
    }
}

/// Represents a timer inside of the chip
/// infrastruture, it will count down to
/// zero from what ever number given.
#[derive(Debug, Default, Clone)]
pub struct Timer<S: TimerCallback> {
    /// will store the value of the timer
    value: u8,
    /// called when the timer is about to reach zero
    callback: S,
}

impl<S: TimerCallback + Default> Timer<S> {
    /// Will create a new timer with the given value.
    pub fn new(value: u8) -> Self {
        Self::with_callback(value, S::default())
    }
}

impl<S: TimerCallback> Timer<S> {
    /// Will create a new timer with the given value and callback.
    pub fn with_callback(value: u8, callback: S) -> Self {
        Self { value, callback }
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Counts the timer down by one, if it is not already at zero.
    ///
    /// The callback fires on the tick that brings the timer from `1` to `0`.
    pub fn tick(&mut self) {
        if self.value == 0 {
            return;
        }
        if self.value == 1 {
            self.callback.handle();
        }
        self.value -= 1;
        log::trace!("timer at {}", self.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_to_zero() {
        let mut timer: Timer<NoCallback> = Timer::new(3);
        for expected in [2, 1, 0, 0, 0] {
            timer.tick();
            assert_eq!(expected, timer.get_value());
        }
    }

    #[test]
    fn test_timer_set_value() {
        let mut timer: Timer<NoCallback> = Timer::new(0);
        timer.set_value(0x42);
        assert_eq!(0x42, timer.get_value());
        timer.tick();
        assert_eq!(0x41, timer.get_value());
    }

    #[test]
    fn test_callback_fires_on_last_tick() {
        let mut callback = MockTimerCallback::new();
        callback.expect_handle().times(1).return_const(());

        let mut timer = Timer::with_callback(2, callback);
        // 2 -> 1, 1 -> 0 (fires), stays at 0
        for _ in 0..4 {
            timer.tick();
        }
        assert_eq!(0, timer.get_value());
    }

    #[test]
    fn test_callback_not_fired_when_idle() {
        let mut callback = MockTimerCallback::new();
        callback.expect_handle().never();

        let mut timer = Timer::with_callback(0, callback);
        timer.tick();
        timer.tick();
    }
}
