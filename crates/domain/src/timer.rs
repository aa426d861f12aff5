use std::fmt;

/// Elapsed-seconds counter of a workout.
///
/// The timer does not measure time itself. Whoever owns the running session calls [`tick`]
/// once per second, and the counter only advances while the timer is running.
///
/// [`tick`]: SessionTimer::tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimer {
    state: TimerState,
    elapsed_seconds: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl SessionTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_elapsed(elapsed_seconds: u32) -> Self {
        Self {
            state: TimerState::Stopped,
            elapsed_seconds,
        }
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    /// Returns `true` if the timer was not running before.
    pub fn start(&mut self) -> bool {
        let started = !self.is_running();
        self.state = TimerState::Running;
        started
    }

    /// Returns `true` if the timer was running before.
    pub fn pause(&mut self) -> bool {
        if self.is_running() {
            self.state = TimerState::Paused;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_seconds = 0;
        self.state = TimerState::Running;
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    pub fn tick(&mut self) {
        if self.is_running() {
            self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        }
    }
}

/// Renders as `HH:MM:SS`.
impl fmt::Display for SessionTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.elapsed_seconds;
        write!(
            f,
            "{:02}:{:02}:{:02}",
            seconds / 3600,
            seconds % 3600 / 60,
            seconds % 60
        )
    }
}

/// Renders a duration as `1h 2m 3s`, omitting the hours if there are none.
#[must_use]
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = seconds / 60 % 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else {
        format!("{minutes}m {secs}s")
    }
}
