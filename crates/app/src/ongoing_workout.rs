use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use log::{debug, error, info, warn};
use snaptrack_domain::{
    ExerciseID, FinishedWorkout, Mutation, Summary, WorkoutError, WorkoutSession,
};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::Settings;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Editing context of the workout that is currently performed.
///
/// The controller exclusively owns the session. While the timer is running, a background task
/// advances the session timer once per second. The task is cancelled when the timer is paused,
/// when the workout is finished or abandoned and when the controller is dropped.
pub struct OngoingWorkout {
    session: Arc<Mutex<WorkoutSession>>,
    ticker: Option<Ticker>,
    settings: Settings,
}

impl OngoingWorkout {
    #[must_use]
    pub fn new(session: WorkoutSession, settings: Settings) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            ticker: None,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> WorkoutSession {
        self.session().clone()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        self.session().elapsed_seconds()
    }

    /// Elapsed time formatted as `HH:MM:SS`.
    #[must_use]
    pub fn timer_display(&self) -> String {
        self.session().timer().to_string()
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Starts the timer and the task advancing it. Must be called from within a Tokio runtime.
    ///
    /// A session whose timer is already running only gets its task started.
    pub fn start_timer(&mut self) -> bool {
        if self.ticker.is_some() {
            return false;
        }
        self.session().start_timer();
        if !self.session().timer().is_running() {
            return false;
        }
        match Ticker::spawn(&self.session) {
            Some(ticker) => {
                debug!("workout timer started");
                self.ticker = Some(ticker);
                true
            }
            None => {
                error!("failed to start workout timer: no runtime");
                self.session().pause_timer();
                false
            }
        }
    }

    pub fn pause_timer(&mut self) -> bool {
        self.ticker = None;
        let paused = self.session().pause_timer();
        if paused {
            debug!("workout timer paused");
        }
        paused
    }

    /// Restarts the timer from zero.
    pub fn reset_timer(&mut self) {
        self.ticker = None;
        self.session().reset_timer();
        if !self.session().timer().is_running() {
            return;
        }
        self.ticker = Ticker::spawn(&self.session);
        if self.ticker.is_none() {
            error!("failed to restart workout timer: no runtime");
            self.session().pause_timer();
        } else {
            debug!("workout timer reset");
        }
    }

    pub fn mutate(&self, mutation: Mutation) -> Result<(), WorkoutError> {
        self.session()
            .mutate(mutation)
            .inspect_err(|err| warn!("rejected workout change: {err}"))
    }

    /// Adds an exercise using the preferred weight unit.
    pub fn add_exercise(&self, id: ExerciseID, name: &str) -> Result<(), WorkoutError> {
        let mut session = self.session();
        let mut updated = session.clone();
        updated.mutate(Mutation::AddExercise {
            id,
            name: name.to_string(),
        })?;
        updated.mutate(Mutation::SetWeightUnit {
            exercise_id: id,
            weight_unit: Some(self.settings.weight_unit),
        })?;
        *session = updated;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(FinishedWorkout, Summary), WorkoutError> {
        self.ticker = None;
        let result = self.session().finish();
        match &result {
            Ok((workout, summary)) => info!(
                "finished workout \"{}\" after {} s with {}/{} sets",
                workout.title(),
                workout.duration(),
                summary.completed_sets,
                summary.total_sets
            ),
            Err(err) => warn!("failed to finish workout: {err}"),
        }
        result
    }

    /// Discards the workout without recording it.
    pub fn abandon(self) {
        info!("abandoned workout \"{}\"", self.session().title());
    }

    fn session(&self) -> MutexGuard<'_, WorkoutSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodic task advancing the timer of a session. Aborted on drop.
struct Ticker(JoinHandle<()>);

impl Ticker {
    fn spawn(session: &Arc<Mutex<WorkoutSession>>) -> Option<Self> {
        let handle = Handle::try_current().ok()?;
        Some(Self(handle.spawn(Self::run(Arc::downgrade(session)))))
    }

    async fn run(session: Weak<Mutex<WorkoutSession>>) {
        let mut interval = time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(session) = session.upgrade() else {
                break;
            };
            session
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .tick();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.0.abort();
    }
}
