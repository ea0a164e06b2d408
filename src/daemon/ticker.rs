//! The single one-second timer source.

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

use super::timer::SharedSession;

/// Drives [`SessionMachine::tick`](super::SessionMachine::tick) once per period.
///
/// Ticks are taken under the session lock, so they never interleave with a
/// command. A tick delayed behind a long-held lock is followed by the
/// missed ones in a burst, so the countdown loses no seconds. Notifying the
/// restart handle after a start makes the first decrement land one full
/// period later.
pub struct Ticker {
    session: SharedSession,
    restart: Arc<Notify>,
    period: Duration,
}

impl Ticker {
    /// Creates a ticker with a one-second period.
    pub fn new(session: SharedSession) -> Self {
        Self::with_period(session, Duration::from_secs(1))
    }

    /// Creates a ticker with a custom period.
    pub fn with_period(session: SharedSession, period: Duration) -> Self {
        Self {
            session,
            restart: Arc::new(Notify::new()),
            period,
        }
    }

    /// Handle used to realign the tick phase.
    pub fn restart_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.restart)
    }

    /// Runs until the task is cancelled.
    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        // The first tick of an interval completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.session.lock().await.tick();
                }
                () = self.restart.notified() => {
                    debug!("Tick phase realigned");
                    ticker.reset();
                }
            }
        }
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::timer::{Backends, SessionEvent, SessionMachine};
    use crate::mirror::{MockNotificationBackend, MockOverlayBackend};
    use crate::settings::Settings;
    use crate::sound::MockAudioEngine;
    use crate::types::{Mode, RunState};

    fn create_shared(work_minutes: u32, break_minutes: u32) -> SharedSession {
        let settings = Settings {
            work_minutes,
            break_minutes,
            ..Settings::default()
        };
        SessionMachine::new(
            &settings,
            Backends {
                audio: Arc::new(MockAudioEngine::new()),
                notification: Arc::new(MockNotificationBackend::new()),
                overlay: Arc::new(MockOverlayBackend::new()),
            },
        )
        .into_shared()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period_while_running() {
        let session = create_shared(1, 1);
        session.lock().await.start();

        let handle = tokio::spawn(Ticker::new(session.clone()).run());
        tokio::time::sleep(Duration::from_millis(3500)).await;
        handle.abort();

        assert_eq!(session.lock().await.session().remaining_seconds(), 57);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_session_catches_up() {
        let session = create_shared(1, 1);
        session.lock().await.start();

        let handle = tokio::spawn(Ticker::new(session.clone()).run());
        {
            // Hold the session across three tick deadlines.
            let _guard = session.lock().await;
            tokio::time::sleep(Duration::from_millis(3500)).await;
        }
        tokio::time::sleep(Duration::from_millis(1000)).await;
        handle.abort();

        assert_eq!(session.lock().await.session().remaining_seconds(), 56);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_does_not_count() {
        let session = create_shared(1, 1);

        let handle = tokio::spawn(Ticker::new(session.clone()).run());
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.abort();

        let guard = session.lock().await;
        assert_eq!(guard.session().remaining_seconds(), 60);
        assert_eq!(guard.session().run_state(), RunState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_interval_switches_mode() {
        let session = create_shared(1, 1);
        let mut rx = {
            let mut guard = session.lock().await;
            guard.start();
            guard.subscribe()
        };

        let handle = tokio::spawn(Ticker::new(session.clone()).run());
        tokio::time::sleep(Duration::from_millis(60_500)).await;
        handle.abort();

        let mut switched = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::ModeSwitched { mode, .. } = event {
                switched.push(mode);
            }
        }
        assert_eq!(switched, vec![Mode::Break]);
        assert_eq!(session.lock().await.session().remaining_seconds(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_realign_delays_next_tick() {
        let session = create_shared(1, 1);
        let ticker = Ticker::new(session.clone());
        let restart = ticker.restart_handle();
        let handle = tokio::spawn(ticker.run());

        // Let the ticker reach its loop, then start mid-period.
        tokio::time::sleep(Duration::from_millis(600)).await;
        session.lock().await.start();
        restart.notify_one();

        // The unaligned tick at 1.0s must not fire.
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(session.lock().await.session().remaining_seconds(), 60);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(session.lock().await.session().remaining_seconds(), 59);
        handle.abort();
    }
}
