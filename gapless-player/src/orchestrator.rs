//! The playback loop.
//!
//! Starts the first track, then polls the renderer's position and queues
//! each following track through `SetNextAVTransportURI` shortly before the
//! current one ends, so the renderer moves on without a gap.
//!
//! ```text
//! Starting ──▶ Steady(0) ──▶ Advancing(1) ──▶ Steady(1) ── … ──▶ Steady(last) ──▶ Done
//! ```

use std::time::Duration;
use tracing::{debug, info, warn};

use avtransport::{ApiError, RendererControl};

use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::session::PlaybackSession;

/// Where the loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing sent to the renderer yet
    Starting,
    /// Track `index` is playing and the next one is not queued yet
    Steady { index: usize },
    /// Track `to` was queued; waiting for the renderer to pick it up
    Advancing { to: usize },
    Done,
}

/// Blocking pause between ticks.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Tracks that became current, the first one included
    pub tracks_played: usize,
    /// `SetNextAVTransportURI` requests sent, one per track boundary
    pub next_uri_calls: usize,
    /// Of those, the ones the renderer rejected or never answered
    pub next_uri_failures: usize,
    /// Ticks abandoned because a control call failed
    pub skipped_ticks: usize,
}

/// Thresholds and intervals the loop runs on.
#[derive(Debug, Clone)]
struct Timing {
    advance_interval: Duration,
    lead_seconds: u32,
    end_tolerance_seconds: u32,
    max_consecutive_failures: u32,
    set_play_mode: bool,
}

impl From<&PlayerConfig> for Timing {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            advance_interval: config.advance_interval,
            lead_seconds: config.lead_seconds,
            end_tolerance_seconds: config.end_tolerance_seconds,
            max_consecutive_failures: config.max_consecutive_failures,
            set_play_mode: config.set_play_mode,
        }
    }
}

pub struct Orchestrator<'r, R: RendererControl + ?Sized, S: Sleeper> {
    renderer: &'r R,
    sleeper: S,
    session: PlaybackSession,
    timing: Timing,
    state: PlaybackState,
    next_sleep: Duration,
    consecutive_failures: u32,
    report: PlaybackReport,
}

impl<'r, R: RendererControl + ?Sized, S: Sleeper> Orchestrator<'r, R, S> {
    pub fn new(renderer: &'r R, sleeper: S, session: PlaybackSession, config: &PlayerConfig) -> Self {
        let timing = Timing::from(config);
        Self {
            renderer,
            sleeper,
            next_sleep: session.poll_interval(),
            session,
            timing,
            state: PlaybackState::Starting,
            consecutive_failures: 0,
            report: PlaybackReport::default(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Drive the state machine until the last track is done.
    ///
    /// # Errors
    ///
    /// Failures while starting the first track are returned as they are.
    /// A failed position poll only skips its tick, until
    /// `max_consecutive_failures` in a row turn into `RendererUnresponsive`.
    /// A rejected `SetNextAVTransportURI` is logged and never re-sent.
    pub fn run(mut self) -> Result<PlaybackReport, PlayerError> {
        while self.state != PlaybackState::Done {
            self.step()?;
        }
        info!(
            tracks = self.report.tracks_played,
            next_uri_calls = self.report.next_uri_calls,
            next_uri_failures = self.report.next_uri_failures,
            skipped_ticks = self.report.skipped_ticks,
            "playback finished"
        );
        Ok(self.report)
    }

    /// Perform one transition and return the new state.
    pub fn step(&mut self) -> Result<PlaybackState, PlayerError> {
        let next = self.transition()?;
        self.state = next;
        Ok(next)
    }

    fn transition(&mut self) -> Result<PlaybackState, PlayerError> {
        match self.state {
            PlaybackState::Starting => self.start(),
            PlaybackState::Steady { index } => {
                self.sleeper.sleep(self.next_sleep);
                self.next_sleep = self.session.poll_interval();
                self.evaluate(index)
            }
            PlaybackState::Advancing { to } => {
                self.sleeper.sleep(self.timing.advance_interval);
                self.next_sleep = self.session.poll_interval();
                self.session.advance_to(to);
                self.report.tracks_played += 1;
                let track = self.session.current();
                info!(index = to, title = %track.title, "now playing");
                self.evaluate(to)
            }
            PlaybackState::Done => Ok(PlaybackState::Done),
        }
    }

    fn start(&mut self) -> Result<PlaybackState, PlayerError> {
        if self.timing.set_play_mode {
            if let Err(e) = self.renderer.set_play_mode_normal() {
                warn!(error = %e, "renderer refused SetPlayMode NORMAL; continuing");
            }
        }

        let track = self.session.current();
        self.renderer.set_current_uri(track, self.session.origin())?;
        self.renderer.play()?;

        info!(
            index = 0,
            title = %track.title,
            renderer = self.session.control_endpoint(),
            "now playing"
        );
        self.report.tracks_played = 1;
        Ok(PlaybackState::Steady { index: 0 })
    }

    /// Poll the position and decide what track `index` calls for.
    fn evaluate(&mut self, index: usize) -> Result<PlaybackState, PlayerError> {
        let stay = PlaybackState::Steady { index };

        let elapsed = match self
            .renderer
            .position_info()
            .and_then(|info| info.elapsed_seconds())
        {
            Ok(elapsed) => elapsed,
            Err(e) => {
                self.tick_failed("GetPositionInfo", e)?;
                return Ok(stay);
            }
        };
        self.consecutive_failures = 0;

        let duration = self.session.current().duration_seconds;
        debug!(index, elapsed, duration, "position");

        if self.session.is_last(index) {
            if elapsed >= duration.saturating_sub(self.timing.end_tolerance_seconds) {
                return Ok(PlaybackState::Done);
            }
            return Ok(stay);
        }

        if elapsed < duration.saturating_sub(self.timing.lead_seconds) {
            return Ok(stay);
        }

        let next = index + 1;
        let Some(track) = self.session.track(next) else {
            return Ok(PlaybackState::Done);
        };
        // Sent once per boundary: the renderer either queued it or will
        // stop at the end of the current track.
        self.report.next_uri_calls += 1;
        match self.renderer.set_next_uri(track, self.session.origin()) {
            Ok(()) => debug!(index = next, title = %track.title, "queued next track"),
            Err(e) => {
                self.report.next_uri_failures += 1;
                warn!(
                    index = next,
                    title = %track.title,
                    error = %e,
                    "SetNextAVTransportURI failed; playback may gap"
                );
            }
        }
        Ok(PlaybackState::Advancing { to: next })
    }

    fn tick_failed(&mut self, action: &str, error: ApiError) -> Result<(), PlayerError> {
        self.consecutive_failures += 1;
        self.report.skipped_ticks += 1;
        self.next_sleep = self.session.poll_interval();
        warn!(
            action,
            error = %error,
            consecutive = self.consecutive_failures,
            "control call failed; skipping tick"
        );

        let limit = self.timing.max_consecutive_failures;
        if limit > 0 && self.consecutive_failures >= limit {
            return Err(PlayerError::RendererUnresponsive {
                failures: self.consecutive_failures,
                last_error: error.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avtransport::{format_hms, MediaOrigin, PlayableTrack, PositionInfo, TransportInfo};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::net::{IpAddr, Ipv4Addr};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        SetPlayMode,
        SetCurrent(String),
        SetNext(String),
        Play,
        Position,
    }

    /// Renderer answering position polls from a script.
    #[derive(Default)]
    struct ScriptedRenderer {
        positions: RefCell<VecDeque<Result<u32, ApiError>>>,
        set_next_failures: RefCell<usize>,
        calls: RefCell<Vec<Call>>,
    }

    impl ScriptedRenderer {
        fn with_positions(positions: Vec<Result<u32, ApiError>>) -> Self {
            Self {
                positions: RefCell::new(positions.into()),
                ..Self::default()
            }
        }

        fn next_uri_calls(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|c| match c {
                    Call::SetNext(id) => Some(id.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl RendererControl for ScriptedRenderer {
        fn set_current_uri(&self, track: &PlayableTrack, _: &MediaOrigin) -> avtransport::Result<()> {
            self.calls.borrow_mut().push(Call::SetCurrent(track.id.clone()));
            Ok(())
        }

        fn set_next_uri(&self, track: &PlayableTrack, _: &MediaOrigin) -> avtransport::Result<()> {
            self.calls.borrow_mut().push(Call::SetNext(track.id.clone()));
            let mut failures = self.set_next_failures.borrow_mut();
            if *failures > 0 {
                *failures -= 1;
                return Err(ApiError::SoapFault(701));
            }
            Ok(())
        }

        fn set_play_mode_normal(&self) -> avtransport::Result<()> {
            self.calls.borrow_mut().push(Call::SetPlayMode);
            Ok(())
        }

        fn play(&self) -> avtransport::Result<()> {
            self.calls.borrow_mut().push(Call::Play);
            Ok(())
        }

        fn pause(&self) -> avtransport::Result<()> {
            Ok(())
        }

        fn stop(&self) -> avtransport::Result<()> {
            Ok(())
        }

        fn seek(&self, _: u32) -> avtransport::Result<()> {
            Ok(())
        }

        fn position_info(&self) -> avtransport::Result<PositionInfo> {
            self.calls.borrow_mut().push(Call::Position);
            let next = self
                .positions
                .borrow_mut()
                .pop_front()
                .expect("position script exhausted");
            next.map(|elapsed| PositionInfo {
                track: 1,
                track_duration: String::new(),
                track_uri: String::new(),
                rel_time: format_hms(elapsed),
                abs_time: format_hms(elapsed),
            })
        }

        fn transport_info(&self) -> avtransport::Result<TransportInfo> {
            Ok(TransportInfo {
                current_transport_state: "PLAYING".to_string(),
                current_transport_status: "OK".to_string(),
                current_speed: "1".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        slept: RefCell<Vec<u64>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration.as_secs());
        }
    }

    fn album(durations: &[u32]) -> PlaybackSession {
        album_polled_every(durations, Duration::from_secs(1))
    }

    fn album_polled_every(durations: &[u32], poll_interval: Duration) -> PlaybackSession {
        let tracks = durations
            .iter()
            .enumerate()
            .map(|(i, &duration)| PlayableTrack {
                id: format!("t{}", i),
                index_in_album: i as u32 + 1,
                title: format!("Track {}", i + 1),
                artist: "Artist".to_string(),
                album_title: "Album".to_string(),
                album_id: "55".to_string(),
                cover_url: "http://img.example.com/55.jpg".to_string(),
                duration_seconds: duration,
                stream_url: format!("http://cdn.example.com/{}.flac", i),
            })
            .collect();
        PlaybackSession::new(
            tracks,
            "http://10.0.0.9:1400/ctl",
            MediaOrigin::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), 8000),
            poll_interval,
        )
        .unwrap()
    }

    fn ok(positions: &[u32]) -> Vec<Result<u32, ApiError>> {
        positions.iter().map(|&p| Ok(p)).collect()
    }

    #[test]
    fn test_three_track_album() {
        let renderer = ScriptedRenderer::with_positions(ok(&[10, 177, 178, 2, 197, 199, 1, 148, 149]));
        let sleeper = RecordingSleeper::default();

        let report = Orchestrator::new(&renderer, &sleeper, album(&[180, 200, 150]), &PlayerConfig::default())
            .run()
            .unwrap();

        assert_eq!(report.tracks_played, 3);
        assert_eq!(report.next_uri_calls, 2);
        assert_eq!(report.skipped_ticks, 0);
        assert_eq!(renderer.next_uri_calls(), vec!["t1", "t2"]);
        assert_eq!(*sleeper.slept.borrow(), vec![1, 1, 1, 3, 1, 1, 3, 1, 1]);

        let calls = renderer.calls.borrow();
        assert_eq!(calls[0], Call::SetCurrent("t0".to_string()));
        assert_eq!(calls[1], Call::Play);
        // Track 1 is queued right after the poll that reported 178.
        assert_eq!(calls[5], Call::SetNext("t1".to_string()));
    }

    #[test]
    fn test_poll_interval_comes_from_session() {
        let renderer = ScriptedRenderer::with_positions(vec![
            Ok(10),
            Err(ApiError::Timeout("t".to_string())),
            Ok(118),
            Ok(59),
        ]);
        let sleeper = RecordingSleeper::default();

        Orchestrator::new(
            &renderer,
            &sleeper,
            album_polled_every(&[120, 60], Duration::from_secs(5)),
            &PlayerConfig::default(),
        )
        .run()
        .unwrap();

        assert_eq!(*sleeper.slept.borrow(), vec![5, 5, 5, 3]);
    }

    #[test]
    fn test_single_track_never_queues() {
        let renderer = ScriptedRenderer::with_positions(ok(&[0, 58, 59]));
        let report = Orchestrator::new(&renderer, RecordingSleeper::default(), album(&[60]), &PlayerConfig::default())
            .run()
            .unwrap();

        assert_eq!(report.tracks_played, 1);
        assert_eq!(report.next_uri_calls, 0);
        assert!(renderer.next_uri_calls().is_empty());
    }

    #[test]
    fn test_failed_poll_skips_tick_and_resumes() {
        let renderer = ScriptedRenderer::with_positions(vec![
            Ok(100),
            Err(ApiError::Transport { status: 500, body: "busy".to_string() }),
            Err(ApiError::MalformedResponse("missing AbsTime".to_string())),
            Ok(118),
            Ok(1),
            Ok(59),
        ]);
        let sleeper = RecordingSleeper::default();

        let report = Orchestrator::new(&renderer, &sleeper, album(&[120, 60]), &PlayerConfig::default())
            .run()
            .unwrap();

        assert_eq!(report.skipped_ticks, 2);
        assert_eq!(report.next_uri_calls, 1);
        assert_eq!(*sleeper.slept.borrow(), vec![1, 1, 1, 1, 3, 1]);
    }

    #[test]
    fn test_failed_set_next_is_not_resent() {
        let renderer = ScriptedRenderer::with_positions(ok(&[118, 1, 59]));
        *renderer.set_next_failures.borrow_mut() = 1;
        let sleeper = RecordingSleeper::default();

        let report = Orchestrator::new(&renderer, &sleeper, album(&[120, 60]), &PlayerConfig::default())
            .run()
            .unwrap();

        assert_eq!(renderer.next_uri_calls(), vec!["t1"]);
        assert_eq!(report.next_uri_calls, 1);
        assert_eq!(report.next_uri_failures, 1);
        assert_eq!(report.skipped_ticks, 0);
        assert_eq!(report.tracks_played, 2);
        assert_eq!(*sleeper.slept.borrow(), vec![1, 3, 1]);
    }

    #[test]
    fn test_renderer_rejecting_every_set_next_still_finishes() {
        let renderer = ScriptedRenderer::with_positions(ok(&[58, 0, 58, 0, 59]));
        *renderer.set_next_failures.borrow_mut() = usize::MAX;
        let config = PlayerConfig::default().with_max_consecutive_failures(2);

        let mut orchestrator = Orchestrator::new(&renderer, RecordingSleeper::default(), album(&[60, 60, 60]), &config);
        let mut steps = 0;
        while orchestrator.state() != PlaybackState::Done {
            orchestrator.step().unwrap();
            steps += 1;
            assert!(steps < 20, "stuck in {:?}", orchestrator.state());
        }

        assert_eq!(renderer.next_uri_calls(), vec!["t1", "t2"]);
        assert_eq!(orchestrator.session().cursor(), 2);
    }

    #[test]
    fn test_consecutive_failures_abort() {
        let failures = (0..3)
            .map(|_| Err(ApiError::NetworkError("connection refused".to_string())))
            .collect();
        let renderer = ScriptedRenderer::with_positions(failures);
        let config = PlayerConfig::default().with_max_consecutive_failures(3);

        let err = Orchestrator::new(&renderer, RecordingSleeper::default(), album(&[120, 60]), &config)
            .run()
            .unwrap_err();

        match err {
            PlayerError::RendererUnresponsive { failures, last_error } => {
                assert_eq!(failures, 3);
                assert!(last_error.contains("connection refused"));
            }
            other => panic!("Expected RendererUnresponsive, got {:?}", other),
        }
    }

    #[test]
    fn test_success_resets_failure_count() {
        let renderer = ScriptedRenderer::with_positions(vec![
            Err(ApiError::Timeout("t".to_string())),
            Ok(5),
            Err(ApiError::Timeout("t".to_string())),
            Ok(59),
        ]);
        let config = PlayerConfig::default().with_max_consecutive_failures(2);

        let report = Orchestrator::new(&renderer, RecordingSleeper::default(), album(&[60]), &config)
            .run()
            .unwrap();
        assert_eq!(report.skipped_ticks, 2);
    }

    #[test]
    fn test_short_tracks_trigger_at_zero() {
        let renderer = ScriptedRenderer::with_positions(ok(&[0, 0]));
        let report = Orchestrator::new(&renderer, RecordingSleeper::default(), album(&[1, 1]), &PlayerConfig::default())
            .run()
            .unwrap();

        assert_eq!(report.next_uri_calls, 1);
        assert_eq!(report.tracks_played, 2);
    }

    #[test]
    fn test_play_mode_is_opt_in() {
        let renderer = ScriptedRenderer::with_positions(ok(&[59]));
        let config = PlayerConfig::default().with_set_play_mode(true);
        Orchestrator::new(&renderer, RecordingSleeper::default(), album(&[60]), &config)
            .run()
            .unwrap();
        assert_eq!(renderer.calls.borrow()[0], Call::SetPlayMode);

        let renderer = ScriptedRenderer::with_positions(ok(&[59]));
        Orchestrator::new(&renderer, RecordingSleeper::default(), album(&[60]), &PlayerConfig::default())
            .run()
            .unwrap();
        assert!(!renderer.calls.borrow().contains(&Call::SetPlayMode));
    }

    #[test]
    fn test_step_by_step_states() {
        let renderer = ScriptedRenderer::with_positions(ok(&[178, 1]));
        let mut orchestrator =
            Orchestrator::new(&renderer, RecordingSleeper::default(), album(&[180, 200]), &PlayerConfig::default());

        assert_eq!(orchestrator.state(), PlaybackState::Starting);
        assert_eq!(orchestrator.step().unwrap(), PlaybackState::Steady { index: 0 });
        assert_eq!(orchestrator.step().unwrap(), PlaybackState::Advancing { to: 1 });
        assert_eq!(orchestrator.step().unwrap(), PlaybackState::Steady { index: 1 });
        assert_eq!(orchestrator.session().cursor(), 1);
    }
}
