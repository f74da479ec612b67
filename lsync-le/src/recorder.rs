//! Lyric sync workflow state machine
//!
//! ```text
//! INTRO ──(enter)──► UNLOCK ──(gate passed)──► SELECT
//! INTRO ──(enter, already unlocked)───────────► SELECT
//! SELECT ──(select song)──► PRELUDE ──(acknowledge)──► RECORDING
//! RECORDING ──(finish)──► DONE
//! RECORDING ──(abandon)──► SELECT   [captures discarded]
//! any ──(reset)──► INTRO
//! ```
//!
//! While RECORDING, each capture event pairs the next lyric line with the
//! engine's current time. The cursor starts *unarmed* (line index -1) and is
//! armed at line 0 by the first pause→play transition, so the user never needs
//! a separate "arm" action.
//!
//! Seeks do not touch the cursor and captured timestamps are not required to
//! increase; a capture after a backward seek is kept as-is.

use crate::export::export;
use crate::playback::{PlaybackEngine, PlaybackError, PlaybackEvent, PlaybackTransition, ReportedPlayback};
use crate::script::LyricScript;
use lsync_common::Song;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Workflow mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncMode {
    /// Landing; no song selected
    Intro,
    /// Passcode challenge in progress
    Unlock,
    /// Song list presented
    Select,
    /// One-time acknowledgment before recording
    Prelude,
    /// Capture loop active
    Recording,
    /// Export produced
    Done,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncMode::Intro => "INTRO",
            SyncMode::Unlock => "UNLOCK",
            SyncMode::Select => "SELECT",
            SyncMode::Prelude => "PRELUDE",
            SyncMode::Recording => "RECORDING",
            SyncMode::Done => "DONE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecorderError {
    #[error("Cannot {action} while in {from}")]
    InvalidTransition { from: SyncMode, action: &'static str },

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// Position in the lyric script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Playback has not started yet
    Unarmed,
    /// Next capture takes this line (== script length at the end)
    Armed(usize),
}

impl Cursor {
    /// Line index with -1 for unarmed
    pub fn line_index(self) -> i64 {
        match self {
            Cursor::Unarmed => -1,
            Cursor::Armed(index) => index as i64,
        }
    }
}

/// One captured (timestamp, line) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    /// Playback position in seconds
    pub timestamp: f64,
    pub text: String,
}

impl Capture {
    pub fn new(timestamp: f64, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }
}

/// What the user should follow next
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurrentLine {
    /// Waiting for playback to start
    NotStarted { first: Option<String> },
    Line { index: usize, text: String },
    EndOfScript,
}

/// Result of a capture event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaptureOutcome {
    Captured { line_index: usize, capture: Capture },
    Ignored { reason: IgnoreReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    Paused,
    NotArmed,
    EndOfScript,
}

/// Frozen result of a finished session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinishedSync {
    pub song_id: String,
    pub song_title: String,
    pub captures: Vec<Capture>,
    pub script_len: usize,
    /// LRC-style block
    pub export: String,
}

impl FinishedSync {
    /// Every script line was captured
    pub fn is_complete(&self) -> bool {
        self.captures.len() == self.script_len
    }
}

/// In-progress session for one song
#[derive(Debug)]
pub struct SyncSession<E> {
    song_id: String,
    song_title: String,
    script: LyricScript,
    cursor: Cursor,
    captures: Vec<Capture>,
    engine: E,
}

impl<E: PlaybackEngine> SyncSession<E> {
    fn new(song: &Song, engine: E) -> Self {
        Self {
            song_id: song.id.clone(),
            song_title: song.title.clone(),
            script: LyricScript::from_lyrics(&song.lyrics),
            cursor: Cursor::Unarmed,
            captures: Vec::new(),
            engine,
        }
    }

    fn current_line(&self) -> CurrentLine {
        match self.cursor {
            Cursor::Unarmed if self.script.is_empty() => CurrentLine::EndOfScript,
            Cursor::Unarmed => CurrentLine::NotStarted {
                first: self.script.line(0).map(str::to_string),
            },
            Cursor::Armed(index) => match self.script.line(index) {
                Some(text) => CurrentLine::Line {
                    index,
                    text: text.to_string(),
                },
                None => CurrentLine::EndOfScript,
            },
        }
    }

    /// Arm line 0 on the first start of playback
    fn playback_started(&mut self) {
        if self.cursor == Cursor::Unarmed {
            self.cursor = Cursor::Armed(0);
            info!(song_id = %self.song_id, "Sync armed at line 0");
        }
    }

    fn capture(&mut self) -> CaptureOutcome {
        if self.engine.is_paused() {
            debug!("Capture ignored: playback paused");
            return CaptureOutcome::Ignored {
                reason: IgnoreReason::Paused,
            };
        }

        let index = match self.cursor {
            Cursor::Unarmed => {
                debug!("Capture ignored: cursor not armed");
                return CaptureOutcome::Ignored {
                    reason: IgnoreReason::NotArmed,
                };
            }
            Cursor::Armed(index) => index,
        };

        let Some(text) = self.script.line(index) else {
            debug!("Capture ignored: end of script");
            return CaptureOutcome::Ignored {
                reason: IgnoreReason::EndOfScript,
            };
        };

        let capture = Capture::new(self.engine.current_time(), text);
        self.captures.push(capture.clone());
        self.cursor = Cursor::Armed(index + 1);

        debug!(line_index = index, timestamp = capture.timestamp, "Captured lyric line");
        CaptureOutcome::Captured {
            line_index: index,
            capture,
        }
    }

    fn finish(self) -> FinishedSync {
        let export = export(&self.captures);
        FinishedSync {
            song_id: self.song_id,
            song_title: self.song_title,
            script_len: self.script.len(),
            captures: self.captures,
            export,
        }
    }
}

enum State<E> {
    Intro,
    Unlock,
    Select,
    Prelude(SyncSession<E>),
    Recording(SyncSession<E>),
    Done(FinishedSync),
}

impl<E> State<E> {
    fn mode(&self) -> SyncMode {
        match self {
            State::Intro => SyncMode::Intro,
            State::Unlock => SyncMode::Unlock,
            State::Select => SyncMode::Select,
            State::Prelude(_) => SyncMode::Prelude,
            State::Recording(_) => SyncMode::Recording,
            State::Done(_) => SyncMode::Done,
        }
    }
}

/// Lyric sync workflow driving a playback engine `E`
pub struct SyncRecorder<E> {
    state: State<E>,
}

impl<E: PlaybackEngine> Default for SyncRecorder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PlaybackEngine> SyncRecorder<E> {
    pub fn new() -> Self {
        Self {
            state: State::Intro,
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.state.mode()
    }

    fn invalid(&self, action: &'static str) -> RecorderError {
        RecorderError::InvalidTransition {
            from: self.mode(),
            action,
        }
    }

    fn transition(&mut self, from: SyncMode, next: State<E>) {
        self.state = next;
        info!(from = %from, to = %self.mode(), "Sync mode transition");
    }

    /// INTRO → SELECT when already unlocked, else INTRO → UNLOCK
    pub fn enter(&mut self, unlocked: bool) -> Result<SyncMode, RecorderError> {
        match self.state {
            State::Intro => {
                let next = if unlocked { State::Select } else { State::Unlock };
                self.transition(SyncMode::Intro, next);
                Ok(self.mode())
            }
            _ => Err(self.invalid("enter")),
        }
    }

    /// UNLOCK → SELECT after the gate accepted the caller
    pub fn gate_passed(&mut self) -> Result<(), RecorderError> {
        match self.state {
            State::Unlock => {
                self.transition(SyncMode::Unlock, State::Select);
                Ok(())
            }
            _ => Err(self.invalid("pass the gate")),
        }
    }

    /// SELECT → PRELUDE; the song's script is fixed from here on
    pub fn select(&mut self, song: &Song, engine: E) -> Result<(), RecorderError> {
        match self.state {
            State::Select => {
                let session = SyncSession::new(song, engine);
                info!(
                    song_id = %song.id,
                    lines = session.script.len(),
                    "Selected song for sync"
                );
                self.transition(SyncMode::Select, State::Prelude(session));
                Ok(())
            }
            _ => Err(self.invalid("select a song")),
        }
    }

    /// PRELUDE → RECORDING
    pub fn acknowledge(&mut self) -> Result<(), RecorderError> {
        match std::mem::replace(&mut self.state, State::Intro) {
            State::Prelude(session) => {
                self.transition(SyncMode::Prelude, State::Recording(session));
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("acknowledge"))
            }
        }
    }

    /// Start playback through the engine
    ///
    /// A failed start leaves mode, cursor and captures untouched.
    pub async fn start_playback(&mut self) -> Result<(), RecorderError> {
        let State::Recording(session) = &mut self.state else {
            return Err(self.invalid("start playback"));
        };
        let was_paused = session.engine.is_paused();
        session.engine.play().await?;
        if was_paused {
            session.playback_started();
        }
        Ok(())
    }

    pub fn pause_playback(&mut self) -> Result<(), RecorderError> {
        let State::Recording(session) = &mut self.state else {
            return Err(self.invalid("pause playback"));
        };
        session.engine.pause();
        Ok(())
    }

    /// Seek; the cursor and earlier captures are not adjusted
    pub fn seek(&mut self, seconds: f64) -> Result<(), RecorderError> {
        let State::Recording(session) = &mut self.state else {
            return Err(self.invalid("seek"));
        };
        session.engine.set_current_time(seconds);
        Ok(())
    }

    /// Capture event
    ///
    /// Ignored (no state change) while paused, before arming, or at the end
    /// of the script.
    pub fn capture(&mut self) -> Result<CaptureOutcome, RecorderError> {
        match &mut self.state {
            State::Recording(session) => Ok(session.capture()),
            _ => Err(self.invalid("capture")),
        }
    }

    /// RECORDING → SELECT, discarding the session
    pub fn abandon(&mut self) -> Result<(), RecorderError> {
        match self.state {
            State::Recording(ref session) => {
                info!(
                    song_id = %session.song_id,
                    discarded = session.captures.len(),
                    "Sync session abandoned"
                );
                self.transition(SyncMode::Recording, State::Select);
                Ok(())
            }
            _ => Err(self.invalid("abandon")),
        }
    }

    /// RECORDING → DONE; partial captures are fine
    pub fn finish(&mut self) -> Result<FinishedSync, RecorderError> {
        let session = match std::mem::replace(&mut self.state, State::Intro) {
            State::Recording(session) => session,
            other => {
                self.state = other;
                return Err(self.invalid("finish"));
            }
        };

        let finished = session.finish();
        info!(
            song_id = %finished.song_id,
            captured = finished.captures.len(),
            script_len = finished.script_len,
            "Sync session finished"
        );
        self.transition(SyncMode::Recording, State::Done(finished.clone()));
        Ok(finished)
    }

    /// Back to INTRO from any mode ("return to catalog")
    pub fn reset(&mut self) {
        let from = self.mode();
        self.transition(from, State::Intro);
    }

    /// Line index, -1 before arming; None outside PRELUDE/RECORDING
    pub fn line_index(&self) -> Option<i64> {
        self.session().map(|s| s.cursor.line_index())
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.session().map(|s| s.cursor)
    }

    pub fn captures(&self) -> &[Capture] {
        match &self.state {
            State::Prelude(session) | State::Recording(session) => &session.captures,
            State::Done(finished) => &finished.captures,
            _ => &[],
        }
    }

    pub fn script(&self) -> Option<&LyricScript> {
        self.session().map(|s| &s.script)
    }

    pub fn song_id(&self) -> Option<&str> {
        match &self.state {
            State::Prelude(session) | State::Recording(session) => Some(&session.song_id),
            State::Done(finished) => Some(&finished.song_id),
            _ => None,
        }
    }

    /// Engine paused state; true when no engine is attached
    pub fn is_paused(&self) -> bool {
        self.session().map(|s| s.engine.is_paused()).unwrap_or(true)
    }

    pub fn current_line(&self) -> Option<CurrentLine> {
        self.session().map(SyncSession::current_line)
    }

    /// Export of the finished session (DONE only)
    pub fn finished(&self) -> Option<&FinishedSync> {
        match &self.state {
            State::Done(finished) => Some(finished),
            _ => None,
        }
    }

    pub fn engine(&self) -> Option<&E> {
        self.session().map(|s| &s.engine)
    }

    fn session(&self) -> Option<&SyncSession<E>> {
        match &self.state {
            State::Prelude(session) | State::Recording(session) => Some(session),
            _ => None,
        }
    }
}

impl SyncRecorder<ReportedPlayback> {
    /// Apply an event reported by the page's audio element
    ///
    /// A reported start arms the cursor exactly like [`start_playback`].
    /// Reported failures are returned and change nothing else.
    ///
    /// [`start_playback`]: SyncRecorder::start_playback
    pub fn on_playback_event(
        &mut self,
        event: &PlaybackEvent,
    ) -> Result<PlaybackTransition, RecorderError> {
        let State::Recording(session) = &mut self.state else {
            return Err(self.invalid("report playback"));
        };
        let transition = session.engine.apply(event)?;
        if transition == PlaybackTransition::Started {
            session.playback_started();
        }
        Ok(transition)
    }
}

/// Songs offered in SELECT
///
/// Non-privileged callers only see sync-enabled songs.
pub fn selectable_songs(songs: Vec<Song>, privileged: bool) -> Vec<Song> {
    if privileged {
        songs
    } else {
        songs.into_iter().filter(|song| song.sync_enabled).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Engine with a hand-driven clock
    #[derive(Debug, Default)]
    struct ManualClock {
        paused: bool,
        time: f64,
        fail_next_play: Option<PlaybackError>,
    }

    impl ManualClock {
        fn paused() -> Self {
            Self {
                paused: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl PlaybackEngine for ManualClock {
        async fn play(&mut self) -> Result<(), PlaybackError> {
            if let Some(err) = self.fail_next_play.take() {
                return Err(err);
            }
            self.paused = false;
            Ok(())
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn current_time(&self) -> f64 {
            self.time
        }

        fn set_current_time(&mut self, seconds: f64) {
            self.time = seconds;
        }
    }

    fn song(lyrics: &str) -> Song {
        Song::new("Test Song", lyrics)
    }

    fn recording(lyrics: &str) -> SyncRecorder<ManualClock> {
        let mut recorder = SyncRecorder::new();
        recorder.enter(true).unwrap();
        recorder.select(&song(lyrics), ManualClock::paused()).unwrap();
        recorder.acknowledge().unwrap();
        recorder
    }

    fn set_time(recorder: &mut SyncRecorder<ManualClock>, seconds: f64) {
        recorder.seek(seconds).unwrap();
    }

    #[test]
    fn test_enter_locked_goes_to_unlock() {
        let mut recorder: SyncRecorder<ManualClock> = SyncRecorder::new();
        assert_eq!(recorder.enter(false).unwrap(), SyncMode::Unlock);
        recorder.gate_passed().unwrap();
        assert_eq!(recorder.mode(), SyncMode::Select);
    }

    #[test]
    fn test_enter_unlocked_skips_gate() {
        let mut recorder: SyncRecorder<ManualClock> = SyncRecorder::new();
        assert_eq!(recorder.enter(true).unwrap(), SyncMode::Select);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut recorder: SyncRecorder<ManualClock> = SyncRecorder::new();
        assert_eq!(
            recorder.acknowledge(),
            Err(RecorderError::InvalidTransition {
                from: SyncMode::Intro,
                action: "acknowledge"
            })
        );
        assert!(recorder.capture().is_err());
        assert!(recorder.finish().is_err());
        assert!(recorder.abandon().is_err());
        assert!(recorder.gate_passed().is_err());
        assert_eq!(recorder.mode(), SyncMode::Intro);
    }

    #[test]
    fn test_prelude_has_unarmed_cursor() {
        let mut recorder = SyncRecorder::new();
        recorder.enter(true).unwrap();
        recorder.select(&song("one\ntwo"), ManualClock::paused()).unwrap();
        assert_eq!(recorder.mode(), SyncMode::Prelude);
        assert_eq!(recorder.line_index(), Some(-1));
        assert!(recorder.capture().is_err());
    }

    #[tokio::test]
    async fn test_first_play_arms_line_zero() {
        let mut recorder = recording("one\ntwo\nthree");
        assert_eq!(recorder.line_index(), Some(-1));

        recorder.start_playback().await.unwrap();
        assert_eq!(recorder.line_index(), Some(0));
        assert!(recorder.captures().is_empty());

        set_time(&mut recorder, 3.5);
        recorder.capture().unwrap();
        assert_eq!(recorder.captures(), &[Capture::new(3.5, "one")]);
    }

    #[tokio::test]
    async fn test_captures_advance_monotonically() {
        let mut recorder = recording("a\nb\nc\nd");
        recorder.start_playback().await.unwrap();

        for (i, t) in [1.0, 2.0, 3.0].into_iter().enumerate() {
            set_time(&mut recorder, t);
            let outcome = recorder.capture().unwrap();
            assert!(matches!(outcome, CaptureOutcome::Captured { line_index, .. } if line_index == i));
        }

        assert_eq!(recorder.line_index(), Some(3));
        let texts: Vec<&str> = recorder.captures().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_capture_while_paused_is_noop() {
        let mut recorder = recording("a\nb");
        recorder.start_playback().await.unwrap();
        recorder.capture().unwrap();
        recorder.pause_playback().unwrap();

        let outcome = recorder.capture().unwrap();
        assert_eq!(
            outcome,
            CaptureOutcome::Ignored {
                reason: IgnoreReason::Paused
            }
        );
        assert_eq!(recorder.line_index(), Some(1));
        assert_eq!(recorder.captures().len(), 1);
    }

    #[tokio::test]
    async fn test_end_of_script_capture_is_noop() {
        let mut recorder = recording("only");
        recorder.start_playback().await.unwrap();
        recorder.capture().unwrap();
        assert_eq!(recorder.current_line(), Some(CurrentLine::EndOfScript));

        for _ in 0..3 {
            let outcome = recorder.capture().unwrap();
            assert_eq!(
                outcome,
                CaptureOutcome::Ignored {
                    reason: IgnoreReason::EndOfScript
                }
            );
        }
        assert_eq!(recorder.line_index(), Some(1));
        assert_eq!(recorder.captures().len(), 1);
    }

    #[tokio::test]
    async fn test_pause_resume_keeps_cursor() {
        let mut recorder = recording("a\nb\nc");
        recorder.start_playback().await.unwrap();
        recorder.capture().unwrap();
        recorder.pause_playback().unwrap();
        recorder.start_playback().await.unwrap();

        assert_eq!(recorder.line_index(), Some(1));
        assert_eq!(recorder.captures().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_play_changes_nothing() {
        let mut recorder = recording("a\nb");
        if let State::Recording(session) = &mut recorder.state {
            session.engine.fail_next_play = Some(PlaybackError::NotAllowed("gesture".into()));
        }

        let err = recorder.start_playback().await.unwrap_err();
        assert_eq!(
            err,
            RecorderError::Playback(PlaybackError::NotAllowed("gesture".into()))
        );
        assert_eq!(recorder.mode(), SyncMode::Recording);
        assert_eq!(recorder.line_index(), Some(-1));
        assert!(recorder.is_paused());

        // retry works
        recorder.start_playback().await.unwrap();
        assert_eq!(recorder.line_index(), Some(0));
    }

    #[tokio::test]
    async fn test_backward_seek_keeps_non_monotonic_timestamps() {
        let mut recorder = recording("a\nb");
        recorder.start_playback().await.unwrap();
        set_time(&mut recorder, 20.0);
        recorder.capture().unwrap();
        set_time(&mut recorder, 5.0);
        recorder.capture().unwrap();

        assert_eq!(
            recorder.captures(),
            &[Capture::new(20.0, "a"), Capture::new(5.0, "b")]
        );
        assert_eq!(recorder.line_index(), Some(2));
    }

    #[tokio::test]
    async fn test_abandon_then_reselect_starts_fresh() {
        let mut recorder = recording("a\nb\nc");
        recorder.start_playback().await.unwrap();
        recorder.capture().unwrap();
        recorder.capture().unwrap();

        recorder.abandon().unwrap();
        assert_eq!(recorder.mode(), SyncMode::Select);
        assert!(recorder.captures().is_empty());
        assert_eq!(recorder.line_index(), None);

        recorder.select(&song("a\nb\nc"), ManualClock::paused()).unwrap();
        assert!(recorder.captures().is_empty());
        assert_eq!(recorder.line_index(), Some(-1));
    }

    #[tokio::test]
    async fn test_partial_finish_exports_captured_lines() {
        let mut recorder = recording("hello\nworld\nagain");
        recorder.start_playback().await.unwrap();
        set_time(&mut recorder, 5.2);
        recorder.capture().unwrap();
        set_time(&mut recorder, 12.75);
        recorder.capture().unwrap();

        let finished = recorder.finish().unwrap();
        assert_eq!(finished.export, "[00:05.20]hello\n[00:12.75]world");
        assert_eq!(finished.script_len, 3);
        assert!(!finished.is_complete());
        assert_eq!(recorder.mode(), SyncMode::Done);
        assert_eq!(recorder.finished(), Some(&finished));
    }

    #[test]
    fn test_empty_script_shows_end_and_finishes_empty() {
        let mut recorder = recording("\n  \n");
        assert_eq!(recorder.current_line(), Some(CurrentLine::EndOfScript));

        let finished = recorder.finish().unwrap();
        assert_eq!(finished.export, "");
        assert!(finished.captures.is_empty());
        assert!(finished.is_complete());
    }

    #[test]
    fn test_script_is_fixed_at_selection() {
        let mut recorder = SyncRecorder::new();
        recorder.enter(true).unwrap();
        let mut chosen = song("one\ntwo");
        recorder.select(&chosen, ManualClock::paused()).unwrap();

        chosen.lyrics = "changed\nentirely\nnow".to_string();
        assert_eq!(recorder.script().map(|s| s.len()), Some(2));
        assert_eq!(
            recorder.current_line(),
            Some(CurrentLine::NotStarted {
                first: Some("one".to_string())
            })
        );
    }

    #[test]
    fn test_reset_from_done_returns_to_intro() {
        let mut recorder = recording("a");
        recorder.finish().unwrap();
        recorder.reset();
        assert_eq!(recorder.mode(), SyncMode::Intro);
        assert!(recorder.finished().is_none());
    }

    #[test]
    fn test_reported_play_arms_cursor() {
        let mut recorder: SyncRecorder<ReportedPlayback> = SyncRecorder::new();
        recorder.enter(true).unwrap();
        let mut chosen = song("a\nb");
        chosen.audio_url = Some("https://cdn.example/a.mp3".to_string());
        let engine = ReportedPlayback::new(chosen.playable_url().map(str::to_string));
        recorder.select(&chosen, engine).unwrap();
        recorder.acknowledge().unwrap();

        let transition = recorder
            .on_playback_event(&PlaybackEvent::Play { position: Some(0.4) })
            .unwrap();
        assert_eq!(transition, PlaybackTransition::Started);
        assert_eq!(recorder.line_index(), Some(0));

        recorder
            .on_playback_event(&PlaybackEvent::TimeUpdate { position: 7.25 })
            .unwrap();
        recorder.capture().unwrap();
        assert_eq!(recorder.captures(), &[Capture::new(7.25, "a")]);
    }

    #[test]
    fn test_reported_error_leaves_state() {
        let mut recorder: SyncRecorder<ReportedPlayback> = SyncRecorder::new();
        recorder.enter(true).unwrap();
        recorder.select(&song("a"), ReportedPlayback::new(None)).unwrap();
        recorder.acknowledge().unwrap();

        let err = recorder
            .on_playback_event(&PlaybackEvent::Play { position: None })
            .unwrap_err();
        assert_eq!(err, RecorderError::Playback(PlaybackError::SourceUnavailable));
        assert_eq!(recorder.mode(), SyncMode::Recording);
        assert_eq!(recorder.line_index(), Some(-1));
    }

    #[test]
    fn test_selectable_songs_filter() {
        let visible = song("a");
        let mut hidden = song("b");
        hidden.sync_enabled = false;

        let for_fans = selectable_songs(vec![visible.clone(), hidden.clone()], false);
        assert_eq!(for_fans, vec![visible.clone()]);

        let for_admin = selectable_songs(vec![visible.clone(), hidden.clone()], true);
        assert_eq!(for_admin.len(), 2);
    }
}
