//! Session controller
//!
//! Owns one play session: the animator, score/lives, the timer queue, sound
//! pool and stats store. Input handlers (`hit_object`, `misclick`) and the
//! per-frame `frame` call all run on the same timeline; the host drains the
//! resulting [`GameEvent`]s to update its presentation.
//!
//! Response timer rule: at most one is pending, armed on every spawn and
//! cancelled on every hit or miss, so a stale timer can't cost a life.
//! Throttled position updates do not re-arm it.
//!
//! Taps only count while the object is drawn: during a celebration, the fail
//! effect or the respawn gap both `hit_object` and `misclick` do nothing.

use chrono::Utc;
use glam::Vec2;

use crate::audio::{AudioBackend, SoundKind, SoundPool};
use crate::highscores::{GameStats, StatsStore};
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{FrameClock, ObjectAnimator, PositionSink, Scheduler, SessionState, TimerId};
use crate::Rect;

/// Things the presentation layer reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Object (re)spawned; place it immediately
    ObjectSpawned { position: Vec2, variant: u8 },
    /// Throttled position update
    PositionObserved(Vec2),
    ScoreChanged(u32),
    LivesChanged(u8),
    /// Hit celebration started at this position
    CelebrationStarted(Vec2),
    CelebrationEnded,
    /// Fail effect shown at this position
    FailShown(Vec2),
    FailHidden,
    GameOver { score: u32, new_record: bool },
    /// Text for the screen reader live region
    Announce(String),
}

/// Delayed actions on the session timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    ResponseTimeout,
    CelebrationDone,
    Respawn,
    HideFail,
}

pub struct GameController<B: AudioBackend, S: KeyValueStore + Clone> {
    settings: Settings,
    session: SessionState,
    animator: ObjectAnimator,
    scheduler: Scheduler<TimerEvent>,
    clock: FrameClock,
    sounds: SoundPool<B, S>,
    stats: StatsStore<S>,
    container: Vec2,
    response_timer: Option<TimerId>,
    fail_timer: Option<TimerId>,
    celebrating: bool,
    fail_visible: bool,
    spawning: bool,
    /// Scheduler time when the session started
    started_at: Option<f64>,
    events: Vec<GameEvent>,
}

impl<B: AudioBackend, S: KeyValueStore + Clone> GameController<B, S> {
    pub fn new(settings: Settings, seed: u64, audio: B, store: S) -> Self {
        let settings = settings.sanitized();
        Self {
            session: SessionState::new(settings.initial_lives),
            animator: ObjectAnimator::new(seed, &settings),
            scheduler: Scheduler::new(),
            clock: FrameClock::new(),
            sounds: SoundPool::new(audio, store.clone(), &settings),
            stats: StatsStore::new(store),
            container: Vec2::ZERO,
            response_timer: None,
            fail_timer: None,
            celebrating: false,
            fail_visible: false,
            spawning: false,
            started_at: None,
            events: Vec::new(),
            settings,
        }
    }

    /// Play-area size in pixels
    pub fn set_container(&mut self, size: Vec2) {
        self.container = size;
    }

    pub fn container(&self) -> Vec2 {
        self.container
    }

    /// Start a fresh session
    pub fn start(&mut self) {
        self.session.start();
        self.scheduler.clear();
        self.clock.reset();
        self.response_timer = None;
        self.fail_timer = None;
        self.celebrating = false;
        self.fail_visible = false;
        self.spawning = false;
        self.started_at = Some(self.scheduler.now());

        let position = self.animator.start(self.container);
        self.push_spawned(position);
        self.arm_response_timer();

        self.events.push(GameEvent::ScoreChanged(self.session.score));
        self.events.push(GameEvent::LivesChanged(self.session.lives));
        log::info!("Session started ({} lives)", self.session.lives);
    }

    /// Play again after game over
    pub fn replay(&mut self) {
        self.start();
    }

    /// Leave the session without recording it
    pub fn quit(&mut self) {
        self.session.quit();
        self.animator.stop();
        self.cancel_response_timer();
        self.sounds.stop_all();
        log::info!("Session quit at score {}", self.session.score);
    }

    /// Advance one display frame. Timers fire first, then the object moves.
    pub fn frame<K: PositionSink + ?Sized>(
        &mut self,
        now_ms: f64,
        container: Vec2,
        sink: &mut K,
    ) -> Vec<GameEvent> {
        self.container = container;
        let elapsed = self.clock.elapsed(now_ms);

        for event in self.scheduler.advance(elapsed) {
            self.on_timer(event);
        }

        if self.session.is_playing {
            let observed = self
                .animator
                .tick(elapsed as f32, self.container, sink)
                .and_then(|outcome| outcome.observed);
            if let Some(position) = observed {
                self.events.push(GameEvent::PositionObserved(position));
            }
        }

        self.take_events()
    }

    /// Player tapped the object (or pressed Enter/Space)
    pub fn hit_object(&mut self) {
        if !self.object_visible() {
            return;
        }

        self.cancel_response_timer();
        self.sounds.play(SoundKind::Success);
        self.session.on_success();

        self.celebrating = true;
        let at = self.animator.observed_position();
        self.scheduler
            .after_delay(self.settings.celebration_ms as f64, TimerEvent::CelebrationDone);

        let score = self.session.score;
        self.events.push(GameEvent::CelebrationStarted(at));
        self.events.push(GameEvent::ScoreChanged(score));
        self.events
            .push(GameEvent::Announce(format!("Score increased to {}", score)));
        log::debug!("Hit! Score {}", score);
    }

    /// Player tapped the play area but not the object
    pub fn misclick(&mut self, at: Vec2) {
        if !self.session.is_playing
            || self.celebrating
            || self.fail_visible
            || self.session.is_game_over
            || self.spawning
        {
            return;
        }

        self.cancel_response_timer();
        self.sounds.play(SoundKind::Miss);
        log::debug!("Misclick at ({:.0}, {:.0})", at.x, at.y);
        self.lose_life(at);
    }

    /// Route a tap in container space to a hit or a misclick
    pub fn tap(&mut self, at: Vec2) {
        if crate::is_successful_interaction(&self.object_rect(), at.x, at.y) {
            self.hit_object();
        } else {
            self.misclick(at);
        }
    }

    fn on_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::ResponseTimeout => {
                self.response_timer = None;
                if !self.session.is_playing || self.celebrating || self.session.is_game_over {
                    return;
                }
                self.sounds.play(SoundKind::Miss);
                log::debug!("Object timed out");
                let at = self.animator.observed_position();
                self.lose_life(at);
            }
            TimerEvent::CelebrationDone => {
                self.celebrating = false;
                self.spawning = true;
                self.events.push(GameEvent::CelebrationEnded);
                self.scheduler
                    .after_delay(self.settings.respawn_delay_ms as f64, TimerEvent::Respawn);
            }
            TimerEvent::Respawn => {
                if self.session.is_playing && !self.session.is_game_over {
                    self.respawn();
                }
                self.spawning = false;
            }
            TimerEvent::HideFail => {
                self.fail_timer = None;
                self.fail_visible = false;
                self.events.push(GameEvent::FailHidden);
            }
        }
    }

    /// Shared tail of timeouts and misclicks
    fn lose_life(&mut self, fail_at: Vec2) {
        let ended = self.session.on_miss();
        let lives = self.session.lives;
        self.events.push(GameEvent::LivesChanged(lives));
        self.events
            .push(GameEvent::Announce(format!("{} lives remaining", lives)));
        self.show_fail(fail_at);

        if ended {
            self.end_session();
        } else {
            self.respawn();
        }
    }

    fn show_fail(&mut self, at: Vec2) {
        if let Some(id) = self.fail_timer.take() {
            self.scheduler.cancel(id);
        }
        self.fail_visible = true;
        self.fail_timer = Some(
            self.scheduler
                .after_delay(self.settings.fail_effect_ms as f64, TimerEvent::HideFail),
        );
        self.events.push(GameEvent::FailShown(at));
    }

    fn respawn(&mut self) {
        let position = self.animator.reset_object(self.container);
        self.push_spawned(position);
        self.arm_response_timer();
    }

    fn push_spawned(&mut self, position: Vec2) {
        self.events.push(GameEvent::ObjectSpawned {
            position,
            variant: self.animator.variant(),
        });
    }

    fn arm_response_timer(&mut self) {
        self.cancel_response_timer();
        self.response_timer = Some(self.scheduler.after_delay(
            self.settings.response_timeout_ms as f64,
            TimerEvent::ResponseTimeout,
        ));
    }

    fn cancel_response_timer(&mut self) {
        if let Some(id) = self.response_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    /// Game over: stop moving, record the session
    fn end_session(&mut self) {
        self.animator.stop();
        self.cancel_response_timer();

        let score = self.session.score;
        let playtime_secs = self
            .started_at
            .take()
            .map(|start| ((self.scheduler.now() - start) / 1000.0).floor() as u64)
            .unwrap_or(0);

        let now = Utc::now();
        let new_record = self.stats.update_high_score(score as u64, now);
        self.stats.record_session(score as u64, playtime_secs, now);

        log::info!(
            "Game over: score {} in {}s{}",
            score,
            playtime_secs,
            if new_record { " (new record)" } else { "" }
        );
        self.events.push(GameEvent::GameOver { score, new_record });
        self.events.push(GameEvent::Announce(format!(
            "Game over. Final score: {}. Press Play Again to restart.",
            score
        )));
    }

    /// Events produced since the last drain
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Object hit area in container space
    pub fn object_rect(&self) -> Rect {
        Rect::centered(self.animator.position(), self.animator.object_size())
    }

    /// Whether the object should be drawn
    pub fn object_visible(&self) -> bool {
        self.session.is_playing
            && !self.celebrating
            && !self.fail_visible
            && !self.session.is_game_over
            && !self.spawning
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.sounds.toggle_mute()
    }

    pub fn is_muted(&self) -> bool {
        self.sounds.is_muted()
    }

    /// Call from the first user gesture so audio may start
    pub fn unlock_audio(&mut self) -> bool {
        self.sounds.unlock()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn animator(&self) -> &ObjectAnimator {
        &self.animator
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> GameStats {
        self.stats.load()
    }

    pub fn sounds(&self) -> &SoundPool<B, S> {
        &self.sounds
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn is_fail_visible(&self) -> bool {
        self.fail_visible
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    /// A response timer is currently counting down
    pub fn response_timer_pending(&self) -> bool {
        self.response_timer
            .is_some_and(|id| self.scheduler.is_pending(id))
    }
}
