//! Arcade shell
//!
//! Mounts one game at a time, owns the frame clock and input state, and
//! forwards the host's accent, quality flag and key layout. The host learns
//! about focus changes through the active-change callback.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::highscores::HighScores;
use crate::platform::{FrameClock, FrameTime, InputState, KeyAction, KeyValueStore};
use crate::renderer::DrawList;
use crate::renderer::scene::{SceneStyle, build_scene};
use crate::settings::{KeyLayout, PongPreset, Settings};
use crate::sim::{LanderGame, PongGame, SnakeGame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Pong,
    Snake,
    Lander,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::Pong, GameKind::Snake, GameKind::Lander];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Pong => "pong",
            GameKind::Snake => "snake",
            GameKind::Lander => "lander",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pong" => Some(GameKind::Pong),
            "snake" => Some(GameKind::Snake),
            "lander" | "lunar" | "lunar_lander" => Some(GameKind::Lander),
            _ => None,
        }
    }

    /// LocalStorage key holding the best score
    pub fn storage_key(&self) -> &'static str {
        match self {
            GameKind::Pong => "phosphor_pong_highscore",
            GameKind::Snake => "phosphor_snake_highscore",
            GameKind::Lander => "phosphor_lander_highscore",
        }
    }
}

/// The mounted game
#[derive(Debug, Clone)]
pub enum ActiveGame {
    Pong(PongGame),
    Snake(SnakeGame),
    Lander(LanderGame),
}

impl ActiveGame {
    fn create(kind: GameKind, preset: PongPreset, seed: u64) -> Self {
        match kind {
            GameKind::Pong => ActiveGame::Pong(PongGame::new(preset)),
            GameKind::Snake => ActiveGame::Snake(SnakeGame::new(seed)),
            GameKind::Lander => ActiveGame::Lander(LanderGame::new(seed)),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            ActiveGame::Pong(_) => GameKind::Pong,
            ActiveGame::Snake(_) => GameKind::Snake,
            ActiveGame::Lander(_) => GameKind::Lander,
        }
    }

    /// Whether the game currently wants keyboard focus
    pub fn is_active(&self) -> bool {
        match self {
            ActiveGame::Pong(game) => game.is_playing(),
            ActiveGame::Snake(game) => game.is_active(),
            ActiveGame::Lander(game) => game.is_active(),
        }
    }

    pub fn phase_str(&self) -> &'static str {
        match self {
            ActiveGame::Pong(game) if game.is_playing() => "playing",
            ActiveGame::Pong(_) => "idle",
            ActiveGame::Snake(game) => game.phase().as_str(),
            ActiveGame::Lander(game) => game.phase().as_str(),
        }
    }

    /// Running score as it counts toward the high score
    pub fn score(&self) -> u32 {
        match self {
            ActiveGame::Pong(game) => game.high_score_value(),
            ActiveGame::Snake(game) => game.score(),
            ActiveGame::Lander(game) => game.score(),
        }
    }

    fn set_low_quality(&mut self, low_quality: bool) {
        match self {
            ActiveGame::Pong(game) => game.set_low_quality(low_quality),
            ActiveGame::Lander(game) => game.set_low_quality(low_quality),
            // Snake has no ephemeral effects
            ActiveGame::Snake(_) => {}
        }
    }

    fn stop(&mut self) {
        match self {
            ActiveGame::Pong(game) => {
                game.stop();
            }
            ActiveGame::Snake(game) => game.stop(),
            ActiveGame::Lander(game) => game.stop(),
        }
    }
}

/// Display snapshot for the host UI. Never read back by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub game: GameKind,
    pub phase: &'static str,
    pub score: u32,
    pub high_score: u32,
    /// Lunar Lander only
    pub fuel: Option<f32>,
    pub fps: f64,
    pub playing: bool,
}

/// What the host should do with a key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Suppress the browser default (scrolling)
    pub consumed: bool,
    /// The game was closed; stop the loop
    pub closed: bool,
    /// Ask the browser for pointer lock on the canvas
    pub request_pointer_lock: bool,
}

pub struct Arcade {
    game: Option<ActiveGame>,
    input: InputState,
    clock: FrameClock,
    settings: Settings,
    low_quality: bool,
    high_scores: HighScores,
    store: Box<dyn KeyValueStore>,
    on_active_change: Option<Box<dyn FnMut(bool)>>,
    last_active: bool,
    suspended: bool,
    seed: u64,
    fps: f64,
}

impl Arcade {
    pub fn new(settings: Settings, store: Box<dyn KeyValueStore>, seed: u64) -> Self {
        let high_scores = HighScores::load_from(store.as_ref());
        Self {
            game: None,
            input: InputState::new(settings.key_layout),
            clock: FrameClock::new(),
            settings,
            low_quality: false,
            high_scores,
            store,
            on_active_change: None,
            last_active: false,
            suspended: false,
            seed,
            fps: 0.0,
        }
    }

    /// Called with the new value whenever the mounted game gains or loses
    /// keyboard focus
    pub fn set_active_callback(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_active_change = Some(Box::new(callback));
    }

    /// Mount `kind`, replacing whatever was mounted
    pub fn mount(&mut self, kind: GameKind) {
        if self.game.is_some() {
            self.unmount();
        }
        self.input.attach();
        self.clock.reset();
        self.suspended = false;
        self.seed = self.seed.wrapping_add(1);

        let mut game = ActiveGame::create(kind, self.settings.pong_preset, self.seed);
        game.set_low_quality(self.low_quality);
        let best = self.high_scores.reload(self.store.as_ref(), kind);
        log::info!("Mounted {} (high score {})", kind.as_str(), best);
        self.game = Some(game);
    }

    /// Stop the game and release input. The frame loop must not run again
    /// until the next `mount`.
    pub fn unmount(&mut self) {
        let Some(mut game) = self.game.take() else {
            return;
        };
        self.record_score(&game);
        game.stop();
        self.input.detach();
        self.clock.reset();
        log::info!("Unmounted {}", game.kind().as_str());
        self.notify_active();
    }

    pub fn is_mounted(&self) -> bool {
        self.game.is_some()
    }

    pub fn kind(&self) -> Option<GameKind> {
        self.game.as_ref().map(ActiveGame::kind)
    }

    pub fn game(&self) -> Option<&ActiveGame> {
        self.game.as_ref()
    }

    /// Whether the loop should keep running
    pub fn wants_frames(&self) -> bool {
        self.game.is_some() && !self.suspended
    }

    /// Advance the mounted game to `now_ms`. Returns `None` when nothing is
    /// mounted or the arcade is suspended.
    pub fn frame(&mut self, now_ms: f64) -> Option<FrameTime> {
        if self.suspended {
            return None;
        }
        let game = self.game.as_mut()?;
        let time = self.clock.tick(now_ms);
        self.fps = time.fps;

        match game {
            ActiveGame::Pong(pong) => {
                pong.tick(&self.input, time.time_scale);
            }
            ActiveGame::Snake(snake) => {
                snake.advance(time.delta_ms);
            }
            ActiveGame::Lander(lander) => {
                lander.tick(&self.input, time.time_scale);
            }
        }

        self.after_update();
        Some(time)
    }

    pub fn key_down(&mut self, key: &str) -> KeyOutcome {
        if self.game.is_none() {
            return KeyOutcome::default();
        }
        let fresh = self.input.key_down(key);
        let action = self.input.action(key);
        let mut outcome = KeyOutcome {
            consumed: self.input.captures(key),
            ..Default::default()
        };

        if action == Some(KeyAction::Close) {
            self.unmount();
            outcome.consumed = true;
            outcome.closed = true;
            return outcome;
        }

        if let (true, Some(action), Some(game)) = (fresh, action, self.game.as_mut()) {
            match game {
                ActiveGame::Pong(pong) => {
                    if matches!(action, KeyAction::Space | KeyAction::Confirm)
                        && pong.start(&self.input)
                    {
                        outcome.request_pointer_lock = true;
                    }
                }
                ActiveGame::Snake(snake) => {
                    snake.key_pressed(action);
                }
                ActiveGame::Lander(lander) => {
                    lander.key_pressed(action);
                }
            }
        }

        self.after_update();
        outcome
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    /// `position` in logical canvas space, `movement` as reported raw
    pub fn pointer_moved(&mut self, position: Vec2, movement: Vec2) {
        self.input.pointer_moved(position, movement);
    }

    /// A click on the canvas. Returns true when pointer lock should be
    /// requested.
    pub fn click(&mut self) -> bool {
        let started = match self.game.as_mut() {
            Some(ActiveGame::Pong(pong)) => pong.start(&self.input),
            _ => false,
        };
        self.after_update();
        started
    }

    /// Losing pointer lock pauses Pong; the game stays mounted
    pub fn pointer_lock_changed(&mut self, locked: bool) {
        self.input.set_pointer_locked(locked);
        if locked {
            log::info!("Pointer lock acquired");
            return;
        }
        if let Some(ActiveGame::Pong(pong)) = self.game.as_mut() {
            if pong.stop() {
                log::info!("Pointer lock released, Pong paused");
            }
        }
        self.after_update();
    }

    /// Window lost focus: nothing stays held
    pub fn blur(&mut self) {
        self.input.release();
    }

    /// Tab hidden: freeze until `resume`
    pub fn suspend(&mut self) {
        if !self.suspended {
            self.suspended = true;
            self.clock.reset();
            self.input.release();
            log::info!("Arcade suspended");
        }
    }

    /// Tab visible again. The next frame counts as one reference frame.
    pub fn resume(&mut self) {
        if self.suspended {
            self.suspended = false;
            self.clock.reset();
            log::info!("Arcade resumed");
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn set_accent(&mut self, accent: &str) {
        self.settings.accent = accent.to_string();
    }

    pub fn accent(&self) -> &str {
        &self.settings.accent
    }

    pub fn set_low_quality(&mut self, low_quality: bool) {
        if self.low_quality == low_quality {
            return;
        }
        self.low_quality = low_quality;
        if let Some(game) = self.game.as_mut() {
            game.set_low_quality(low_quality);
        }
    }

    pub fn low_quality(&self) -> bool {
        self.low_quality
    }

    pub fn set_layout(&mut self, layout: KeyLayout) {
        self.settings.key_layout = layout;
        self.input.set_layout(layout);
        log::info!("Key layout: {}", layout.as_str());
    }

    pub fn layout(&self) -> KeyLayout {
        self.input.layout()
    }

    /// Takes effect on the next Pong mount, or now if Pong is idle
    pub fn set_pong_preset(&mut self, preset: PongPreset) {
        self.settings.pong_preset = preset;
        if let Some(ActiveGame::Pong(pong)) = self.game.as_mut() {
            if !pong.is_playing() {
                pong.preset = preset;
                pong.reset();
            }
        }
    }

    pub fn set_show_fps(&mut self, show: bool) {
        self.settings.show_fps = show;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn hud(&self) -> Option<Hud> {
        let game = self.game.as_ref()?;
        let kind = game.kind();
        Some(Hud {
            game: kind,
            phase: game.phase_str(),
            score: game.score(),
            high_score: self.high_scores.get(kind),
            fuel: match game {
                ActiveGame::Lander(lander) => Some(lander.fuel()),
                _ => None,
            },
            fps: self.fps,
            playing: game.is_active(),
        })
    }

    /// Draw the mounted game. Rendering runs every frame whether or not the
    /// simulation advanced.
    pub fn render(&self) -> Option<DrawList> {
        let game = self.game.as_ref()?;
        let style = SceneStyle {
            accent: &self.settings.accent,
            high_score: self.high_scores.get(game.kind()),
            fps: self.settings.show_fps.then_some(self.fps),
        };
        Some(build_scene(game, &style))
    }

    fn after_update(&mut self) {
        if let Some(game) = self.game.take() {
            self.record_score(&game);
            self.game = Some(game);
        }
        self.notify_active();
    }

    fn record_score(&mut self, game: &ActiveGame) {
        let kind = game.kind();
        let score = game.score();
        if self.high_scores.submit(kind, score, self.store.as_mut()) {
            log::debug!("New {} high score: {}", kind.as_str(), score);
        }
    }

    fn notify_active(&mut self) {
        let active = self.game.as_ref().is_some_and(ActiveGame::is_active);
        if active == self.last_active {
            return;
        }
        self.last_active = active;
        log::debug!("Game active: {}", active);
        if let Some(callback) = self.on_active_change.as_mut() {
            callback(active);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::IVec2;

    use crate::consts::{PONG_PHOSPHOR, REFERENCE_FRAME_MS};
    use crate::platform::MemoryStore;
    use crate::sim::{LanderPhase, SnakePhase};

    fn arcade() -> Arcade {
        Arcade::new(Settings::default(), Box::new(MemoryStore::new()), 9)
    }

    fn with_callback(arcade: &mut Arcade) -> Rc<RefCell<Vec<bool>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        arcade.set_active_callback(move |active| sink.borrow_mut().push(active));
        log
    }

    /// Run frames at 60 Hz for `ms` milliseconds starting at `now`
    fn run(arcade: &mut Arcade, now: &mut f64, ms: f64) {
        let end = *now + ms;
        while *now < end {
            *now += REFERENCE_FRAME_MS;
            arcade.frame(*now);
        }
    }

    #[test]
    fn test_game_kind_keys() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(GameKind::Pong.storage_key(), "phosphor_pong_highscore");
        assert_eq!(GameKind::Lander.storage_key(), "phosphor_lander_highscore");
    }

    #[test]
    fn test_nothing_mounted() {
        let mut arcade = arcade();
        assert_eq!(arcade.frame(16.0), None);
        assert_eq!(arcade.key_down("ArrowUp"), KeyOutcome::default());
        assert!(arcade.hud().is_none());
        assert!(arcade.render().is_none());
    }

    #[test]
    fn test_snake_start_and_escape() {
        let mut arcade = arcade();
        let calls = with_callback(&mut arcade);
        arcade.mount(GameKind::Snake);
        assert!(calls.borrow().is_empty());

        let outcome = arcade.key_down(" ");
        assert!(outcome.consumed);
        assert_eq!(*calls.borrow(), vec![true]);
        assert_eq!(arcade.hud().map(|h| h.phase), Some("playing"));

        let outcome = arcade.key_down("Escape");
        assert!(outcome.closed);
        assert!(!arcade.is_mounted());
        assert!(!arcade.wants_frames());
        assert_eq!(*calls.borrow(), vec![true, false]);
        assert_eq!(arcade.frame(1000.0), None);
    }

    #[test]
    fn test_snake_ticks_on_interval_and_records_high_score() {
        let mut arcade = arcade();
        arcade.mount(GameKind::Snake);
        arcade.key_down("Enter");
        if let Some(ActiveGame::Snake(snake)) = arcade.game.as_mut() {
            snake.place_food(IVec2::new(6, 3));
        }

        let mut now = 1000.0;
        arcade.frame(now);
        run(&mut arcade, &mut now, 100.0);
        assert_eq!(arcade.hud().map(|h| h.score), Some(0));
        run(&mut arcade, &mut now, 60.0);

        let hud = arcade.hud().expect("mounted");
        assert_eq!(hud.score, 10);
        assert_eq!(hud.high_score, 10);
        assert_eq!(
            arcade.store().get_item("phosphor_snake_highscore").as_deref(),
            Some("10")
        );
    }

    #[test]
    fn test_high_score_read_at_mount() {
        let mut store = MemoryStore::new();
        store.set_item("phosphor_lander_highscore", "350");
        store.set_item("phosphor_snake_highscore", "garbage");
        let mut arcade = Arcade::new(Settings::default(), Box::new(store), 1);

        arcade.mount(GameKind::Lander);
        assert_eq!(arcade.hud().map(|h| h.high_score), Some(350));
        arcade.mount(GameKind::Snake);
        assert_eq!(arcade.hud().map(|h| h.high_score), Some(0));
    }

    #[test]
    fn test_remount_replaces_game() {
        let mut arcade = arcade();
        let calls = with_callback(&mut arcade);
        arcade.mount(GameKind::Snake);
        arcade.key_down(" ");
        arcade.key_up(" ");
        arcade.mount(GameKind::Lander);
        assert_eq!(arcade.kind(), Some(GameKind::Lander));
        assert_eq!(*calls.borrow(), vec![true, false]);
        // Input was detached and reattached, so keys still register
        arcade.key_down("Enter");
        assert_eq!(arcade.hud().map(|h| h.phase), Some("waiting"));
    }

    #[test]
    fn test_lander_active_while_waiting() {
        let mut arcade = arcade();
        let calls = with_callback(&mut arcade);
        arcade.mount(GameKind::Lander);
        arcade.key_down("Enter");
        assert_eq!(*calls.borrow(), vec![true]);
        let fuel = arcade.hud().and_then(|h| h.fuel);
        assert_eq!(fuel, Some(100.0));

        arcade.key_up("Enter");
        arcade.key_down("ArrowUp");
        let mut now = 0.0;
        run(&mut arcade, &mut now, 200.0);
        let hud = arcade.hud().expect("mounted");
        assert!(hud.playing);
        assert!(hud.fuel.is_some_and(|f| f < 100.0));
        match arcade.game() {
            Some(ActiveGame::Lander(lander)) => {
                assert_eq!(lander.phase(), LanderPhase::Playing)
            }
            _ => panic!("lander not mounted"),
        }
    }

    #[test]
    fn test_pong_click_requests_lock_and_loss_pauses() {
        let mut arcade = arcade();
        let calls = with_callback(&mut arcade);
        arcade.mount(GameKind::Pong);
        assert!(arcade.click());
        assert!(!arcade.click());
        assert_eq!(*calls.borrow(), vec![true]);

        arcade.pointer_lock_changed(true);
        arcade.pointer_lock_changed(false);
        assert!(arcade.is_mounted());
        assert_eq!(arcade.hud().map(|h| h.phase), Some("idle"));
        assert_eq!(*calls.borrow(), vec![true, false]);

        let outcome = arcade.key_down("Enter");
        assert!(outcome.request_pointer_lock);
    }

    #[test]
    fn test_pong_paddle_stays_relative_after_blur() {
        fn player_y(arcade: &Arcade) -> Option<f32> {
            match arcade.game() {
                Some(ActiveGame::Pong(pong)) => Some(pong.player.y),
                _ => None,
            }
        }

        let mut arcade = arcade();
        arcade.mount(GameKind::Pong);
        assert!(arcade.click());
        arcade.pointer_lock_changed(true);
        let mut now = 0.0;

        // First sample after the start is swallowed
        arcade.pointer_moved(Vec2::ZERO, Vec2::new(0.0, 20.0));
        run(&mut arcade, &mut now, REFERENCE_FRAME_MS);
        let start = player_y(&arcade).unwrap_or_default();

        arcade.pointer_moved(Vec2::ZERO, Vec2::new(0.0, 20.0));
        run(&mut arcade, &mut now, REFERENCE_FRAME_MS);
        assert_eq!(player_y(&arcade), Some(start + 20.0));

        // Lock survives the blur, so a move reporting client y = 0 is
        // still read as a relative delta
        arcade.blur();
        arcade.pointer_moved(Vec2::ZERO, Vec2::new(0.0, 20.0));
        run(&mut arcade, &mut now, REFERENCE_FRAME_MS);
        assert_eq!(player_y(&arcade), Some(start + 40.0));
        assert_eq!(arcade.hud().map(|h| h.phase), Some("playing"));
    }

    #[test]
    fn test_pong_renders_phosphor_regardless_of_accent() {
        let mut arcade = arcade();
        arcade.set_accent("#ff0000");
        arcade.mount(GameKind::Pong);
        let list = arcade.render().expect("mounted");
        assert!(list.colors().any(|c| c == PONG_PHOSPHOR));
        assert!(!list.colors().any(|c| c == "#ff0000"));

        arcade.mount(GameKind::Snake);
        let list = arcade.render().expect("mounted");
        assert!(list.colors().any(|c| c == "#ff0000"));
    }

    #[test]
    fn test_low_quality_reaches_mounted_game() {
        let mut arcade = arcade();
        arcade.mount(GameKind::Pong);
        arcade.click();
        let mut now = 0.0;
        run(&mut arcade, &mut now, 100.0);
        let trail = |arcade: &Arcade| match arcade.game() {
            Some(ActiveGame::Pong(pong)) => pong.trail.len(),
            _ => usize::MAX,
        };
        assert!(trail(&arcade) > 0);
        arcade.set_low_quality(true);
        assert_eq!(trail(&arcade), 0);
        run(&mut arcade, &mut now, 100.0);
        assert_eq!(trail(&arcade), 0);

        // Survives a remount
        arcade.mount(GameKind::Pong);
        arcade.click();
        run(&mut arcade, &mut now, 100.0);
        assert_eq!(trail(&arcade), 0);
    }

    #[test]
    fn test_suspend_freezes_and_resume_has_no_jump() {
        let mut arcade = arcade();
        arcade.mount(GameKind::Snake);
        arcade.key_down(" ");
        arcade.frame(0.0);
        arcade.suspend();
        assert!(!arcade.wants_frames());
        assert_eq!(arcade.frame(5000.0), None);
        arcade.resume();
        let time = arcade.frame(60_000.0).expect("running");
        assert!((time.delta_ms - REFERENCE_FRAME_MS).abs() < 1e-9);
        match arcade.game() {
            Some(ActiveGame::Snake(snake)) => assert_eq!(snake.phase(), SnakePhase::Playing),
            _ => panic!("snake not mounted"),
        }
    }

    #[test]
    fn test_layout_switch_applies_to_running_game() {
        let mut arcade = arcade();
        arcade.mount(GameKind::Snake);
        arcade.key_down(" ");
        arcade.set_layout(KeyLayout::Azerty);
        assert_eq!(arcade.settings().key_layout, KeyLayout::Azerty);
        // "z" is up on Azerty and captured
        assert!(arcade.key_down("z").consumed);
        assert!(!arcade.key_down("w").consumed);
    }

    #[test]
    fn test_hud_serializes() {
        let mut arcade = arcade();
        arcade.mount(GameKind::Lander);
        let json = serde_json::to_string(&arcade.hud()).expect("serializable");
        assert!(json.contains(r#""game":"lander""#));
        assert!(json.contains(r#""phase":"idle""#));
    }
}
