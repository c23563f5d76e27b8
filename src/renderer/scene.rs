//! Scene builders
//!
//! One function per game turning its state into draw commands. Pong always
//! draws in phosphor green; Snake and Lunar Lander use the host accent.

use glam::Vec2;

use super::{DrawList, TextAlign};
use crate::arcade::ActiveGame;
use crate::consts::{BACKGROUND, CANVAS_HEIGHT, CANVAS_WIDTH, PONG_PHOSPHOR};
use crate::sim::lander::{LANDER_HALF_SIZE, LanderGame, LanderPhase, MAX_FUEL};
use crate::sim::pong::{AI_X, BALL_SIZE, PADDLE_HEIGHT, PADDLE_WIDTH, PLAYER_X, PongGame, PongPhase};
use crate::sim::snake::{CELL_SIZE, GRID_HEIGHT, GRID_WIDTH, SnakeGame, SnakePhase, cell_to_px};

const DANGER: &str = "#ef4444";
const OBSTACLE: &str = "#64748b";
const EXHAUST: &str = "#fbbf24";
const DIM_TEXT: &str = "#6b7280";

const TITLE_SIZE: f32 = 28.0;
const PROMPT_SIZE: f32 = 14.0;
const HUD_SIZE: f32 = 12.0;

/// Per-frame values the scene needs from the shell
#[derive(Debug, Clone, Copy)]
pub struct SceneStyle<'a> {
    pub accent: &'a str,
    pub high_score: u32,
    /// FPS readout, when enabled
    pub fps: Option<f64>,
}

/// Build the full frame for whichever game is mounted
pub fn build_scene(game: &ActiveGame, style: &SceneStyle) -> DrawList {
    let mut list = DrawList::new();
    match game {
        ActiveGame::Pong(pong) => pong_scene(pong, style, &mut list),
        ActiveGame::Snake(snake) => snake_scene(snake, style, &mut list),
        ActiveGame::Lander(lander) => lander_scene(lander, style, &mut list),
    }
    if let Some(fps) = style.fps {
        list.text(
            format!("FPS {:.0}", fps),
            Vec2::new(CANVAS_WIDTH - 8.0, CANVAS_HEIGHT - 8.0),
            HUD_SIZE,
            TextAlign::Right,
            DIM_TEXT,
        );
    }
    list
}

fn center_text(list: &mut DrawList, title: &str, prompt: &str, color: &str) {
    let mid = Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
    list.text(title, mid - Vec2::new(0.0, 14.0), TITLE_SIZE, TextAlign::Center, color);
    list.text(prompt, mid + Vec2::new(0.0, 18.0), PROMPT_SIZE, TextAlign::Center, color);
}

pub fn pong_scene(game: &PongGame, style: &SceneStyle, list: &mut DrawList) {
    let color = PONG_PHOSPHOR;
    list.clear(BACKGROUND);
    list.dashed_line(
        Vec2::new(CANVAS_WIDTH / 2.0, 0.0),
        Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT),
        color,
        &[6.0, 10.0],
    );

    let ball = Vec2::splat(BALL_SIZE);
    for point in &game.trail {
        // Shrinks and fades toward the oldest point
        let size = ball * (0.3 + 0.7 * point.life);
        let pos = point.pos + (ball - size) / 2.0;
        list.fill_rect(pos, size, color, point.life * 0.4);
    }

    let paddle = Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT);
    list.fill_rect(Vec2::new(PLAYER_X, game.player.y), paddle, color, 1.0);
    list.fill_rect(Vec2::new(AI_X, game.ai.y), paddle, color, 1.0);
    list.fill_rect(game.ball.pos, ball, color, 1.0);

    list.text(
        format!("{}   {}", game.score.player, game.score.ai),
        Vec2::new(CANVAS_WIDTH / 2.0, 28.0),
        20.0,
        TextAlign::Center,
        color,
    );
    let hud = if game.preset.awards_points() {
        format!("PTS {}  HI {}", game.points, style.high_score)
    } else {
        format!("HI {}", style.high_score)
    };
    list.text(hud, Vec2::new(8.0, 16.0), HUD_SIZE, TextAlign::Left, color);

    if game.phase == PongPhase::Idle {
        center_text(list, "PONG", "CLICK TO PLAY", color);
    }
}

pub fn snake_scene(game: &SnakeGame, style: &SceneStyle, list: &mut DrawList) {
    let accent = style.accent;
    let cell = Vec2::splat(CELL_SIZE);
    list.clear(BACKGROUND);
    list.stroke_rect(
        Vec2::ZERO,
        Vec2::new(GRID_WIDTH as f32, GRID_HEIGHT as f32) * CELL_SIZE,
        accent,
        1.0,
    );

    for obstacle in game.obstacles() {
        let pos = cell_to_px(obstacle.as_vec2());
        list.fill_rect(pos + 1.0, cell - 2.0, OBSTACLE, 1.0);
    }

    let food = cell_to_px(game.food().as_vec2()) + cell / 2.0;
    list.fill_circle(food, CELL_SIZE * 0.35, accent, 1.0);

    let body = game.snake();
    let len = body.len();
    // Interior segments sit on their cells; head and tail glide
    for segment in body.iter().skip(1).take(len.saturating_sub(2)) {
        let pos = cell_to_px(segment.as_vec2());
        list.fill_rect(pos + 1.0, cell - 2.0, accent, 0.8);
    }
    if len > 1 {
        let tail = cell_to_px(game.interpolated_tail());
        list.fill_rect(tail + 1.0, cell - 2.0, accent, 0.8);
    }
    let head_color = match game.phase() {
        SnakePhase::Dying | SnakePhase::GameOver => DANGER,
        _ => accent,
    };
    let head = cell_to_px(game.interpolated_head());
    list.fill_rect(head, cell, head_color, 1.0);

    list.text(
        format!("SCORE {}  HI {}", game.score(), style.high_score),
        Vec2::new(8.0, 16.0),
        HUD_SIZE,
        TextAlign::Left,
        accent,
    );

    match game.phase() {
        SnakePhase::Idle => center_text(list, "SNAKE", "PRESS SPACE OR ENTER", accent),
        SnakePhase::GameOver => center_text(
            list,
            "GAME OVER",
            &format!("SCORE {}  -  SPACE TO RETRY", game.score()),
            accent,
        ),
        SnakePhase::Playing | SnakePhase::Dying => {}
    }
}

pub fn lander_scene(game: &LanderGame, style: &SceneStyle, list: &mut DrawList) {
    let accent = style.accent;
    list.clear(BACKGROUND);

    let terrain = game.terrain();
    let points = terrain.points().map(|(x, y)| Vec2::new(x, y)).collect();
    list.path(points, accent, 1.5, false);
    let pad = terrain.pad;
    list.line(
        Vec2::new(pad.x, pad.y),
        Vec2::new(pad.x + pad.width, pad.y),
        accent,
        4.0,
    );

    for particle in game.particles() {
        list.fill_circle(particle.pos, 1.5, EXHAUST, particle.life.clamp(0.0, 1.0));
    }

    let lander = game.lander();
    let heading = lander.heading();
    let side = heading.perp() * LANDER_HALF_SIZE * 0.8;
    let nose = lander.pos + heading * LANDER_HALF_SIZE;
    let rear = lander.pos - heading * LANDER_HALF_SIZE;
    let hull_color = match game.phase() {
        LanderPhase::Crashed(_) => DANGER,
        _ => accent,
    };
    list.path(vec![nose, rear + side, rear - side], hull_color, 1.5, true);
    if lander.thrusting {
        let flame = rear - heading * LANDER_HALF_SIZE;
        list.path(vec![rear + side * 0.5, flame, rear - side * 0.5], EXHAUST, 1.0, true);
    }

    list.text(
        format!("SCORE {}  HI {}", game.score(), style.high_score),
        Vec2::new(8.0, 16.0),
        HUD_SIZE,
        TextAlign::Left,
        accent,
    );
    list.text(
        format!("FUEL {:.0}", game.fuel()),
        Vec2::new(CANVAS_WIDTH - 8.0, 16.0),
        HUD_SIZE,
        TextAlign::Right,
        accent,
    );
    let gauge = Vec2::new(80.0, 4.0);
    let gauge_pos = Vec2::new(CANVAS_WIDTH - 8.0 - gauge.x, 22.0);
    list.stroke_rect(gauge_pos, gauge, accent, 1.0);
    let fill = Vec2::new(gauge.x * (game.fuel() / MAX_FUEL), gauge.y);
    list.fill_rect(gauge_pos, fill, accent, 1.0);

    match game.phase() {
        LanderPhase::Idle => center_text(list, "LUNAR LANDER", "PRESS SPACE OR ENTER", accent),
        LanderPhase::WaitingForFirstInput => list.text(
            "ROTATE + THRUST TO BEGIN",
            Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            PROMPT_SIZE,
            TextAlign::Center,
            accent,
        ),
        LanderPhase::Crashed(reason) => {
            center_text(list, reason.message(), "SPACE TO RETRY", DANGER)
        }
        LanderPhase::Landed { bonus } => center_text(
            list,
            &format!("LANDED +{}", bonus),
            "SPACE FOR THE NEXT PAD",
            accent,
        ),
        LanderPhase::Playing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::InputState;
    use crate::renderer::DrawCmd;
    use crate::settings::{KeyLayout, PongPreset};
    use crate::sim::terrain::TERRAIN_POINTS;

    const ACCENT: &str = "#ff00ff";

    fn style() -> SceneStyle<'static> {
        SceneStyle {
            accent: ACCENT,
            high_score: 120,
            fps: None,
        }
    }

    #[test]
    fn test_pong_ignores_accent() {
        let game = ActiveGame::Pong(PongGame::new(PongPreset::Arcade));
        let list = build_scene(&game, &style());
        assert!(list.colors().all(|c| c == PONG_PHOSPHOR || c == BACKGROUND));
        assert!(list.texts().any(|t| t == "CLICK TO PLAY"));
    }

    #[test]
    fn test_pong_trail_fades() {
        let mut pong = PongGame::new(PongPreset::Arcade);
        let mut input = InputState::new(KeyLayout::Qwerty);
        input.attach();
        pong.start(&input);
        for _ in 0..5 {
            pong.tick(&input, 1.0);
        }
        let mut list = DrawList::new();
        pong_scene(&pong, &style(), &mut list);
        let alphas: Vec<f32> = list
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::FillRect { alpha, .. } if *alpha < 1.0 => Some(*alpha),
                _ => None,
            })
            .collect();
        assert_eq!(alphas.len(), 5);
        // Oldest first, so alpha rises toward the ball
        assert!(alphas.windows(2).all(|w| w[0] < w[1]));
        assert!(!list.texts().any(|t| t == "CLICK TO PLAY"));
    }

    #[test]
    fn test_snake_uses_accent_and_prompts() {
        let mut snake = SnakeGame::new(4);
        let list = build_scene(&ActiveGame::Snake(snake.clone()), &style());
        assert!(list.colors().any(|c| c == ACCENT));
        assert!(list.texts().any(|t| t == "PRESS SPACE OR ENTER"));
        assert!(list.texts().any(|t| t == "SCORE 0  HI 120"));

        snake.start();
        let list = build_scene(&ActiveGame::Snake(snake), &style());
        assert!(!list.texts().any(|t| t == "PRESS SPACE OR ENTER"));
    }

    #[test]
    fn test_snake_head_glides() {
        let mut snake = SnakeGame::new(4);
        snake.start();
        snake.advance(150.0);
        snake.advance(75.0);
        let mut list = DrawList::new();
        snake_scene(&snake, &style(), &mut list);
        let head = list
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::FillRect { pos, size, .. } if *size == Vec2::splat(CELL_SIZE) => {
                    Some(*pos)
                }
                _ => None,
            })
            .last();
        assert_eq!(head, Some(Vec2::new(5.5 * CELL_SIZE, 3.0 * CELL_SIZE)));
    }

    #[test]
    fn test_lander_draws_terrain_and_fps() {
        let mut lander = LanderGame::new(2);
        lander.start();
        let style = SceneStyle {
            fps: Some(59.6),
            ..style()
        };
        let list = build_scene(&ActiveGame::Lander(lander), &style);
        let terrain_points = list.iter().find_map(|cmd| match cmd {
            DrawCmd::Path { points, closed: false, .. } => Some(points.len()),
            _ => None,
        });
        assert_eq!(terrain_points, Some(TERRAIN_POINTS));
        assert!(list.texts().any(|t| t == "FUEL 100"));
        assert!(list.texts().any(|t| t == "ROTATE + THRUST TO BEGIN"));
        assert!(list.texts().any(|t| t == "FPS 60"));
    }
}
