//! Snake engine
//!
//! Grid logic advances on a fixed 150 ms tick while rendering runs every
//! animation frame. The previous body is kept so the head and tail can be
//! drawn part way between cells.

use std::collections::{HashSet, VecDeque};

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::platform::input::{Direction, DirectionQueue, KeyAction};

pub const CELL_SIZE: f32 = 20.0;
pub const GRID_WIDTH: i32 = 40;
pub const GRID_HEIGHT: i32 = 15;
pub const TICK_INTERVAL_MS: f64 = 150.0;
pub const FOOD_POINTS: u32 = 10;
/// One obstacle appears per this many foods eaten
pub const FOODS_PER_OBSTACLE: u32 = 5;

pub const START_SNAKE: [IVec2; 3] = [IVec2::new(5, 3), IVec2::new(4, 3), IVec2::new(3, 3)];
pub const START_DIRECTION: Direction = Direction::Right;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakePhase {
    /// Title screen
    Idle,
    Playing,
    /// Fatal tick is still animating in
    Dying,
    GameOver,
}

impl SnakePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Dying => "dying",
            Self::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Wall,
    Obstacle,
    SelfBite,
}

/// What a single grid tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Ate,
    Died(DeathCause),
    /// No free cell left for food
    BoardFull,
}

pub fn in_bounds(cell: IVec2) -> bool {
    cell.x >= 0 && cell.x < GRID_WIDTH && cell.y >= 0 && cell.y < GRID_HEIGHT
}

/// Pixel position of a cell's top-left corner
pub fn cell_to_px(cell: Vec2) -> Vec2 {
    cell * CELL_SIZE
}

#[derive(Debug, Clone)]
pub struct SnakeGame {
    phase: SnakePhase,
    /// Head first
    snake: VecDeque<IVec2>,
    /// Body before the most recent tick
    prev_snake: VecDeque<IVec2>,
    direction: Direction,
    queue: DirectionQueue,
    food: IVec2,
    obstacles: Vec<IVec2>,
    score: u32,
    foods_eaten: u32,
    since_tick_ms: f64,
    death: Option<DeathCause>,
    rng: Pcg32,
}

impl SnakeGame {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            phase: SnakePhase::Idle,
            snake: VecDeque::new(),
            prev_snake: VecDeque::new(),
            direction: START_DIRECTION,
            queue: DirectionQueue::new(),
            food: IVec2::ZERO,
            obstacles: Vec::new(),
            score: 0,
            foods_eaten: 0,
            since_tick_ms: 0.0,
            death: None,
            rng: Pcg32::seed_from_u64(seed),
        };
        game.init_game();
        game
    }

    /// Reset the board. Obstacles and score are cleared.
    pub fn init_game(&mut self) {
        self.snake = START_SNAKE.iter().copied().collect();
        self.prev_snake = self.snake.clone();
        self.direction = START_DIRECTION;
        self.queue.clear();
        self.obstacles.clear();
        self.score = 0;
        self.foods_eaten = 0;
        self.since_tick_ms = 0.0;
        self.death = None;
        // The start board always has free cells
        self.food = self.random_free_cell().unwrap_or(IVec2::ZERO);
    }

    /// Begin a fresh game from the title or game-over screen
    pub fn start(&mut self) -> bool {
        match self.phase {
            SnakePhase::Idle | SnakePhase::GameOver => {
                self.init_game();
                self.phase = SnakePhase::Playing;
                log::info!("Snake started");
                true
            }
            _ => false,
        }
    }

    /// Back to the title screen
    pub fn stop(&mut self) {
        self.phase = SnakePhase::Idle;
        self.queue.clear();
    }

    /// Route a freshly pressed key. Returns true if it did anything.
    pub fn key_pressed(&mut self, action: KeyAction) -> bool {
        match action {
            KeyAction::Move(direction) => self.queue_direction(direction),
            KeyAction::Space | KeyAction::Confirm => self.start(),
            KeyAction::Close => false,
        }
    }

    /// Buffer a turn for an upcoming tick
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        self.phase == SnakePhase::Playing && self.queue.push(direction, self.direction)
    }

    /// Feed one frame's elapsed time. Returns the outcome if a grid tick ran.
    pub fn advance(&mut self, delta_ms: f64) -> Option<StepOutcome> {
        match self.phase {
            SnakePhase::Playing => {
                self.since_tick_ms += delta_ms;
                if self.since_tick_ms >= TICK_INTERVAL_MS {
                    self.since_tick_ms = 0.0;
                    Some(self.step())
                } else {
                    None
                }
            }
            SnakePhase::Dying => {
                self.since_tick_ms += delta_ms;
                if self.progress() >= 1.0 {
                    self.phase = SnakePhase::GameOver;
                    log::info!("Snake game over, score {}", self.score);
                }
                None
            }
            SnakePhase::Idle | SnakePhase::GameOver => None,
        }
    }

    /// One grid tick
    pub fn step(&mut self) -> StepOutcome {
        self.prev_snake = self.snake.clone();
        if let Some(turn) = self.queue.pop() {
            self.direction = turn;
        }

        let head = self.snake[0] + self.direction.delta();
        let tail = self.snake.len() - 1;
        let cause = if !in_bounds(head) {
            Some(DeathCause::Wall)
        } else if self.obstacles.contains(&head) {
            Some(DeathCause::Obstacle)
        } else if self.snake.iter().take(tail).any(|&cell| cell == head) {
            Some(DeathCause::SelfBite)
        } else {
            None
        };

        self.snake.push_front(head);

        if let Some(cause) = cause {
            self.snake.pop_back();
            self.phase = SnakePhase::Dying;
            self.death = Some(cause);
            self.queue.clear();
            log::debug!("Snake died: {:?}", cause);
            return StepOutcome::Died(cause);
        }

        if head != self.food {
            self.snake.pop_back();
            return StepOutcome::Moved;
        }

        self.score += FOOD_POINTS;
        self.foods_eaten += 1;

        match self.random_free_cell() {
            Some(cell) => self.food = cell,
            None => {
                self.phase = SnakePhase::GameOver;
                log::info!("Snake filled the board, score {}", self.score);
                return StepOutcome::BoardFull;
            }
        }

        if self.foods_eaten % FOODS_PER_OBSTACLE == 0 {
            // A full board just means no obstacle this time
            if let Some(cell) = self.random_free_cell() {
                self.obstacles.push(cell);
            }
        }
        StepOutcome::Ate
    }

    /// Uniformly pick a cell not covered by the snake, food or obstacles
    fn random_free_cell(&mut self) -> Option<IVec2> {
        let occupied: HashSet<IVec2> = self
            .snake
            .iter()
            .chain(self.obstacles.iter())
            .copied()
            .chain(std::iter::once(self.food))
            .collect();
        let free: Vec<IVec2> = (0..GRID_HEIGHT)
            .flat_map(|y| (0..GRID_WIDTH).map(move |x| IVec2::new(x, y)))
            .filter(|cell| !occupied.contains(cell))
            .collect();
        if free.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..free.len());
        Some(free[index])
    }

    /// Fraction of the current tick interval that has elapsed, in [0, 1]
    pub fn progress(&self) -> f32 {
        match self.phase {
            SnakePhase::Playing | SnakePhase::Dying => {
                (self.since_tick_ms / TICK_INTERVAL_MS).min(1.0) as f32
            }
            SnakePhase::Idle | SnakePhase::GameOver => 1.0,
        }
    }

    /// Head position in cell units, between the previous and current head
    pub fn interpolated_head(&self) -> Vec2 {
        interpolate(self.prev_snake.front(), self.snake.front(), self.progress())
    }

    /// Tail position in cell units, between the previous and current tail
    pub fn interpolated_tail(&self) -> Vec2 {
        interpolate(self.prev_snake.back(), self.snake.back(), self.progress())
    }

    pub fn phase(&self) -> SnakePhase {
        self.phase
    }

    /// Whether the game wants keyboard focus
    pub fn is_active(&self) -> bool {
        matches!(self.phase, SnakePhase::Playing | SnakePhase::Dying)
    }

    pub fn snake(&self) -> &VecDeque<IVec2> {
        &self.snake
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> IVec2 {
        self.food
    }

    pub fn obstacles(&self) -> &[IVec2] {
        &self.obstacles
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn death(&self) -> Option<DeathCause> {
        self.death
    }

    #[cfg(test)]
    pub(crate) fn place_food(&mut self, cell: IVec2) {
        self.food = cell;
    }
}

fn interpolate(from: Option<&IVec2>, to: Option<&IVec2>, t: f32) -> Vec2 {
    match (from, to) {
        (Some(a), Some(b)) => a.as_vec2().lerp(b.as_vec2(), t),
        (None, Some(b)) => b.as_vec2(),
        _ => Vec2::ZERO,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    /// Queue a turn toward the food
    fn steer(game: &mut SnakeGame) {
        let head = game.snake()[0];
        let food = game.food();
        let want = if food.x > head.x {
            Direction::Right
        } else if food.x < head.x {
            Direction::Left
        } else if food.y > head.y {
            Direction::Down
        } else {
            Direction::Up
        };
        game.queue_direction(want);
    }

    proptest! {
        #[test]
        fn prop_board_invariants_hold_while_playing(
            seed in any::<u64>(),
            moves in prop::collection::vec(prop::option::of(direction()), 1..400)
        ) {
            let mut game = SnakeGame::new(seed);
            game.start();
            let mut eaten = 0u32;

            for m in moves {
                match m {
                    Some(d) => { game.queue_direction(d); }
                    None => steer(&mut game),
                }
                let before = game.snake().len();
                let outcome = game.step();
                if game.phase() != SnakePhase::Playing {
                    break;
                }

                let cells: HashSet<IVec2> = game.snake().iter().copied().collect();
                prop_assert_eq!(cells.len(), game.snake().len());
                prop_assert!(game.snake().iter().all(|&c| in_bounds(c)));
                prop_assert!(!cells.contains(&game.food()));
                for obstacle in game.obstacles() {
                    prop_assert!(!cells.contains(obstacle));
                    prop_assert_ne!(*obstacle, game.food());
                }

                if outcome == StepOutcome::Ate {
                    eaten += 1;
                    prop_assert_eq!(game.snake().len(), before + 1);
                } else {
                    prop_assert_eq!(game.snake().len(), before);
                }
                prop_assert_eq!(game.obstacles().len() as u32, eaten / FOODS_PER_OBSTACLE);
                prop_assert_eq!(game.score(), eaten * FOOD_POINTS);
            }
        }
    }
}
