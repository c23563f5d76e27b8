//! Keyboard and pointer input
//!
//! The input layer is the only writer: DOM listeners call `key_down`,
//! `key_up` and `pointer_moved`, engines only read. Edge-triggered intents
//! (Snake turns) go through `DirectionQueue` instead of the held-key map.

use std::collections::{HashSet, VecDeque};

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::settings::KeyLayout;

/// Cardinal direction for grid movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit vector on the grid (y grows downward)
    pub fn delta(&self) -> IVec2 {
        match self {
            Self::Up => IVec2::new(0, -1),
            Self::Down => IVec2::new(0, 1),
            Self::Left => IVec2::new(-1, 0),
            Self::Right => IVec2::new(1, 0),
        }
    }
}

/// What a key means to the games, after layout resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Move(Direction),
    /// Space: Lander thrust, start/retry everywhere
    Space,
    /// Enter: start/retry
    Confirm,
    /// Escape: leave the game
    Close,
}

/// DOM `key` values are case-sensitive; letters are folded to lowercase so
/// Shift or Caps Lock never break a binding.
pub fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().collect(),
        _ => key.to_string(),
    }
}

/// Map a normalized key to its action under `layout`
pub fn action_for(layout: KeyLayout, key: &str) -> Option<KeyAction> {
    use Direction::*;
    let action = match key {
        "ArrowUp" => KeyAction::Move(Up),
        "ArrowDown" => KeyAction::Move(Down),
        "ArrowLeft" => KeyAction::Move(Left),
        "ArrowRight" => KeyAction::Move(Right),
        " " => KeyAction::Space,
        "Enter" => KeyAction::Confirm,
        "Escape" => KeyAction::Close,
        other => {
            let (up, left) = match layout {
                KeyLayout::Qwerty => ("w", "a"),
                KeyLayout::Azerty => ("z", "q"),
            };
            match other {
                k if k == up => KeyAction::Move(Up),
                k if k == left => KeyAction::Move(Left),
                "s" => KeyAction::Move(Down),
                "d" => KeyAction::Move(Right),
                _ => return None,
            }
        }
    };
    Some(action)
}

/// Last known pointer data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerState {
    /// Pointer lock is active (relative movement only)
    pub locked: bool,
    /// Cursor position in logical canvas coordinates, when unlocked
    pub position: Option<Vec2>,
    /// Sum of all relative movement reported while locked
    pub movement: Vec2,
    /// Number of move events received; lets readers detect fresh samples
    pub samples: u64,
}

/// Held keys plus pointer state, shared by whichever game is mounted
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<String>,
    pointer: PointerState,
    layout: KeyLayout,
    attached: bool,
}

impl InputState {
    pub fn new(layout: KeyLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    /// Start accepting events. Returns false if already attached; the
    /// previous owner must `detach` first so handlers are never doubled.
    pub fn attach(&mut self) -> bool {
        if self.attached {
            log::warn!("Input already attached, ignoring second attach");
            return false;
        }
        self.attached = true;
        true
    }

    /// Stop accepting events and drop everything held
    pub fn detach(&mut self) {
        self.attached = false;
        self.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Forget held keys and pointer samples (unmount)
    pub fn clear(&mut self) {
        self.held.clear();
        self.pointer = PointerState::default();
    }

    /// Release held keys and forget the cursor position (blur, hidden tab).
    /// Pointer lock can outlive a blur, so the lock flag and the movement
    /// totals stay.
    pub fn release(&mut self) {
        self.held.clear();
        self.pointer.position = None;
    }

    pub fn layout(&self) -> KeyLayout {
        self.layout
    }

    /// Swap bindings at runtime. Held keys are dropped so a key that
    /// changes meaning cannot stay stuck.
    pub fn set_layout(&mut self, layout: KeyLayout) {
        if self.layout != layout {
            self.layout = layout;
            self.held.clear();
        }
    }

    /// Record a key press. Returns true on the initial press, false for
    /// auto-repeat or while detached.
    pub fn key_down(&mut self, key: &str) -> bool {
        if !self.attached {
            return false;
        }
        self.held.insert(normalize_key(key))
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&normalize_key(key));
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&normalize_key(key))
    }

    /// Whether any held key resolves to `action` under the current layout
    pub fn action_held(&self, action: KeyAction) -> bool {
        self.held
            .iter()
            .any(|key| action_for(self.layout, key) == Some(action))
    }

    pub fn direction_held(&self, direction: Direction) -> bool {
        self.action_held(KeyAction::Move(direction))
    }

    pub fn action(&self, key: &str) -> Option<KeyAction> {
        action_for(self.layout, &normalize_key(key))
    }

    /// Resolve a key to a grid direction, if it is a movement key
    pub fn resolve_direction(&self, key: &str) -> Option<Direction> {
        match self.action(key) {
            Some(KeyAction::Move(direction)) => Some(direction),
            _ => None,
        }
    }

    /// Keys whose default browser behaviour (scrolling) is suppressed
    /// while a game has focus
    pub fn captures(&self, key: &str) -> bool {
        matches!(
            self.action(key),
            Some(KeyAction::Move(_) | KeyAction::Space)
        )
    }

    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.pointer.locked = locked;
        if locked {
            self.pointer.position = None;
        }
    }

    /// Record a pointer move. `position` is in logical canvas space and is
    /// ignored while locked; `movement` is the raw relative delta.
    pub fn pointer_moved(&mut self, position: Vec2, movement: Vec2) {
        if !self.attached {
            return;
        }
        if self.pointer.locked {
            self.pointer.movement += movement;
        } else {
            self.pointer.position = Some(position);
        }
        self.pointer.samples += 1;
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }
}

/// Maximum pending turns
pub const DIRECTION_QUEUE_CAPACITY: usize = 2;

/// Bounded FIFO of pending turns between grid ticks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionQueue {
    pending: VecDeque<Direction>,
}

impl DirectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a turn. `current` is the direction already being applied; it
    /// stands in for the last queued turn when the queue is empty. Rejects
    /// reversals and repeats of the last queued turn, and anything past
    /// capacity.
    pub fn push(&mut self, direction: Direction, current: Direction) -> bool {
        if self.pending.len() >= DIRECTION_QUEUE_CAPACITY {
            return false;
        }
        let last = self.pending.back().copied().unwrap_or(current);
        if direction == last || direction == last.opposite() {
            return false;
        }
        self.pending.push_back(direction);
        true
    }

    pub fn pop(&mut self) -> Option<Direction> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Direction> {
        self.pending.iter()
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

    proptest! {
        #[test]
        fn prop_queue_never_holds_reversal_chain(
            current in direction(),
            pushes in prop::collection::vec(direction(), 0..20)
        ) {
            let mut queue = DirectionQueue::new();
            for d in pushes {
                queue.push(d, current);
            }
            prop_assert!(queue.len() <= DIRECTION_QUEUE_CAPACITY);

            let mut previous = current;
            for d in queue.iter() {
                prop_assert_ne!(*d, previous);
                prop_assert_ne!(*d, previous.opposite());
                previous = *d;
            }
        }
    }
}
