//! Discrete agent actions and facing directions.

use std::convert::TryFrom;

use crate::error::ActionError;

/// Facing direction of an agent.
///
/// Row indices grow "up": the rendered frame is rotated 180° relative to
/// the storage layout, so [`Up`](Orientation::Up) steps to `row + 1`.
/// Turning left advances the index by one, turning right decrements it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Orientation {
    /// Unit step `(+1, 0)`.
    Up = 0,
    /// Unit step `(0, +1)`.
    Right = 1,
    /// Unit step `(-1, 0)`.
    Down = 2,
    /// Unit step `(0, -1)`.
    Left = 3,
}

impl Orientation {
    /// All orientations in index order.
    pub const ALL: [Orientation; 4] = [
        Orientation::Up,
        Orientation::Right,
        Orientation::Down,
        Orientation::Left,
    ];

    /// Orientation for an index, reduced modulo 4.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    /// The orientation index in `0..4`.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// `(row, col)` unit step in the facing direction.
    pub fn step(self) -> (i32, i32) {
        match self {
            Orientation::Up => (1, 0),
            Orientation::Right => (0, 1),
            Orientation::Down => (-1, 0),
            Orientation::Left => (0, -1),
        }
    }

    /// Orientation after a left turn (`index + 1`).
    #[inline]
    pub fn turned_left(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Orientation after a right turn (`index - 1`).
    #[inline]
    pub fn turned_right(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// This orientation relative to `viewer`: `(self - viewer) mod 4`.
    #[inline]
    pub fn relative_to(self, viewer: Orientation) -> u8 {
        (self.index() + 4 - viewer.index()) % 4
    }
}

/// One discrete action per agent per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    /// Rotate counter-clockwise in place.
    TurnLeft = 0,
    /// Rotate clockwise in place.
    TurnRight = 1,
    /// Shift column by `+1`, regardless of facing.
    MoveLeft = 2,
    /// Shift column by `-1`, regardless of facing.
    MoveRight = 3,
    /// Shift row by `+1`, regardless of facing.
    MoveUp = 4,
    /// Shift row by `-1`, regardless of facing.
    MoveDown = 5,
    /// Do nothing.
    Stay = 6,
    /// Fire the zap beam ahead.
    ZapForward = 7,
}

impl Action {
    /// Number of actions in the action space.
    pub const COUNT: usize = 8;

    /// All actions in code order.
    pub const ALL: [Action; Action::COUNT] = [
        Action::TurnLeft,
        Action::TurnRight,
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::Stay,
        Action::ZapForward,
    ];

    /// The raw action code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Translation applied by this action, independent of facing.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Action::MoveLeft => (0, 1),
            Action::MoveRight => (0, -1),
            Action::MoveUp => (1, 0),
            Action::MoveDown => (-1, 0),
            _ => (0, 0),
        }
    }

    /// Facing after applying this action to `current`.
    pub fn rotate(self, current: Orientation) -> Orientation {
        match self {
            Action::TurnLeft => current.turned_left(),
            Action::TurnRight => current.turned_right(),
            _ => current,
        }
    }

    /// Whether this action fires a zap beam.
    #[inline]
    pub fn is_zap(self) -> bool {
        self == Action::ZapForward
    }
}

impl TryFrom<u8> for Action {
    type Error = ActionError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(ActionError::UnknownAction { code })
    }
}
