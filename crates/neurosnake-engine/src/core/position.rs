use serde::{Deserialize, Serialize};

/// A cell coordinate on the board.
///
/// `x` grows to the right and `y` grows downwards, so [`Direction::Up`]
/// decreases `y`. Coordinates are signed so that positions one step outside
/// the board can be represented and bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the neighbouring position one step towards `direction`.
    #[must_use]
    pub const fn moved(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// One of the four cardinal headings.
///
/// The discriminants are the direction codes used by the move log and by the
/// network's output layer (`0=up, 1=down, 2=left, 3=right`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Direction {
    #[display("up")]
    Up = 0,
    #[display("down")]
    Down = 1,
    #[display("left")]
    Left = 2,
    #[display("right")]
    Right = 3,
}

/// A move expressed relative to the current heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeAction {
    Straight,
    TurnLeft,
    TurnRight,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid direction code: {code}")]
pub struct InvalidDirectionCode {
    pub code: u8,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Maps an output index of the network to a direction.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Up),
            1 => Some(Self::Down),
            2 => Some(Self::Left),
            3 => Some(Self::Right),
            _ => None,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit step `(dx, dy)` for this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Returns the absolute heading reached by taking `action` from `self`.
    #[must_use]
    pub const fn apply(self, action: RelativeAction) -> Self {
        match (self, action) {
            (heading, RelativeAction::Straight) => heading,
            (Self::Up, RelativeAction::TurnLeft) | (Self::Down, RelativeAction::TurnRight) => {
                Self::Left
            }
            (Self::Up, RelativeAction::TurnRight) | (Self::Down, RelativeAction::TurnLeft) => {
                Self::Right
            }
            (Self::Left, RelativeAction::TurnLeft) | (Self::Right, RelativeAction::TurnRight) => {
                Self::Down
            }
            (Self::Left, RelativeAction::TurnRight) | (Self::Right, RelativeAction::TurnLeft) => {
                Self::Up
            }
        }
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        direction.code()
    }
}

impl TryFrom<u8> for Direction {
    type Error = InvalidDirectionCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_index(usize::from(code)).ok_or(InvalidDirectionCode { code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_ne!(dir, dir.opposite());
            assert_eq!(dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn test_moved_follows_offset() {
        let p = Position::new(3, 3);
        assert_eq!(p.moved(Direction::Up), Position::new(3, 2));
        assert_eq!(p.moved(Direction::Down), Position::new(3, 4));
        assert_eq!(p.moved(Direction::Left), Position::new(2, 3));
        assert_eq!(p.moved(Direction::Right), Position::new(4, 3));
    }

    #[test]
    fn test_relative_actions_never_reverse() {
        let actions = [
            RelativeAction::Straight,
            RelativeAction::TurnLeft,
            RelativeAction::TurnRight,
        ];
        for dir in Direction::ALL {
            for action in actions {
                assert_ne!(dir.apply(action), dir.opposite());
            }
            assert_eq!(
                dir.apply(RelativeAction::TurnLeft).apply(RelativeAction::TurnRight),
                dir
            );
        }
    }

    #[test]
    fn test_code_roundtrip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::try_from(dir.code()).unwrap(), dir);
        }
        assert!(Direction::try_from(4).is_err());
    }

    #[test]
    fn test_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Direction::Left).unwrap(), "2");
        let dir: Direction = serde_json::from_str("3").unwrap();
        assert_eq!(dir, Direction::Right);
    }
}
