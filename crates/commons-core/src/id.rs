//! Cell codes and agent identifiers.
//!
//! Every grid cell stores a single `u16` code. Codes below
//! [`AGENT_CODE_OFFSET`] are [`Item`]s; agent `i` is stored as
//! `AGENT_CODE_OFFSET + i`, so agent codes never collide with item codes.

use std::fmt;

/// First cell code used for agents.
pub const AGENT_CODE_OFFSET: u16 = Item::COUNT as u16;

/// Static cell contents.
///
/// The two spawn codes only appear in parsed layouts. A live grid holds
/// [`Empty`](Item::Empty), [`Wall`](Item::Wall),
/// [`Interact`](Item::Interact), [`Apple`](Item::Apple) or an agent code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum Item {
    /// Nothing.
    Empty = 0,
    /// Impassable wall.
    Wall = 1,
    /// Zap beam marker, cleared at the start of the next interaction phase.
    Interact = 2,
    /// Harvestable apple.
    Apple = 3,
    /// Perimeter player spawn.
    SpawnPoint = 4,
    /// Interior player spawn.
    InsideSpawnPoint = 5,
}

impl Item {
    /// Number of item codes.
    pub const COUNT: usize = 6;

    /// The raw cell code.
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Decode an item code. Returns `None` for agent codes.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Wall),
            2 => Some(Self::Interact),
            3 => Some(Self::Apple),
            4 => Some(Self::SpawnPoint),
            5 => Some(Self::InsideSpawnPoint),
            _ => None,
        }
    }
}

/// Index of an agent, `0..num_agents`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u16);

impl AgentId {
    /// The cell code this agent occupies on the grid.
    #[inline]
    pub const fn code(self) -> u16 {
        AGENT_CODE_OFFSET + self.0
    }

    /// Decode an agent from a cell code. Returns `None` for item codes.
    #[inline]
    pub fn from_code(code: u16) -> Option<Self> {
        code.checked_sub(AGENT_CODE_OFFSET).map(Self)
    }

    /// The agent index as `usize`.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for AgentId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_codes_start_after_items() {
        assert_eq!(AgentId(0).code(), 6);
        assert_eq!(AgentId(4).code(), 10);
        assert_eq!(Item::from_code(AgentId(0).code()), None);
    }

    #[test]
    fn agent_code_round_trips() {
        for i in 0..20 {
            assert_eq!(AgentId::from_code(AgentId(i).code()), Some(AgentId(i)));
        }
        assert_eq!(AgentId::from_code(Item::Apple.code()), None);
    }

    #[test]
    fn item_codes_are_stable() {
        assert_eq!(Item::Empty.code(), 0);
        assert_eq!(Item::Wall.code(), 1);
        assert_eq!(Item::Interact.code(), 2);
        assert_eq!(Item::Apple.code(), 3);
        for code in 0..Item::COUNT as u16 {
            assert_eq!(Item::from_code(code).map(Item::code), Some(code));
        }
    }
}
