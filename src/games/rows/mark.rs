//! Player marks drawn from a fixed, ordered alphabet.

use serde::{Serialize, Serializer};

/// Glyphs handed out to players in join order.
pub const MARKS: [&str; 9] = ["X", "O", "△", "□", "◆", "◇", "▲", "○", "●"];

/// A player's mark: an index into [`MARKS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mark(u8);

impl Mark {
    /// Number of distinct marks, and therefore the seat limit of a session.
    pub const COUNT: usize = MARKS.len();

    /// The mark given to the founder of a session.
    pub fn first() -> Self {
        Self(0)
    }

    /// Returns the mark at `index` in the alphabet, if there is one.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::COUNT).then(|| Self(index as u8))
    }

    /// Position of this mark in the alphabet.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The glyph shown on the board.
    pub fn symbol(self) -> &'static str {
        MARKS[self.index()]
    }

    /// Iterates the alphabet in assignment order.
    pub fn all() -> impl Iterator<Item = Mark> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }

    /// Returns the earliest mark in the alphabet that is not in `taken`.
    pub fn first_unused<I>(taken: I) -> Option<Self>
    where
        I: IntoIterator<Item = Mark>,
    {
        let taken: Vec<Mark> = taken.into_iter().collect();
        Self::all().find(|mark| !taken.contains(mark))
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Serialize for Mark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}
