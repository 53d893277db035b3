use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;


pub const MAX_DIMENSION: u8 = 16;

const RANK_LETTERS: &[u8] = b"abcdefghijklmnop";
const_assert!(MAX_DIMENSION as usize == RANK_LETTERS.len());


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Dimensions {
    pub files: u8,
    pub ranks: u8,
}

impl Dimensions {
    pub const STANDARD: Dimensions = Dimensions { files: 9, ranks: 9 };

    // Clamps both values into the supported range.
    pub fn new(files: u8, ranks: u8) -> Self {
        Dimensions {
            files: files.clamp(1, MAX_DIMENSION),
            ranks: ranks.clamp(1, MAX_DIMENSION),
        }
    }

    pub fn contains(self, sq: Square) -> bool { sq.file < self.files && sq.rank < self.ranks }

    // Rank-major order starting from rank `a`, file `1` within a rank.
    pub fn squares(self) -> impl Iterator<Item = Square> + Clone {
        (0..self.ranks)
            .cartesian_product(0..self.files)
            .map(|(rank, file)| Square { file, rank })
    }
}

impl Default for Dimensions {
    fn default() -> Self { Dimensions::STANDARD }
}

// A board square. Both coordinates are zero-based. File 0 is shown on the right from sente's
// point of view, rank 0 is the top rank from sente's point of view.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    pub rank: u8,
    pub file: u8,
}

impl Square {
    pub const fn new(file: u8, rank: u8) -> Self {
        assert!(file < MAX_DIMENSION && rank < MAX_DIMENSION);
        Square { file, rank }
    }

    pub fn checked_new(file: i16, rank: i16) -> Option<Self> {
        let range = 0..MAX_DIMENSION as i16;
        (range.contains(&file) && range.contains(&rank)).then(|| Square {
            file: file as u8,
            rank: rank as u8,
        })
    }

    pub fn offset(self, file_delta: i16, rank_delta: i16) -> Option<Self> {
        Square::checked_new(self.file as i16 + file_delta, self.rank as i16 + rank_delta)
    }

    pub fn to_key(self) -> String {
        format!("{}{}", self.file + 1, RANK_LETTERS[self.rank as usize] as char)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let (rank_idx, rank_char) = key.char_indices().last()?;
        let rank = RANK_LETTERS.iter().position(|&c| c as char == rank_char)?;
        let file_str = &key[..rank_idx];
        if file_str.is_empty() || file_str.len() > 2 || !file_str.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let file: u8 = file_str.parse().ok()?;
        if file == 0 || file > MAX_DIMENSION {
            return None;
        }
        Some(Square { file: file - 1, rank: rank as u8 })
    }

    pub fn distance_sq(self, other: Square) -> i32 {
        let df = self.file as i32 - other.file as i32;
        let dr = self.rank as i32 - other.rank as i32;
        df * df + dr * dr
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_key()) }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Square({})", self) }
}

impl FromStr for Square {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_key(s).ok_or_else(|| format!("invalid square key: {s}"))
    }
}

impl Serialize for Square {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys() {
        assert_eq!(Square::new(4, 4).to_key(), "5e");
        assert_eq!(Square::new(11, 2).to_key(), "12c");
        assert_eq!(Square::from_key("12c"), Some(Square::new(11, 2)));
        assert_eq!(Square::from_key("1a"), Some(Square::new(0, 0)));
        assert_eq!(Square::from_key("16p"), Some(Square::new(15, 15)));
        assert_eq!(Square::from_key("0a"), None);
        assert_eq!(Square::from_key("17a"), None);
        assert_eq!(Square::from_key("5q"), None);
        assert_eq!(Square::from_key("e"), None);
        assert_eq!(Square::from_key(""), None);
    }

    #[test]
    fn dimensions() {
        let dims = Dimensions::new(5, 20);
        assert_eq!(dims, Dimensions { files: 5, ranks: 16 });
        assert_eq!(dims.squares().count(), 80);
        assert!(dims.contains(Square::new(4, 15)));
        assert!(!dims.contains(Square::new(5, 0)));
    }
}
