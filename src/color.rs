use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};


#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Enum,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Sente,
    Gote,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::Sente => Color::Gote,
            Color::Gote => Color::Sente,
        }
    }
}

// Which side may interact with the board, independently of whose turn it is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveColor {
    Sente,
    Gote,
    Both,
}

impl ActiveColor {
    pub fn allows(self, color: Color) -> bool {
        match self {
            ActiveColor::Both => true,
            ActiveColor::Sente => color == Color::Sente,
            ActiveColor::Gote => color == Color::Gote,
        }
    }

    // `Some` if exactly one color is active.
    pub fn single(self) -> Option<Color> {
        match self {
            ActiveColor::Sente => Some(Color::Sente),
            ActiveColor::Gote => Some(Color::Gote),
            ActiveColor::Both => None,
        }
    }
}

impl From<Color> for ActiveColor {
    fn from(color: Color) -> Self {
        match color {
            Color::Sente => ActiveColor::Sente,
            Color::Gote => ActiveColor::Gote,
        }
    }
}
