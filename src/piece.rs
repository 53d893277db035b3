use std::fmt;
use std::str::FromStr;

use derive_new::new;
use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::color::Color;


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
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    King,
    Rook,
    Bishop,
    Gold,
    Silver,
    Knight,
    Lance,
    Pawn,
    Dragon,
    Horse,
    PromotedSilver,
    PromotedKnight,
    PromotedLance,
    Tokin,
}

// Roles shown in hands by default, in display order.
pub const HAND_ROLES: [Role; 7] = [
    Role::Rook,
    Role::Bishop,
    Role::Gold,
    Role::Silver,
    Role::Knight,
    Role::Lance,
    Role::Pawn,
];

impl Role {
    pub fn is_promoted(self) -> bool {
        matches!(
            self,
            Role::Dragon
                | Role::Horse
                | Role::PromotedSilver
                | Role::PromotedKnight
                | Role::PromotedLance
                | Role::Tokin
        )
    }

    // Standard shogi promotion table.
    pub fn promoted(self) -> Option<Role> {
        match self {
            Role::Rook => Some(Role::Dragon),
            Role::Bishop => Some(Role::Horse),
            Role::Silver => Some(Role::PromotedSilver),
            Role::Knight => Some(Role::PromotedKnight),
            Role::Lance => Some(Role::PromotedLance),
            Role::Pawn => Some(Role::Tokin),
            Role::King | Role::Gold => None,
            Role::Dragon
            | Role::Horse
            | Role::PromotedSilver
            | Role::PromotedKnight
            | Role::PromotedLance
            | Role::Tokin => None,
        }
    }

    pub fn unpromoted(self) -> Option<Role> {
        match self {
            Role::Dragon => Some(Role::Rook),
            Role::Horse => Some(Role::Bishop),
            Role::PromotedSilver => Some(Role::Silver),
            Role::PromotedKnight => Some(Role::Knight),
            Role::PromotedLance => Some(Role::Lance),
            Role::Tokin => Some(Role::Pawn),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, new)]
pub struct Piece {
    pub role: Role,
    pub color: Color,
}

impl Piece {
    pub fn with_role(self, role: Role) -> Self { Piece { role, ..self } }

    // Name used both as the DOM class list of a piece node and as its JSON representation.
    pub fn name(self) -> String { format!("{} {}", self.color, self.role) }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.role)
    }
}

impl FromStr for Piece {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (color, role) = s
            .split_once(' ')
            .ok_or_else(|| format!("invalid piece name: {s}"))?;
        let color = Color::from_str(color).map_err(|_| format!("invalid color: {color}"))?;
        let role = Role::from_str(role).map_err(|_| format!("invalid role: {role}"))?;
        Ok(Piece { role, color })
    }
}

impl Serialize for Piece {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn promotion_table_is_inverse() {
        for role in Role::iter() {
            if let Some(promoted) = role.promoted() {
                assert!(promoted.is_promoted());
                assert_eq!(promoted.unpromoted(), Some(role));
            }
        }
        assert_eq!(Role::iter().filter(|r| r.is_promoted()).count(), 6);
    }

    #[test]
    fn piece_name() {
        let piece = Piece::new(Role::PromotedSilver, Color::Gote);
        assert_eq!(piece.name(), "gote promotedsilver");
        assert_eq!("gote promotedsilver".parse::<Piece>(), Ok(piece));
        assert!("gote".parse::<Piece>().is_err());
        assert!("white pawn".parse::<Piece>().is_err());
    }
}
