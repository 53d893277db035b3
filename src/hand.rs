use enum_map::{EnumMap, enum_map};
use log::warn;

use crate::color::Color;
use crate::internal_error_message;
use crate::piece::{HAND_ROLES, Piece, Role};


pub type HandMap = EnumMap<Color, EnumMap<Role, u8>>;

pub fn empty_hand_map() -> HandMap { enum_map! { _ => enum_map! { _ => 0 } } }

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Hands {
    pub hand_map: HandMap,
    // Roles rendered in the hand UI, in display order.
    pub roles: Vec<Role>,
    // Render hands inside the board container rather than in separate elements.
    pub inlined: bool,
}

impl Hands {
    pub fn count(&self, piece: Piece) -> u8 { self.hand_map[piece.color][piece.role] }

    pub fn is_empty(&self, color: Color) -> bool {
        self.hand_map[color].values().all(|&cnt| cnt == 0)
    }

    // Maps a role to the one used by the hand, if any: the role itself when the hand lists it,
    // otherwise its unpromoted form when the hand lists that.
    pub fn normalize_role(
        &self, role: Role, unpromote: impl FnOnce(Role) -> Option<Role>,
    ) -> Option<Role> {
        if self.roles.contains(&role) {
            Some(role)
        } else {
            unpromote(role).filter(|r| self.roles.contains(r))
        }
    }

    pub fn add(&mut self, color: Color, role: Role, cnt: u8) {
        let slot = &mut self.hand_map[color][role];
        *slot = slot.saturating_add(cnt);
    }

    pub fn remove(&mut self, color: Color, role: Role, cnt: u8) {
        let slot = &mut self.hand_map[color][role];
        if *slot < cnt {
            warn!(
                "{}",
                internal_error_message!("removing {cnt} {color} {role} from a hand of {}", *slot)
            );
        }
        *slot = slot.saturating_sub(cnt);
    }
}

impl Default for Hands {
    fn default() -> Self {
        Hands {
            hand_map: empty_hand_map(),
            roles: HAND_ROLES.to_vec(),
            inlined: false,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_never_negative() {
        let mut hands = Hands::default();
        hands.add(Color::Sente, Role::Pawn, 2);
        hands.remove(Color::Sente, Role::Pawn, 1);
        hands.remove(Color::Sente, Role::Pawn, 5);
        hands.remove(Color::Gote, Role::Rook, 1);
        assert_eq!(hands.count(Piece::new(Role::Pawn, Color::Sente)), 0);
        assert_eq!(hands.count(Piece::new(Role::Rook, Color::Gote)), 0);
        assert!(hands.is_empty(Color::Sente));
    }

    #[test]
    fn normalize_role() {
        let hands = Hands::default();
        assert_eq!(hands.normalize_role(Role::Pawn, Role::unpromoted), Some(Role::Pawn));
        assert_eq!(hands.normalize_role(Role::Tokin, Role::unpromoted), Some(Role::Pawn));
        assert_eq!(hands.normalize_role(Role::King, Role::unpromoted), None);
    }
}
