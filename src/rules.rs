// Rule capabilities. The board never decides legality on its own: it asks these traits which
// moves may promote and where queued moves could go. Different variants plug in different
// implementations.

use std::fmt;

use crate::board::Pieces;
use crate::color::Color;
use crate::piece::{Piece, Role};
use crate::square::{Dimensions, Square};


pub trait PromotionRules: fmt::Debug {
    // Promoted form of a role, `None` if it cannot promote.
    fn promotes_to(&self, role: Role) -> Option<Role>;
    fn unpromotes_to(&self, role: Role) -> Option<Role>;

    // Whether the user must be asked about promotion. Only consulted for pieces that can
    // promote and only when the move or drop is otherwise acceptable.
    fn move_promotion_dialog(&self, _orig: Square, _dest: Square, _piece: Piece, _dims: Dimensions) -> bool {
        false
    }
    fn drop_promotion_dialog(&self, _piece: Piece, _dest: Square, _dims: Dimensions) -> bool {
        false
    }

    // Whether the move or drop promotes without asking. Consulted when the caller doesn't
    // specify promotion explicitly.
    fn force_move_promotion(&self, _orig: Square, _dest: Square, _piece: Piece, _dims: Dimensions) -> bool {
        false
    }
    fn force_drop_promotion(&self, _piece: Piece, _dest: Square, _dims: Dimensions) -> bool {
        false
    }
}

// Destinations used to validate and highlight premoves and predrops. These are approximations
// of future legal moves: blocking pieces are ignored since the position will change before the
// move is played.
pub trait PremoveGenerator: fmt::Debug {
    fn premove_dests(&self, orig: Square, pieces: &Pieces, dims: Dimensions) -> Vec<Square>;
    fn predrop_dests(&self, piece: Piece, pieces: &Pieces, dims: Dimensions) -> Vec<Square>;
}

// Standard promotion table without any dialogs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ShogiPromotion;

impl PromotionRules for ShogiPromotion {
    fn promotes_to(&self, role: Role) -> Option<Role> { role.promoted() }
    fn unpromotes_to(&self, role: Role) -> Option<Role> { role.unpromoted() }
}

// Standard promotion table with a promotion zone of the last `zone_ranks` ranks. Moves into,
// out of or within the zone ask the user, unless the piece would be stuck unpromoted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ZonePromotion {
    pub zone_ranks: u8,
}

impl ZonePromotion {
    pub const STANDARD: ZonePromotion = ZonePromotion { zone_ranks: 3 };

    pub fn in_zone(&self, sq: Square, color: Color, dims: Dimensions) -> bool {
        ranks_ahead(sq, color, dims) < self.zone_ranks
    }

    fn promotion_possible(&self, orig: Square, dest: Square, piece: Piece, dims: Dimensions) -> bool {
        piece.role.promoted().is_some()
            && (self.in_zone(orig, piece.color, dims) || self.in_zone(dest, piece.color, dims))
    }
}

impl PromotionRules for ZonePromotion {
    fn promotes_to(&self, role: Role) -> Option<Role> { role.promoted() }
    fn unpromotes_to(&self, role: Role) -> Option<Role> { role.unpromoted() }

    fn move_promotion_dialog(&self, orig: Square, dest: Square, piece: Piece, dims: Dimensions) -> bool {
        self.promotion_possible(orig, dest, piece, dims)
            && !self.force_move_promotion(orig, dest, piece, dims)
    }

    fn force_move_promotion(&self, orig: Square, dest: Square, piece: Piece, dims: Dimensions) -> bool {
        self.promotion_possible(orig, dest, piece, dims) && !has_moves_unpromoted(piece, dest, dims)
    }
}

// Number of ranks in front of the square from the color's point of view.
pub fn ranks_ahead(sq: Square, color: Color, dims: Dimensions) -> u8 {
    match color {
        Color::Sente => sq.rank,
        Color::Gote => dims.ranks.saturating_sub(sq.rank + 1),
    }
}

// Whether an unpromoted piece standing on `sq` would still have somewhere to go.
pub fn has_moves_unpromoted(piece: Piece, sq: Square, dims: Dimensions) -> bool {
    let ahead = ranks_ahead(sq, piece.color, dims);
    match piece.role {
        Role::Pawn | Role::Lance => ahead >= 1,
        Role::Knight => ahead >= 2,
        _ => true,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sq(key: &str) -> Square { Square::from_key(key).unwrap() }

    #[test]
    fn zone_promotion() {
        let rules = ZonePromotion::STANDARD;
        let dims = Dimensions::STANDARD;
        let pawn = Piece::new(Role::Pawn, Color::Sente);
        assert!(!rules.move_promotion_dialog(sq("5e"), sq("5d"), pawn, dims));
        assert!(rules.move_promotion_dialog(sq("5d"), sq("5c"), pawn, dims));
        assert!(!rules.force_move_promotion(sq("5d"), sq("5c"), pawn, dims));
        assert!(rules.force_move_promotion(sq("5b"), sq("5a"), pawn, dims));
        assert!(!rules.move_promotion_dialog(sq("5b"), sq("5a"), pawn, dims));

        let gote_knight = Piece::new(Role::Knight, Color::Gote);
        assert!(rules.move_promotion_dialog(sq("4e"), sq("5g"), gote_knight, dims));
        assert!(rules.force_move_promotion(sq("4f"), sq("5h"), gote_knight, dims));

        let gold = Piece::new(Role::Gold, Color::Sente);
        assert!(!rules.move_promotion_dialog(sq("5d"), sq("5c"), gold, dims));
        assert!(!rules.drop_promotion_dialog(pawn, sq("5c"), dims));
    }

    #[test]
    fn ranks_ahead_off_the_board() {
        let dims = Dimensions::STANDARD;
        assert_eq!(ranks_ahead(sq("4i"), Color::Gote, dims), 0);
        assert_eq!(ranks_ahead(sq("4p"), Color::Gote, dims), 0);
        assert_eq!(ranks_ahead(sq("4a"), Color::Gote, dims), 8);
    }
}
