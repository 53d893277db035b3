use crate::board::Pieces;
use crate::color::Color;
use crate::piece::{Piece, Role};
use crate::rules::{PremoveGenerator, has_moves_unpromoted};
use crate::square::{Dimensions, Square};


const ORTHOGONAL: [(i16, i16); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
const DIAGONAL: [(i16, i16); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

// Piece geometry of standard shogi.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ShogiPremoves;

// Steps are written for sente (forward is towards rank `a`, i.e. negative rank delta).
fn steps(role: Role) -> &'static [(i16, i16)] {
    const GOLD: &[(i16, i16)] = &[(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (0, 1)];
    match role {
        Role::Pawn => &[(0, -1)],
        Role::Knight => &[(-1, -2), (1, -2)],
        Role::Silver => &[(-1, -1), (0, -1), (1, -1), (-1, 1), (1, 1)],
        Role::Gold
        | Role::Tokin
        | Role::PromotedSilver
        | Role::PromotedKnight
        | Role::PromotedLance => GOLD,
        Role::King => &[(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)],
        Role::Dragon => &DIAGONAL,
        Role::Horse => &ORTHOGONAL,
        Role::Lance | Role::Rook | Role::Bishop => &[],
    }
}

fn rays(role: Role) -> &'static [(i16, i16)] {
    match role {
        Role::Lance => &[(0, -1)],
        Role::Rook | Role::Dragon => &ORTHOGONAL,
        Role::Bishop | Role::Horse => &DIAGONAL,
        _ => &[],
    }
}

fn orient((df, dr): (i16, i16), color: Color) -> (i16, i16) {
    match color {
        Color::Sente => (df, dr),
        Color::Gote => (-df, -dr),
    }
}

pub fn piece_reach(orig: Square, piece: Piece, dims: Dimensions) -> Vec<Square> {
    let mut dests = Vec::new();
    for &step in steps(piece.role) {
        let (df, dr) = orient(step, piece.color);
        if let Some(sq) = orig.offset(df, dr).filter(|&sq| dims.contains(sq)) {
            dests.push(sq);
        }
    }
    for &dir in rays(piece.role) {
        let (df, dr) = orient(dir, piece.color);
        let mut cur = orig;
        while let Some(sq) = cur.offset(df, dr).filter(|&sq| dims.contains(sq)) {
            dests.push(sq);
            cur = sq;
        }
    }
    dests.sort();
    dests.dedup();
    dests
}

impl PremoveGenerator for ShogiPremoves {
    fn premove_dests(&self, orig: Square, pieces: &Pieces, dims: Dimensions) -> Vec<Square> {
        match pieces.get(&orig) {
            Some(&piece) => piece_reach(orig, piece, dims),
            None => Vec::new(),
        }
    }

    fn predrop_dests(&self, piece: Piece, pieces: &Pieces, dims: Dimensions) -> Vec<Square> {
        dims.squares()
            .filter(|sq| pieces.get(sq).is_none_or(|p| p.color != piece.color))
            .filter(|&sq| has_moves_unpromoted(piece, sq, dims))
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sq(key: &str) -> Square { Square::from_key(key).unwrap() }
    fn keys(squares: &[Square]) -> Vec<String> { squares.iter().map(|s| s.to_key()).collect() }

    #[test]
    fn pawn_and_knight() {
        let dims = Dimensions::STANDARD;
        let sente_pawn = Piece::new(Role::Pawn, Color::Sente);
        assert_eq!(keys(&piece_reach(sq("5g"), sente_pawn, dims)), ["5f"]);
        let gote_pawn = Piece::new(Role::Pawn, Color::Gote);
        assert_eq!(keys(&piece_reach(sq("5c"), gote_pawn, dims)), ["5d"]);
        let knight = Piece::new(Role::Knight, Color::Sente);
        let mut reach = keys(&piece_reach(sq("8i"), knight, dims));
        reach.sort();
        assert_eq!(reach, ["7g", "9g"]);
        assert!(piece_reach(sq("5b"), knight, dims).is_empty());
    }

    #[test]
    fn sliders_ignore_blockers() {
        let dims = Dimensions::STANDARD;
        let rook = Piece::new(Role::Rook, Color::Sente);
        assert_eq!(piece_reach(sq("5e"), rook, dims).len(), 16);
        let dragon = Piece::new(Role::Dragon, Color::Sente);
        assert_eq!(piece_reach(sq("5e"), dragon, dims).len(), 20);
        let lance = Piece::new(Role::Lance, Color::Gote);
        assert_eq!(piece_reach(sq("1a"), lance, dims).len(), 8);
    }

    #[test]
    fn predrops() {
        let dims = Dimensions::STANDARD;
        let mut pieces = Pieces::new();
        pieces.insert(sq("5e"), Piece::new(Role::Gold, Color::Sente));
        pieces.insert(sq("4e"), Piece::new(Role::Gold, Color::Gote));
        let pawn = Piece::new(Role::Pawn, Color::Sente);
        let dests = ShogiPremoves.predrop_dests(pawn, &pieces, dims);
        assert!(!dests.contains(&sq("5e")));
        assert!(dests.contains(&sq("4e")));
        assert!(!dests.contains(&sq("1a")));
        assert_eq!(dests.len(), 81 - 9 - 1);
        let knight = Piece::new(Role::Knight, Color::Gote);
        let dests = ShogiPremoves.predrop_dests(knight, &pieces, dims);
        assert_eq!(dests.len(), 81 - 18 - 1);
    }
}
