// Position codec: board and hand parts of SFEN (the shogi flavour of Forsyth–Edwards notation).
//
// Differences from strict SFEN:
//   - Boards up to 16x16 are supported. Runs of empty squares may take two decimal digits.
//   - Parsing is best-effort: unknown symbols are skipped, parsing stops at the first space or
//     underscore, and extra ranks are ignored. Nothing here ever fails.
//   - Symbols are pluggable per role (`SymbolMapping`), so variants can reuse the codec.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::board::Pieces;
use crate::color::Color;
use crate::hand::{HandMap, empty_hand_map};
use crate::once_cell_regex;
use crate::piece::{Piece, Role};
use crate::square::{Dimensions, Square};


pub const STANDARD_BOARD_SFEN: &str =
    "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL";
pub const EMPTY_HANDS_SFEN: &str = "-";

const PROMOTION_MARKER: char = '+';

pub trait SymbolMapping: fmt::Debug {
    // Input is always lowercase.
    fn parse(&self, symbol: &str) -> Option<Role>;
    // Output must be lowercase; the codec takes care of the case.
    fn render(&self, role: Role) -> Option<String>;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DefaultSymbols;

impl SymbolMapping for DefaultSymbols {
    fn parse(&self, symbol: &str) -> Option<Role> {
        Some(match symbol {
            "k" => Role::King,
            "r" => Role::Rook,
            "b" => Role::Bishop,
            "g" => Role::Gold,
            "s" => Role::Silver,
            "n" => Role::Knight,
            "l" => Role::Lance,
            "p" => Role::Pawn,
            "+r" => Role::Dragon,
            "+b" => Role::Horse,
            "+s" => Role::PromotedSilver,
            "+n" => Role::PromotedKnight,
            "+l" => Role::PromotedLance,
            "+p" => Role::Tokin,
            _ => return None,
        })
    }

    fn render(&self, role: Role) -> Option<String> {
        let s = match role {
            Role::King => "k",
            Role::Rook => "r",
            Role::Bishop => "b",
            Role::Gold => "g",
            Role::Silver => "s",
            Role::Knight => "n",
            Role::Lance => "l",
            Role::Pawn => "p",
            Role::Dragon => "+r",
            Role::Horse => "+b",
            Role::PromotedSilver => "+s",
            Role::PromotedKnight => "+n",
            Role::PromotedLance => "+l",
            Role::Tokin => "+p",
        };
        Some(s.to_owned())
    }
}

// User-supplied symbols. Roles missing from the table are neither parsed nor rendered.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable(pub BTreeMap<Role, String>);

impl SymbolTable {
    pub fn from_mapping(mapping: &dyn SymbolMapping) -> Self {
        SymbolTable(Role::iter().filter_map(|r| Some((r, mapping.render(r)?))).collect())
    }
}

impl SymbolMapping for SymbolTable {
    fn parse(&self, symbol: &str) -> Option<Role> {
        self.0
            .iter()
            .find(|(_, s)| s.eq_ignore_ascii_case(symbol))
            .map(|(&role, _)| role)
    }

    fn render(&self, role: Role) -> Option<String> {
        self.0.get(&role).map(|s| s.to_ascii_lowercase())
    }
}

fn symbol_color(symbol: &str) -> Color {
    if symbol == symbol.to_lowercase() {
        Color::Gote
    } else {
        Color::Sente
    }
}

fn symbol_with_case(symbol: &str, color: Color) -> String {
    match color {
        Color::Sente => symbol.to_uppercase(),
        Color::Gote => symbol.to_lowercase(),
    }
}

// Reads the next piece token starting at `chars[*i]`, advancing `i` past a promotion marker.
fn next_symbol(chars: &[char], i: &mut usize) -> String {
    let ch = chars[*i];
    if ch == PROMOTION_MARKER && *i + 1 < chars.len() {
        *i += 1;
        format!("{PROMOTION_MARKER}{}", chars[*i])
    } else {
        ch.to_string()
    }
}

pub fn infer_dimensions(board_sfen: &str) -> Dimensions {
    let ranks = board_sfen.split('/').collect_vec();
    let mut files: u32 = 0;
    let mut empty_run: u32 = 0;
    for ch in ranks[0].chars() {
        if let Some(digit) = ch.to_digit(10) {
            empty_run = empty_run.saturating_mul(10).saturating_add(digit);
        } else if ch != PROMOTION_MARKER {
            files = files.saturating_add(empty_run + 1);
            empty_run = 0;
        }
    }
    files = files.saturating_add(empty_run);
    Dimensions::new(files.min(u8::MAX as u32) as u8, ranks.len().min(u8::MAX as usize) as u8)
}

pub fn sfen_to_board(board_sfen: &str, dims: Dimensions, symbols: &dyn SymbolMapping) -> Pieces {
    let chars = board_sfen.chars().collect_vec();
    let mut pieces = Pieces::new();
    // Ranks are written from file `dims.files` down to file 1.
    let mut file = dims.files as i16 - 1;
    let mut rank: u8 = 0;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            ' ' | '_' => break,
            '/' => {
                rank += 1;
                if rank >= dims.ranks {
                    break;
                }
                file = dims.files as i16 - 1;
            }
            _ => {
                if let Some(digit) = ch.to_digit(10) {
                    match chars.get(i + 1).and_then(|c| c.to_digit(10)) {
                        Some(second_digit) => {
                            file -= (digit * 10 + second_digit) as i16;
                            i += 1;
                        }
                        None => file -= digit as i16,
                    }
                } else {
                    let symbol = next_symbol(&chars, &mut i);
                    if file >= 0 {
                        if let Some(role) = symbols.parse(&symbol.to_lowercase()) {
                            let color = symbol_color(&symbol);
                            pieces.insert(Square::new(file as u8, rank), Piece { role, color });
                        }
                    }
                    file -= 1;
                }
            }
        }
        i += 1;
    }
    pieces
}

pub fn board_to_sfen(pieces: &Pieces, dims: Dimensions, symbols: &dyn SymbolMapping) -> String {
    let board = (0..dims.ranks)
        .map(|rank| {
            (0..dims.files)
                .rev()
                .map(|file| {
                    let piece = pieces.get(&Square::new(file, rank));
                    match piece.and_then(|p| Some((p.color, symbols.render(p.role)?))) {
                        Some((color, symbol)) => symbol_with_case(&symbol, color),
                        None => "1".to_owned(),
                    }
                })
                .join("")
        })
        .join("/");
    let empty_run_re = once_cell_regex!("1{2,}");
    empty_run_re
        .replace_all(&board, |caps: &regex_lite::Captures| caps[0].len().to_string())
        .into_owned()
}

pub fn sfen_to_hands(hands_sfen: &str, symbols: &dyn SymbolMapping) -> HandMap {
    let chars = hands_sfen.chars().collect_vec();
    let mut hand_map = empty_hand_map();
    let mut count: u32 = 0;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if let Some(digit) = ch.to_digit(10) {
            count = count.saturating_mul(10).saturating_add(digit);
        } else {
            let symbol = next_symbol(&chars, &mut i);
            if let Some(role) = symbols.parse(&symbol.to_lowercase()) {
                let slot = &mut hand_map[symbol_color(&symbol)][role];
                let count = if count == 0 { 1 } else { count.min(u8::MAX as u32) as u8 };
                *slot = slot.saturating_add(count);
            }
            count = 0;
        }
        i += 1;
    }
    hand_map
}

pub fn hands_to_sfen(hand_map: &HandMap, roles: &[Role], symbols: &dyn SymbolMapping) -> String {
    let hand_notation = |color: Color| {
        roles
            .iter()
            .filter_map(|&role| {
                let symbol = symbols.render(role)?;
                let count = hand_map[color][role];
                let symbol = symbol_with_case(&symbol, color);
                match count {
                    0 => None,
                    1 => Some(symbol),
                    n => Some(format!("{n}{symbol}")),
                }
            })
            .join("")
    };
    let notation = format!("{}{}", hand_notation(Color::Sente), hand_notation(Color::Gote));
    if notation.is_empty() { EMPTY_HANDS_SFEN.to_owned() } else { notation }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::piece::HAND_ROLES;

    fn sq(key: &str) -> Square { Square::from_key(key).unwrap() }

    #[test]
    fn standard_position() {
        let dims = infer_dimensions(STANDARD_BOARD_SFEN);
        assert_eq!(dims, Dimensions::STANDARD);
        let pieces = sfen_to_board(STANDARD_BOARD_SFEN, dims, &DefaultSymbols);
        assert_eq!(pieces.len(), 40);
        assert_eq!(pieces[&sq("5i")], Piece::new(Role::King, Color::Sente));
        assert_eq!(pieces[&sq("5a")], Piece::new(Role::King, Color::Gote));
        assert_eq!(pieces[&sq("8b")], Piece::new(Role::Rook, Color::Gote));
        assert_eq!(pieces[&sq("2h")], Piece::new(Role::Rook, Color::Sente));
        assert_eq!(pieces[&sq("9a")], Piece::new(Role::Lance, Color::Gote));
        assert_eq!(board_to_sfen(&pieces, dims, &DefaultSymbols), STANDARD_BOARD_SFEN);
    }

    #[test]
    fn promoted_pieces() {
        let board = "4k4/9/4+P4/9/9/9/9/1+r7/4K4";
        let dims = infer_dimensions(board);
        assert_eq!(dims, Dimensions::STANDARD);
        let pieces = sfen_to_board(board, dims, &DefaultSymbols);
        assert_eq!(pieces[&sq("5c")], Piece::new(Role::Tokin, Color::Sente));
        assert_eq!(pieces[&sq("8h")], Piece::new(Role::Dragon, Color::Gote));
        assert_eq!(board_to_sfen(&pieces, dims, &DefaultSymbols), board);
    }

    #[test]
    fn wide_board() {
        let board = "12/k10K/12";
        let dims = infer_dimensions(board);
        assert_eq!(dims, Dimensions { files: 12, ranks: 3 });
        let pieces = sfen_to_board(board, dims, &DefaultSymbols);
        assert_eq!(pieces[&sq("12b")], Piece::new(Role::King, Color::Gote));
        assert_eq!(pieces[&sq("1b")], Piece::new(Role::King, Color::Sente));
        assert_eq!(board_to_sfen(&pieces, dims, &DefaultSymbols), board);
    }

    #[test]
    fn malformed_input_is_best_effort() {
        let dims = Dimensions::STANDARD;
        let pieces = sfen_to_board("4k4/9/xyz/9/9/9/9/9/9/9/P8", dims, &DefaultSymbols);
        assert_eq!(pieces.len(), 1);
        // Too many pieces in a rank: the excess falls off the board.
        let pieces = sfen_to_board("kkkkkkkkkkkk", dims, &DefaultSymbols);
        assert_eq!(pieces.len(), 9);
        // Trailing promotion marker is ignored.
        let pieces = sfen_to_board("8+", dims, &DefaultSymbols);
        assert!(pieces.is_empty());
        // Parsing stops at the terminator.
        let pieces = sfen_to_board("k8 b - 1", dims, &DefaultSymbols);
        assert_eq!(pieces.len(), 1);
    }

    #[test]
    fn hands() {
        let hand_map = sfen_to_hands("R2Pb10p", &DefaultSymbols);
        assert_eq!(hand_map[Color::Sente][Role::Rook], 1);
        assert_eq!(hand_map[Color::Sente][Role::Pawn], 2);
        assert_eq!(hand_map[Color::Gote][Role::Bishop], 1);
        assert_eq!(hand_map[Color::Gote][Role::Pawn], 10);
        assert_eq!(hands_to_sfen(&hand_map, &HAND_ROLES, &DefaultSymbols), "R2Pb10p");
        assert_eq!(hands_to_sfen(&empty_hand_map(), &HAND_ROLES, &DefaultSymbols), "-");
        assert_eq!(sfen_to_hands("-", &DefaultSymbols), empty_hand_map());
    }

    #[test]
    fn custom_symbols() {
        let symbols = SymbolTable(
            [(Role::King, "o".to_owned()), (Role::Pawn, "x".to_owned()), (Role::Tokin, "+x".to_owned())]
                .into_iter()
                .collect(),
        );
        let board = "1o1/3/X+x1";
        let dims = infer_dimensions(board);
        assert_eq!(dims, Dimensions { files: 3, ranks: 3 });
        let pieces = sfen_to_board(board, dims, &symbols);
        assert_eq!(pieces[&sq("2a")], Piece::new(Role::King, Color::Gote));
        assert_eq!(pieces[&sq("3c")], Piece::new(Role::Pawn, Color::Sente));
        assert_eq!(pieces[&sq("2c")], Piece::new(Role::Tokin, Color::Gote));
        assert_eq!(board_to_sfen(&pieces, dims, &symbols), board);
        // Roles the table doesn't know about are dropped.
        let default_pieces = sfen_to_board("1k1/3/1G1", dims, &DefaultSymbols);
        assert_eq!(board_to_sfen(&default_pieces, dims, &symbols), "3/3/3");
    }

    #[test]
    fn symbol_table_from_default_mapping() {
        let table = SymbolTable::from_mapping(&DefaultSymbols);
        let dims = infer_dimensions(STANDARD_BOARD_SFEN);
        let pieces = sfen_to_board(STANDARD_BOARD_SFEN, dims, &table);
        assert_eq!(board_to_sfen(&pieces, dims, &table), STANDARD_BOARD_SFEN);
    }
}
