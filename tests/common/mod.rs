// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use shogiground::api::Shogiground;
use shogiground::config::Config;
use shogiground::event::BoardEvent;
use shogiground::sfen::STANDARD_BOARD_SFEN;


#[macro_export]
macro_rules! sq {
    ($key:literal) => {
        shogiground::square::Square::from_key($key).unwrap()
    };
}

#[macro_export]
macro_rules! piece {
    ($color:ident $role:ident) => {
        shogiground::piece::Piece::new(
            shogiground::piece::Role::$role,
            shogiground::color::Color::$color,
        )
    };
}

#[allow(dead_code)]
pub fn standard_board() -> Shogiground { Shogiground::new(&Config::from_sfen(STANDARD_BOARD_SFEN, None)) }

#[allow(dead_code)]
pub fn board_from_json(json: &str) -> Shogiground {
    Shogiground::new(&Config::from_json(json).unwrap())
}

#[allow(dead_code)]
pub fn drain_events(sg: &mut Shogiground) -> Vec<BoardEvent> {
    std::iter::from_fn(|| sg.next_event()).collect()
}
