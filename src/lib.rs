#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod anim;
pub mod api;
pub mod board;
pub mod color;
pub mod config;
pub mod display;
pub mod drag;
pub mod draw;
pub mod error;
pub mod event;
pub mod frame;
pub mod hand;
pub mod piece;
pub mod premove;
pub mod render;
pub mod rules;
pub mod sfen;
pub mod shape;
pub mod square;
pub mod state;
pub mod test_util;
pub mod util;
