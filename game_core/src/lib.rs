pub mod board;
pub mod direction;
pub mod piece;

pub use board::*;
pub use direction::*;
pub use piece::*;
