//! Grid geometry - sextants, cells and the wrap-around board

pub mod board;
pub mod cell;
pub mod compass;

pub use board::{Board, DegreesOfFreedom, Shape};
pub use cell::{Cell, Coord};
pub use compass::Sextant;
