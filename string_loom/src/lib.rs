pub mod geometry {
    pub mod point;
    pub mod segment;

    pub use point::Point;
    pub use segment::Segment;
}

mod algorithm;
pub mod approximation;
pub mod color;
pub mod config;
pub mod control;
mod float;
pub mod grid;
pub mod image;
pub mod peg_table;
pub mod random_winding;
pub mod shape;
pub mod strands;
pub mod verboser;
pub mod winding;

pub use algorithm::*;
pub use approximation::{Approximation, StartPeg};
pub use config::RunConfig;
pub use control::Control;
pub use float::Float;
pub use grid::Grid;
pub use image::{RgbaBuffer, Surface};
pub use peg_table::{InnerRing, PegTable, TableConfig};
pub use random_winding::RandomWinding;
pub use shape::{Distribution, Shape};
pub use strands::{Blend, Strands};
pub use winding::{Chord, Winding};
