use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    approximation::StartPeg,
    control::{Control, MAX_SPEED},
    grid::Grid,
    peg_table::{PegTable, TableConfig},
    verboser::Verboser,
    Float,
};

/// Everything a run needs besides the target image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub table: TableConfig,
    /// Side of the square canvas in pixels.
    pub canvas_size: usize,
    pub steps: usize,
    /// `0` pauses, `100` runs with the shortest delay.
    pub speed: u8,
    pub start: StartPeg,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            table: TableConfig::default(),
            canvas_size: 600,
            steps: 1000,
            speed: MAX_SPEED,
            start: StartPeg::First,
        }
    }
}

impl RunConfig {
    pub fn grid(&self) -> Grid {
        Grid::square(self.canvas_size)
    }

    pub fn control(&self) -> Control {
        Control::new(self.speed)
    }

    pub fn peg_table<S: Float, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        verboser: &mut impl Verboser,
    ) -> PegTable<S> {
        PegTable::new(&self.table, self.canvas_size, rng, verboser)
    }
}
