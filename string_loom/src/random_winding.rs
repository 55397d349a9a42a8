use rand::Rng;

use crate::{
    algorithm::{Driver, Error, RunState},
    grid::Grid,
    image::Surface,
    peg_table::PegTable,
    strands::Strands,
    winding::Winding,
    Float,
};

/// Decorative winding: every chord goes to a uniformly random peg.
pub struct RandomWinding<'a, S, R> {
    table: &'a PegTable<S>,
    strands: Strands<S>,
    state: RunState<S>,
    winding: Winding<S>,
    rng: R,
}

impl<'a, S: Float, R: Rng> RandomWinding<'a, S, R> {
    pub fn new(table: &'a PegTable<S>, rng: R) -> Self {
        Self {
            table,
            strands: Strands::pastel(),
            state: RunState::new(0),
            winding: Winding::default(),
            rng,
        }
    }

    pub fn with_strands(mut self, strands: Strands<S>) -> Self {
        self.strands = strands;
        self
    }

    /// Uniform pick over the whole table. A forbidden inner to inner pick is
    /// drawn again from the outer ring.
    fn pick(&mut self) -> usize {
        let current = self.state.current;
        let next = self.rng.gen_range(0..self.table.len());
        if self.table.allows(current, next) {
            return next;
        }
        let outer = self.table.outer();
        if outer.is_empty() {
            current
        } else {
            self.rng.gen_range(outer)
        }
    }
}

impl<S: Float, R: Rng> Driver for RandomWinding<'_, S, R> {
    type Scalar = S;

    fn begin(&mut self, _: &Grid) -> Result<(), Error> {
        let start = if self.table.is_empty() {
            0
        } else {
            self.rng.gen_range(0..self.table.len())
        };
        self.state = RunState::new(start);
        self.winding.clear();
        Ok(())
    }

    fn step<C: Surface + ?Sized>(&mut self, surface: &mut C) {
        if self.table.is_empty() {
            self.state.step += 1;
            return;
        }
        let next = self.pick();
        let from = self.table[self.state.current];
        let drawn = self
            .strands
            .draw(surface, from, self.table[next], self.state.phase)
            .is_some();
        let chord = self.state.advance(next);
        if drawn {
            self.winding.push(chord);
        }
    }

    fn state(&self) -> &RunState<S> {
        &self.state
    }

    fn winding(&self) -> &Winding<S> {
        &self.winding
    }
}
