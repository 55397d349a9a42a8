use num_traits::ToPrimitive;
use rand::{seq::index, Rng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    algorithm::{Driver, Error, RunState},
    grid::Grid,
    image::{PixelData, RgbaBuffer, Surface},
    peg_table::PegTable,
    strands::Strands,
    winding::Winding,
    Float,
};

/// Fewest random candidates drawn in the first stage.
pub const MIN_CANDIDATES: usize = 15;
/// Share of the table drawn in the first stage.
pub const CANDIDATE_RATIO: f64 = 0.035;
/// Fewest offsets tried around the best first stage candidate.
pub const MIN_REFINEMENTS: usize = 4;
/// Share of the first stage count tried around the best candidate.
pub const REFINEMENT_RATIO: f64 = 0.1;
/// Share of the table scanned exhaustively around the best candidate.
pub const NEIGHBOURHOOD_RATIO: f64 = 0.002;

/// Peg the approximation starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPeg {
    #[default]
    First,
    Random,
}

/// A peg together with the local error its chord would leave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate<S> {
    pub peg: usize,
    pub error: S,
}

/// What one step looked at.
#[derive(Clone, Debug, PartialEq)]
pub struct Search<S> {
    pub from: usize,
    /// Valid first stage candidates in draw order.
    pub sampled: Vec<Candidate<S>>,
    /// Candidate committed at the end of the step, `None` after a fallback jump.
    pub best: Option<Candidate<S>>,
}

/// Candidate counts of the three search stages for a table of `pegs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Budget {
    pub initial: usize,
    pub refined: usize,
    pub window: usize,
    pub neighbourhood: usize,
}

impl Budget {
    pub fn new(pegs: usize) -> Self {
        let initial = ratio(pegs, CANDIDATE_RATIO).max(MIN_CANDIDATES);
        Self {
            initial,
            refined: ratio(initial, REFINEMENT_RATIO).max(MIN_REFINEMENTS),
            window: pegs / 20,
            neighbourhood: ratio(pegs, NEIGHBOURHOOD_RATIO).max(1),
        }
    }
}

fn ratio(count: usize, ratio: f64) -> usize {
    (count as f64 * ratio).round().to_usize().unwrap_or(0)
}

/// Greedy winding approaching the luminance of a target image.
///
/// Each step scores candidate chords from the current peg on a scratch copy of
/// their region and commits the one leaving the lowest mean luminance error.
pub struct Approximation<'a, S, R> {
    table: &'a PegTable<S>,
    target: PixelData<S>,
    strands: Strands<S>,
    start: StartPeg,
    budget: Budget,
    state: RunState<S>,
    winding: Winding<S>,
    last_search: Option<Search<S>>,
    rng: R,
}

impl<'a, S: Float, R: Rng> Approximation<'a, S, R> {
    pub fn new(table: &'a PegTable<S>, target: &RgbaBuffer, rng: R, start: StartPeg) -> Self {
        Self {
            table,
            target: target.luma(),
            strands: Strands::approximation(),
            start,
            budget: Budget::new(table.len()),
            state: RunState::new(0),
            winding: Winding::default(),
            last_search: None,
            rng,
        }
    }

    pub fn with_strands(mut self, strands: Strands<S>) -> Self {
        self.strands = strands;
        self
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    pub fn last_search(&self) -> Option<&Search<S>> {
        self.last_search.as_ref()
    }

    /// Local error left by a chord from the current peg to `peg`, `None` when
    /// the chord is not allowed or would draw nothing.
    fn score<C: Surface + ?Sized>(&self, surface: &C, peg: usize) -> Option<Candidate<S>> {
        let from = self.state.current;
        if peg == from || !self.table.allows(from, peg) {
            return None;
        }
        let (a, b) = (*self.table.get(from)?, *self.table.get(peg)?);
        let rect = self.strands.region(a, b, &surface.grid())?;
        let mut scratch = surface.read_region(rect);
        self.strands.composite(&mut scratch, a, b, self.state.phase);
        Some(Candidate {
            peg,
            error: scratch.luma_error(&self.target),
        })
    }

    /// Keeps `candidate` if it beats `best` strictly.
    fn challenge(best: &mut Candidate<S>, candidate: Option<Candidate<S>>) {
        if let Some(candidate) = candidate {
            if candidate.error < best.error {
                *best = candidate;
            }
        }
    }

    fn search<C: Surface + ?Sized>(&mut self, surface: &C) -> Search<S> {
        let from = self.state.current;
        let len = self.table.len();

        let amount = self.budget.initial.min(len - 1);
        let sampled: Vec<_> = index::sample(&mut self.rng, len - 1, amount)
            .into_iter()
            .map(|i| if i >= from { i + 1 } else { i })
            .filter_map(|peg| self.score(surface, peg))
            .collect();
        let Some(mut best) = sampled
            .iter()
            .copied()
            .reduce(|best, candidate| if candidate.error < best.error { candidate } else { best })
        else {
            return Search {
                from,
                sampled,
                best: None,
            };
        };

        let half = (self.budget.window / 2) as isize;
        let anchor = best.peg;
        for _ in 0..self.budget.refined {
            let offset = self.rng.gen_range(-half..=half);
            let peg = self.table.wrap(anchor, offset);
            Self::challenge(&mut best, self.score(surface, peg));
        }

        let anchor = best.peg;
        let reach = self.budget.neighbourhood as isize;
        for offset in (-reach..=reach).filter(|offset| *offset != 0) {
            let peg = self.table.wrap(anchor, offset);
            Self::challenge(&mut best, self.score(surface, peg));
        }

        Search {
            from,
            sampled,
            best: Some(best),
        }
    }
}

impl<S: Float, R: Rng> Driver for Approximation<'_, S, R> {
    type Scalar = S;

    fn begin(&mut self, grid: &Grid) -> Result<(), Error> {
        let target = *self.target.grid();
        if target != *grid {
            return Err(Error::TargetSize {
                target,
                canvas: *grid,
            });
        }
        let start = match self.start {
            StartPeg::Random if !self.table.is_empty() => self.rng.gen_range(0..self.table.len()),
            _ => 0,
        };
        self.state = RunState::new(start);
        self.winding.clear();
        self.last_search = None;
        debug!(start, budget = ?self.budget, "approximation started");
        Ok(())
    }

    fn step<C: Surface + ?Sized>(&mut self, surface: &mut C) {
        let len = self.table.len();
        if len < 2 {
            self.state.step += 1;
            return;
        }
        let search = self.search(surface);
        match search.best {
            Some(best) => {
                let from = self.table[self.state.current];
                self.strands
                    .draw(surface, from, self.table[best.peg], self.state.phase);
                let chord = self.state.advance(best.peg);
                trace!(from = chord.from, to = chord.to, error = %best.error, "chord committed");
                self.winding.push(chord);
            }
            None => {
                let peg = self.rng.gen_range(0..len);
                debug!(from = search.from, to = peg, "no valid candidate, jumping");
                self.state.jump(peg);
            }
        }
        self.last_search = Some(search);
    }

    fn state(&self) -> &RunState<S> {
        &self.state
    }

    fn winding(&self) -> &Winding<S> {
        &self.winding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithm::{run, Status},
        control::Control,
        geometry::Point,
        image::BLACK,
        peg_table::{InnerRing, TableConfig},
        verboser::Silent,
    };
    use image::Rgba;
    use rand::{rngs::SmallRng, SeedableRng};

    fn table(config: TableConfig, size: usize) -> PegTable<f64> {
        PegTable::new(&config, size, &mut SmallRng::seed_from_u64(0), &mut Silent)
    }

    #[test]
    fn budget_follows_table_size() {
        assert_eq!(
            Budget::new(200),
            Budget {
                initial: 15,
                refined: 4,
                window: 10,
                neighbourhood: 1,
            }
        );
        assert_eq!(
            Budget::new(1000),
            Budget {
                initial: 35,
                refined: 4,
                window: 50,
                neighbourhood: 2,
            }
        );
        assert_eq!(Budget::new(3000).refined, 11);
    }

    #[test]
    fn mismatched_target_is_rejected() {
        let table = table(TableConfig::default(), 50);
        let target = RgbaBuffer::black(Grid::square(40));
        let mut driver =
            Approximation::new(&table, &target, SmallRng::seed_from_u64(0), StartPeg::First);
        let mut canvas = RgbaBuffer::black(Grid::square(50));
        let result = run(&mut driver, &mut canvas, 5, &Control::default(), &mut Silent);
        assert!(matches!(result, Err(Error::TargetSize { .. })));
    }

    #[test]
    fn black_target_commits_the_least_bad_candidate() {
        let table = table(
            TableConfig {
                pegs: 60,
                ..Default::default()
            },
            80,
        );
        let target = RgbaBuffer::black(Grid::square(80));
        let mut driver =
            Approximation::new(&table, &target, SmallRng::seed_from_u64(9), StartPeg::First);
        let mut canvas = RgbaBuffer::black(Grid::square(80));
        driver.begin(&Grid::square(80)).unwrap();

        for _ in 0..10 {
            driver.step(&mut canvas);
            let search = driver.last_search().unwrap();
            let best = search.best.unwrap();
            let min = search
                .sampled
                .iter()
                .map(|c| c.error)
                .fold(f64::INFINITY, f64::min);
            assert!(best.error <= min);
            assert!(search.sampled.iter().all(|c| c.peg != search.from));
            assert_eq!(driver.state().current, best.peg);

            let chord = *driver.winding().chords().last().unwrap();
            assert_eq!((chord.from, chord.to), (search.from, best.peg));
            let rect = Strands::approximation()
                .region(table[chord.from], table[chord.to], &Grid::square(80))
                .unwrap();
            let committed = canvas.read_region(rect).luma_error(&target.luma::<f64>());
            assert_eq!(committed, best.error);
            assert!(committed <= min);
        }
        assert_eq!(driver.winding().len(), 10);
    }

    #[test]
    fn first_stage_draws_distinct_candidates() {
        let table = table(
            TableConfig {
                pegs: 40,
                ..Default::default()
            },
            60,
        );
        let target = RgbaBuffer::black(Grid::square(60));
        let mut driver =
            Approximation::new(&table, &target, SmallRng::seed_from_u64(2), StartPeg::Random);
        let mut canvas = RgbaBuffer::black(Grid::square(60));
        driver.begin(&Grid::square(60)).unwrap();
        driver.step(&mut canvas);
        let search = driver.last_search().unwrap();
        let mut pegs: Vec<_> = search.sampled.iter().map(|c| c.peg).collect();
        pegs.sort_unstable();
        pegs.dedup();
        assert_eq!(pegs.len(), 15);
    }

    #[test]
    fn bright_diagonal_attracts_the_chord() {
        let size = 40;
        let table = PegTable::with_rings(
            vec![
                Point::new(2.0, 2.0),
                Point::new(37.0, 37.0),
                Point::new(37.0, 2.0),
                Point::new(2.0, 37.0),
                Point::new(20.0, 2.0),
            ],
            Vec::new(),
            false,
        );
        let target = RgbaBuffer::new(
            |p| {
                if p.x.abs_diff(p.y) <= 1 {
                    Rgba([255, 255, 255, 255])
                } else {
                    BLACK
                }
            },
            Grid::square(size),
        );
        let mut driver =
            Approximation::new(&table, &target, SmallRng::seed_from_u64(1), StartPeg::First);
        let mut canvas = RgbaBuffer::black(Grid::square(size));
        driver.begin(&Grid::square(size)).unwrap();
        driver.step(&mut canvas);
        assert_eq!(driver.winding().chords()[0].to, 1);
    }

    #[test]
    fn isolated_inner_peg_falls_back_to_a_jump() {
        let table = PegTable::with_rings(
            Vec::new(),
            vec![Point::new(5.0, 5.0), Point::new(15.0, 15.0)],
            false,
        );
        let target = RgbaBuffer::black(Grid::square(20));
        let mut driver =
            Approximation::new(&table, &target, SmallRng::seed_from_u64(0), StartPeg::First);
        let mut canvas = RgbaBuffer::black(Grid::square(20));
        let status = run(&mut driver, &mut canvas, 4, &Control::default(), &mut Silent).unwrap();
        assert_eq!(status, Status::Completed);
        assert!(driver.winding().is_empty());
        assert_eq!(driver.state().step, 4);
        assert_eq!(driver.last_search().unwrap().best, None);
        assert_eq!(canvas, RgbaBuffer::black(Grid::square(20)));
    }

    #[test]
    fn inner_ring_chords_respect_the_table() {
        let table = table(
            TableConfig {
                pegs: 50,
                inner: Some(InnerRing {
                    size: 40,
                    ..Default::default()
                }),
                ..Default::default()
            },
            60,
        );
        let target = RgbaBuffer::filled(Rgba([128, 128, 128, 255]), Grid::square(60));
        let mut driver =
            Approximation::new(&table, &target, SmallRng::seed_from_u64(4), StartPeg::Random);
        let mut canvas = RgbaBuffer::black(Grid::square(60));
        run(&mut driver, &mut canvas, 40, &Control::default(), &mut Silent).unwrap();
        for chord in driver.winding() {
            assert!(table.allows(chord.from, chord.to));
            assert_ne!(chord.from, chord.to);
        }
    }
}
