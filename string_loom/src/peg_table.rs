use std::ops::{Index, Range};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    geometry::Point,
    shape::{self, Distribution, Shape},
    verboser::{Message, Verboser},
    Float,
};

/// Largest inner ring, as a percentage of the outer one.
pub const MAX_INNER_SIZE: u8 = 100;

/// Second, concentric ring of pegs appended after the outer one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InnerRing {
    pub shape: Shape,
    pub distribution: Distribution,
    /// Percentage of the outer radius and of the outer peg count, at most [`MAX_INNER_SIZE`].
    pub size: u8,
    /// Whether a chord may join two pegs of the inner ring.
    pub connect_inner: bool,
}

impl Default for InnerRing {
    fn default() -> Self {
        Self {
            shape: Shape::Circle,
            distribution: Distribution::Uniform,
            size: 50,
            connect_inner: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub pegs: usize,
    pub shape: Shape,
    pub distribution: Distribution,
    pub inner: Option<InnerRing>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            pegs: 200,
            shape: Shape::Circle,
            distribution: Distribution::Uniform,
            inner: None,
        }
    }
}

/// Peg positions of one run. Outer ring first, then the inner ring if any.
#[derive(Clone, Debug, PartialEq)]
pub struct PegTable<S = f64> {
    pegs: Vec<Point<S>>,
    outer: usize,
    connect_inner: bool,
}

impl<S: Float> PegTable<S> {
    /// Lays the pegs of `config` on a square canvas of `size` pixels, centered,
    /// with the outer ring touching the canvas edges.
    pub fn new<R: Rng + ?Sized>(
        config: &TableConfig,
        size: usize,
        rng: &mut R,
        verboser: &mut impl Verboser,
    ) -> Self {
        let radius = S::from_index(size) * S::HALF;
        let center = Point::new(radius, radius);
        let outer = shape::generate(
            config.shape,
            config.distribution,
            config.pegs,
            radius,
            center,
            rng,
        );
        let inner = match config.inner {
            Some(ring) => {
                let size = ring.size.min(MAX_INNER_SIZE) as usize;
                let ratio = S::from_index(size) / S::HUNDRED;
                let count = config.pegs * size / 100;
                shape::generate(ring.shape, ring.distribution, count, radius * ratio, center, rng)
            }
            None => Vec::new(),
        };
        let table = Self::with_rings(
            outer,
            inner,
            config.inner.is_some_and(|ring| ring.connect_inner),
        );
        debug!(
            outer = table.outer,
            inner = table.len() - table.outer,
            shape = ?config.shape,
            distribution = ?config.distribution,
            "peg table generated"
        );
        verboser.verbose(Message::CreatingPegs(table.len()));
        table
    }

    pub fn with_rings(outer: Vec<Point<S>>, inner: Vec<Point<S>>, connect_inner: bool) -> Self {
        let outer_len = outer.len();
        let mut pegs = outer;
        pegs.extend(inner);
        Self {
            pegs,
            outer: outer_len,
            connect_inner,
        }
    }

    pub fn pegs(&self) -> &[Point<S>] {
        &self.pegs
    }

    pub fn get(&self, idx: usize) -> Option<&Point<S>> {
        self.pegs.get(idx)
    }

    pub fn len(&self) -> usize {
        self.pegs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pegs.is_empty()
    }

    pub fn outer(&self) -> Range<usize> {
        0..self.outer
    }

    pub fn inner(&self) -> Range<usize> {
        self.outer..self.pegs.len()
    }

    pub fn is_inner(&self, idx: usize) -> bool {
        idx >= self.outer
    }

    /// Ring holding `idx`.
    pub fn ring(&self, idx: usize) -> Range<usize> {
        if self.is_inner(idx) {
            self.inner()
        } else {
            self.outer()
        }
    }

    /// Whether a chord between `a` and `b` is permitted. Only inner to inner
    /// chords can be forbidden.
    pub fn allows(&self, a: usize, b: usize) -> bool {
        self.connect_inner || !(self.is_inner(a) && self.is_inner(b))
    }

    /// Index `offset` steps away from `idx`, wrapping around the ring of `idx`.
    pub fn wrap(&self, idx: usize, offset: isize) -> usize {
        let ring = self.ring(idx);
        let len = ring.len() as isize;
        if len == 0 {
            return idx;
        }
        let local = (idx - ring.start) as isize;
        ring.start + (local + offset).rem_euclid(len) as usize
    }
}

impl<S> Index<usize> for PegTable<S> {
    type Output = Point<S>;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.pegs[idx]
    }
}
