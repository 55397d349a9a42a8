use serde::{Deserialize, Serialize};

use crate::{
    color::{pastel_turns, Rgb},
    geometry::{Point, Segment},
    grid::{Grid, Rect},
    image::{Region, Surface},
    Float,
};

/// Fewest samples taken along a chord, whatever its length.
pub const MIN_SAMPLES: usize = 100;

/// How a strand sample is mixed into the pixel under it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blend {
    /// `min(255, (old + 3·new) / 4)`: colors pile up quickly, for decorative windings.
    Accumulate,
    /// `(old + new) / 2`: keeps the luminance close to what was there, for approximations.
    Average,
}

impl Blend {
    pub fn apply<S: Float>(self, old: u8, new: S) -> u8 {
        let old = S::from_index(old as usize);
        let mixed = match self {
            Blend::Accumulate => (old + new * S::THREE) / S::FOUR,
            Blend::Average => (old + new) * S::HALF,
        };
        mixed
            .round()
            .max(S::ZERO)
            .min(S::TWO_FIVE_FIVE)
            .to_u8()
            .unwrap_or(u8::MAX)
    }
}

/// A chord drawn as `count` parallel strands `width` pixels apart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strands<S> {
    pub count: usize,
    pub width: S,
    pub blend: Blend,
}

impl<S: Float> Strands<S> {
    /// Five close strands accumulating toward the pastel color.
    pub fn pastel() -> Self {
        Self {
            count: 5,
            width: S::STRAND_WIDTH,
            blend: Blend::Accumulate,
        }
    }

    /// A single averaged strand, so the rendered luminance can track a target.
    pub fn approximation() -> Self {
        Self {
            count: 1,
            width: S::STRAND_WIDTH,
            blend: Blend::Average,
        }
    }

    /// Distance from the chord to its outermost strand.
    fn half_width(&self) -> S {
        S::from_index(self.count.saturating_sub(1)) * S::HALF * self.width
    }

    /// Pixels a chord from `a` to `b` may touch, padded by one pixel and clipped
    /// to `grid`. `None` for zero length chords or chords fully outside.
    pub fn region(&self, a: Point<S>, b: Point<S>, grid: &Grid) -> Option<Rect> {
        let chord = Segment::new(a, b);
        if chord.is_degenerate() {
            return None;
        }
        Rect::around(&chord, S::ONE + self.half_width(), grid)
    }

    /// Composites the chord into `region`. Samples falling outside the region are dropped.
    pub fn composite(&self, region: &mut Region, a: Point<S>, b: Point<S>, phase: S) {
        let chord = Segment::new(a, b);
        let length = chord.length();
        if length < S::EPSILON {
            return;
        }
        let steps = length.floor().to_usize().unwrap_or(0).max(MIN_SAMPLES);
        let last = S::from_index(steps - 1);
        let middle = S::from_index(self.count.saturating_sub(1)) * S::HALF;

        for strand in 0..self.count {
            let offset = (S::from_index(strand) - middle) * self.width;
            let line = chord.parallel_at_distance(offset);
            for i in 0..steps {
                let t = S::from_index(i) / last;
                let Some(pixel) = line.point_at(t).round() else {
                    continue;
                };
                let Some(target) = region.get_mut(pixel) else {
                    continue;
                };
                let Rgb(r, g, b) = pastel_turns((phase + t * S::TWO).fract());
                let [old_r, old_g, old_b, _] = target.0;
                target.0 = [
                    self.blend.apply(old_r, r),
                    self.blend.apply(old_g, g),
                    self.blend.apply(old_b, b),
                    u8::MAX,
                ];
            }
        }
    }

    /// Reads the chord's region from `surface`, composites and writes it back.
    /// Returns the region touched, `None` when nothing was drawn.
    pub fn draw<C: Surface + ?Sized>(
        &self,
        surface: &mut C,
        a: Point<S>,
        b: Point<S>,
        phase: S,
    ) -> Option<Rect> {
        let rect = self.region(a, b, &surface.grid())?;
        let mut region = surface.read_region(rect);
        self.composite(&mut region, a, b, phase);
        surface.write_region(&region);
        Some(rect)
    }
}
