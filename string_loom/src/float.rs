use std::{
    fmt::{Debug, Display},
    ops::{AddAssign, DivAssign, MulAssign, SubAssign},
};

use num_traits::{ConstOne, ConstZero};

pub trait Float:
    'static
    + Debug
    + Display
    + Sync
    + Send
    + Default
    + Into<svg::node::Value>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + num_traits::Float
    + num_traits::NumCast
    + ConstZero
    + ConstOne
{
    const HALF: Self;
    const EPSILON: Self;
    const INFINITY: Self;
    const TWO: Self;
    const THREE: Self;
    const FOUR: Self;
    const PI: Self;
    const TAU: Self;
    const TWO_FIVE_FIVE: Self;
    const HUNDRED: Self;
    /// (√5 - 1) / 2
    const GOLDEN_RATIO_CONJUGATE: Self;
    /// π (3 - √5)
    const GOLDEN_ANGLE: Self;

    const PASTEL_AMPLITUDE: Self;
    const PASTEL_BASE: Self;
    const STRAND_WIDTH: Self;
    const PHASE_STEP: Self;

    fn from_index(index: usize) -> Self;

    fn from_f64(value: f64) -> Self;
}

impl Float for f32 {
    const HALF: Self = 0.5;
    const EPSILON: Self = f32::EPSILON;
    const INFINITY: Self = f32::INFINITY;
    const TWO: Self = 2.0;
    const THREE: Self = 3.0;
    const FOUR: Self = 4.0;
    const PI: Self = core::f32::consts::PI;
    const TAU: Self = core::f32::consts::TAU;
    const TWO_FIVE_FIVE: Self = 255.0;
    const HUNDRED: Self = 100.0;
    const GOLDEN_RATIO_CONJUGATE: Self = 0.618_034;
    const GOLDEN_ANGLE: Self = 2.399_963_2;

    const PASTEL_AMPLITUDE: Self = 64.0;
    const PASTEL_BASE: Self = 191.0;
    const STRAND_WIDTH: Self = 0.035;
    const PHASE_STEP: Self = 0.1;

    fn from_index(index: usize) -> Self {
        index as f32
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Float for f64 {
    const HALF: Self = 0.5;
    const EPSILON: Self = f64::EPSILON;
    const INFINITY: Self = f64::INFINITY;
    const TWO: Self = 2.0;
    const THREE: Self = 3.0;
    const FOUR: Self = 4.0;
    const PI: Self = core::f64::consts::PI;
    const TAU: Self = core::f64::consts::TAU;
    const TWO_FIVE_FIVE: Self = 255.0;
    const HUNDRED: Self = 100.0;
    const GOLDEN_RATIO_CONJUGATE: Self = 0.618_033_988_749_894_8;
    const GOLDEN_ANGLE: Self = 2.399_963_229_728_653;

    const PASTEL_AMPLITUDE: Self = 64.0;
    const PASTEL_BASE: Self = 191.0;
    const STRAND_WIDTH: Self = 0.035;
    const PHASE_STEP: Self = 0.1;

    fn from_index(index: usize) -> Self {
        index as f64
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}
