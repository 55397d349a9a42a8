use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{geometry::Point, Float};

/// Number of sine terms in the overtone and harmonic series.
const OVERTONES: usize = 8;

/// Boundary the pegs are laid on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Circle,
    Square,
    Triangle,
    /// Circle whose radius follows a harmonic series of the peg index, which
    /// gives a scalloped outline.
    Harmonic,
}

/// How the index of a peg maps to its position along the boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    #[default]
    Uniform,
    Random,
    Fibonacci,
    Overtones,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Circle, Shape::Square, Shape::Triangle, Shape::Harmonic];

    /// Vertices of the polygonal shapes, `None` for the round ones.
    fn vertices<S: Float>(self, radius: S, center: Point<S>) -> Option<Vec<Point<S>>> {
        match self {
            Shape::Circle | Shape::Harmonic => None,
            Shape::Square => Some(vec![
                center + Point::new(-radius, -radius),
                center + Point::new(radius, -radius),
                center + Point::new(radius, radius),
                center + Point::new(-radius, radius),
            ]),
            Shape::Triangle => {
                let start = -S::PI * S::HALF;
                let step = S::TAU / S::THREE;
                Some(
                    (0..3)
                        .map(|k| center + Point::polar(radius, start + step * S::from_index(k)))
                        .collect(),
                )
            }
        }
    }
}

impl Distribution {
    pub const ALL: [Distribution; 4] = [
        Distribution::Uniform,
        Distribution::Random,
        Distribution::Fibonacci,
        Distribution::Overtones,
    ];

    /// Parametric position in `[0, 1)` of peg `index` out of `count`.
    pub fn position<S: Float, R: Rng + ?Sized>(self, index: usize, count: usize, rng: &mut R) -> S {
        match self {
            Distribution::Uniform => S::from_index(index) / S::from_index(count),
            Distribution::Random => S::from_f64(rng.gen::<f64>()),
            Distribution::Fibonacci => (S::from_index(index) * S::GOLDEN_RATIO_CONJUGATE).fract(),
            Distribution::Overtones => {
                let x = S::from_index(index) / S::from_index(count);
                let sum = harmonic_sum::<S>();
                (overtone_series(x * S::TAU) + sum) / (S::TWO * sum)
            }
        }
    }

    /// Angle of peg `index` on a circle. Fibonacci uses the golden angle directly.
    pub fn angle<S: Float, R: Rng + ?Sized>(self, index: usize, count: usize, rng: &mut R) -> S {
        match self {
            Distribution::Fibonacci => S::from_index(index) * S::GOLDEN_ANGLE,
            _ => S::TAU * self.position(index, count, rng),
        }
    }
}

/// `Σ 1/k` for the first [`OVERTONES`] harmonics: the amplitude bound of [`overtone_series`].
fn harmonic_sum<S: Float>() -> S {
    (1..=OVERTONES).fold(S::ZERO, |acc, k| acc + S::ONE / S::from_index(k))
}

/// `Σ sin(k·θ)/k` over the first [`OVERTONES`] harmonics.
fn overtone_series<S: Float>(theta: S) -> S {
    (1..=OVERTONES).fold(S::ZERO, |acc, k| {
        let k = S::from_index(k);
        acc + (k * theta).sin() / k
    })
}

/// Lays `count` pegs on `shape` around `center`.
///
/// `radius` is the circle radius for round shapes, the half side for the
/// square and the circumradius for the triangle. Polygons get
/// `count / sides` pegs per side, so the result may hold fewer than `count`
/// pegs.
pub fn generate<S: Float, R: Rng + ?Sized>(
    shape: Shape,
    distribution: Distribution,
    count: usize,
    radius: S,
    center: Point<S>,
    rng: &mut R,
) -> Vec<Point<S>> {
    if count == 0 {
        return Vec::new();
    }
    match shape {
        Shape::Circle => (0..count)
            .map(|i| center + Point::polar(radius, distribution.angle(i, count, rng)))
            .collect(),
        Shape::Harmonic => {
            let sum = harmonic_sum::<S>();
            (0..count)
                .map(|i| {
                    let angle = S::TAU * S::from_index(i) / S::from_index(count);
                    let t: S = distribution.position(i, count, rng);
                    let series = overtone_series(t * S::TAU) / sum;
                    let scale = S::from_f64(0.8) + S::from_f64(0.2) * (series + S::ONE) * S::HALF;
                    center + Point::polar(radius * scale, angle)
                })
                .collect()
        }
        Shape::Square | Shape::Triangle => {
            let vertices = shape.vertices(radius, center).unwrap_or_default();
            let sides = vertices.len();
            let per_side = count / sides;
            let mut pegs = Vec::with_capacity(per_side * sides);
            for (side, &from) in vertices.iter().enumerate() {
                let to = vertices[(side + 1) % sides];
                for j in 0..per_side {
                    pegs.push(from.lerp(to, distribution.position(j, per_side, rng)));
                }
            }
            pegs
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn counts_never_exceed_request() {
        let mut rng = rng();
        for shape in Shape::ALL {
            for distribution in Distribution::ALL {
                for count in [0, 1, 2, 3, 7, 12, 101] {
                    let pegs =
                        generate(shape, distribution, count, 50.0f64, Point::new(50.0, 50.0), &mut rng);
                    assert!(pegs.len() <= count, "{shape:?} {distribution:?} {count}");
                    match shape {
                        Shape::Circle | Shape::Harmonic => assert_eq!(pegs.len(), count),
                        Shape::Square => assert_eq!(pegs.len(), count / 4 * 4),
                        Shape::Triangle => assert_eq!(pegs.len(), count / 3 * 3),
                    }
                }
            }
        }
    }

    #[test]
    fn uniform_pegs_are_distinct() {
        let mut rng = rng();
        for shape in Shape::ALL {
            for count in [2, 5, 12, 60] {
                let pegs = generate(
                    shape,
                    Distribution::Uniform,
                    count,
                    50.0f64,
                    Point::new(50.0, 50.0),
                    &mut rng,
                );
                for (i, a) in pegs.iter().enumerate() {
                    for b in pegs.iter().skip(i + 1) {
                        assert!(a.distance(b) > 1e-9, "{shape:?} {count}: {a} == {b}");
                    }
                }
            }
        }
    }

    #[test]
    fn uniform_circle_starts_at_angle_zero() {
        let pegs = generate(
            Shape::Circle,
            Distribution::Uniform,
            12,
            50.0f64,
            Point::new(50.0, 50.0),
            &mut rng(),
        );
        assert!(pegs[0].distance(&Point::new(100.0, 50.0)) < 1e-9);
        assert!(pegs[3].distance(&Point::new(50.0, 100.0)) < 1e-9);
        assert!(pegs[6].distance(&Point::new(0.0, 50.0)) < 1e-9);
    }

    #[test]
    fn fibonacci_angles_never_repeat_consecutively() {
        let mut rng = rng();
        for i in 0..99 {
            let a: f64 = Distribution::Fibonacci.angle(i, 100, &mut rng);
            let b: f64 = Distribution::Fibonacci.angle(i + 1, 100, &mut rng);
            let delta = (b - a).rem_euclid(core::f64::consts::TAU);
            assert!(delta > 1e-6);
        }
        let pegs = generate(
            Shape::Circle,
            Distribution::Fibonacci,
            100,
            50.0f64,
            Point::new(50.0, 50.0),
            &mut rng,
        );
        for pair in pegs.windows(2) {
            assert!(pair[0].distance(&pair[1]) > 1e-6);
        }
    }

    #[test]
    fn overtones_stay_in_unit_range() {
        let mut rng = rng();
        for i in 0..200 {
            let t: f64 = Distribution::Overtones.position(i, 200, &mut rng);
            assert!((0.0..=1.0).contains(&t));
        }
    }

    #[test]
    fn random_distribution_is_not_repeatable_across_rngs() {
        let a = generate(
            Shape::Circle,
            Distribution::Random,
            16,
            10.0f64,
            Point::new(0.0, 0.0),
            &mut SmallRng::seed_from_u64(1),
        );
        let b = generate(
            Shape::Circle,
            Distribution::Random,
            16,
            10.0f64,
            Point::new(0.0, 0.0),
            &mut SmallRng::seed_from_u64(2),
        );
        assert_ne!(a, b);
    }

    #[test]
    fn harmonic_radius_is_modulated_not_angle() {
        let center = Point::new(0.0f64, 0.0);
        let pegs = generate(Shape::Harmonic, Distribution::Uniform, 64, 100.0, center, &mut rng());
        let mut radii = Vec::new();
        for (i, peg) in pegs.iter().enumerate() {
            let expected = core::f64::consts::TAU * i as f64 / 64.0;
            let angle = peg.y.atan2(peg.x).rem_euclid(core::f64::consts::TAU);
            assert!((angle - expected).abs() < 1e-9);
            let r = peg.distance(&center);
            assert!((80.0 - 1e-9..=100.0 + 1e-9).contains(&r));
            radii.push(r);
        }
        let min = radii.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = radii.iter().cloned().fold(0.0, f64::max);
        assert!(max - min > 1.0);
    }

    #[test]
    fn polygon_pegs_lie_on_their_sides() {
        let pegs = generate(
            Shape::Square,
            Distribution::Fibonacci,
            40,
            10.0f64,
            Point::new(10.0, 10.0),
            &mut rng(),
        );
        for peg in pegs {
            let on_x = peg.x.abs() < 1e-9 || (peg.x - 20.0).abs() < 1e-9;
            let on_y = peg.y.abs() < 1e-9 || (peg.y - 20.0).abs() < 1e-9;
            assert!(on_x || on_y, "{peg}");
        }
    }
}
