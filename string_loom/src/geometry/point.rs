use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::Float;

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T> Add for Point<T>
where
    T: Add<Output = T>,
{
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl<T> Sub for Point<T>
where
    T: Sub<Output = T>,
{
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl<T> Mul<T> for Point<T>
where
    T: Mul<Output = T> + Clone,
{
    type Output = Self;

    fn mul(self, scalar: T) -> Self {
        Point {
            x: self.x * scalar.clone(),
            y: self.y * scalar,
        }
    }
}

impl<T> AddAssign for Point<T>
where
    T: AddAssign,
{
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl<T: Neg> Neg for Point<T> {
    type Output = Point<T::Output>;

    fn neg(self) -> Self::Output {
        Point {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl<T: Float> Point<T> {
    /// Point at `radius` from the origin in direction `angle` (radians, y pointing down).
    pub fn polar(radius: T, angle: T) -> Self {
        Self {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        }
    }

    pub fn sq_distance(&self, other: &Self) -> T {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> T {
        num_traits::Float::sqrt(self.sq_distance(other))
    }

    pub fn aprox_eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < T::EPSILON && (self.y - other.y).abs() < T::EPSILON
    }

    /// Linear interpolation, `t = 0` is `self` and `t = 1` is `other`.
    pub fn lerp(self, other: Self, t: T) -> Self {
        self + (other - self) * t
    }

    /// Nearest pixel, `None` when the rounded coordinates do not fit an `isize`.
    pub fn round(&self) -> Option<Point<isize>> {
        Some(Point {
            x: self.x.round().to_isize()?,
            y: self.y.round().to_isize()?,
        })
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Point<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:2}, {:2})", self.x, self.y)
    }
}
