use super::Point;
use crate::Float;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment<T> {
    pub start: Point<T>,
    pub end: Point<T>,
}

impl<T: fmt::Display> fmt::Display for Segment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:2}, {:2}]", self.start, self.end)
    }
}

impl<T> Segment<T> {
    pub fn new(start: Point<T>, end: Point<T>) -> Self {
        Self { start, end }
    }
}

impl<T: Float> Segment<T> {
    pub fn length(&self) -> T {
        self.start.distance(&self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() < T::EPSILON
    }

    pub fn point_at(&self, t: T) -> Point<T> {
        self.start.lerp(self.end, t)
    }

    /// Copy of the segment shifted sideways by `distance` along its left normal.
    /// Degenerate segments are returned unchanged.
    pub fn parallel_at_distance(&self, distance: T) -> Self {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let length = num_traits::Float::sqrt(dx * dx + dy * dy);
        if length < T::EPSILON {
            return *self;
        }
        let ux = dx / length;
        let uy = dy / length;

        let offset = Point {
            x: -uy * distance,
            y: ux * distance,
        };

        Segment::new(self.start + offset, self.end + offset)
    }
}
