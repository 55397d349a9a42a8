use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Point, Segment},
    Float,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T = usize> {
    pub height: T,
    pub width: T,
}

impl<T> Grid<T> {
    pub fn new(height: T, width: T) -> Self {
        Self { height, width }
    }
}

impl Grid {
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index_of(&self, point: Point<usize>) -> Option<usize> {
        if point.x < self.width && point.y < self.height {
            Some(point.y * self.width + point.x)
        } else {
            None
        }
    }

    /// Same as [`Self::index_of`] for signed pixel coordinates; negative ones are outside.
    pub fn checked_index_of(&self, point: Point<isize>) -> Option<usize> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        self.index_of(Point { x, y })
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Axis aligned pixel rectangle, `x..x + width` by `y..y + height`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, point: Point<isize>) -> bool {
        point.x >= self.x as isize
            && point.y >= self.y as isize
            && point.x < (self.x + self.width) as isize
            && point.y < (self.y + self.height) as isize
    }

    pub fn clip(&self, grid: &Grid) -> Self {
        let x = self.x.min(grid.width);
        let y = self.y.min(grid.height);
        Rect {
            x,
            y,
            width: self.width.min(grid.width - x),
            height: self.height.min(grid.height - y),
        }
    }

    pub fn points(&self) -> impl Iterator<Item = Point<usize>> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| Point { x, y }))
    }

    /// Pixels covered by `segment` widened by `pad` on every side, clipped to `grid`.
    /// Returns `None` when nothing is left after clipping.
    pub fn around<S: Float>(segment: &Segment<S>, pad: S, grid: &Grid) -> Option<Self> {
        let min_x = (segment.start.x.min(segment.end.x) - pad).floor();
        let min_y = (segment.start.y.min(segment.end.y) - pad).floor();
        let max_x = (segment.start.x.max(segment.end.x) + pad).ceil();
        let max_y = (segment.start.y.max(segment.end.y) + pad).ceil();

        let clip = |value: S, len: usize| -> Option<usize> {
            let value = value.to_isize()?;
            Some(value.clamp(0, len as isize) as usize)
        };
        let x0 = clip(min_x, grid.width)?;
        let y0 = clip(min_y, grid.height)?;
        // inclusive max pixel, hence the + 1
        let x1 = clip(max_x + S::ONE, grid.width)?;
        let y1 = clip(max_y + S::ONE, grid.height)?;

        let rect = Rect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        };
        (!rect.is_empty()).then_some(rect)
    }
}
