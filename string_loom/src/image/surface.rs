use image::{Rgba, RgbaImage};

use super::{PixelData, RgbaBuffer, BLACK};
use crate::{
    color::luma,
    geometry::Point,
    grid::{Grid, Rect},
    Float,
};

/// Raster the strands are composited onto. Everything goes through whole
/// regions: read, modify in memory, write back.
pub trait Surface {
    fn grid(&self) -> Grid;

    fn fill(&mut self, rect: Rect, color: Rgba<u8>);

    fn read_region(&self, rect: Rect) -> Region;

    fn write_region(&mut self, region: &Region);

    fn clear(&mut self) {
        let bounds = self.grid().bounds();
        self.fill(bounds, BLACK);
    }
}

/// Detached copy of a rectangle of a [`Surface`], addressed in surface coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    rect: Rect,
    pixels: Vec<Rgba<u8>>,
}

impl Region {
    pub fn new(rect: Rect, mut read: impl FnMut(Point<usize>) -> Rgba<u8>) -> Self {
        Self {
            pixels: rect.points().map(&mut read).collect(),
            rect,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn pixels(&self) -> &[Rgba<u8>] {
        &self.pixels
    }

    /// Pixels with their surface coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Point<usize>, &Rgba<u8>)> + '_ {
        self.rect.points().zip(self.pixels.iter())
    }

    fn offset_of(&self, point: Point<isize>) -> Option<usize> {
        if !self.rect.contains(point) {
            return None;
        }
        let x = point.x as usize - self.rect.x;
        let y = point.y as usize - self.rect.y;
        Some(y * self.rect.width + x)
    }

    pub fn get(&self, point: Point<isize>) -> Option<&Rgba<u8>> {
        self.offset_of(point).and_then(|idx| self.pixels.get(idx))
    }

    pub fn get_mut(&mut self, point: Point<isize>) -> Option<&mut Rgba<u8>> {
        self.offset_of(point).and_then(|idx| self.pixels.get_mut(idx))
    }

    /// Mean absolute difference between the luminance of this region and
    /// `target` over the same pixels. Infinite when nothing overlaps.
    pub fn luma_error<S: Float>(&self, target: &PixelData<S>) -> S {
        let mut error = S::ZERO;
        let mut count = 0usize;
        for (point, pixel) in self.iter() {
            if let Some(&expected) = target.get(point) {
                error += (luma::<S>(pixel) - expected).abs();
                count += 1;
            }
        }
        if count > 0 {
            error / S::from_index(count)
        } else {
            S::INFINITY
        }
    }
}

impl Surface for RgbaBuffer {
    fn grid(&self) -> Grid {
        *PixelData::grid(self)
    }

    fn fill(&mut self, rect: Rect, color: Rgba<u8>) {
        let rect = rect.clip(&self.grid);
        for point in rect.points() {
            if let Some(pixel) = self.get_mut(point) {
                *pixel = color;
            }
        }
    }

    fn read_region(&self, rect: Rect) -> Region {
        Region::new(rect.clip(&self.grid), |point| {
            self.get(point).copied().unwrap_or(BLACK)
        })
    }

    fn write_region(&mut self, region: &Region) {
        for (point, pixel) in region.iter() {
            if let Some(target) = self.get_mut(point) {
                *target = *pixel;
            }
        }
    }
}

impl Surface for RgbaImage {
    fn grid(&self) -> Grid {
        Grid::new(self.height() as usize, self.width() as usize)
    }

    fn fill(&mut self, rect: Rect, color: Rgba<u8>) {
        let rect = rect.clip(&Surface::grid(self));
        for point in rect.points() {
            self.put_pixel(point.x as u32, point.y as u32, color);
        }
    }

    fn read_region(&self, rect: Rect) -> Region {
        Region::new(rect.clip(&Surface::grid(self)), |point| {
            *self.get_pixel(point.x as u32, point.y as u32)
        })
    }

    fn write_region(&mut self, region: &Region) {
        let grid = Surface::grid(self);
        for (point, pixel) in region.iter() {
            if grid.index_of(point).is_some() {
                self.put_pixel(point.x as u32, point.y as u32, *pixel);
            }
        }
    }
}
