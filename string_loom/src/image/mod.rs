use crate::{color::luma, geometry::Point, Float, Grid};
use image::{DynamicImage, GrayImage, Rgba, RgbaImage};
use std::ops::Deref;

mod surface;

pub use surface::{Region, Surface};

/// Opaque black, the background every run starts from.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, u8::MAX]);

#[derive(Clone, Debug, PartialEq)]
pub struct PixelData<T> {
    pixels: Vec<T>,
    grid: Grid,
}

impl<T> PixelData<T> {
    /// Wraps row-major `pixels`; `None` when their count does not match `grid`.
    pub fn from_raw(pixels: Vec<T>, grid: Grid) -> Option<Self> {
        (pixels.len() == grid.len()).then_some(Self { pixels, grid })
    }

    pub fn new(mut builder: impl FnMut(Point<usize>) -> T, grid: Grid) -> Self {
        let mut pixels = Vec::with_capacity(grid.len());
        for y in 0..grid.height {
            for x in 0..grid.width {
                pixels.push(builder(Point { x, y }));
            }
        }
        Self { pixels, grid }
    }

    pub fn filled(value: T, grid: Grid) -> Self
    where
        T: Clone,
    {
        Self {
            pixels: vec![value; grid.len()],
            grid,
        }
    }

    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    pub fn get(&self, index: impl ImageIndexer) -> Option<&T> {
        index.get(self)
    }

    pub fn get_mut(&mut self, index: impl ImageIndexer) -> Option<&mut T> {
        index.get_mut(self)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> PixelData<U> {
        PixelData {
            pixels: self.pixels.iter().map(f).collect(),
            grid: self.grid,
        }
    }
}

impl<T> Deref for PixelData<T> {
    type Target = Grid;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}

/// Work and target buffers: row-major RGBA, one byte per channel.
pub type RgbaBuffer = PixelData<Rgba<u8>>;

impl RgbaBuffer {
    pub fn black(grid: Grid) -> Self {
        Self::filled(BLACK, grid)
    }

    /// Per-pixel luminance, computed once so candidate scoring only reads floats.
    pub fn luma<S: Float>(&self) -> PixelData<S> {
        self.map(luma::<S>)
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            self.get(Point {
                x: x as usize,
                y: y as usize,
            })
            .copied()
            .unwrap_or(BLACK)
        })
    }
}

impl From<RgbaImage> for RgbaBuffer {
    fn from(value: RgbaImage) -> Self {
        Self {
            grid: Grid {
                height: value.height() as usize,
                width: value.width() as usize,
            },
            pixels: value.pixels().copied().collect(),
        }
    }
}

impl From<&RgbaImage> for RgbaBuffer {
    fn from(value: &RgbaImage) -> Self {
        Self {
            grid: Grid {
                height: value.height() as usize,
                width: value.width() as usize,
            },
            pixels: value.pixels().copied().collect(),
        }
    }
}

impl From<GrayImage> for RgbaBuffer {
    fn from(value: GrayImage) -> Self {
        Self {
            grid: Grid {
                height: value.height() as usize,
                width: value.width() as usize,
            },
            pixels: value
                .pixels()
                .map(|pixel| Rgba([pixel.0[0], pixel.0[0], pixel.0[0], u8::MAX]))
                .collect(),
        }
    }
}

impl From<DynamicImage> for RgbaBuffer {
    fn from(value: DynamicImage) -> Self {
        value.into_rgba8().into()
    }
}

pub trait ImageIndexer {
    fn get_mut<T>(self, image: &mut PixelData<T>) -> Option<&mut T>;

    fn get<T>(self, image: &PixelData<T>) -> Option<&T>;
}

impl ImageIndexer for usize {
    fn get_mut<T>(self, image: &mut PixelData<T>) -> Option<&mut T> {
        image.pixels.get_mut(self)
    }

    fn get<T>(self, image: &PixelData<T>) -> Option<&T> {
        image.pixels.get(self)
    }
}

impl ImageIndexer for Point<usize> {
    fn get_mut<T>(self, image: &mut PixelData<T>) -> Option<&mut T> {
        image
            .grid
            .index_of(self)
            .and_then(|index| image.pixels.get_mut(index))
    }

    fn get<T>(self, image: &PixelData<T>) -> Option<&T> {
        image
            .grid
            .index_of(self)
            .and_then(|index| image.pixels.get(index))
    }
}
