use std::ops::{Add, Mul, Sub};

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::Float;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb<T = u8>(pub T, pub T, pub T);

impl<T: Add<Output = T>> Add for Rgb<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Rgb(self.0 + rhs.0, self.1 + rhs.1, self.2 + rhs.2)
    }
}

impl<T: Sub<Output = T>> Sub for Rgb<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Rgb(self.0 - rhs.0, self.1 - rhs.1, self.2 - rhs.2)
    }
}

impl<T: Copy + Mul<Output = T>> Mul<T> for Rgb<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self::Output {
        Rgb(self.0 * rhs, self.1 * rhs, self.2 * rhs)
    }
}

impl<T: Copy> From<Rgb<T>> for [T; 3] {
    fn from(rgb: Rgb<T>) -> Self {
        [rgb.0, rgb.1, rgb.2]
    }
}

impl<T: Copy> From<[T; 3]> for Rgb<T> {
    fn from(value: [T; 3]) -> Self {
        Rgb(value[0], value[1], value[2])
    }
}

impl<S: Float> Rgb<S> {
    /// Rounds and saturates every channel into a byte.
    pub fn to_u8(self) -> Rgb {
        let channel = |value: S| {
            value
                .round()
                .max(S::ZERO)
                .min(S::TWO_FIVE_FIVE)
                .to_u8()
                .unwrap_or(u8::MAX)
        };
        Rgb(channel(self.0), channel(self.1), channel(self.2))
    }
}

impl From<Rgb> for Rgba<u8> {
    fn from(rgb: Rgb) -> Self {
        Rgba([rgb.0, rgb.1, rgb.2, u8::MAX])
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Three phase sinusoid around a light gray: every channel stays in `[127, 255]`
/// and the hue cycles once per `2π` of `phase`.
pub fn pastel<S: Float>(phase: S) -> Rgb<S> {
    let third = S::TAU / S::THREE;
    let channel = |offset: S| S::PASTEL_AMPLITUDE * (phase + offset).sin() + S::PASTEL_BASE;
    Rgb(channel(S::ZERO), channel(third), channel(third * S::TWO))
}

/// Pastel color for a phase expressed in turns (`[0, 1)` is one full cycle).
pub fn pastel_turns<S: Float>(turns: S) -> Rgb<S> {
    pastel(turns * S::TAU)
}

/// Mean of the three channels, used as luminance when comparing against a grayscale target.
pub fn luma<S: Float>(pixel: &Rgba<u8>) -> S {
    let [r, g, b, _] = pixel.0;
    S::from_index(r as usize + g as usize + b as usize) / S::THREE
}
