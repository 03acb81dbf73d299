use num::traits::{Num, Signed};
use std::{
    fmt::{self, Display},
    ops::{Add, Mul, Sub},
};

/// Width of the toroidal map in grid cells.
pub const MAP_WIDTH: u32 = 21600;
/// Height of the toroidal map in grid cells.
pub const MAP_HEIGHT: u32 = 10800;

/// A 2D vector generic over any numeric type.
///
/// Used for positions, velocities and offsets on the toroidal map. Positions are kept
/// wrapped into `[0, MAP_WIDTH) x [0, MAP_HEIGHT)` by calling [`Vec2D::wrap_around_map`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct Vec2D<T> {
    /// The x-component of the vector.
    x: T,
    /// The y-component of the vector.
    y: T,
}

impl<T: Copy> Vec2D<T> {
    /// Creates a new vector with the given x and y components.
    pub const fn new(x: T, y: T) -> Self { Self { x, y } }

    /// Returns the x-component of the vector.
    pub const fn x(&self) -> T { self.x }

    /// Returns the y-component of the vector.
    pub const fn y(&self) -> T { self.y }
}

impl<T: Num + Copy> Vec2D<T> {
    /// Creates a zero vector (x = 0, y = 0).
    pub fn zero() -> Self { Self::new(T::zero(), T::zero()) }

    /// Computes the dot product of the current vector with another vector.
    pub fn dot(self, other: Self) -> T { self.x * other.x + self.y * other.y }
}

impl<T: Num + Signed + PartialOrd + Copy> Vec2D<T> {
    /// Wraps a single coordinate into `[0, max_value)`, also for values far outside.
    pub fn wrap_coordinate(value: T, max_value: T) -> T {
        ((value % max_value) + max_value) % max_value
    }
}

impl Vec2D<f64> {
    /// Returns the dimensions of the map as a 2D vector.
    pub fn map_size() -> Self { Self::new(f64::from(MAP_WIDTH), f64::from(MAP_HEIGHT)) }

    /// Wraps the vector around the map so both coordinates are in bounds.
    pub fn wrap_around_map(&self) -> Self {
        let size = Self::map_size();
        Self::new(
            Self::wrap_coordinate(self.x, size.x),
            Self::wrap_coordinate(self.y, size.y),
        )
    }

    /// Computes the magnitude of the vector.
    pub fn abs(&self) -> f64 { self.x.hypot(self.y) }

    /// Computes the plain Euclidean distance, ignoring wraparound.
    pub fn euclid_distance(&self, other: &Self) -> f64 { (*self - *other).abs() }

    /// Signed minimal difference `other - self` on a ring of circumference `size`.
    ///
    /// The result lies in `(-size/2, size/2]`.
    pub fn wrapped_delta(from: f64, to: f64, size: f64) -> f64 {
        let d = Self::wrap_coordinate(to - from, size);
        if d > size / 2.0 { d - size } else { d }
    }

    /// Per-axis minimal offset from `self` to `other` on the torus.
    pub fn to_wrapped(&self, other: &Self) -> Self {
        let size = Self::map_size();
        Self::new(
            Self::wrapped_delta(self.x, other.x, size.x),
            Self::wrapped_delta(self.y, other.y, size.y),
        )
    }

    /// Distance on the torus, taking `min(direct, wrap - direct)` per axis.
    pub fn toroidal_distance(&self, other: &Self) -> f64 { self.to_wrapped(other).abs() }

    /// Rounds both components to the nearest integer.
    pub fn round(self) -> Self { Self::new(self.x.round(), self.y.round()) }

    /// Rounds and converts to integer grid coordinates.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_cell(self) -> Vec2D<i32> {
        let r = self.wrap_around_map().round().wrap_around_map();
        Vec2D::new(r.x as i32, r.y as i32)
    }
}

impl Vec2D<i32> {
    /// Converts integer grid coordinates into floating point coordinates.
    pub fn to_f64(self) -> Vec2D<f64> { Vec2D::new(f64::from(self.x), f64::from(self.y)) }
}

impl<T: Num + Copy> Add for Vec2D<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output { Self::new(self.x + rhs.x, self.y + rhs.y) }
}

impl<T: Num + Copy> Sub for Vec2D<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output { Self::new(self.x - rhs.x, self.y - rhs.y) }
}

impl<T: Num + Copy> Mul<T> for Vec2D<T> {
    type Output = Self;

    /// Scales the vector by a scalar.
    fn mul(self, rhs: T) -> Self::Output { Self::new(self.x * rhs, self.y * rhs) }
}

impl<T: Copy> From<(T, T)> for Vec2D<T> {
    fn from(tuple: (T, T)) -> Self { Self::new(tuple.0, tuple.1) }
}

impl<T: Display> Display for Vec2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
