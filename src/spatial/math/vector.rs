use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Sub};

#[derive(Default, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(C)]
pub struct V3c<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Copy> V3c<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    pub fn unit(scale: T) -> Self {
        Self {
            x: scale,
            y: scale,
            z: scale,
        }
    }

    /// Applies the given function to every component
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> V3c<U> {
        V3c::new(f(self.x), f(self.y), f(self.z))
    }
}

impl<T> Index<usize> for V3c<T> {
    type Output = T;

    /// Component by axis: 0 is x, 1 is y, 2 is z
    fn index(&self, axis: usize) -> &T {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid axis {axis} for V3c!"),
        }
    }
}

impl<T> IndexMut<usize> for V3c<T> {
    fn index_mut(&mut self, axis: usize) -> &mut T {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Invalid axis {axis} for V3c!"),
        }
    }
}

impl<T> AddAssign for V3c<T>
where
    T: Copy + Add<Output = T>,
{
    fn add_assign(&mut self, other: V3c<T>) {
        *self = *self + other;
    }
}

impl<T> V3c<T>
where
    T: num_traits::Float,
{
    pub fn length(&self) -> T {
        ((self.x * self.x) + (self.y * self.y) + (self.z * self.z)).sqrt()
    }

    pub fn normalized(self) -> V3c<T> {
        self / self.length()
    }

    /// True if none of the components are NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }
}

impl<T> V3c<T>
where
    T: std::ops::Mul<Output = T>
        + std::ops::Add<Output = T>
        + std::ops::Sub<Output = T>
        + std::marker::Copy,
{
    pub fn cross(self, other: V3c<T>) -> V3c<T> {
        V3c {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }
}

impl<T: Add<Output = T>> Add for V3c<T> {
    type Output = V3c<T>;

    fn add(self, other: V3c<T>) -> V3c<T> {
        V3c {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<T> Sub for V3c<T>
where
    T: Copy + Sub<Output = T>,
{
    type Output = V3c<T>;

    fn sub(self, other: V3c<T>) -> V3c<T> {
        V3c {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl<T: Mul<Output = T> + Copy> Mul<T> for V3c<T> {
    type Output = V3c<T>;

    fn mul(self, scalar: T) -> V3c<T> {
        V3c {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl<T: Div<Output = T> + Copy> Div<T> for V3c<T> {
    type Output = V3c<T>;

    fn div(self, scalar: T) -> V3c<T> {
        V3c {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl From<V3c<i32>> for V3c<f32> {
    fn from(vec: V3c<i32>) -> V3c<f32> {
        V3c::new(vec.x as f32, vec.y as f32, vec.z as f32)
    }
}

impl From<V3c<u32>> for V3c<f32> {
    fn from(vec: V3c<u32>) -> V3c<f32> {
        V3c::new(vec.x as f32, vec.y as f32, vec.z as f32)
    }
}

impl From<V3c<i32>> for V3c<u32> {
    fn from(vec: V3c<i32>) -> V3c<u32> {
        V3c::new(vec.x as u32, vec.y as u32, vec.z as u32)
    }
}
