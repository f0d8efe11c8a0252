use crate::core::config::EPSILON;
use std::ops::{Add, Mul};

/// A 2D vector using 32-bit floating point coordinates, as carried by `vec2` vertex attributes
/// and uniforms.
///
/// Equality is approximate: two vectors are equal if their components differ by less than
/// [`EPSILON`](crate::core::config::EPSILON).
#[derive(Default, Debug, Copy, Clone)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl PartialEq for Vec2 {
    fn eq(&self, other: &Self) -> bool {
        if self.is_finite() || other.is_finite() {
            (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
        } else {
            self.x == other.x && self.y == other.y
        }
    }
}

impl Vec2 {
    #[must_use]
    pub fn one() -> Vec2 {
        Vec2 { x: 1.0, y: 1.0 }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Multiplies each component by the matching component of `other`, like GLSL `vec2 * vec2`.
    #[must_use]
    pub fn component_wise(&self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x * other.x,
            y: self.y * other.y,
        }
    }
    /// Divides each component by the matching component of `other`, like GLSL `vec2 / vec2`.
    #[must_use]
    pub fn component_wise_div(&self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x / other.x,
            y: self.y / other.y,
        }
    }

    pub fn as_f32(&self) -> [f32; 2] {
        (*self).into()
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(value: [f32; 2]) -> Self {
        Vec2 {
            x: value[0],
            y: value[1],
        }
    }
}
impl From<Vec2> for [f32; 2] {
    fn from(value: Vec2) -> Self {
        [value.x, value.y]
    }
}

impl Add<Vec2> for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// A 3x3 matrix acting on homogeneous 2D coordinates, matching the GLSL `mat3` transform uniform.
///
/// Fields are named row-first: `xw` is the x-translation, `yw` the y-translation.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct Mat3x3 {
    pub xx: f32,
    pub xy: f32,
    pub xw: f32,
    pub yx: f32,
    pub yy: f32,
    pub yw: f32,
    pub wx: f32,
    pub wy: f32,
    pub ww: f32,
}

impl Mat3x3 {
    /// Creates an identity matrix.
    pub fn one() -> Mat3x3 {
        Mat3x3 {
            xx: 1.0,
            xy: 0.0,
            xw: 0.0,
            yx: 0.0,
            yy: 1.0,
            yw: 0.0,
            wx: 0.0,
            wy: 0.0,
            ww: 1.0,
        }
    }

    /// Creates a translation matrix.
    ///
    /// ```text
    /// | 1 0 dx |
    /// | 0 1 dy |
    /// | 0 0 1  |
    /// ```
    pub fn translation(dx: f32, dy: f32) -> Mat3x3 {
        Mat3x3 {
            xw: dx,
            yw: dy,
            ..Self::one()
        }
    }

    /// Creates a scaling matrix.
    pub fn scale(sx: f32, sy: f32) -> Mat3x3 {
        Mat3x3 {
            xx: sx,
            yy: sy,
            ..Self::one()
        }
    }

    /// Returns the matrix in column-major order, the layout GLSL expects when a `mat3` is uploaded
    /// without transposition.
    pub fn to_columns(&self) -> [[f32; 3]; 3] {
        [
            [self.xx, self.yx, self.wx],
            [self.xy, self.yy, self.wy],
            [self.xw, self.yw, self.ww],
        ]
    }
}

impl Mul<Mat3x3> for Mat3x3 {
    type Output = Mat3x3;

    fn mul(self, rhs: Mat3x3) -> Self::Output {
        Mat3x3 {
            xx: self.xx * rhs.xx + self.xy * rhs.yx + self.xw * rhs.wx,
            xy: self.xx * rhs.xy + self.xy * rhs.yy + self.xw * rhs.wy,
            xw: self.xx * rhs.xw + self.xy * rhs.yw + self.xw * rhs.ww,
            yx: self.yx * rhs.xx + self.yy * rhs.yx + self.yw * rhs.wx,
            yy: self.yx * rhs.xy + self.yy * rhs.yy + self.yw * rhs.wy,
            yw: self.yx * rhs.xw + self.yy * rhs.yw + self.yw * rhs.ww,
            wx: self.wx * rhs.xx + self.wy * rhs.yx + self.ww * rhs.wx,
            wy: self.wx * rhs.xy + self.wy * rhs.yy + self.ww * rhs.wy,
            ww: self.wx * rhs.xw + self.wy * rhs.yw + self.ww * rhs.ww,
        }
    }
}

impl Mul<Vec2> for Mat3x3 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.xx * rhs.x + self.xy * rhs.y + self.xw * 1.0,
            y: self.yx * rhs.x + self.yy * rhs.y + self.yw * 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec2_arithmetic() {
        let a = Vec2 { x: 1.0, y: 2.0 };
        let b = Vec2 { x: 3.0, y: 4.0 };
        assert_eq!(a + b, Vec2 { x: 4.0, y: 6.0 });
        assert_eq!(a.component_wise(b), Vec2 { x: 3.0, y: 8.0 });
        assert_eq!(b.component_wise_div(a), Vec2 { x: 3.0, y: 2.0 });
    }

    #[test]
    fn mat3x3_transforms_points() {
        let p = Vec2 { x: 1.0, y: 2.0 };
        assert_eq!(Mat3x3::one() * p, p);
        assert_eq!(Mat3x3::translation(3.0, -1.0) * p, Vec2 { x: 4.0, y: 1.0 });
        assert_eq!(Mat3x3::scale(2.0, 3.0) * p, Vec2 { x: 2.0, y: 6.0 });
    }

    #[test]
    fn mat3x3_composition() {
        let m = Mat3x3::translation(1.0, 1.0) * Mat3x3::scale(2.0, 2.0);
        assert_eq!(m * Vec2::one(), Vec2 { x: 3.0, y: 3.0 });
        assert_eq!(Mat3x3::one() * m, m);
    }

    #[test]
    fn mat3x3_columns_are_column_major() {
        let columns = Mat3x3::translation(5.0, 7.0).to_columns();
        assert_eq!(columns[0], [1.0, 0.0, 0.0]);
        assert_eq!(columns[1], [0.0, 1.0, 0.0]);
        assert_eq!(columns[2], [5.0, 7.0, 1.0]);
    }
}
