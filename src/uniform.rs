// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `glow-shader`.
//
// `glow-shader` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `glow-shader` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `glow-shader`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! Uniform values.

use crate::Error;

use glow::HasContext;
use kurbo::{Affine, Point, Vec2};

macro_rules! c {
    ($e:expr) => {{
        ($e) as f32
    }};
}

/// A value that can be assigned to a GLSL uniform.
///
/// Matrices are stored in column-major order, which is what GLSL expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    /// An `int`, `bool` or sampler.
    Int(i32),

    /// A `uint`.
    UInt(u32),

    /// A `float`.
    Float(f32),

    /// An `ivec2`.
    IVec2([i32; 2]),

    /// An `ivec3`.
    IVec3([i32; 3]),

    /// An `ivec4`.
    IVec4([i32; 4]),

    /// A `uvec2`.
    UVec2([u32; 2]),

    /// A `uvec3`.
    UVec3([u32; 3]),

    /// A `uvec4`.
    UVec4([u32; 4]),

    /// A `vec2`.
    Vec2([f32; 2]),

    /// A `vec3`.
    Vec3([f32; 3]),

    /// A `vec4`.
    Vec4([f32; 4]),

    /// A `mat2`.
    Mat2([f32; 4]),

    /// A `mat3`.
    Mat3([f32; 9]),

    /// A `mat4`.
    Mat4([f32; 16]),
}

impl Uniform {
    /// The name of the GLSL type this value is meant for.
    pub fn glsl_type(&self) -> &'static str {
        match self {
            Uniform::Int(_) => "int",
            Uniform::UInt(_) => "uint",
            Uniform::Float(_) => "float",
            Uniform::IVec2(_) => "ivec2",
            Uniform::IVec3(_) => "ivec3",
            Uniform::IVec4(_) => "ivec4",
            Uniform::UVec2(_) => "uvec2",
            Uniform::UVec3(_) => "uvec3",
            Uniform::UVec4(_) => "uvec4",
            Uniform::Vec2(_) => "vec2",
            Uniform::Vec3(_) => "vec3",
            Uniform::Vec4(_) => "vec4",
            Uniform::Mat2(_) => "mat2",
            Uniform::Mat3(_) => "mat3",
            Uniform::Mat4(_) => "mat4",
        }
    }

    /// Build a `mat3` from three columns.
    pub fn mat3(columns: [[f32; 3]; 3]) -> Self {
        Uniform::Mat3(bytemuck::cast(columns))
    }

    /// Build a `mat4` from four columns.
    pub fn mat4(columns: [[f32; 4]; 4]) -> Self {
        Uniform::Mat4(bytemuck::cast(columns))
    }

    /// Write this value into the uniform at `location` of the program in use.
    ///
    /// # Safety
    ///
    /// The context must be current and the program owning `location` must be in use.
    pub(crate) unsafe fn upload<H: HasContext + ?Sized>(
        &self,
        gl: &H,
        location: &H::UniformLocation,
    ) {
        let loc = Some(location);

        match *self {
            Uniform::Int(x) => gl.uniform_1_i32(loc, x),
            Uniform::UInt(x) => gl.uniform_1_u32(loc, x),
            Uniform::Float(x) => gl.uniform_1_f32(loc, x),
            Uniform::IVec2([x, y]) => gl.uniform_2_i32(loc, x, y),
            Uniform::IVec3([x, y, z]) => gl.uniform_3_i32(loc, x, y, z),
            Uniform::IVec4([x, y, z, w]) => gl.uniform_4_i32(loc, x, y, z, w),
            Uniform::UVec2([x, y]) => gl.uniform_2_u32(loc, x, y),
            Uniform::UVec3([x, y, z]) => gl.uniform_3_u32(loc, x, y, z),
            Uniform::UVec4([x, y, z, w]) => gl.uniform_4_u32(loc, x, y, z, w),
            Uniform::Vec2([x, y]) => gl.uniform_2_f32(loc, x, y),
            Uniform::Vec3([x, y, z]) => gl.uniform_3_f32(loc, x, y, z),
            Uniform::Vec4([x, y, z, w]) => gl.uniform_4_f32(loc, x, y, z, w),
            Uniform::Mat2(ref m) => gl.uniform_matrix_2_f32_slice(loc, false, m),
            Uniform::Mat3(ref m) => gl.uniform_matrix_3_f32_slice(loc, false, m),
            Uniform::Mat4(ref m) => gl.uniform_matrix_4_f32_slice(loc, false, m),
        }
    }
}

/// The sampler value and `GL_TEXTUREi` enum for texture unit `unit`.
pub(crate) fn texture_unit(unit: u32) -> Result<(i32, u32), Error> {
    match (i32::try_from(unit), glow::TEXTURE0.checked_add(unit)) {
        (Ok(sampler), Some(slot)) => Ok((sampler, slot)),
        _ => Err(Error::InvalidTextureUnit(unit)),
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Uniform {
                fn from(value: $ty) -> Self {
                    Uniform::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    i32 => Int,
    u32 => UInt,
    f32 => Float,
    [i32; 2] => IVec2,
    [i32; 3] => IVec3,
    [i32; 4] => IVec4,
    [u32; 2] => UVec2,
    [u32; 3] => UVec3,
    [u32; 4] => UVec4,
    [f32; 2] => Vec2,
    [f32; 3] => Vec3,
    [f32; 4] => Vec4,
}

impl From<f64> for Uniform {
    fn from(value: f64) -> Self {
        Uniform::Float(c!(value))
    }
}

impl From<bool> for Uniform {
    fn from(value: bool) -> Self {
        Uniform::Int(value as i32)
    }
}

impl From<[[f32; 2]; 2]> for Uniform {
    fn from(columns: [[f32; 2]; 2]) -> Self {
        Uniform::Mat2(bytemuck::cast(columns))
    }
}

impl From<[[f32; 3]; 3]> for Uniform {
    fn from(columns: [[f32; 3]; 3]) -> Self {
        Uniform::mat3(columns)
    }
}

impl From<[[f32; 4]; 4]> for Uniform {
    fn from(columns: [[f32; 4]; 4]) -> Self {
        Uniform::mat4(columns)
    }
}

impl From<Affine> for Uniform {
    fn from(transform: Affine) -> Self {
        let [a, b, c, d, e, f] = transform.as_coeffs();

        Uniform::Mat3([
            c!(a),
            c!(b),
            c!(0.0),
            c!(c),
            c!(d),
            c!(0.0),
            c!(e),
            c!(f),
            c!(1.0),
        ])
    }
}

impl From<Vec2> for Uniform {
    fn from(v: Vec2) -> Self {
        Uniform::Vec2([c!(v.x), c!(v.y)])
    }
}

impl From<Point> for Uniform {
    fn from(p: Point) -> Self {
        Uniform::Vec2([c!(p.x), c!(p.y)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_are_narrowed() {
        assert_eq!(Uniform::from(0.25f64), Uniform::Float(0.25));
        assert_eq!(Uniform::from(0.25f64).glsl_type(), "float");
    }

    #[test]
    fn bools_are_ints() {
        assert_eq!(Uniform::from(true), Uniform::Int(1));
        assert_eq!(Uniform::from(false), Uniform::Int(0));
    }

    #[test]
    fn matrices_are_column_major() {
        let columns = [
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ];

        let Uniform::Mat4(flat) = Uniform::from(columns) else {
            panic!("expected a mat4");
        };
        assert_eq!(flat[..4], columns[0]);
        assert_eq!(flat[12..], columns[3]);
    }

    #[test]
    fn mat4_is_not_mat3() {
        let identity = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];

        assert_eq!(Uniform::mat4(identity).glsl_type(), "mat4");
        assert_eq!(
            Uniform::mat3([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]).glsl_type(),
            "mat3"
        );
    }

    #[test]
    fn affine_packs_like_a_2d_transform() {
        let transform = Affine::new([2.0, 0.5, -0.5, 3.0, 10.0, 20.0]);

        assert_eq!(
            Uniform::from(transform),
            Uniform::Mat3([2.0, 0.5, 0.0, -0.5, 3.0, 0.0, 10.0, 20.0, 1.0])
        );
    }

    #[test]
    fn texture_units() {
        assert_eq!(texture_unit(0).unwrap(), (0, glow::TEXTURE0));
        assert_eq!(texture_unit(5).unwrap(), (5, glow::TEXTURE5));
    }

    #[test]
    fn oversized_texture_units_are_rejected() {
        assert!(matches!(
            texture_unit(u32::MAX),
            Err(Error::InvalidTextureUnit(u32::MAX))
        ));

        let past_i32 = i32::MAX as u32 + 1;
        assert!(matches!(
            texture_unit(past_i32),
            Err(Error::InvalidTextureUnit(unit)) if unit == past_i32
        ));
    }

    #[test]
    fn kurbo_vectors() {
        assert_eq!(Uniform::from(Vec2::new(1.0, 2.0)), Uniform::Vec2([1.0, 2.0]));
        assert_eq!(Uniform::from(Point::new(-1.0, 0.5)), Uniform::Vec2([-1.0, 0.5]));
    }
}
