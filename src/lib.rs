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

//! Shader program management for OpenGL contexts provided by [`glow`].
//!
//! The centerpiece of this crate is the [`Shader`] structure, which owns a single OpenGL
//! program object. Shader stages are loaded from disk (or from memory), compiled, attached and
//! linked into the program, after which uniform variables can be set on it by name.
//!
//! ```no_run
//! # use std::rc::Rc;
//! # fn demo<H: glow::HasContext>(context: Rc<H>) -> Result<(), glow_shader::Error> {
//! use glow_shader::{Shader, ShaderStage};
//!
//! let mut shader = unsafe { Shader::new(context)? };
//! shader.add_shader("shaders/sky.vert", ShaderStage::Vertex)?;
//! shader.add_shader("shaders/sky.frag", ShaderStage::Fragment)?;
//!
//! let bound = shader.bind();
//! bound.set_uniform("uExposure", 1.5f32)?;
//! bound.set_uniform("uSunDirection", [0.0f32, 1.0, 0.0])?;
//! # Ok(())
//! # }
//! ```
//!
//! Everything here assumes that the OpenGL context is current on the calling thread. The
//! context is shared through an [`Rc`], so none of these types can leave that thread.
//!
//! [`glow`]: https://crates.io/crates/glow
//! [`Rc`]: std::rc::Rc

mod builder;
mod config;
mod error;
mod locations;
mod shader;
mod source;
mod stage;
mod uniform;

pub use builder::ProgramBuilder;
pub use config::{GlVersion, ShaderConfig, VersionHeader};
pub use error::{check_error, Error, GlErrorCode};
pub use shader::{BoundShader, Shader};
pub use source::{prepare_source, read_shader_file};
pub use stage::ShaderStage;
pub use uniform::Uniform;

pub use glow;

trait ResultExt<T> {
    fn gl_err(self) -> Result<T, Error>;
}

impl<T> ResultExt<T> for Result<T, String> {
    fn gl_err(self) -> Result<T, Error> {
        self.map_err(Error::Create)
    }
}

struct CallOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
