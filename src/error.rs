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

//! Errors produced while building and driving a shader program.

use crate::stage::ShaderStage;

use glow::HasContext;

use std::fmt;
use std::io;
use std::path::PathBuf;

/// An error that occurred while loading, compiling, linking or using a shader program.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A shader file could not be read.
    Io {
        /// The path that was being read.
        path: PathBuf,

        /// The underlying I/O error.
        source: io::Error,
    },

    /// A shader file did not contain valid UTF-8.
    Encoding {
        /// The path that was being read.
        path: PathBuf,
    },

    /// The shader stage could not be told from the file extension.
    UnknownStage(PathBuf),

    /// A texture unit number too large for OpenGL.
    InvalidTextureUnit(u32),

    /// The driver refused to create a program or shader object.
    Create(String),

    /// A shader stage failed to compile.
    Compile {
        /// The stage that failed.
        stage: ShaderStage,

        /// The compiler's info log.
        log: String,
    },

    /// The program failed to link.
    Link {
        /// The linker's info log.
        log: String,
    },

    /// The program has not been linked successfully yet.
    NotLinked,

    /// A uniform does not exist in the program, or was optimized out.
    ///
    /// Only returned when [`ShaderConfig::strict_uniforms`] is enabled.
    ///
    /// [`ShaderConfig::strict_uniforms`]: crate::ShaderConfig::strict_uniforms
    MissingUniform(String),

    /// `glGetError` reported an error.
    Gl(GlErrorCode),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => {
                write!(f, "failed to open {}: {}", path.display(), source)
            }
            Error::Encoding { path } => {
                write!(f, "{} is not valid UTF-8", path.display())
            }
            Error::UnknownStage(path) => {
                write!(f, "cannot tell the shader stage of {}", path.display())
            }
            Error::InvalidTextureUnit(unit) => write!(f, "invalid texture unit {unit}"),
            Error::Create(msg) => write!(f, "failed to create GL object: {msg}"),
            Error::Compile { stage, log } => {
                write!(f, "failed to compile {stage} shader: {}", log.trim_end())
            }
            Error::Link { log } => write!(f, "failed to link program: {}", log.trim_end()),
            Error::NotLinked => f.write_str("the program has not been linked"),
            Error::MissingUniform(name) => {
                write!(f, "the uniform '{name}' does not exist or is never used")
            }
            Error::Gl(code) => write!(f, "gl error: {code}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// An error code reported by `glGetError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlErrorCode(pub u32);

impl GlErrorCode {
    /// The symbolic name of this error code, if it is a known one.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            glow::INVALID_ENUM => "GL_INVALID_ENUM",
            glow::INVALID_VALUE => "GL_INVALID_VALUE",
            glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
            glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
            glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
            glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
            _ => return None,
        };

        Some(name)
    }
}

impl fmt::Display for GlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unknown GL error {:#06x}", self.0),
        }
    }
}

/// Poll `glGetError` and turn a pending error into an [`Error::Gl`].
///
/// # Safety
///
/// The context must be current.
pub unsafe fn check_error(h: &(impl HasContext + ?Sized)) -> Result<(), Error> {
    let err = h.get_error();

    if err == glow::NO_ERROR {
        return Ok(());
    }

    let code = GlErrorCode(err);
    tracing::error!("GL error: {}", code);
    Err(Error::Gl(code))
}
