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

//! Shader stages.

use std::fmt;
use std::path::Path;

/// A programmable stage of the OpenGL pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,

    /// The fragment stage.
    Fragment,

    /// The geometry stage.
    ///
    /// Requires OpenGL 3.2 or OpenGL ES 3.2.
    Geometry,

    /// A compute shader.
    ///
    /// Requires OpenGL 4.3 or OpenGL ES 3.1. A program with a compute stage cannot contain
    /// any other stage.
    Compute,

    /// The tessellation control stage.
    TessControl,

    /// The tessellation evaluation stage.
    TessEvaluation,
}

impl ShaderStage {
    /// Every stage, in pipeline order.
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
        ShaderStage::Compute,
    ];

    /// The OpenGL enum passed to `glCreateShader` for this stage.
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
            ShaderStage::Compute => glow::COMPUTE_SHADER,
            ShaderStage::TessControl => glow::TESS_CONTROL_SHADER,
            ShaderStage::TessEvaluation => glow::TESS_EVALUATION_SHADER,
        }
    }

    /// Guess the stage of a shader file from its extension.
    ///
    /// Both the short (`.vs`, `.fs`) and the glslang-style (`.vert`, `.frag`) extensions are
    /// understood. A trailing `.glsl` is skipped, so `sky.frag.glsl` is a fragment shader.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?;

        // The last segment of a name without dots is the stem, not an extension.
        if !name.contains('.') {
            return None;
        }

        let mut extensions = name.rsplit('.');
        let mut ext = extensions.next()?;
        if ext.eq_ignore_ascii_case("glsl") {
            ext = extensions.next()?;
        }

        Self::from_extension(ext)
    }

    fn from_extension(ext: &str) -> Option<Self> {
        let stage = match ext.to_ascii_lowercase().as_str() {
            "vert" | "vs" | "vsh" => ShaderStage::Vertex,
            "frag" | "fs" | "fsh" => ShaderStage::Fragment,
            "geom" | "gs" | "gsh" => ShaderStage::Geometry,
            "comp" | "cs" | "csh" => ShaderStage::Compute,
            "tesc" => ShaderStage::TessControl,
            "tese" => ShaderStage::TessEvaluation,
            _ => return None,
        };

        Some(stage)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Compute => "compute",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
        })
    }
}
