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

//! Options for building shader programs.

use glow::HasContext;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// The OpenGL version of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlVersion {
    /// Desktop OpenGL.
    Gl {
        /// The major version.
        major: u32,

        /// The minor version.
        minor: u32,
    },

    /// OpenGL ES or WebGL.
    Es {
        /// The major version.
        major: u32,

        /// The minor version.
        minor: u32,
    },
}

impl GlVersion {
    /// Get the version of the given context.
    pub fn detect<H: HasContext + ?Sized>(context: &H) -> Self {
        let version = context.version();

        if version.is_embedded {
            GlVersion::Es {
                major: version.major,
                minor: version.minor,
            }
        } else {
            GlVersion::Gl {
                major: version.major,
                minor: version.minor,
            }
        }
    }

    /// The `#version` header to use for shaders that do not declare their own.
    ///
    /// Contexts older than OpenGL 3.3 or OpenGL ES 3.0 get no header.
    pub fn default_header(self) -> Option<&'static str> {
        match self {
            GlVersion::Gl { major, minor } if (major, minor) >= (3, 3) => {
                Some("#version 330 core")
            }
            GlVersion::Es { major, .. } if major >= 3 => Some("#version 300 es"),
            _ => None,
        }
    }

    /// Whether compute shaders are available.
    pub fn supports_compute(self) -> bool {
        match self {
            GlVersion::Gl { major, minor } => (major, minor) >= (4, 3),
            GlVersion::Es { major, minor } => (major, minor) >= (3, 1),
        }
    }
}

/// Which `#version` header to put in front of shader sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VersionHeader {
    /// Pick one based on the context's [`GlVersion`].
    #[default]
    Auto,

    /// Never add a header.
    None,

    /// Always use this header.
    Custom(String),
}

/// Options for a [`Shader`].
///
/// [`Shader`]: crate::Shader
#[derive(Debug, Clone)]
pub struct ShaderConfig {
    base_dir: Option<PathBuf>,
    version_header: VersionHeader,
    strict_uniforms: bool,
    check_errors: bool,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            version_header: VersionHeader::Auto,
            strict_uniforms: false,
            check_errors: true,
        }
    }
}

impl ShaderConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative shader paths against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Set the `#version` header policy.
    pub fn with_version_header(mut self, header: VersionHeader) -> Self {
        self.version_header = header;
        self
    }

    /// Return [`Error::MissingUniform`] for unknown uniforms instead of logging a warning.
    ///
    /// [`Error::MissingUniform`]: crate::Error::MissingUniform
    pub fn strict_uniforms(mut self, strict: bool) -> Self {
        self.strict_uniforms = strict;
        self
    }

    /// Poll `glGetError` after adding a stage or dispatching compute work.
    pub fn check_errors(mut self, check: bool) -> Self {
        self.check_errors = check;
        self
    }

    /// The directory relative shader paths are resolved against.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Whether missing uniforms are errors.
    pub fn is_strict(&self) -> bool {
        self.strict_uniforms
    }

    /// Whether `glGetError` is polled.
    pub fn checks_errors(&self) -> bool {
        self.check_errors
    }

    pub(crate) fn resolve_path<'a>(&self, path: &'a Path) -> Cow<'a, Path> {
        match &self.base_dir {
            Some(dir) if path.is_relative() => Cow::Owned(dir.join(path)),
            _ => Cow::Borrowed(path),
        }
    }

    pub(crate) fn header(&self, version: GlVersion) -> Option<String> {
        match &self.version_header {
            VersionHeader::Auto => version.default_header().map(String::from),
            VersionHeader::None => None,
            VersionHeader::Custom(header) => Some(header.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers() {
        assert_eq!(
            GlVersion::Gl { major: 4, minor: 6 }.default_header(),
            Some("#version 330 core")
        );
        assert_eq!(
            GlVersion::Es { major: 3, minor: 0 }.default_header(),
            Some("#version 300 es")
        );
        assert_eq!(GlVersion::Gl { major: 3, minor: 2 }.default_header(), None);
        assert_eq!(GlVersion::Es { major: 2, minor: 0 }.default_header(), None);
    }

    #[test]
    fn compute_support() {
        assert!(GlVersion::Gl { major: 4, minor: 3 }.supports_compute());
        assert!(!GlVersion::Gl { major: 4, minor: 1 }.supports_compute());
        assert!(GlVersion::Es { major: 3, minor: 1 }.supports_compute());
        assert!(!GlVersion::Es { major: 3, minor: 0 }.supports_compute());
    }

    #[test]
    fn header_policy() {
        let version = GlVersion::Gl { major: 4, minor: 5 };

        assert_eq!(
            ShaderConfig::new().header(version).as_deref(),
            Some("#version 330 core")
        );
        assert_eq!(
            ShaderConfig::new()
                .with_version_header(VersionHeader::None)
                .header(version),
            None
        );
        assert_eq!(
            ShaderConfig::new()
                .with_version_header(VersionHeader::Custom("#version 450".into()))
                .header(version)
                .as_deref(),
            Some("#version 450")
        );
    }

    #[test]
    fn relative_paths_use_base_dir() {
        let config = ShaderConfig::new().with_base_dir("assets/shaders");

        assert_eq!(
            config.resolve_path(Path::new("pbr.frag")),
            Path::new("assets/shaders/pbr.frag")
        );

        let absolute = std::env::temp_dir().join("pbr.frag");
        assert_eq!(config.resolve_path(&absolute), absolute.as_path());
        assert_eq!(
            ShaderConfig::new().resolve_path(Path::new("pbr.frag")),
            Path::new("pbr.frag")
        );
    }

    #[test]
    fn defaults() {
        let config = ShaderConfig::default();
        assert!(!config.is_strict());
        assert!(config.checks_errors());
        assert!(config.base_dir().is_none());
    }
}
