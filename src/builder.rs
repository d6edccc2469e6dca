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

//! Build a program from several stages with a single link.

use crate::config::ShaderConfig;
use crate::error::{check_error, Error};
use crate::shader::{compile_shader, Shader};
use crate::source::{prepare_source, read_shader_file};
use crate::stage::ShaderStage;

use glow::HasContext;

use std::borrow::Cow;
use std::path::PathBuf;
use std::rc::Rc;

/// Where the text of a stage comes from.
#[derive(Debug, Clone)]
enum StageSource {
    File(PathBuf),
    Text(String),
}

/// Collects shader stages and links them into a [`Shader`] in one go.
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    config: ShaderConfig,
    stages: Vec<(ShaderStage, StageSource)>,
}

impl ProgramBuilder {
    /// Create an empty builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for loading sources and for the resulting [`Shader`].
    pub fn with_config(mut self, config: ShaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a stage from source text.
    pub fn source(mut self, stage: ShaderStage, source: impl Into<String>) -> Self {
        self.stages.push((stage, StageSource::Text(source.into())));
        self
    }

    /// Add a stage from a file, read when the program is built.
    pub fn file(mut self, stage: ShaderStage, path: impl Into<PathBuf>) -> Self {
        self.stages.push((stage, StageSource::File(path.into())));
        self
    }

    /// Add a stage from a file, guessing the stage from its extension.
    pub fn file_auto(self, path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();

        match ShaderStage::from_path(&path) {
            Some(stage) => Ok(self.file(stage, path)),
            None => Err(Error::UnknownStage(path)),
        }
    }

    /// The stages added so far.
    pub fn stages(&self) -> impl Iterator<Item = ShaderStage> + '_ {
        self.stages.iter().map(|(stage, _)| *stage)
    }

    /// Read every file-backed stage.
    fn load_sources(&self) -> Result<Vec<(ShaderStage, Cow<'_, str>)>, Error> {
        self.stages
            .iter()
            .map(|(stage, source)| {
                let text = match source {
                    StageSource::Text(text) => Cow::Borrowed(text.as_str()),
                    StageSource::File(path) => {
                        Cow::Owned(read_shader_file(self.config.resolve_path(path))?)
                    }
                };

                Ok((*stage, text))
            })
            .collect()
    }

    /// Compile every stage and link them into a program.
    ///
    /// Every shader object is released again whether this succeeds or not; on failure the
    /// program is deleted as well.
    ///
    /// # Safety
    ///
    /// `context` must be current, see [`Shader::new`].
    pub unsafe fn build<H: HasContext + ?Sized>(self, context: Rc<H>) -> Result<Shader<H>, Error> {
        if self.stages.is_empty() {
            return Err(Error::Link {
                log: "no shader stages were added".into(),
            });
        }

        // Read everything before touching the context.
        let sources = self.load_sources()?;

        let mut shader = Shader::with_config(context.clone(), self.config.clone())?;
        let mut compiled = ShaderObjects {
            context: &*context,
            shaders: Vec::with_capacity(sources.len()),
        };

        let header = self.config.header(shader.version());
        for (stage, text) in &sources {
            let text = prepare_source(text, header.as_deref());
            let object = compile_shader(&*context, *stage, &text)?;
            compiled.shaders.push((*stage, object));
        }

        shader.attach_and_link(&compiled.shaders)?;

        if self.config.checks_errors() {
            check_error(&*context)?;
        }

        Ok(shader)
    }
}

/// Shader objects that are deleted when this goes out of scope.
///
/// Deleting an attached shader only flags it, so this is safe to drop after linking.
struct ShaderObjects<'a, H: HasContext + ?Sized> {
    context: &'a H,
    shaders: Vec<(ShaderStage, H::Shader)>,
}

impl<H: HasContext + ?Sized> Drop for ShaderObjects<'_, H> {
    fn drop(&mut self) {
        for &(_, shader) in &self.shaders {
            unsafe {
                self.context.delete_shader(shader);
            }
        }
    }
}
