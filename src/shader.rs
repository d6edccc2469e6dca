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

//! The shader program wrapper.

use crate::config::{GlVersion, ShaderConfig};
use crate::error::{check_error, Error};
use crate::locations::UniformCache;
use crate::source::{prepare_source, read_shader_file};
use crate::stage::ShaderStage;
use crate::uniform::{texture_unit, Uniform};
use crate::{CallOnDrop, ResultExt};

use glow::{ActiveUniform, HasContext};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::ops::Deref;
use std::path::Path;
use std::rc::Rc;

/// An OpenGL shader program.
///
/// The program object is created along with this structure and deleted when it is dropped.
pub struct Shader<H: HasContext + ?Sized> {
    /// The OpenGL context.
    context: Rc<H>,

    /// The program object.
    program: H::Program,

    /// Options this program was created with.
    config: ShaderConfig,

    /// The `#version` header put in front of sources that lack one.
    header: Option<String>,

    /// The version of the context.
    version: GlVersion,

    /// Stages attached to the program, in the order they were added.
    stages: Vec<ShaderStage>,

    /// Whether the last link succeeded.
    linked: bool,

    /// Cached uniform locations for the current link.
    uniforms: RefCell<UniformCache<H::UniformLocation>>,

    /// Live `bind()` guards and explicit `use_program()` calls.
    binding: Cell<BindState>,
}

impl<H: HasContext + ?Sized> fmt::Debug for Shader<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("program", &self.program)
            .field("stages", &self.stages)
            .field("linked", &self.linked)
            .finish_non_exhaustive()
    }
}

impl<H: HasContext + ?Sized> Shader<H> {
    /// Create a new, empty program with the default configuration.
    ///
    /// # Safety
    ///
    /// `context` must be current while calling this function, while using any of the methods
    /// on the returned value, and when it is dropped.
    pub unsafe fn new(context: Rc<H>) -> Result<Self, Error> {
        Self::with_config(context, ShaderConfig::default())
    }

    /// Create a new, empty program.
    ///
    /// # Safety
    ///
    /// Same as [`Shader::new`].
    pub unsafe fn with_config(context: Rc<H>, config: ShaderConfig) -> Result<Self, Error> {
        let version = GlVersion::detect(&*context);
        let program = context.create_program().gl_err()?;

        tracing::debug!(?program, ?version, "created shader program");

        Ok(Self {
            header: config.header(version),
            context,
            program,
            config,
            version,
            stages: Vec::new(),
            linked: false,
            uniforms: RefCell::new(UniformCache::new()),
            binding: Cell::new(BindState::default()),
        })
    }

    /// Get a reference to the underlying context.
    pub fn context(&self) -> &H {
        &self.context
    }

    /// The raw program object.
    pub fn program(&self) -> H::Program {
        self.program
    }

    /// The configuration this program was created with.
    pub fn config(&self) -> &ShaderConfig {
        &self.config
    }

    /// The version of the context this program lives on.
    pub fn version(&self) -> GlVersion {
        self.version
    }

    /// The stages attached so far, in the order they were added.
    pub fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    /// Whether the most recent link succeeded.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Load a shader file, compile it as `stage`, attach it and relink the program.
    ///
    /// Relative paths are resolved against [`ShaderConfig::with_base_dir`]. If the stage
    /// compiles but the program fails to link, the stage stays attached, so adding the
    /// missing stages later can still produce a working program. Use [`ProgramBuilder`]
    /// to link only once.
    ///
    /// [`ProgramBuilder`]: crate::ProgramBuilder
    pub fn add_shader(&mut self, path: impl AsRef<Path>, stage: ShaderStage) -> Result<(), Error> {
        let path = self.config.resolve_path(path.as_ref());
        let source = read_shader_file(&path)?;

        tracing::debug!(path = %path.display(), %stage, "adding shader stage");
        self.add_shader_source(&source, stage)
    }

    /// Like [`Shader::add_shader`], with the stage guessed from the file extension.
    ///
    /// Files whose stage cannot be guessed are rejected with [`Error::UnknownStage`].
    pub fn add_shader_auto(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let stage = ShaderStage::from_path(path)
            .ok_or_else(|| Error::UnknownStage(path.to_path_buf()))?;

        self.add_shader(path, stage)
    }

    /// Compile `source` as `stage`, attach it and relink the program.
    pub fn add_shader_source(&mut self, source: &str, stage: ShaderStage) -> Result<(), Error> {
        let source = prepare_source(source, self.header.as_deref());

        unsafe {
            let shader = compile_shader(&*self.context, stage, &source)?;
            self.context.attach_shader(self.program, shader);

            // Only flags the shader; it lives as long as it is attached.
            self.context.delete_shader(shader);
        }

        self.stages.push(stage);
        self.link()?;

        if self.config.checks_errors() {
            unsafe { check_error(&*self.context)? };
        }

        Ok(())
    }

    /// Attach already compiled shader objects and link once.
    pub(crate) unsafe fn attach_and_link(
        &mut self,
        shaders: &[(ShaderStage, H::Shader)],
    ) -> Result<(), Error> {
        for &(stage, shader) in shaders {
            self.context.attach_shader(self.program, shader);
            self.stages.push(stage);
        }

        self.link()
    }

    fn link(&mut self) -> Result<(), Error> {
        let gl = &*self.context;

        // Locations are only valid for the link they came from.
        self.uniforms.get_mut().clear();

        unsafe {
            gl.link_program(self.program);
            self.linked = gl.get_program_link_status(self.program);

            if !self.linked {
                let log = gl.get_program_info_log(self.program);
                tracing::error!("failed to link shader program: {}", log.trim_end());
                return Err(Error::Link { log });
            }
        }

        tracing::debug!(program = ?self.program, stages = ?self.stages, "linked shader program");
        Ok(())
    }

    /// Make this the current program until [`Shader::unuse`] is called.
    ///
    /// Dropping a [`BoundShader`] does not clear a program made current this way.
    pub fn use_program(&self) {
        self.update_binding(BindState::pin);
        unsafe {
            self.context.use_program(Some(self.program));
        }
    }

    /// Clear the current program.
    pub fn unuse(&self) {
        self.update_binding(BindState::unpin);
        unsafe {
            self.context.use_program(None);
        }
    }

    /// Make this the current program until the returned guard is dropped.
    ///
    /// Guards nest: the program is only cleared once the outermost guard is dropped.
    pub fn bind(&self) -> BoundShader<'_, H> {
        self.update_binding(BindState::enter);
        unsafe {
            self.context.use_program(Some(self.program));
        }

        BoundShader { shader: self }
    }

    fn update_binding<T>(&self, f: impl FnOnce(&mut BindState) -> T) -> T {
        let mut state = self.binding.get();
        let result = f(&mut state);
        self.binding.set(state);
        result
    }

    /// Look up the location of a uniform.
    ///
    /// Returns `Ok(None)` if the uniform does not exist or was optimized out by the driver; a
    /// warning is logged the first time a name is found missing. With
    /// [`ShaderConfig::strict_uniforms`] enabled, [`Error::MissingUniform`] is returned
    /// instead.
    pub fn uniform_location(&self, name: &str) -> Result<Option<H::UniformLocation>, Error> {
        self.uniforms.borrow_mut().resolve(
            name,
            self.linked,
            self.config.is_strict(),
            |name| unsafe { self.context.get_uniform_location(self.program, name) },
        )
    }

    /// Set a uniform of any supported type.
    ///
    /// The program must be in use, see [`Shader::bind`].
    pub fn set_uniform(&self, name: &str, value: impl Into<Uniform>) -> Result<(), Error> {
        let value = value.into();

        if let Some(location) = self.uniform_location(name)? {
            tracing::trace!(uniform = name, ty = value.glsl_type(), "setting uniform");
            unsafe { value.upload(&*self.context, &location) };
        }

        Ok(())
    }

    /// Set an `int` uniform.
    pub fn set_int(&self, name: &str, v0: i32) -> Result<(), Error> {
        self.set_uniform(name, v0)
    }

    /// Set an `ivec2` uniform.
    pub fn set_int2(&self, name: &str, v0: i32, v1: i32) -> Result<(), Error> {
        self.set_uniform(name, [v0, v1])
    }

    /// Set an `ivec3` uniform.
    pub fn set_int3(&self, name: &str, v0: i32, v1: i32, v2: i32) -> Result<(), Error> {
        self.set_uniform(name, [v0, v1, v2])
    }

    /// Set an `ivec4` uniform.
    pub fn set_int4(&self, name: &str, v0: i32, v1: i32, v2: i32, v3: i32) -> Result<(), Error> {
        self.set_uniform(name, [v0, v1, v2, v3])
    }

    /// Set a `uint` uniform.
    pub fn set_uint(&self, name: &str, v0: u32) -> Result<(), Error> {
        self.set_uniform(name, v0)
    }

    /// Set a `float` uniform.
    pub fn set_float(&self, name: &str, v0: f32) -> Result<(), Error> {
        self.set_uniform(name, v0)
    }

    /// Set a `vec2` uniform.
    pub fn set_float2(&self, name: &str, v0: f32, v1: f32) -> Result<(), Error> {
        self.set_uniform(name, [v0, v1])
    }

    /// Set a `vec3` uniform.
    pub fn set_float3(&self, name: &str, v0: f32, v1: f32, v2: f32) -> Result<(), Error> {
        self.set_uniform(name, [v0, v1, v2])
    }

    /// Set a `vec4` uniform.
    pub fn set_float4(
        &self,
        name: &str,
        v0: f32,
        v1: f32,
        v2: f32,
        v3: f32,
    ) -> Result<(), Error> {
        self.set_uniform(name, [v0, v1, v2, v3])
    }

    /// Set a `vec3` uniform.
    pub fn set_vec3(&self, name: &str, value: [f32; 3]) -> Result<(), Error> {
        self.set_uniform(name, value)
    }

    /// Set a `mat3` uniform from its columns.
    pub fn set_mat3(&self, name: &str, columns: [[f32; 3]; 3]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::mat3(columns))
    }

    /// Set a `mat4` uniform from its columns.
    pub fn set_mat4(&self, name: &str, columns: [[f32; 4]; 4]) -> Result<(), Error> {
        self.set_uniform(name, Uniform::mat4(columns))
    }

    /// Point a sampler uniform at a texture unit, without binding anything to the unit.
    pub fn set_texture_unit(&self, name: &str, unit: u32) -> Result<(), Error> {
        let (sampler, _) = texture_unit(unit)?;
        self.set_uniform(name, sampler)
    }

    /// Bind `texture` to `target` on texture unit `unit` and point the sampler `name` at it.
    ///
    /// Nothing is bound if the sampler does not exist.
    pub fn bind_texture(
        &self,
        target: u32,
        texture: H::Texture,
        name: &str,
        unit: u32,
    ) -> Result<(), Error> {
        let (sampler, slot) = texture_unit(unit)?;

        if let Some(location) = self.uniform_location(name)? {
            unsafe {
                self.context.uniform_1_i32(Some(&location), sampler);
                self.context.active_texture(slot);
                self.context.bind_texture(target, Some(texture));
            }
        }

        Ok(())
    }

    /// List the uniforms the driver kept after linking.
    pub fn active_uniforms(&self) -> Vec<ActiveUniform> {
        if !self.linked {
            return Vec::new();
        }

        unsafe {
            let count = self.context.get_active_uniforms(self.program);
            (0..count)
                .filter_map(|index| self.context.get_active_uniform(self.program, index))
                .collect()
        }
    }

    /// Run a linked compute program over the given number of work groups.
    ///
    /// The program is made current for the dispatch. Afterwards it stays current only if it
    /// already was through [`Shader::bind`] or [`Shader::use_program`].
    pub fn dispatch_compute(&self, x: u32, y: u32, z: u32) -> Result<(), Error> {
        if !self.linked {
            return Err(Error::NotLinked);
        }

        if !self.version.supports_compute() {
            tracing::warn!(version = ?self.version, "context may not support compute shaders");
        }

        if !self.stages.contains(&ShaderStage::Compute) {
            tracing::warn!(program = ?self.program, "dispatching a program without a compute stage");
        }

        let _bound = self.bind();
        unsafe {
            self.context.dispatch_compute(x, y, z);
        }

        if self.config.checks_errors() {
            unsafe { check_error(&*self.context)? };
        }

        Ok(())
    }
}

impl<H: HasContext + ?Sized> Drop for Shader<H> {
    fn drop(&mut self) {
        unsafe {
            self.context.delete_program(self.program);
        }
    }
}

/// A [`Shader`] that is the current program.
///
/// Clears the current program when dropped.
pub struct BoundShader<'a, H: HasContext + ?Sized> {
    shader: &'a Shader<H>,
}

impl<H: HasContext + ?Sized> Deref for BoundShader<'_, H> {
    type Target = Shader<H>;

    fn deref(&self) -> &Self::Target {
        self.shader
    }
}

impl<H: HasContext + ?Sized> Drop for BoundShader<'_, H> {
    fn drop(&mut self) {
        if self.shader.update_binding(BindState::exit) {
            unsafe {
                self.shader.context.use_program(None);
            }
        }
    }
}

/// Who is keeping a program current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BindState {
    /// Live [`BoundShader`] guards.
    guards: usize,

    /// Made current through [`Shader::use_program`].
    pinned: bool,
}

impl BindState {
    fn enter(&mut self) {
        self.guards += 1;
    }

    /// Returns whether the program should be cleared.
    fn exit(&mut self) -> bool {
        self.guards = self.guards.saturating_sub(1);
        self.guards == 0 && !self.pinned
    }

    fn pin(&mut self) {
        self.pinned = true;
    }

    fn unpin(&mut self) {
        self.pinned = false;
    }
}

/// Compile a single stage.
///
/// The shader object is deleted again if compilation fails.
pub(crate) unsafe fn compile_shader<H: HasContext + ?Sized>(
    context: &H,
    stage: ShaderStage,
    source: &str,
) -> Result<H::Shader, Error> {
    let shader = context.create_shader(stage.gl_enum()).gl_err()?;
    let _call_on_drop = CallOnDrop(|| context.delete_shader(shader));

    context.shader_source(shader, source);
    context.compile_shader(shader);

    if !context.get_shader_compile_status(shader) {
        let log = context.get_shader_info_log(shader);
        tracing::error!("failed to compile {} shader: {}", stage, log.trim_end());
        return Err(Error::Compile { stage, log });
    }

    mem::forget(_call_on_drop);
    Ok(shader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_guard_clears() {
        let mut state = BindState::default();

        state.enter();
        assert!(state.exit());
        assert_eq!(state, BindState::default());
    }

    #[test]
    fn nested_guards_clear_once() {
        let mut state = BindState::default();

        // An outer bind() and the temporary one inside dispatch_compute.
        state.enter();
        state.enter();
        assert!(!state.exit());
        assert!(state.exit());
    }

    #[test]
    fn pinned_program_outlives_guards() {
        let mut state = BindState::default();

        state.pin();
        state.enter();
        assert!(!state.exit());

        state.unpin();
        state.enter();
        assert!(state.exit());
    }

    #[test]
    fn unbalanced_exit_does_not_underflow() {
        let mut state = BindState::default();
        assert!(state.exit());
        assert_eq!(state.guards, 0);
    }
}
