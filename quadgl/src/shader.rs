use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use gl::types::*;
use glam::{Mat4, Vec2, Vec4};

use crate::{
    api::GlApi, context::Context, error::GlError, gl_call, has_handle, transmutable_u32, GlResult,
};

mod source;

pub use source::{ShaderSource, SECTION_MARKER};

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex = gl::VERTEX_SHADER,
    Fragment = gl::FRAGMENT_SHADER,
}
transmutable_u32!(ShaderStage);

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// One compiled stage, deleted once it has been linked into a program (or
/// when compilation fails).
struct StageObject<'ctx, A: GlApi> {
    ctx: &'ctx Context<A>,
    handle: GLuint,
}

impl<'ctx, A: GlApi> StageObject<'ctx, A> {
    fn compile(ctx: &'ctx Context<A>, stage: ShaderStage, source: &str) -> GlResult<Self> {
        let handle = gl_call!(ctx, |gl| gl.create_shader(stage))?;
        if handle == 0 {
            return Err(GlError::CreateFailed {
                object: "shader stage",
            });
        }
        let object = Self { ctx, handle };

        gl_call!(ctx, |gl| gl.shader_source(handle, source))?;
        gl_call!(ctx, |gl| gl.compile_shader(handle))?;

        if !gl_call!(ctx, |gl| gl.shader_compile_status(handle))? {
            let log = gl_call!(ctx, |gl| gl.shader_info_log(handle))?;
            log::error!("failed to compile {stage} shader:");
            for line in log.lines() {
                log::error!(" | {line}");
            }
            return Err(GlError::StageCompile { stage, log });
        }

        Ok(object)
    }
}

impl<A: GlApi> Drop for StageObject<'_, A> {
    fn drop(&mut self) {
        if let Err(err) = gl_call!(self.ctx, |gl| gl.delete_shader(self.handle)) {
            log::error!("failed to delete shader stage {}: {err}", self.handle);
        }
    }
}

/// A driver uniform location. [`UniformLocation::MISSING`] marks a name the
/// program has no active uniform for; setting it does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(GLint);

impl UniformLocation {
    pub const MISSING: Self = Self(-1);

    pub const fn raw(self) -> GLint {
        self.0
    }

    pub const fn is_missing(self) -> bool {
        self.0 < 0
    }
}

/// A linked vertex + fragment program.
pub struct Shader<'ctx, A: GlApi> {
    ctx: &'ctx Context<A>,
    handle: GLuint,
    filepath: Option<PathBuf>,
    uniform_cache: RefCell<HashMap<String, UniformLocation>>,
}
has_handle!(Shader);

impl<'ctx, A: GlApi> Shader<'ctx, A> {
    pub fn from_file(ctx: &'ctx Context<A>, path: impl AsRef<Path>) -> GlResult<Self> {
        let path = path.as_ref();
        let source = ShaderSource::read(path)?;
        let mut shader = Self::from_source(ctx, &source)?;
        shader.filepath = Some(path.to_path_buf());
        Ok(shader)
    }

    /// Compiles both stages and links them. Any stage failing to compile
    /// aborts construction; nothing is linked against a missing stage.
    pub fn from_source(ctx: &'ctx Context<A>, source: &ShaderSource) -> GlResult<Self> {
        let handle = gl_call!(ctx, |gl| gl.create_program())?;
        if handle == 0 {
            return Err(GlError::CreateFailed { object: "program" });
        }
        let shader = Self {
            ctx,
            handle,
            filepath: None,
            uniform_cache: RefCell::new(HashMap::new()),
        };

        let vs = StageObject::compile(ctx, ShaderStage::Vertex, &source.vertex)?;
        let fs = StageObject::compile(ctx, ShaderStage::Fragment, &source.fragment)?;
        shader.link(&[vs, fs])?;

        log::debug!("linked program {handle}");
        Ok(shader)
    }

    fn link(&self, stages: &[StageObject<'ctx, A>]) -> GlResult<()> {
        let ctx = self.ctx;
        let program = self.handle;

        for stage in stages {
            gl_call!(ctx, |gl| gl.attach_shader(program, stage.handle))?;
        }
        gl_call!(ctx, |gl| gl.link_program(program))?;

        if !gl_call!(ctx, |gl| gl.program_link_status(program))? {
            let log = gl_call!(ctx, |gl| gl.program_info_log(program))?;
            log::error!("failed to link program {program}:");
            for line in log.lines() {
                log::error!(" | {line}");
            }
            return Err(GlError::Link { log });
        }

        gl_call!(ctx, |gl| gl.validate_program(program))?;
        if !gl_call!(ctx, |gl| gl.program_validate_status(program))? {
            let log = gl_call!(ctx, |gl| gl.program_info_log(program))?;
            log::warn!("program {program} did not validate: {}", log.trim_end());
        }

        for stage in stages {
            gl_call!(ctx, |gl| gl.detach_shader(program, stage.handle))?;
        }
        Ok(())
    }

    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// Cached per name. A name the program lacks is queried once, warned
    /// about once, and cached as [`UniformLocation::MISSING`].
    pub fn uniform_location(&self, name: &str) -> GlResult<UniformLocation> {
        if let Some(&location) = self.uniform_cache.borrow().get(name) {
            return Ok(location);
        }

        let raw = gl_call!(self.ctx, |gl| gl.uniform_location(self.handle, name))?;
        let location = UniformLocation(raw);
        if location.is_missing() {
            log::warn!("uniform '{name}' doesn't exist in program {}", self.handle);
        }

        self.uniform_cache
            .borrow_mut()
            .insert(name.to_owned(), location);
        Ok(location)
    }

    /// Makes this the active program. Uniforms can only be set through the
    /// returned binding.
    pub fn bind(&self) -> GlResult<ShaderBinding<'_, A>> {
        gl_call!(self.ctx, |gl| gl.use_program(self.handle))?;
        Ok(ShaderBinding { shader: self })
    }

    pub fn unbind(&self) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.use_program(0))
    }
}

impl<A: GlApi> Drop for Shader<'_, A> {
    fn drop(&mut self) {
        match gl_call!(self.ctx, |gl| gl.delete_program(self.handle)) {
            Ok(()) => log::trace!("deleted program {}", self.handle),
            Err(err) => log::error!("failed to delete program {}: {err}", self.handle),
        }
    }
}

/// Proof that a [`Shader`] was made the active program.
///
/// Binding another program while this is alive makes the setters write to
/// that program instead, so keep bindings short-lived.
pub struct ShaderBinding<'s, A: GlApi> {
    shader: &'s Shader<'s, A>,
}

impl<A: GlApi> ShaderBinding<'_, A> {
    pub fn shader(&self) -> &Shader<'_, A> {
        self.shader
    }

    fn set(&self, name: &str, write: impl FnOnce(&A, GLint)) -> GlResult<()> {
        let location = self.shader.uniform_location(name)?;
        gl_call!(self.shader.ctx, |gl| write(gl, location.raw()))
    }

    pub fn set_uniform_1i(&self, name: &str, value: i32) -> GlResult<()> {
        self.set(name, |gl, location| gl.uniform_1i(location, value))
    }

    pub fn set_uniform_1f(&self, name: &str, value: f32) -> GlResult<()> {
        self.set(name, |gl, location| gl.uniform_1f(location, value))
    }

    pub fn set_uniform_vec2(&self, name: &str, value: Vec2) -> GlResult<()> {
        self.set(name, |gl, location| gl.uniform_2f(location, value.to_array()))
    }

    pub fn set_uniform_4f(&self, name: &str, value: Vec4) -> GlResult<()> {
        self.set(name, |gl, location| gl.uniform_4f(location, value.to_array()))
    }

    pub fn set_uniform_mat4f(&self, name: &str, value: &Mat4) -> GlResult<()> {
        let columns = value.to_cols_array();
        self.set(name, |gl, location| gl.uniform_matrix_4f(location, &columns))
    }
}
