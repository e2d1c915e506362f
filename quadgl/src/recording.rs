//! An in-memory [`GlApi`] that records every command instead of talking to a
//! driver. Handles are issued from 1 upward, uploaded buffer sizes are kept
//! for introspection, and errors can be queued on demand.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
};

use gl::types::*;

use crate::{
    api::GlApi,
    buffer::BufferBindTarget,
    info::GlString,
    renderer::PrimitiveMode,
    shader::ShaderStage,
    vertex::AttrType,
};

/// A command as seen by the driver. Pure queries (error queue, status and
/// log reads) are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GenBuffer(GLuint),
    DeleteBuffer(GLuint),
    BindBuffer(BufferBindTarget, GLuint),
    BufferData {
        target: BufferBindTarget,
        len: usize,
        usage: GLenum,
    },
    GenVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    BindVertexArray(GLuint),
    EnableVertexAttribArray(GLuint),
    VertexAttribPointer {
        index: GLuint,
        component_count: GLint,
        attr_type: AttrType,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    },
    VertexAttribIPointer {
        index: GLuint,
        component_count: GLint,
        attr_type: AttrType,
        stride: GLsizei,
        offset: usize,
    },
    CreateShader(ShaderStage, GLuint),
    ShaderSource(GLuint, String),
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader { program: GLuint, shader: GLuint },
    DetachShader { program: GLuint, shader: GLuint },
    LinkProgram(GLuint),
    ValidateProgram(GLuint),
    UseProgram(GLuint),
    DeleteProgram(GLuint),
    Uniform1i(GLint, GLint),
    Uniform1f(GLint, GLfloat),
    Uniform2f(GLint, [GLfloat; 2]),
    Uniform4f(GLint, [GLfloat; 4]),
    UniformMatrix4f(GLint, [GLfloat; 16]),
    GenTexture(GLuint),
    DeleteTexture(GLuint),
    ActiveTexture(u32),
    BindTexture2d(GLuint),
    TexParameter2d(GLenum, GLint),
    TexImage2d {
        width: GLsizei,
        height: GLsizei,
        len: usize,
    },
    ClearColor([GLfloat; 4]),
    Clear(GLbitfield),
    Enable(GLenum),
    BlendFunc(GLenum, GLenum),
    Viewport(GLint, GLint, GLsizei, GLsizei),
    DrawElements { mode: PrimitiveMode, count: GLsizei },
}

type CallMatcher = Box<dyn Fn(&Call) -> bool>;

#[derive(Default)]
struct State {
    last_handle: GLuint,
    calls: Vec<Call>,
    errors: VecDeque<GLenum>,
    error_triggers: Vec<(CallMatcher, GLenum)>,

    bound_buffers: HashMap<BufferBindTarget, GLuint>,
    buffer_sizes: HashMap<GLuint, usize>,
    shader_stages: HashMap<GLuint, ShaderStage>,
    bound_program: GLuint,

    uniforms: HashMap<String, GLint>,
    uniform_queries: HashMap<String, usize>,
    compile_failure: Option<(ShaderStage, String)>,
    link_failure: Option<String>,
}

impl State {
    fn next_handle(&mut self) -> GLuint {
        self.last_handle += 1;
        self.last_handle
    }
}

#[derive(Default)]
pub struct RecordingGl {
    state: RefCell<State>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Programs report `name` as an active uniform at `location`.
    pub fn with_uniform(self, name: &str, location: GLint) -> Self {
        self.state
            .borrow_mut()
            .uniforms
            .insert(name.to_owned(), location);
        self
    }

    /// Every shader of `stage` fails to compile with `log`.
    pub fn fail_compile(self, stage: ShaderStage, log: &str) -> Self {
        self.state.borrow_mut().compile_failure = Some((stage, log.to_owned()));
        self
    }

    pub fn fail_link(self, log: &str) -> Self {
        self.state.borrow_mut().link_failure = Some(log.to_owned());
        self
    }

    /// Queues `code` as if an earlier, unchecked call had failed.
    pub fn push_error(&self, code: GLenum) {
        self.state.borrow_mut().errors.push_back(code);
    }

    /// Queues `code` right after the next call matching `matcher`.
    pub fn fail_after(&self, matcher: impl Fn(&Call) -> bool + 'static, code: GLenum) {
        self.state
            .borrow_mut()
            .error_triggers
            .push((Box::new(matcher), code));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn count_calls(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| matcher(c)).count()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// How many times the driver was asked for the location of `name`.
    pub fn uniform_queries(&self, name: &str) -> usize {
        let state = self.state.borrow();
        state.uniform_queries.get(name).copied().unwrap_or(0)
    }

    pub fn pending_errors(&self) -> usize {
        self.state.borrow().errors.len()
    }

    pub fn bound_program(&self) -> GLuint {
        self.state.borrow().bound_program
    }

    fn record(&self, call: Call) {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state
            .error_triggers
            .iter()
            .position(|(matcher, _)| matcher(&call))
        {
            let (_, code) = state.error_triggers.remove(pos);
            state.errors.push_back(code);
        }
        state.calls.push(call);
    }

    fn issue(&self, make: impl FnOnce(GLuint) -> Call) -> GLuint {
        let handle = self.state.borrow_mut().next_handle();
        self.record(make(handle));
        handle
    }
}

impl GlApi for RecordingGl {
    fn get_error(&self) -> GLenum {
        let mut state = self.state.borrow_mut();
        state.errors.pop_front().unwrap_or(gl::NO_ERROR)
    }

    fn get_string(&self, name: GlString) -> Option<String> {
        Some(match name {
            GlString::Vendor => "quadgl".to_owned(),
            GlString::Renderer => "recording".to_owned(),
            GlString::Version => "3.3.0 recording".to_owned(),
            GlString::ShadingLanguageVersion => "3.30".to_owned(),
        })
    }

    fn gen_buffer(&self) -> GLuint {
        self.issue(Call::GenBuffer)
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.state.borrow_mut().buffer_sizes.remove(&buffer);
        self.record(Call::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: BufferBindTarget, buffer: GLuint) {
        self.state.borrow_mut().bound_buffers.insert(target, buffer);
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferBindTarget, data: &[u8], usage: GLenum) {
        {
            let mut state = self.state.borrow_mut();
            if let Some(&bound) = state.bound_buffers.get(&target) {
                state.buffer_sizes.insert(bound, data.len());
            }
        }
        self.record(Call::BufferData {
            target,
            len: data.len(),
            usage,
        });
    }

    fn buffer_size(&self, target: BufferBindTarget) -> GLint {
        let state = self.state.borrow();
        state
            .bound_buffers
            .get(&target)
            .and_then(|bound| state.buffer_sizes.get(bound))
            .map_or(0, |&size| size as GLint)
    }

    fn gen_vertex_array(&self) -> GLuint {
        self.issue(Call::GenVertexArray)
    }

    fn delete_vertex_array(&self, array: GLuint) {
        self.record(Call::DeleteVertexArray(array));
    }

    fn bind_vertex_array(&self, array: GLuint) {
        self.record(Call::BindVertexArray(array));
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        component_count: GLint,
        attr_type: AttrType,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        self.record(Call::VertexAttribPointer {
            index,
            component_count,
            attr_type,
            normalized,
            stride,
            offset,
        });
    }

    fn vertex_attrib_i_pointer(
        &self,
        index: GLuint,
        component_count: GLint,
        attr_type: AttrType,
        stride: GLsizei,
        offset: usize,
    ) {
        self.record(Call::VertexAttribIPointer {
            index,
            component_count,
            attr_type,
            stride,
            offset,
        });
    }

    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        let handle = self.issue(|handle| Call::CreateShader(stage, handle));
        self.state.borrow_mut().shader_stages.insert(handle, stage);
        handle
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        self.record(Call::ShaderSource(shader, source.to_owned()));
    }

    fn compile_shader(&self, shader: GLuint) {
        self.record(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        let state = self.state.borrow();
        match (&state.compile_failure, state.shader_stages.get(&shader)) {
            (Some((failing, _)), Some(stage)) => failing != stage,
            _ => true,
        }
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        if self.shader_compile_status(shader) {
            return String::new();
        }
        let state = self.state.borrow();
        state
            .compile_failure
            .as_ref()
            .map(|(_, log)| log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: GLuint) {
        self.state.borrow_mut().shader_stages.remove(&shader);
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> GLuint {
        self.issue(Call::CreateProgram)
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(Call::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(Call::DetachShader { program, shader });
    }

    fn link_program(&self, program: GLuint) {
        self.record(Call::LinkProgram(program));
    }

    fn program_link_status(&self, _program: GLuint) -> bool {
        self.state.borrow().link_failure.is_none()
    }

    fn validate_program(&self, program: GLuint) {
        self.record(Call::ValidateProgram(program));
    }

    fn program_validate_status(&self, _program: GLuint) -> bool {
        true
    }

    fn program_info_log(&self, _program: GLuint) -> String {
        self.state.borrow().link_failure.clone().unwrap_or_default()
    }

    fn use_program(&self, program: GLuint) {
        self.state.borrow_mut().bound_program = program;
        self.record(Call::UseProgram(program));
    }

    fn delete_program(&self, program: GLuint) {
        self.record(Call::DeleteProgram(program));
    }

    fn uniform_location(&self, _program: GLuint, name: &str) -> GLint {
        let mut state = self.state.borrow_mut();
        *state.uniform_queries.entry(name.to_owned()).or_default() += 1;
        state.uniforms.get(name).copied().unwrap_or(-1)
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        self.record(Call::Uniform1i(location, value));
    }

    fn uniform_1f(&self, location: GLint, value: GLfloat) {
        self.record(Call::Uniform1f(location, value));
    }

    fn uniform_2f(&self, location: GLint, value: [GLfloat; 2]) {
        self.record(Call::Uniform2f(location, value));
    }

    fn uniform_4f(&self, location: GLint, value: [GLfloat; 4]) {
        self.record(Call::Uniform4f(location, value));
    }

    fn uniform_matrix_4f(&self, location: GLint, value: &[GLfloat; 16]) {
        self.record(Call::UniformMatrix4f(location, *value));
    }

    fn gen_texture(&self) -> GLuint {
        self.issue(Call::GenTexture)
    }

    fn delete_texture(&self, texture: GLuint) {
        self.record(Call::DeleteTexture(texture));
    }

    fn active_texture(&self, slot: u32) {
        self.record(Call::ActiveTexture(slot));
    }

    fn bind_texture_2d(&self, texture: GLuint) {
        self.record(Call::BindTexture2d(texture));
    }

    fn tex_parameter_2d(&self, param: GLenum, value: GLint) {
        self.record(Call::TexParameter2d(param, value));
    }

    fn tex_image_2d_rgba8(&self, width: GLsizei, height: GLsizei, pixels: &[u8]) {
        self.record(Call::TexImage2d {
            width,
            height,
            len: pixels.len(),
        });
    }

    fn clear_color(&self, rgba: [GLfloat; 4]) {
        self.record(Call::ClearColor(rgba));
    }

    fn clear(&self, mask: GLbitfield) {
        self.record(Call::Clear(mask));
    }

    fn enable(&self, capability: GLenum) {
        self.record(Call::Enable(capability));
    }

    fn blend_func(&self, src: GLenum, dst: GLenum) {
        self.record(Call::BlendFunc(src, dst));
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: GLsizei) {
        self.record(Call::DrawElements { mode, count });
    }
}
