use std::{
    ffi::{c_void, CStr, CString},
    marker::PhantomData,
    ptr,
};

use gl::types::*;

use crate::{
    buffer::BufferBindTarget,
    info::GlString,
    renderer::PrimitiveMode,
    shader::ShaderStage,
    vertex::AttrType,
};

/// The driver entry points the resource layer is built on.
///
/// Every method maps onto one OpenGL call (or a fixed pair of calls for the
/// status and log queries). Implementations are expected to behave like a
/// single global OpenGL context: binds mutate shared state, and failures are
/// reported through [`GlApi::get_error`] rather than return values.
pub trait GlApi {
    fn get_error(&self) -> GLenum;
    fn get_string(&self, name: GlString) -> Option<String>;

    fn gen_buffer(&self) -> GLuint;
    fn delete_buffer(&self, buffer: GLuint);
    fn bind_buffer(&self, target: BufferBindTarget, buffer: GLuint);
    fn buffer_data(&self, target: BufferBindTarget, data: &[u8], usage: GLenum);
    /// Byte size of the buffer currently bound to `target`.
    fn buffer_size(&self, target: BufferBindTarget) -> GLint;

    fn gen_vertex_array(&self) -> GLuint;
    fn delete_vertex_array(&self, array: GLuint);
    fn bind_vertex_array(&self, array: GLuint);
    fn enable_vertex_attrib_array(&self, index: GLuint);
    #[allow(clippy::too_many_arguments)]
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        component_count: GLint,
        attr_type: AttrType,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );
    fn vertex_attrib_i_pointer(
        &self,
        index: GLuint,
        component_count: GLint,
        attr_type: AttrType,
        stride: GLsizei,
        offset: usize,
    );

    fn create_shader(&self, stage: ShaderStage) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &str);
    fn compile_shader(&self, shader: GLuint);
    fn shader_compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn detach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn program_link_status(&self, program: GLuint) -> bool;
    fn validate_program(&self, program: GLuint);
    fn program_validate_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);

    /// Returns `-1` when the program has no active uniform called `name`.
    fn uniform_location(&self, program: GLuint, name: &str) -> GLint;
    fn uniform_1i(&self, location: GLint, value: GLint);
    fn uniform_1f(&self, location: GLint, value: GLfloat);
    fn uniform_2f(&self, location: GLint, value: [GLfloat; 2]);
    fn uniform_4f(&self, location: GLint, value: [GLfloat; 4]);
    /// `value` is column-major.
    fn uniform_matrix_4f(&self, location: GLint, value: &[GLfloat; 16]);

    fn gen_texture(&self) -> GLuint;
    fn delete_texture(&self, texture: GLuint);
    fn active_texture(&self, slot: u32);
    fn bind_texture_2d(&self, texture: GLuint);
    fn tex_parameter_2d(&self, param: GLenum, value: GLint);
    fn tex_image_2d_rgba8(&self, width: GLsizei, height: GLsizei, pixels: &[u8]);

    fn clear_color(&self, rgba: [GLfloat; 4]);
    fn clear(&self, mask: GLbitfield);
    fn enable(&self, capability: GLenum);
    fn blend_func(&self, src: GLenum, dst: GLenum);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    /// Indexed draw reading `count` unsigned 32-bit indices from the bound
    /// element buffer.
    fn draw_elements(&self, mode: PrimitiveMode, count: GLsizei);
}

/// [`GlApi`] over the process-wide OpenGL function pointers.
///
/// Not `Send` or `Sync`: the context it talks to is current on one thread.
pub struct NativeGl {
    _thread_bound: PhantomData<*const ()>,
}

impl NativeGl {
    /// Loads the OpenGL function pointers. The context the loader belongs to
    /// must be current on this thread for as long as the returned value is
    /// used.
    pub fn load_with(loader: impl FnMut(&'static str) -> *const c_void) -> Self {
        gl::load_with(loader);
        Self {
            _thread_bound: PhantomData,
        }
    }
}

fn read_info_log(
    handle: GLuint,
    get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
    get_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut log_size = 0;
    unsafe { get_iv(handle, gl::INFO_LOG_LENGTH, &mut log_size) };
    if log_size <= 0 {
        return String::new();
    }

    let mut info_log: Vec<u8> = vec![0; log_size as usize];
    let mut bytes_written = 0;
    unsafe {
        get_log(
            handle,
            log_size,
            &mut bytes_written,
            info_log.as_mut_ptr().cast(),
        );
    }
    info_log.truncate(bytes_written.max(0) as usize);
    String::from_utf8_lossy(&info_log).into_owned()
}

impl GlApi for NativeGl {
    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn get_string(&self, name: GlString) -> Option<String> {
        let str_ptr = unsafe { gl::GetString(name.to_u32()) };
        if str_ptr.is_null() {
            return None;
        }
        let value = unsafe { CStr::from_ptr(str_ptr.cast()) };
        Some(value.to_string_lossy().into_owned())
    }

    fn gen_buffer(&self) -> GLuint {
        let mut handle = 0;
        unsafe { gl::GenBuffers(1, &mut handle) };
        handle
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) };
    }

    fn bind_buffer(&self, target: BufferBindTarget, buffer: GLuint) {
        unsafe { gl::BindBuffer(target.to_u32(), buffer) };
    }

    fn buffer_data(&self, target: BufferBindTarget, data: &[u8], usage: GLenum) {
        unsafe {
            gl::BufferData(
                target.to_u32(),
                data.len() as GLsizeiptr,
                data.as_ptr().cast(),
                usage,
            );
        }
    }

    fn buffer_size(&self, target: BufferBindTarget) -> GLint {
        let mut size = 0;
        unsafe { gl::GetBufferParameteriv(target.to_u32(), gl::BUFFER_SIZE, &mut size) };
        size
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut handle = 0;
        unsafe { gl::GenVertexArrays(1, &mut handle) };
        handle
    }

    fn delete_vertex_array(&self, array: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &array) };
    }

    fn bind_vertex_array(&self, array: GLuint) {
        unsafe { gl::BindVertexArray(array) };
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) };
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
        let normalized = if normalized { gl::TRUE } else { gl::FALSE };
        unsafe {
            gl::VertexAttribPointer(
                index,
                component_count,
                attr_type.to_u32(),
                normalized,
                stride,
                offset as *const c_void,
            );
        }
    }

    fn vertex_attrib_i_pointer(
        &self,
        index: GLuint,
        component_count: GLint,
        attr_type: AttrType,
        stride: GLsizei,
        offset: usize,
    ) {
        unsafe {
            gl::VertexAttribIPointer(
                index,
                component_count,
                attr_type.to_u32(),
                stride,
                offset as *const c_void,
            );
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        unsafe { gl::CreateShader(stage.to_u32()) }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let length = source.len() as GLint;
        let source = source.as_ptr().cast::<GLchar>();
        unsafe { gl::ShaderSource(shader, 1, &source, &length) };
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        let mut success = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success) };
        success != GLint::from(gl::FALSE)
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        read_info_log(shader, gl::GetShaderiv, gl::GetShaderInfoLog)
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) };
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&self, program: GLuint) -> bool {
        let mut success = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut success) };
        success != GLint::from(gl::FALSE)
    }

    fn validate_program(&self, program: GLuint) {
        unsafe { gl::ValidateProgram(program) };
    }

    fn program_validate_status(&self, program: GLuint) -> bool {
        let mut success = 0;
        unsafe { gl::GetProgramiv(program, gl::VALIDATE_STATUS, &mut success) };
        success != GLint::from(gl::FALSE)
    }

    fn program_info_log(&self, program: GLuint) -> String {
        read_info_log(program, gl::GetProgramiv, gl::GetProgramInfoLog)
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) };
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> GLint {
        // interior nul can never name a uniform
        let Ok(name) = CString::new(name) else {
            return -1;
        };
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        unsafe { gl::Uniform1i(location, value) };
    }

    fn uniform_1f(&self, location: GLint, value: GLfloat) {
        unsafe { gl::Uniform1f(location, value) };
    }

    fn uniform_2f(&self, location: GLint, [x, y]: [GLfloat; 2]) {
        unsafe { gl::Uniform2f(location, x, y) };
    }

    fn uniform_4f(&self, location: GLint, [x, y, z, w]: [GLfloat; 4]) {
        unsafe { gl::Uniform4f(location, x, y, z, w) };
    }

    fn uniform_matrix_4f(&self, location: GLint, value: &[GLfloat; 16]) {
        unsafe { gl::UniformMatrix4fv(location, 1, gl::FALSE, value.as_ptr()) };
    }

    fn gen_texture(&self) -> GLuint {
        let mut handle = 0;
        unsafe { gl::GenTextures(1, &mut handle) };
        handle
    }

    fn delete_texture(&self, texture: GLuint) {
        unsafe { gl::DeleteTextures(1, &texture) };
    }

    fn active_texture(&self, slot: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + slot) };
    }

    fn bind_texture_2d(&self, texture: GLuint) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D, texture) };
    }

    fn tex_parameter_2d(&self, param: GLenum, value: GLint) {
        unsafe { gl::TexParameteri(gl::TEXTURE_2D, param, value) };
    }

    fn tex_image_2d_rgba8(&self, width: GLsizei, height: GLsizei, pixels: &[u8]) {
        unsafe {
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA8 as GLint,
                width,
                height,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                pixels.as_ptr().cast(),
            );
        }
    }

    fn clear_color(&self, [r, g, b, a]: [GLfloat; 4]) {
        unsafe { gl::ClearColor(r, g, b, a) };
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) };
    }

    fn enable(&self, capability: GLenum) {
        unsafe { gl::Enable(capability) };
    }

    fn blend_func(&self, src: GLenum, dst: GLenum) {
        unsafe { gl::BlendFunc(src, dst) };
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) };
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: GLsizei) {
        unsafe { gl::DrawElements(mode.to_u32(), count, gl::UNSIGNED_INT, ptr::null()) };
    }
}
