use gl::types::*;
use glam::{IVec2, Vec4};

use crate::{
    api::GlApi,
    buffer::IndexBuffer,
    context::Context,
    error::GlError,
    gl_call,
    shader::Shader,
    transmutable_u32,
    vertex::VertexArray,
    GlResult,
};

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Triangles = gl::TRIANGLES,
}
transmutable_u32!(PrimitiveMode);

pub(crate) fn draw_count(count: usize) -> GlResult<GLsizei> {
    GLsizei::try_from(count).map_err(|_| GlError::DrawTooLarge { count })
}

/// Issues clears and draws. One draw call per [`Renderer::draw`], no
/// batching or sorting.
pub struct Renderer<'ctx, A: GlApi> {
    ctx: &'ctx Context<A>,
}

impl<'ctx, A: GlApi> Renderer<'ctx, A> {
    pub fn new(ctx: &'ctx Context<A>) -> Self {
        Self { ctx }
    }

    pub fn clear(&self) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.clear(gl::COLOR_BUFFER_BIT))
    }

    pub fn set_clear_color(&self, color: Vec4) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.clear_color(color.to_array()))
    }

    /// `SRC_ALPHA, ONE_MINUS_SRC_ALPHA` blending.
    pub fn enable_alpha_blending(&self) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.enable(gl::BLEND))?;
        gl_call!(self.ctx, |gl| gl.blend_func(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA))
    }

    pub fn set_viewport(&self, size: IVec2) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.viewport(0, 0, size.x, size.y))
    }

    /// Binds all three, then draws every index in `index_buffer` as a
    /// triangle list.
    pub fn draw(
        &self,
        vertex_array: &VertexArray<'_, A>,
        index_buffer: &IndexBuffer<'_, A>,
        shader: &Shader<'_, A>,
    ) -> GlResult<()> {
        let count = draw_count(index_buffer.count())?;
        shader.bind()?;
        vertex_array.bind()?;
        index_buffer.bind()?;

        gl_call!(self.ctx, |gl| gl.draw_elements(PrimitiveMode::Triangles, count))
    }
}
