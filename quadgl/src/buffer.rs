use gl::types::*;

use crate::{
    api::GlApi, context::Context, error::GlError, gl_call, has_handle, transmutable_u32, GlResult,
};

/// Usage hint for every upload. Buffers are written once at creation and
/// drawn from many times.
pub const WRITE_ONCE_USAGE: GLenum = gl::STATIC_DRAW;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferBindTarget {
    /// Vertex attributes
    ArrayBuffer = gl::ARRAY_BUFFER,
    /// Vertex array indices
    ElementArray = gl::ELEMENT_ARRAY_BUFFER,
}
transmutable_u32!(BufferBindTarget);

/// A write-once block of GPU memory. The size is fixed at creation.
pub struct Buffer<'ctx, A: GlApi> {
    ctx: &'ctx Context<A>,
    handle: GLuint,
    target: BufferBindTarget,
    size: usize,
}
has_handle!(Buffer);

impl<'ctx, A: GlApi> Buffer<'ctx, A> {
    pub fn new(
        ctx: &'ctx Context<A>,
        target: BufferBindTarget,
        data: &[u8],
    ) -> GlResult<Self> {
        let handle = gl_call!(ctx, |gl| gl.gen_buffer())?;
        if handle == 0 {
            return Err(GlError::CreateFailed { object: "buffer" });
        }
        // from here on a failed upload still releases the handle
        let buffer = Self {
            ctx,
            handle,
            target,
            size: data.len(),
        };
        buffer.bind()?;
        gl_call!(ctx, |gl| gl.buffer_data(target, data, WRITE_ONCE_USAGE))?;
        log::debug!("created {target:?} buffer {handle} ({} bytes)", data.len());
        Ok(buffer)
    }

    pub fn target(&self) -> BufferBindTarget {
        self.target
    }

    /// Size in bytes, as uploaded.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Binds the buffer and asks the driver how large it is.
    pub fn driver_size(&self) -> GlResult<usize> {
        self.bind()?;
        let size = gl_call!(self.ctx, |gl| gl.buffer_size(self.target))?;
        Ok(size.max(0) as usize)
    }

    pub fn bind(&self) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.bind_buffer(self.target, self.handle))
    }

    pub fn unbind(&self) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.bind_buffer(self.target, 0))
    }
}

impl<A: GlApi> Drop for Buffer<'_, A> {
    fn drop(&mut self) {
        match gl_call!(self.ctx, |gl| gl.delete_buffer(self.handle)) {
            Ok(()) => log::trace!("deleted buffer {}", self.handle),
            Err(err) => log::error!("failed to delete buffer {}: {err}", self.handle),
        }
    }
}

/// Vertex attribute data.
pub struct VertexBuffer<'ctx, A: GlApi> {
    buffer: Buffer<'ctx, A>,
}

impl<'ctx, A: GlApi> VertexBuffer<'ctx, A> {
    pub fn new<T: bytemuck::Pod>(ctx: &'ctx Context<A>, data: &[T]) -> GlResult<Self> {
        Self::from_bytes(ctx, bytemuck::cast_slice(data))
    }

    pub fn from_bytes(ctx: &'ctx Context<A>, data: &[u8]) -> GlResult<Self> {
        let buffer = Buffer::new(ctx, BufferBindTarget::ArrayBuffer, data)?;
        Ok(Self { buffer })
    }

    pub fn buffer(&self) -> &Buffer<'ctx, A> {
        &self.buffer
    }

    pub fn size(&self) -> usize {
        self.buffer.size()
    }

    pub fn bind(&self) -> GlResult<()> {
        self.buffer.bind()
    }

    pub fn unbind(&self) -> GlResult<()> {
        self.buffer.unbind()
    }
}

/// Unsigned 32-bit primitive indices.
pub struct IndexBuffer<'ctx, A: GlApi> {
    buffer: Buffer<'ctx, A>,
    count: usize,
}

impl<'ctx, A: GlApi> IndexBuffer<'ctx, A> {
    pub fn new(ctx: &'ctx Context<A>, indices: &[u32]) -> GlResult<Self> {
        let buffer = Buffer::new(
            ctx,
            BufferBindTarget::ElementArray,
            bytemuck::cast_slice(indices),
        )?;
        Ok(Self {
            buffer,
            count: indices.len(),
        })
    }

    pub fn buffer(&self) -> &Buffer<'ctx, A> {
        &self.buffer
    }

    /// Number of indices, not bytes.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bind(&self) -> GlResult<()> {
        self.buffer.bind()
    }

    pub fn unbind(&self) -> GlResult<()> {
        self.buffer.unbind()
    }
}
