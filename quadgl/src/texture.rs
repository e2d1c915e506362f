use gl::types::*;

use crate::{api::GlApi, context::Context, error::GlError, gl_call, has_handle, GlResult};

/// A 2D RGBA8 texture, linearly filtered and clamped at the edges.
///
/// Pixels arrive already decoded; row 0 is the bottom of the image.
pub struct Texture<'ctx, A: GlApi> {
    ctx: &'ctx Context<A>,
    handle: GLuint,
    width: u32,
    height: u32,
}
has_handle!(Texture);

impl<'ctx, A: GlApi> Texture<'ctx, A> {
    pub fn from_rgba8(
        ctx: &'ctx Context<A>,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> GlResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(GlError::TextureSize {
                width,
                height,
                expected,
                got: pixels.len(),
            });
        }

        let handle = gl_call!(ctx, |gl| gl.gen_texture())?;
        if handle == 0 {
            return Err(GlError::CreateFailed { object: "texture" });
        }
        let texture = Self {
            ctx,
            handle,
            width,
            height,
        };

        gl_call!(ctx, |gl| gl.bind_texture_2d(handle))?;
        for (param, value) in [
            (gl::TEXTURE_MIN_FILTER, gl::LINEAR),
            (gl::TEXTURE_MAG_FILTER, gl::LINEAR),
            (gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE),
            (gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE),
        ] {
            gl_call!(ctx, |gl| gl.tex_parameter_2d(param, value as GLint))?;
        }
        gl_call!(ctx, |gl| gl.tex_image_2d_rgba8(
            width as GLsizei,
            height as GLsizei,
            pixels
        ))?;
        texture.unbind()?;

        log::debug!("created {width}x{height} texture {handle}");
        Ok(texture)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Binds to texture unit `slot`, the value a sampler uniform takes.
    pub fn bind(&self, slot: u32) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.active_texture(slot))?;
        gl_call!(self.ctx, |gl| gl.bind_texture_2d(self.handle))
    }

    pub fn unbind(&self) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.bind_texture_2d(0))
    }
}

impl<A: GlApi> Drop for Texture<'_, A> {
    fn drop(&mut self) {
        match gl_call!(self.ctx, |gl| gl.delete_texture(self.handle)) {
            Ok(()) => log::trace!("deleted texture {}", self.handle),
            Err(err) => log::error!("failed to delete texture {}: {err}", self.handle),
        }
    }
}
