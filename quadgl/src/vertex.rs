use gl::types::*;

use crate::{
    api::GlApi, buffer::VertexBuffer, context::Context, error::GlError, gl_call, has_handle,
    transmutable_u32, GlResult,
};

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    Float = gl::FLOAT,
    Uint = gl::UNSIGNED_INT,
    Int = gl::INT,
    Ubyte = gl::UNSIGNED_BYTE,
}
transmutable_u32!(AttrType);

enum GlVertexFormatFunc {
    Float,
    Int,
}

impl AttrType {
    /// Size of one component in bytes.
    pub const fn size(self) -> u32 {
        match self {
            Self::Float => 4,
            Self::Uint => 4,
            Self::Int => 4,
            Self::Ubyte => 1,
        }
    }

    // normalized integers reach the shader as floats
    fn function_to_use(self, normalized: bool) -> GlVertexFormatFunc {
        match self {
            Self::Float => GlVertexFormatFunc::Float,
            Self::Int | Self::Uint | Self::Ubyte if normalized => GlVertexFormatFunc::Float,
            Self::Int | Self::Uint | Self::Ubyte => GlVertexFormatFunc::Int,
        }
    }
}

/// Component types accepted by [`VertexBufferLayout::push`].
pub trait VertexComponent: bytemuck::Pod {
    const ATTR_TYPE: AttrType;
    const NORMALIZED: bool;
}

impl VertexComponent for f32 {
    const ATTR_TYPE: AttrType = AttrType::Float;
    const NORMALIZED: bool = false;
}

impl VertexComponent for u32 {
    const ATTR_TYPE: AttrType = AttrType::Uint;
    const NORMALIZED: bool = false;
}

impl VertexComponent for i32 {
    const ATTR_TYPE: AttrType = AttrType::Int;
    const NORMALIZED: bool = false;
}

impl VertexComponent for u8 {
    const ATTR_TYPE: AttrType = AttrType::Ubyte;
    const NORMALIZED: bool = true;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutElement {
    pub attr_type: AttrType,
    pub component_count: u32,
    pub normalized: bool,
}

impl LayoutElement {
    pub const fn size(&self) -> u32 {
        self.component_count * self.attr_type.size()
    }
}

/// How the bytes of one vertex map onto attribute slots.
///
/// Entries must be pushed in the order the vertex shader declares its
/// inputs; nothing checks the two against each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexBufferLayout {
    elements: Vec<LayoutElement>,
    stride: u32,
}

impl VertexBufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: VertexComponent>(&mut self, component_count: u32) -> GlResult<&mut Self> {
        self.push_attr(T::ATTR_TYPE, component_count, T::NORMALIZED)
    }

    /// Appends one attribute of 1 to 4 components.
    pub fn push_attr(
        &mut self,
        attr_type: AttrType,
        component_count: u32,
        normalized: bool,
    ) -> GlResult<&mut Self> {
        if !(1..=4).contains(&component_count) {
            return Err(GlError::ComponentCount {
                count: component_count,
            });
        }
        let element = LayoutElement {
            attr_type,
            component_count,
            normalized,
        };
        self.stride += element.size();
        self.elements.push(element);
        Ok(self)
    }

    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    /// Bytes between the starts of consecutive vertices.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Each element with its byte offset inside a vertex.
    pub fn offsets(&self) -> impl Iterator<Item = (&LayoutElement, u32)> + '_ {
        self.elements.iter().scan(0, |offset, element| {
            let this_offset = *offset;
            *offset += element.size();
            Some((element, this_offset))
        })
    }
}

/// Remembers which buffers feed which attribute slots, so binding it alone
/// restores the whole vertex input state.
pub struct VertexArray<'a, A: GlApi> {
    ctx: &'a Context<A>,
    handle: GLuint,
    next_attr_index: GLuint,
    buffers: Vec<&'a VertexBuffer<'a, A>>,
}
has_handle!(VertexArray);

impl<'a, A: GlApi> VertexArray<'a, A> {
    pub fn new(ctx: &'a Context<A>) -> GlResult<Self> {
        let handle = gl_call!(ctx, |gl| gl.gen_vertex_array())?;
        if handle == 0 {
            return Err(GlError::CreateFailed {
                object: "vertex array",
            });
        }
        log::debug!("created vertex array {handle}");
        Ok(Self {
            ctx,
            handle,
            next_attr_index: 0,
            buffers: Vec::new(),
        })
    }

    /// Registers every element of `layout` as the next attribute slot,
    /// sourcing from `buffer`. Slot numbers keep counting across calls.
    ///
    /// If a slot fails, the slots wired before it stay registered and
    /// `buffer` stays referenced by the vertex array.
    pub fn add_buffer(
        &mut self,
        buffer: &'a VertexBuffer<'a, A>,
        layout: &VertexBufferLayout,
    ) -> GlResult<()> {
        self.bind()?;
        buffer.bind()?;
        self.buffers.push(buffer);

        let stride = layout.stride() as GLsizei;
        for (element, offset) in layout.offsets() {
            let index = self.next_attr_index;
            let count = element.component_count as GLint;
            let offset = offset as usize;

            gl_call!(self.ctx, |gl| gl.enable_vertex_attrib_array(index))?;
            match element.attr_type.function_to_use(element.normalized) {
                GlVertexFormatFunc::Float => gl_call!(self.ctx, |gl| gl.vertex_attrib_pointer(
                    index,
                    count,
                    element.attr_type,
                    element.normalized,
                    stride,
                    offset,
                ))?,
                GlVertexFormatFunc::Int => gl_call!(self.ctx, |gl| gl.vertex_attrib_i_pointer(
                    index,
                    count,
                    element.attr_type,
                    stride,
                    offset,
                ))?,
            }
            self.next_attr_index += 1;
        }
        Ok(())
    }

    /// Attribute slots registered so far.
    pub fn attr_count(&self) -> u32 {
        self.next_attr_index
    }

    pub fn buffers(&self) -> &[&'a VertexBuffer<'a, A>] {
        &self.buffers
    }

    pub fn bind(&self) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.bind_vertex_array(self.handle))
    }

    pub fn unbind(&self) -> GlResult<()> {
        gl_call!(self.ctx, |gl| gl.bind_vertex_array(0))
    }
}

impl<A: GlApi> Drop for VertexArray<'_, A> {
    fn drop(&mut self) {
        match gl_call!(self.ctx, |gl| gl.delete_vertex_array(self.handle)) {
            Ok(()) => log::trace!("deleted vertex array {}", self.handle),
            Err(err) => log::error!("failed to delete vertex array {}: {err}", self.handle),
        }
    }
}
