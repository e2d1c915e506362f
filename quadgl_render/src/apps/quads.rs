use glam::{IVec2, Mat4, Vec3, Vec4};
use quadgl::{
    buffer::IndexBuffer,
    renderer::Renderer,
    shader::Shader,
    texture::Texture,
    vertex::{VertexArray, VertexBufferLayout},
    GlApi, GlResult,
};

/// Position xy, then texture uv.
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 16] = [
    -50.0,  50.0, 0.0, 1.0,
    -50.0, -50.0, 0.0, 0.0,
     50.0, -50.0, 1.0, 0.0,
     50.0,  50.0, 1.0, 1.0,
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

pub fn quad_layout() -> GlResult<VertexBufferLayout> {
    let mut layout = VertexBufferLayout::new();
    layout.push::<f32>(2)?.push::<f32>(2)?;
    Ok(layout)
}

/// RGBA8 checkerboard used when no texture file is given.
pub fn checkerboard(size: u32, cell: u32) -> Vec<u8> {
    let cell = cell.max(1);
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x / cell + y / cell) % 2 == 0 {
                [235, 235, 235, 255]
            } else {
                [40, 90, 200, 255]
            }
        })
        .collect()
}

/// One mesh drawn twice per frame at two translations.
pub struct QuadScene<'a, A: GlApi> {
    renderer: Renderer<'a, A>,
    vertex_array: &'a VertexArray<'a, A>,
    index_buffer: &'a IndexBuffer<'a, A>,
    shader: &'a Shader<'a, A>,

    projection: Mat4,
    view: Mat4,
    translations: [Vec3; 2],
    tint: Vec4,
}

impl<'a, A: GlApi> QuadScene<'a, A> {
    pub fn new(
        renderer: Renderer<'a, A>,
        vertex_array: &'a VertexArray<'a, A>,
        index_buffer: &'a IndexBuffer<'a, A>,
        shader: &'a Shader<'a, A>,
        texture: &'a Texture<'a, A>,
    ) -> GlResult<Self> {
        renderer.enable_alpha_blending()?;

        texture.bind(0)?;
        shader.bind()?.set_uniform_1i("u_Texture", 0)?;

        vertex_array.unbind()?;
        shader.unbind()?;
        index_buffer.unbind()?;

        Ok(Self {
            renderer,
            vertex_array,
            index_buffer,
            shader,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            translations: [Vec3::ZERO; 2],
            tint: Vec4::ONE,
        })
    }

    pub fn on_resize(&mut self, new_size: IVec2) -> GlResult<()> {
        self.renderer.set_viewport(new_size)?;
        let size = new_size.as_vec2();
        self.projection = Mat4::orthographic_rh_gl(0.0, size.x, 0.0, size.y, -1.0, 1.0);
        Ok(())
    }

    pub fn update(&mut self, time: f64, window_size: IVec2) {
        let size = window_size.as_vec2();
        let phase = time as f32;
        self.translations = [
            Vec3::new(size.x * (0.3 + 0.1 * phase.sin()), size.y * 0.5, 0.0),
            Vec3::new(size.x * (0.7 + 0.1 * phase.cos()), size.y * 0.5, 0.0),
        ];

        let pulse = 0.5 + 0.5 * (phase * 2.0).sin();
        self.tint = Vec4::new(1.0, 0.6 + 0.4 * pulse, 1.0, 1.0);
    }

    pub fn render(&self) -> GlResult<()> {
        self.renderer.clear()?;

        let binding = self.shader.bind()?;
        binding.set_uniform_4f("u_Color", self.tint)?;
        for translation in self.translations {
            let model = Mat4::from_translation(translation);
            let mvp = self.projection * self.view * model;
            binding.set_uniform_mat4f("u_MVP", &mvp)?;
            self.renderer
                .draw(self.vertex_array, self.index_buffer, self.shader)?;
        }
        Ok(())
    }
}
