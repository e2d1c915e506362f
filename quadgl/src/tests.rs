use pretty_assertions::assert_eq;

use gl::types::GLsizei;
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::buffer::{BufferBindTarget, IndexBuffer, VertexBuffer, WRITE_ONCE_USAGE};
use crate::info::GlString;
use crate::recording::{Call, RecordingGl};
use crate::renderer::{draw_count, PrimitiveMode, Renderer};
use crate::shader::{Shader, ShaderSource, ShaderStage, UniformLocation};
use crate::texture::Texture;
use crate::vertex::{AttrType, VertexArray, VertexBufferLayout};
use crate::{gl_call, Context, ErrorCode, GlError};

const QUAD: [f32; 16] = [
    -0.5, -0.5, 0.0, 0.0, //
    0.5, -0.5, 1.0, 0.0, //
    0.5, 0.5, 1.0, 1.0, //
    -0.5, 0.5, 0.0, 1.0, //
];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

fn basic_source() -> ShaderSource {
    ShaderSource::parse(
        "#shader vertex\nvoid main() { gl_Position = vec4(0.0); }\n\
         #shader fragment\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n",
    )
}

fn quad_layout() -> VertexBufferLayout {
    let mut layout = VertexBufferLayout::new();
    layout.push::<f32>(2).unwrap().push::<f32>(2).unwrap();
    layout
}

#[test]
fn layout_accumulates_stride_and_offsets() {
    let layout = quad_layout();
    assert_eq!(layout.stride(), 16);

    let offsets: Vec<u32> = layout.offsets().map(|(_, offset)| offset).collect();
    assert_eq!(offsets, vec![0, 8]);
}

#[test]
fn byte_attributes_are_normalized() {
    let mut layout = VertexBufferLayout::new();
    layout.push::<f32>(3).unwrap().push::<u8>(4).unwrap();

    assert_eq!(layout.stride(), 16);
    let color = layout.elements()[1];
    assert_eq!(color.attr_type, AttrType::Ubyte);
    assert!(color.normalized);
    assert_eq!(color.size(), 4);
}

#[test]
fn layout_rejects_bad_component_counts() {
    let mut layout = VertexBufferLayout::new();

    for count in [0, 5, u32::MAX] {
        let err = layout.push::<f32>(count).err().unwrap();
        assert!(matches!(err, GlError::ComponentCount { count: c } if c == count));
    }
    assert!(layout.elements().is_empty());
    assert_eq!(layout.stride(), 0);
}

#[test]
fn buffer_size_round_trips_through_driver() {
    let ctx = Context::new(RecordingGl::new());
    let vb = VertexBuffer::new(&ctx, QUAD.as_slice()).unwrap();

    assert_eq!(vb.size(), 64);
    assert_eq!(vb.buffer().driver_size().unwrap(), 64);
    assert_eq!(
        ctx.api().count_calls(|call| matches!(
            call,
            Call::BufferData {
                target: BufferBindTarget::ArrayBuffer,
                len: 64,
                usage: gl::STATIC_DRAW,
            }
        )),
        1
    );
}

#[test]
fn buffers_are_uploaded_once_as_static_draw() {
    let ctx = Context::new(RecordingGl::new());
    let _vb = VertexBuffer::new(&ctx, QUAD.as_slice()).unwrap();
    let _ib = IndexBuffer::new(&ctx, QUAD_INDICES.as_slice()).unwrap();

    let usages: Vec<_> = ctx
        .api()
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::BufferData { target, usage, .. } => Some((target, usage)),
            _ => None,
        })
        .collect();
    assert_eq!(
        usages,
        vec![
            (BufferBindTarget::ArrayBuffer, WRITE_ONCE_USAGE),
            (BufferBindTarget::ElementArray, WRITE_ONCE_USAGE),
        ]
    );
    assert_eq!(WRITE_ONCE_USAGE, gl::STATIC_DRAW);
}

#[test]
fn index_buffer_counts_elements() {
    let ctx = Context::new(RecordingGl::new());
    let ib = IndexBuffer::new(&ctx, QUAD_INDICES.as_slice()).unwrap();

    assert_eq!(ib.count(), 6);
    assert_eq!(ib.buffer().size(), 24);
    assert_eq!(ib.buffer().target(), BufferBindTarget::ElementArray);
}

#[test]
fn add_buffer_registers_slots_in_order() {
    let ctx = Context::new(RecordingGl::new());
    let positions = VertexBuffer::new(&ctx, QUAD.as_slice()).unwrap();
    let ids = VertexBuffer::new(&ctx, [0u32, 1, 2, 3].as_slice()).unwrap();

    let mut id_layout = VertexBufferLayout::new();
    id_layout.push::<u32>(1).unwrap();

    let mut va = VertexArray::new(&ctx).unwrap();
    ctx.api().clear_calls();
    va.add_buffer(&positions, &quad_layout()).unwrap();
    va.add_buffer(&ids, &id_layout).unwrap();

    assert_eq!(va.attr_count(), 3);
    assert_eq!(va.buffers().len(), 2);

    let va_handle = va.as_handle();
    let calls = ctx.api().calls();
    assert_eq!(
        calls,
        vec![
            Call::BindVertexArray(va_handle),
            Call::BindBuffer(BufferBindTarget::ArrayBuffer, positions.buffer().as_handle()),
            Call::EnableVertexAttribArray(0),
            Call::VertexAttribPointer {
                index: 0,
                component_count: 2,
                attr_type: AttrType::Float,
                normalized: false,
                stride: 16,
                offset: 0,
            },
            Call::EnableVertexAttribArray(1),
            Call::VertexAttribPointer {
                index: 1,
                component_count: 2,
                attr_type: AttrType::Float,
                normalized: false,
                stride: 16,
                offset: 8,
            },
            Call::BindVertexArray(va_handle),
            Call::BindBuffer(BufferBindTarget::ArrayBuffer, ids.buffer().as_handle()),
            Call::EnableVertexAttribArray(2),
            Call::VertexAttribIPointer {
                index: 2,
                component_count: 1,
                attr_type: AttrType::Uint,
                stride: 4,
                offset: 0,
            },
        ]
    );
}

#[test]
fn failed_add_buffer_keeps_wired_slots() {
    let ctx = Context::new(RecordingGl::new());
    let vb = VertexBuffer::new(&ctx, QUAD.as_slice()).unwrap();
    let mut va = VertexArray::new(&ctx).unwrap();
    ctx.api().fail_after(
        |call| matches!(call, Call::VertexAttribPointer { index: 1, .. }),
        gl::INVALID_VALUE,
    );

    let err = va.add_buffer(&vb, &quad_layout()).err().unwrap();
    assert!(matches!(
        err,
        GlError::Call {
            code: ErrorCode::InvalidValue,
            ..
        }
    ));
    assert_eq!(va.attr_count(), 1);
    assert_eq!(va.buffers().len(), 1);
    assert_eq!(va.buffers()[0].buffer().as_handle(), vb.buffer().as_handle());
}

#[test]
fn draw_issues_one_indexed_draw() {
    let ctx = Context::new(RecordingGl::new());
    let vb = VertexBuffer::new(&ctx, QUAD.as_slice()).unwrap();
    let ib = IndexBuffer::new(&ctx, QUAD_INDICES.as_slice()).unwrap();
    let mut va = VertexArray::new(&ctx).unwrap();
    va.add_buffer(&vb, &quad_layout()).unwrap();
    let shader = Shader::from_source(&ctx, &basic_source()).unwrap();
    let renderer = Renderer::new(&ctx);

    ctx.api().clear_calls();
    renderer.draw(&va, &ib, &shader).unwrap();

    assert_eq!(
        ctx.api().calls(),
        vec![
            Call::UseProgram(shader.as_handle()),
            Call::BindVertexArray(va.as_handle()),
            Call::BindBuffer(BufferBindTarget::ElementArray, ib.buffer().as_handle()),
            Call::DrawElements {
                mode: PrimitiveMode::Triangles,
                count: 6,
            },
        ]
    );
}

#[test]
fn oversized_draw_is_rejected() {
    assert_eq!(draw_count(6).unwrap(), 6);
    assert_eq!(draw_count(GLsizei::MAX as usize).unwrap(), GLsizei::MAX);

    let count = GLsizei::MAX as usize + 1;
    let err = draw_count(count).err().unwrap();
    assert!(matches!(err, GlError::DrawTooLarge { count: c } if c == count));
}

#[test]
fn clear_uses_color_buffer_bit() {
    let ctx = Context::new(RecordingGl::new());
    let renderer = Renderer::new(&ctx);

    renderer.set_clear_color(Vec4::new(0.2, 0.3, 0.8, 1.0)).unwrap();
    renderer.clear().unwrap();
    renderer.enable_alpha_blending().unwrap();

    assert_eq!(
        ctx.api().calls(),
        vec![
            Call::ClearColor([0.2, 0.3, 0.8, 1.0]),
            Call::Clear(gl::COLOR_BUFFER_BIT),
            Call::Enable(gl::BLEND),
            Call::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA),
        ]
    );
}

#[test]
fn uniform_location_is_cached() {
    let ctx = Context::new(RecordingGl::new().with_uniform("u_Color", 3));
    let shader = Shader::from_source(&ctx, &basic_source()).unwrap();

    let first = shader.uniform_location("u_Color").unwrap();
    let second = shader.uniform_location("u_Color").unwrap();

    assert_eq!(first, second);
    assert_eq!(first.raw(), 3);
    assert_eq!(ctx.api().uniform_queries("u_Color"), 1);
}

#[test]
fn missing_uniform_is_queried_once_and_set_as_noop() {
    let ctx = Context::new(RecordingGl::new());
    let shader = Shader::from_source(&ctx, &basic_source()).unwrap();
    let binding = shader.bind().unwrap();

    binding.set_uniform_1i("u_Texture", 0).unwrap();
    binding.set_uniform_1i("u_Texture", 1).unwrap();

    assert_eq!(
        shader.uniform_location("u_Texture").unwrap(),
        UniformLocation::MISSING
    );
    assert_eq!(ctx.api().uniform_queries("u_Texture"), 1);
    assert_eq!(
        ctx.api()
            .count_calls(|call| matches!(call, Call::Uniform1i(-1, _))),
        2
    );
}

#[test]
fn uniform_setters_write_through_binding() {
    let ctx = Context::new(
        RecordingGl::new()
            .with_uniform("u_MVP", 0)
            .with_uniform("u_Color", 1),
    );
    let shader = Shader::from_source(&ctx, &basic_source()).unwrap();
    let binding = shader.bind().unwrap();
    assert_eq!(ctx.api().bound_program(), shader.as_handle());

    let mvp = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    ctx.api().clear_calls();
    binding.set_uniform_mat4f("u_MVP", &mvp).unwrap();
    binding
        .set_uniform_4f("u_Color", Vec4::new(0.3, 0.4, 0.3, 1.0))
        .unwrap();

    let calls = ctx.api().calls();
    let Call::UniformMatrix4f(0, columns) = calls[0] else {
        panic!("expected a matrix upload, got {:?}", calls[0]);
    };
    assert_eq!(&columns[12..], &[1.0f32, 2.0, 3.0, 1.0]);
    assert_eq!(calls[1], Call::Uniform4f(1, [0.3, 0.4, 0.3, 1.0]));
}

#[test]
fn scalar_and_vec2_uniforms_are_written() {
    let ctx = Context::new(
        RecordingGl::new()
            .with_uniform("u_Time", 4)
            .with_uniform("u_Resolution", 5),
    );
    let shader = Shader::from_source(&ctx, &basic_source()).unwrap();
    let binding = shader.bind().unwrap();

    ctx.api().clear_calls();
    binding.set_uniform_1f("u_Time", 0.25).unwrap();
    binding
        .set_uniform_vec2("u_Resolution", Vec2::new(960.0, 540.0))
        .unwrap();

    assert_eq!(
        ctx.api().calls(),
        vec![
            Call::Uniform1f(4, 0.25),
            Call::Uniform2f(5, [960.0, 540.0]),
        ]
    );
}

#[test]
fn shader_links_and_releases_stages() {
    let ctx = Context::new(RecordingGl::new());
    let shader = Shader::from_source(&ctx, &basic_source()).unwrap();
    let program = shader.as_handle();

    let api = ctx.api();
    let links = api.count_calls(|call| matches!(call, Call::LinkProgram(p) if *p == program));
    assert_eq!(links, 1);
    assert_eq!(
        api.count_calls(|call| matches!(call, Call::AttachShader { .. })),
        2
    );
    assert_eq!(
        api.count_calls(|call| matches!(call, Call::DetachShader { .. })),
        2
    );
    assert_eq!(
        api.count_calls(|call| matches!(call, Call::DeleteShader(_))),
        2
    );
    assert_eq!(
        api.count_calls(|call| matches!(call, Call::DeleteProgram(_))),
        0
    );
    assert!(shader.filepath().is_none());
}

#[test]
fn shader_from_file_keeps_path() {
    let path = std::env::temp_dir().join(format!("quadgl_basic_{}.shader", std::process::id()));
    std::fs::write(
        &path,
        "#shader vertex\nvoid main() {}\n#shader fragment\nvoid main() {}\n",
    )
    .unwrap();

    let ctx = Context::new(RecordingGl::new());
    let shader = Shader::from_file(&ctx, &path).unwrap();
    assert_eq!(shader.filepath(), Some(path.as_path()));
    let uploads = ctx.api().count_calls(
        |call| matches!(call, Call::ShaderSource(_, src) if src == "void main() {}\n"),
    );
    assert_eq!(uploads, 2);

    drop(shader);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn stage_compile_failure_aborts_construction() {
    let ctx = Context::new(
        RecordingGl::new().fail_compile(ShaderStage::Fragment, "0:1: syntax error"),
    );

    let err = Shader::from_source(&ctx, &basic_source()).err().unwrap();
    match err {
        GlError::StageCompile { stage, log } => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert_eq!(log, "0:1: syntax error");
        }
        other => panic!("unexpected error: {other}"),
    }

    let api = ctx.api();
    assert_eq!(api.count_calls(|call| matches!(call, Call::LinkProgram(_))), 0);
    assert_eq!(api.count_calls(|call| matches!(call, Call::DeleteShader(_))), 2);
    assert_eq!(api.count_calls(|call| matches!(call, Call::DeleteProgram(_))), 1);
}

#[test]
fn link_failure_aborts_construction() {
    let ctx = Context::new(RecordingGl::new().fail_link("missing main"));

    let err = Shader::from_source(&ctx, &basic_source()).err().unwrap();
    assert!(matches!(err, GlError::Link { ref log } if log == "missing main"));
    assert_eq!(
        ctx.api()
            .count_calls(|call| matches!(call, Call::DeleteProgram(_))),
        1
    );
}

#[test]
fn stale_errors_are_drained_not_attributed() {
    let ctx = Context::new(RecordingGl::new());
    ctx.api().push_error(gl::INVALID_VALUE);
    ctx.api().push_error(gl::INVALID_ENUM);

    let vb = VertexBuffer::new(&ctx, QUAD.as_slice());
    assert!(vb.is_ok());
    assert_eq!(ctx.api().pending_errors(), 0);
}

#[test]
fn failed_call_reports_site_and_code() {
    let ctx = Context::new(RecordingGl::new());
    ctx.api().fail_after(
        |call| matches!(call, Call::BufferData { .. }),
        gl::OUT_OF_MEMORY,
    );

    let err = VertexBuffer::new(&ctx, QUAD.as_slice()).err().unwrap();
    let (site, code) = match err {
        GlError::Call { site, code } => (site, code),
        other => panic!("unexpected error: {other}"),
    };
    assert_eq!(code, ErrorCode::OutOfMemory);
    assert!(site.call.contains("buffer_data"));
    assert!(site.file.ends_with("buffer.rs"));

    // the half-built buffer is still released
    assert_eq!(
        ctx.api()
            .count_calls(|call| matches!(call, Call::DeleteBuffer(_))),
        1
    );
}

#[test]
fn only_first_error_is_reported() {
    let ctx = Context::new(RecordingGl::new());

    let result = gl_call!(ctx, |gl| {
        gl.push_error(gl::INVALID_OPERATION);
        gl.push_error(gl::INVALID_VALUE);
    });

    let Err(GlError::Call { code, .. }) = result else {
        panic!("expected a call error");
    };
    assert_eq!(code, ErrorCode::InvalidOperation);
    assert_eq!(ctx.api().pending_errors(), 1);
}

#[test]
fn every_resource_is_released_once() {
    let ctx = Context::new(RecordingGl::new());
    let handles = {
        let vb = VertexBuffer::new(&ctx, QUAD.as_slice()).unwrap();
        let ib = IndexBuffer::new(&ctx, QUAD_INDICES.as_slice()).unwrap();
        let mut va = VertexArray::new(&ctx).unwrap();
        va.add_buffer(&vb, &quad_layout()).unwrap();
        let shader = Shader::from_source(&ctx, &basic_source()).unwrap();
        let texture = Texture::from_rgba8(&ctx, 1, 1, &[255; 4]).unwrap();
        [
            vb.buffer().as_handle(),
            ib.buffer().as_handle(),
            va.as_handle(),
            shader.as_handle(),
            texture.as_handle(),
        ]
    };
    let [vb, ib, va, program, texture] = handles;

    let api = ctx.api();
    assert_eq!(api.count_calls(|call| *call == Call::DeleteBuffer(vb)), 1);
    assert_eq!(api.count_calls(|call| *call == Call::DeleteBuffer(ib)), 1);
    assert_eq!(api.count_calls(|call| *call == Call::DeleteVertexArray(va)), 1);
    assert_eq!(api.count_calls(|call| *call == Call::DeleteProgram(program)), 1);
    assert_eq!(api.count_calls(|call| *call == Call::DeleteTexture(texture)), 1);
}

#[test]
fn texture_rejects_wrong_pixel_count() {
    let ctx = Context::new(RecordingGl::new());

    let err = Texture::from_rgba8(&ctx, 2, 2, &[0; 12]).err().unwrap();
    assert!(matches!(
        err,
        GlError::TextureSize {
            expected: 16,
            got: 12,
            ..
        }
    ));
    assert_eq!(ctx.api().count_calls(|call| matches!(call, Call::GenTexture(_))), 0);
}

#[test]
fn texture_binds_to_slot() {
    let ctx = Context::new(RecordingGl::new());
    let texture = Texture::from_rgba8(&ctx, 2, 1, &[0; 8]).unwrap();
    assert_eq!((texture.width(), texture.height()), (2, 1));
    assert_eq!(
        ctx.api()
            .count_calls(|call| *call == Call::TexImage2d { width: 2, height: 1, len: 8 }),
        1
    );

    ctx.api().clear_calls();
    texture.bind(1).unwrap();
    assert_eq!(
        ctx.api().calls(),
        vec![Call::ActiveTexture(1), Call::BindTexture2d(texture.as_handle())]
    );
}

#[test]
fn reports_driver_strings() {
    let ctx = Context::new(RecordingGl::new());
    let version = ctx.gl_string(GlString::Version).unwrap();
    assert_eq!(version.as_deref(), Some("3.3.0 recording"));
}

#[test]
fn unknown_error_codes_are_kept() {
    assert_eq!(ErrorCode::from_raw(gl::NO_ERROR), None);
    assert_eq!(ErrorCode::from_raw(0x1234), Some(ErrorCode::Unknown(0x1234)));
    assert_eq!(ErrorCode::InvalidValue.to_raw(), gl::INVALID_VALUE);
}
