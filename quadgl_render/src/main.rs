use std::path::{Path, PathBuf};

use apps::quads::{self, QuadScene};
use clap::Parser;
use color_eyre::{eyre::WrapErr, Result as EyreResult};
use glam::{IVec2, Vec4};
use quadgl::{
    buffer::{IndexBuffer, VertexBuffer},
    glfw::{self, Window},
    info::GlString,
    renderer::Renderer,
    shader::Shader,
    texture::Texture,
    vertex::VertexArray,
    Context, NativeGl,
};

mod apps;

const DEFAULT_SHADER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders/basic.shader");

#[derive(Parser, Debug)]
#[command(about = "Two textured quads drawn through the quadgl wrappers")]
struct Config {
    #[arg(long, default_value_t = 960)]
    width: i32,
    #[arg(long, default_value_t = 540)]
    height: i32,
    #[arg(long, default_value = "quadgl")]
    title: String,
    /// Multi-section source with `#shader vertex` and `#shader fragment`
    #[arg(long, default_value = DEFAULT_SHADER)]
    shader: PathBuf,
    /// Image for the quads; a checkerboard is generated when omitted
    #[arg(long)]
    texture: Option<PathBuf>,
    #[arg(long)]
    no_vsync: bool,
    /// `r,g,b,a` in 0..1
    #[arg(long, value_delimiter = ',', default_values = ["0.1", "0.1", "0.1", "1.0"])]
    clear_color: Vec<f32>,
}

impl Config {
    fn clear_color(&self) -> Vec4 {
        match self.clear_color.as_slice() {
            &[r, g, b, a] => Vec4::new(r, g, b, a),
            other => {
                log::warn!("clear color needs 4 components, got {}", other.len());
                Vec4::new(0.1, 0.1, 0.1, 1.0)
            }
        }
    }
}

fn load_texture<'ctx>(
    ctx: &'ctx Context<NativeGl>,
    path: Option<&Path>,
) -> EyreResult<Texture<'ctx, NativeGl>> {
    let Some(path) = path else {
        const SIZE: u32 = 64;
        return Ok(Texture::from_rgba8(ctx, SIZE, SIZE, &quads::checkerboard(SIZE, 8))?);
    };

    // row 0 has to be the bottom row for OpenGL
    let image = image::open(path)
        .wrap_err_with(|| format!("loading texture {}", path.display()))?
        .flipv()
        .into_rgba8();
    let (width, height) = image.dimensions();
    Ok(Texture::from_rgba8(ctx, width, height, image.as_raw())?)
}

struct App<'a> {
    window: &'a Window,
    window_size: IVec2,
    scene: QuadScene<'a, NativeGl>,
}

impl<'a> App<'a> {
    fn run(config: &Config) -> EyreResult<()> {
        let window = Window::create(config.width, config.height, &config.title)?;
        window.make_current();
        window.set_swap_interval(if config.no_vsync { 0 } else { 1 });

        let ctx = Context::new(NativeGl::load_with(glfw::get_proc_address));
        for name in GlString::ALL {
            if let Some(value) = ctx.gl_string(name)? {
                log::info!("{}: {value}", name.label());
            }
        }

        let vb = VertexBuffer::new(&ctx, quads::QUAD_VERTICES.as_slice())?;
        let ib = IndexBuffer::new(&ctx, quads::QUAD_INDICES.as_slice())?;
        let mut va = VertexArray::new(&ctx)?;
        va.add_buffer(&vb, &quads::quad_layout()?)?;

        let shader = Shader::from_file(&ctx, &config.shader)
            .wrap_err_with(|| format!("building shader {}", config.shader.display()))?;
        let texture = load_texture(&ctx, config.texture.as_deref())?;

        let renderer = Renderer::new(&ctx);
        renderer.set_clear_color(config.clear_color())?;
        let scene = QuadScene::new(renderer, &va, &ib, &shader, &texture)?;

        App {
            window: &window,
            window_size: IVec2::ZERO,
            scene,
        }
        .run_internal()
    }

    fn run_internal(mut self) -> EyreResult<()> {
        while !self.window.should_close() {
            self.tick()?;
        }
        Ok(())
    }

    fn tick(&mut self) -> EyreResult<()> {
        let new_size = self.window.get_framebuffer_size();
        if new_size != self.window_size {
            self.scene.on_resize(new_size)?;
            self.window_size = new_size;
        }

        self.scene.update(glfw::time(), self.window_size);
        self.scene.render()?;

        self.window.swap_buffers();
        glfw::poll_events();
        Ok(())
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::debug!("{config:?}");

    glfw::init()?;
    let result = App::run(&config);
    glfw::terminate();
    result
}
