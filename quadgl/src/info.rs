use crate::transmutable_u32;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlString {
    Vendor = gl::VENDOR,
    Renderer = gl::RENDERER,
    Version = gl::VERSION,
    ShadingLanguageVersion = gl::SHADING_LANGUAGE_VERSION,
}
transmutable_u32!(GlString);

impl GlString {
    pub const ALL: [Self; 4] = [
        Self::Vendor,
        Self::Renderer,
        Self::Version,
        Self::ShadingLanguageVersion,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Renderer => "renderer",
            Self::Version => "version",
            Self::ShadingLanguageVersion => "glsl version",
        }
    }
}
