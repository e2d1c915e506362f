pub mod api;
pub mod buffer;
pub mod context;
mod error;
#[cfg(feature = "glfw")]
pub mod glfw;
pub mod info;
pub mod recording;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod vertex;

#[cfg(test)]
mod tests;

pub use api::{GlApi, NativeGl};
pub use context::Context;
pub use error::{CallSite, ErrorCode, GlError, GlErrorGuard, GlResult};

pub use gl;

/// Runs a driver call through [`Context::checked`], recording the call's
/// text and source location for the error report.
///
/// ```ignore
/// let handle = gl_call!(ctx, |gl| gl.gen_buffer())?;
/// ```
#[macro_export]
macro_rules! gl_call {
    ($ctx: expr, |$gl: ident| $call: expr) => {
        $ctx.checked(
            $crate::CallSite::new(stringify!($call), file!(), line!()),
            |$gl| $call,
        )
    };
}

#[macro_export]
macro_rules! transmutable_u32 {
    ($name: ident) => {
        impl $name {
            pub const fn to_u32(self) -> u32 {
                self as u32
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.to_u32()
            }
        }
    };
}

#[macro_export]
macro_rules! has_handle {
    ($name: ident) => {
        impl<A: $crate::GlApi> $name<'_, A> {
            pub fn as_handle(&self) -> $crate::gl::types::GLuint {
                self.handle
            }
        }
    };
}
