use std::{fmt, io, path::PathBuf};

use gl::types::GLenum;
use thiserror::Error;

use crate::{api::GlApi, context::Context, shader::ShaderStage};

pub type GlResult<T> = Result<T, GlError>;

/// A code read from the driver's error queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    StackUnderflow,
    StackOverflow,
    Unknown(GLenum),
}

impl ErrorCode {
    pub fn from_raw(err_num: GLenum) -> Option<Self> {
        Some(match err_num {
            gl::NO_ERROR => return None,
            gl::INVALID_ENUM => Self::InvalidEnum,
            gl::INVALID_VALUE => Self::InvalidValue,
            gl::INVALID_OPERATION => Self::InvalidOperation,
            gl::INVALID_FRAMEBUFFER_OPERATION => Self::InvalidFramebufferOperation,
            gl::OUT_OF_MEMORY => Self::OutOfMemory,
            gl::STACK_UNDERFLOW => Self::StackUnderflow,
            gl::STACK_OVERFLOW => Self::StackOverflow,
            other => Self::Unknown(other),
        })
    }

    pub const fn to_raw(self) -> GLenum {
        match self {
            Self::InvalidEnum => gl::INVALID_ENUM,
            Self::InvalidValue => gl::INVALID_VALUE,
            Self::InvalidOperation => gl::INVALID_OPERATION,
            Self::InvalidFramebufferOperation => gl::INVALID_FRAMEBUFFER_OPERATION,
            Self::OutOfMemory => gl::OUT_OF_MEMORY,
            Self::StackUnderflow => gl::STACK_UNDERFLOW,
            Self::StackOverflow => gl::STACK_OVERFLOW,
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x} {:?}", self.to_raw(), self)
    }
}

/// Where a checked driver call was written, as captured by [`gl_call!`](crate::gl_call).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub call: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(call: &'static str, file: &'static str, line: u32) -> Self {
        Self { call, file, line }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.call, self.file, self.line)
    }
}

#[derive(Error, Debug)]
pub enum GlError {
    #[error("[OpenGL Error] ({code}): {site}")]
    Call { site: CallSite, code: ErrorCode },
    #[error("driver returned no handle when creating a {object}")]
    CreateFailed { object: &'static str },
    #[error("could not read shader source {}", .path.display())]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to compile {stage} shader:\n{log}")]
    StageCompile { stage: ShaderStage, log: String },
    #[error("failed to link shader program:\n{log}")]
    Link { log: String },
    #[error("{count} indices do not fit in a single draw call")]
    DrawTooLarge { count: usize },
    #[error("vertex attributes take 1 to 4 components, got {count}")]
    ComponentCount { count: u32 },
    #[error("texture of {width}x{height} needs {expected} bytes of RGBA8 data, got {got}")]
    TextureSize {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },
}

/// Upper bound on queue reads when draining, for drivers that keep
/// reporting an error with no current context.
const MAX_DRAIN: usize = 64;

/// Clears the driver's error queue on creation; [`GlErrorGuard::finish`]
/// then reports the first error raised during the guard's lifetime.
#[must_use = "an unfinished guard never reports the call's error"]
pub struct GlErrorGuard<'ctx, A: GlApi> {
    ctx: &'ctx Context<A>,
    site: CallSite,
}

impl<'ctx, A: GlApi> GlErrorGuard<'ctx, A> {
    pub fn new(ctx: &'ctx Context<A>, site: CallSite) -> Self {
        Self::clear_existing(ctx, site);
        Self { ctx, site }
    }

    /// Drains the queue, logging what was left over by earlier calls.
    /// Returns how many stale errors were drained.
    pub fn clear_existing(ctx: &Context<A>, site: CallSite) -> usize {
        let mut drained = 0;
        while drained < MAX_DRAIN {
            let Some(err) = ErrorCode::from_raw(ctx.api().get_error()) else {
                return drained;
            };
            log::warn!("stale GL error before \"{}\": {err}", site.call);
            drained += 1;
        }
        log::warn!("GL error queue still not empty after {MAX_DRAIN} reads");
        drained
    }

    /// Only the first queued error is reported.
    pub fn finish(self) -> GlResult<()> {
        match ErrorCode::from_raw(self.ctx.api().get_error()) {
            None => Ok(()),
            Some(code) => {
                let err = GlError::Call {
                    site: self.site,
                    code,
                };
                log::error!("{err}");
                Err(err)
            }
        }
    }
}
