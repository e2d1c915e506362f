//! Thin GLFW glue: enough to open a window with a 3.3 core context and run
//! a frame loop. Nothing in the resource layer depends on it.

use std::{
    borrow::Cow,
    ffi::{c_char, c_void, CStr, CString},
    ptr::{self, NonNull},
};

use glam::IVec2;
use glfw::ffi;
use thiserror::Error;

#[derive(Debug, Clone, Copy)]
pub enum GlfwError {
    NotInitialized,
    NoCurrentContext,
    InvalidEnum,
    InvalidValue,
    OutOfMemory,
    ApiUnavailable,
    VersionUnavailable,
    PlatformError,
    FormatUnavailable,
    NoWindowContext,
    Unknown(i32),
}

impl GlfwError {
    pub fn from_num(err: i32) -> Option<Self> {
        Some(match err {
            0 => return None,
            0x00010001 => Self::NotInitialized,
            0x00010002 => Self::NoCurrentContext,
            0x00010003 => Self::InvalidEnum,
            0x00010004 => Self::InvalidValue,
            0x00010005 => Self::OutOfMemory,
            0x00010006 => Self::ApiUnavailable,
            0x00010007 => Self::VersionUnavailable,
            0x00010008 => Self::PlatformError,
            0x00010009 => Self::FormatUnavailable,
            0x0001000a => Self::NoWindowContext,
            other => Self::Unknown(other),
        })
    }
}

#[derive(Error, Debug)]
pub enum WindowError {
    #[error("glfw init failed")]
    InitFailed,
    #[error("window title contains a nul byte")]
    BadTitle(#[from] std::ffi::NulError),
    #[error("window creation failed: nullptr")]
    CreateFailed,
}

const CONTEXT_VERSION_MAJOR: i32 = 0x00022002;
const CONTEXT_VERSION_MINOR: i32 = 0x00022003;
const OPENGL_FORWARD_COMPAT: i32 = 0x00022006;
const OPENGL_PROFILE: i32 = 0x00022008;
const OPENGL_CORE_PROFILE: i32 = 0x00032001;

extern "C" fn err_callback(err: i32, desc: *const c_char) {
    let desc: Cow<str> = if desc.is_null() {
        "<no description>".into()
    } else {
        unsafe { CStr::from_ptr(desc) }.to_string_lossy()
    };
    match GlfwError::from_num(err) {
        Some(err) => log::error!("glfw error {err:?}: {desc}"),
        None => log::error!("glfw error: {desc}"),
    }
}

/// Installs the error callback, initializes GLFW and requests an OpenGL
/// 3.3 core profile for every window created afterwards.
pub fn init() -> Result<(), WindowError> {
    unsafe { ffi::glfwSetErrorCallback(Some(err_callback)) };
    if unsafe { ffi::glfwInit() } != 1 {
        return Err(WindowError::InitFailed);
    }
    unsafe {
        ffi::glfwWindowHint(CONTEXT_VERSION_MAJOR, 3);
        ffi::glfwWindowHint(CONTEXT_VERSION_MINOR, 3);
        ffi::glfwWindowHint(OPENGL_PROFILE, OPENGL_CORE_PROFILE);
        if cfg!(target_os = "macos") {
            ffi::glfwWindowHint(OPENGL_FORWARD_COMPAT, 1);
        }
    }
    Ok(())
}

pub fn terminate() {
    unsafe { ffi::glfwTerminate() }
}

/// For [`NativeGl::load_with`](crate::NativeGl::load_with).
pub fn get_proc_address(name: &'static str) -> *const c_void {
    let Ok(name) = CString::new(name) else {
        return ptr::null();
    };
    unsafe { ffi::glfwGetProcAddress(name.as_ptr()) }
}

pub fn poll_events() {
    unsafe { ffi::glfwPollEvents() }
}

pub fn time() -> f64 {
    unsafe { ffi::glfwGetTime() }
}

pub struct Window {
    window: NonNull<ffi::GLFWwindow>,
}

impl Window {
    pub fn create(width: i32, height: i32, title: &str) -> Result<Self, WindowError> {
        let as_c_str = CString::new(title)?;
        let window = unsafe {
            ffi::glfwCreateWindow(
                width,
                height,
                as_c_str.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };

        NonNull::new(window)
            .map(|window| Self { window })
            .ok_or(WindowError::CreateFailed)
    }

    pub fn make_current(&self) {
        unsafe { ffi::glfwMakeContextCurrent(self.window.as_ptr()) };
    }

    /// `1` waits for vsync, `0` does not. Needs a current context.
    pub fn set_swap_interval(&self, interval: i32) {
        unsafe { ffi::glfwSwapInterval(interval) };
    }

    pub fn should_close(&self) -> bool {
        (unsafe { ffi::glfwWindowShouldClose(self.window.as_ptr()) }) > 0
    }

    pub fn swap_buffers(&self) {
        unsafe { ffi::glfwSwapBuffers(self.window.as_ptr()) }
    }

    pub fn get_framebuffer_size(&self) -> IVec2 {
        let mut result = IVec2::ZERO;
        unsafe { ffi::glfwGetFramebufferSize(self.window.as_ptr(), &mut result.x, &mut result.y) };
        result
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        unsafe { ffi::glfwDestroyWindow(self.window.as_ptr()) };
    }
}
