use crate::{
    api::{GlApi, NativeGl},
    error::{CallSite, GlErrorGuard, GlResult},
    gl_call,
    info::GlString,
};

/// Owns the driver. Every resource borrows the context it was created in,
/// so all GPU objects are released before the driver goes away.
pub struct Context<A: GlApi = NativeGl> {
    api: A,
}

impl<A: GlApi> Context<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Unchecked access to the driver.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Runs `call` with the error queue drained beforehand, and fails with
    /// the first error it left behind.
    pub fn checked<T>(&self, site: CallSite, call: impl FnOnce(&A) -> T) -> GlResult<T> {
        let guard = GlErrorGuard::new(self, site);
        let result = call(&self.api);
        guard.finish()?;
        Ok(result)
    }

    pub fn gl_string(&self, name: GlString) -> GlResult<Option<String>> {
        gl_call!(self, |gl| gl.get_string(name))
    }
}
