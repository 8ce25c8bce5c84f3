//! Request/response channel to the external name-location service.

use crate::error::Result;
use std::path::PathBuf;

/// Answer to a synthetic `Require <name>.` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    /// The name denotes a loadable module compiled to this artifact
    Located(PathBuf),

    /// The request was understood but the name is not a module by itself
    /// (typically a definition inside one)
    NotModule,

    /// Several artifacts could satisfy the request
    Ambiguous(Vec<PathBuf>),
}

/// One sequential session with the name-location service.
///
/// Requests are answered in order; a session must not be shared by
/// overlapping calls.
pub trait LookupSession {
    fn request(&mut self, request: &str) -> Result<LookupResponse>;

    /// Release the session; called once by whoever opened it
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Opens fresh sessions for resolutions that were not handed one
pub trait SessionFactory {
    fn open(&self) -> Result<Box<dyn LookupSession>>;
}

/// Session opened by the resolver itself, closed when dropped
pub(crate) struct ScopedSession {
    inner: Box<dyn LookupSession>,
}

impl ScopedSession {
    pub(crate) fn new(inner: Box<dyn LookupSession>) -> Self {
        Self { inner }
    }

    pub(crate) fn session(&mut self) -> &mut dyn LookupSession {
        self.inner.as_mut()
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        if let Err(err) = self.inner.close() {
            log::warn!("Failed to close lookup session: {err}");
        }
    }
}
