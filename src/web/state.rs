//! Shared state for the CodeLoop web server.

use std::sync::Arc;

use crate::core::CodeLoopCore;

/// Application state handed to every handler.
///
/// The core is read-mostly, so a plain Arc is enough; handlers never need
/// exclusive access.
#[derive(Clone)]
pub struct WebAppState {
    core: Arc<CodeLoopCore>,
}

impl WebAppState {
    pub fn new(core: CodeLoopCore) -> Self {
        Self {
            core: Arc::new(core),
        }
    }

    pub fn core(&self) -> &CodeLoopCore {
        &self.core
    }
}
