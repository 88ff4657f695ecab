//! Error types for the Prism3D engine
//!
//! This module defines the error types used throughout the engine,
//! including device access, resource construction and render passes.
//! Fatal conditions (incomplete framebuffers, singular transforms, missing
//! geometry data) are returned as `Err` and logged at error level by the
//! call site.

use std::fmt;

/// Result type for Prism3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (device lock, driver failure, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, etc.)
    InvalidResource(String),

    /// Initialization failed (renderer, caches, subsystems)
    InitializationFailed(String),

    /// Required vertex or index data is absent
    MissingData(String),

    /// Texture target not supported by the requested operation
    UnsupportedTextureTarget(String),

    /// Device extension required by the requested operation is missing
    MissingExtension(String),

    /// Framebuffer failed its completeness check
    FramebufferIncomplete(String),

    /// Matrix could not be inverted
    SingularMatrix(String),

    /// Reference counter went below zero
    ReferenceCount(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::MissingData(msg) => write!(f, "Missing data: {}", msg),
            Error::UnsupportedTextureTarget(msg) => write!(f, "Unsupported texture target: {}", msg),
            Error::MissingExtension(msg) => write!(f, "Missing extension: {}", msg),
            Error::FramebufferIncomplete(msg) => write!(f, "Framebuffer incomplete: {}", msg),
            Error::SingularMatrix(msg) => write!(f, "Singular matrix: {}", msg),
            Error::ReferenceCount(msg) => write!(f, "Reference count error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Log this error at error level and hand it back
    ///
    /// The caller's file and line are attached to the log entry.
    #[track_caller]
    pub(crate) fn logged(self, source: &str) -> Self {
        let location = std::panic::Location::caller();
        crate::engine::Engine::log_detailed(
            crate::log::LogSeverity::Error,
            source,
            self.to_string(),
            location.file(),
            location.line(),
        );
        self
    }
}

// ===== ERROR MACROS =====

/// Log an error and build an `Error::BackendError` from a format string
///
/// # Example
///
/// ```no_run
/// # use prism_3d_engine::engine_err;
/// # let index = 0;
/// let err = engine_err!("prism3d::Mesh", "SubMesh {} out of range", index);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::prism3d::Error::BackendError(message)
    }};
}

/// Log an error and return early with `Error::BackendError`
///
/// # Example
///
/// ```no_run
/// # use prism_3d_engine::engine_bail;
/// # fn f() -> Result<(), prism_3d_engine::prism3d::Error> {
/// # let info_log = "";
/// engine_bail!("prism3d::Shader", "Program link failed: {}", info_log);
/// # }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
