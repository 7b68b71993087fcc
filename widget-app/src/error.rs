//! Error types for the widget runtime.

use thiserror::Error;

/// Base of the widget-specific error range.
const WIDGET_ERROR_BASE: i32 = -0x02FB_0000;

/// Result alias used across the crate.
pub type Result<T, E = WidgetError> = std::result::Result<T, E>;

/// Errors returned by registry, dispatcher, and subscription operations.
///
/// Every variant carries a short description of what was rejected. The
/// numeric [`code`](WidgetError::code) is stable and is what a host process
/// reports when it exits with an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// A null, empty, or out-of-range argument.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Allocation of a new record failed.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The capability is disabled on this host.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Unexpected internal inconsistency.
    #[error("fault: {0}")]
    Fault(String),

    /// A status report could not be delivered.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The addressed instance, class, or surface does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record with the same identity is already registered.
    #[error("already exists: {0}")]
    AlreadyExists(String),
}

impl WidgetError {
    /// Creates an `InvalidParameter` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Creates a `NotFound` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Creates a `NotSupported` error.
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Creates an `IoError` error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::IoError(message.into())
    }

    /// Platform error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidParameter(_) => -22,
            Self::OutOfMemory(_) => -12,
            Self::IoError(_) => -5,
            Self::NotSupported(_) => -0x3FFF_FFFE,
            Self::Fault(_) => WIDGET_ERROR_BASE | 0x0001,
            Self::AlreadyExists(_) => WIDGET_ERROR_BASE | 0x0002,
            Self::NotFound(_) => WIDGET_ERROR_BASE | 0x0008,
        }
    }

    /// Upper-case kind name, as it appears in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::OutOfMemory(_) => "OUT_OF_MEMORY",
            Self::NotSupported(_) => "NOT_SUPPORTED",
            Self::Fault(_) => "FAULT",
            Self::IoError(_) => "IO_ERROR",
            Self::NotFound(_) => "NOT_EXIST",
            Self::AlreadyExists(_) => "ALREADY_EXIST",
        }
    }

    /// The description carried by the error.
    pub fn description(&self) -> &str {
        match self {
            Self::InvalidParameter(m)
            | Self::OutOfMemory(m)
            | Self::NotSupported(m)
            | Self::Fault(m)
            | Self::IoError(m)
            | Self::NotFound(m)
            | Self::AlreadyExists(m) => m,
        }
    }

    /// Log this error against the operation that produced it and hand it back.
    ///
    /// ```ignore
    /// return Err(WidgetError::invalid("class id is empty").report("add_class"));
    /// ```
    pub fn report(self, function: &str) -> Self {
        if self.description().is_empty() {
            log::error!(
                "[{}] {}(0x{:08x})",
                function,
                self.kind_name(),
                self.code() as u32
            );
        } else {
            log::error!(
                "[{}] {}(0x{:08x}) : {}",
                function,
                self.kind_name(),
                self.code() as u32,
                self.description()
            );
        }
        self
    }
}
