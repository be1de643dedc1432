//! Errors surfaced to the user while setting up an AR session.
//!
//! Only capability and permission problems are errors. Noisy frames or
//! samples that yield no surface are absorbed by the detectors' scoring and
//! never reach this type.

use crate::platform::{Capability, Permission};
use crate::session::SessionState;

/// Errors that can occur while opening or driving an [`ArSession`](crate::ArSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The host lacks a capability the selected detector needs.
    CapabilityUnavailable(Capability),
    /// The user declined a consent prompt.
    PermissionDenied(Permission),
    /// The operation is not valid in the current lifecycle state.
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Lifecycle state at the time of the call.
        state: SessionState,
    },
}

impl SessionError {
    /// Whether the user should be offered a manual retry.
    ///
    /// Every user-facing failure is shown as a static message with a retry
    /// action; only lifecycle misuse by the host is not retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidState { .. })
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapabilityUnavailable(capability) => {
                write!(f, "{} is not available on this device", capability)
            }
            Self::PermissionDenied(permission) => {
                write!(f, "{} access was denied", permission)
            }
            Self::InvalidState { operation, state } => {
                write!(f, "cannot {} while session is {:?}", operation, state)
            }
        }
    }
}

impl std::error::Error for SessionError {}
