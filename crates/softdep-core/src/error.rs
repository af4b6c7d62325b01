//! Binding errors.
//!
//! Every failure the binder or a member handle can produce is a
//! [`BindingError`]. None of them are fatal to the consumer: callers map them
//! to defaults or sentinels using [`BindingError::failure_kind`].

use crate::value::ValueKind;

/// How a binding failure should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The provider is not installed, not loaded or not ready.
    Unavailable,
    /// The provider build does not expose a member in the expected shape.
    BindingMismatch,
    /// Something that should exist could not be found right now.
    TransientLookupFailure,
}

/// Errors raised while binding to or accessing a provider module.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindingError {
    #[error("Module not loaded: {0}")]
    ModuleNotLoaded(String),

    #[error("Type not found: {type_name} in module {module}")]
    TypeNotFound { module: String, type_name: String },

    #[error("Member not found: {type_name}.{member}")]
    MemberNotFound { type_name: String, member: String },

    #[error("Member is read-only: {0}")]
    ReadOnly(String),

    #[error("Type mismatch on {member}: expected {expected}, got {found}")]
    TypeMismatch {
        member: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Instance of {found} passed to a handle for {expected}")]
    WrongInstanceType { expected: String, found: String },

    #[error("Instance has been released by its owner")]
    InstanceDropped,

    #[error("Value is not an object: {0}")]
    NotAnObject(ValueKind),

    #[error("Invocation of {method} failed: {reason}")]
    InvocationFailed { method: String, reason: String },
}

impl BindingError {
    /// Classify this error for degradation decisions.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::ModuleNotLoaded(_) | Self::TypeNotFound { .. } => FailureKind::Unavailable,
            Self::InstanceDropped => FailureKind::TransientLookupFailure,
            Self::MemberNotFound { .. }
            | Self::ReadOnly(_)
            | Self::TypeMismatch { .. }
            | Self::WrongInstanceType { .. }
            | Self::NotAnObject(_)
            | Self::InvocationFailed { .. } => FailureKind::BindingMismatch,
        }
    }

    pub(crate) fn member_not_found(type_name: &str, member: &str) -> Self {
        Self::MemberNotFound {
            type_name: type_name.to_string(),
            member: member.to_string(),
        }
    }
}

/// Result type for binding operations.
pub type Result<T> = std::result::Result<T, BindingError>;
