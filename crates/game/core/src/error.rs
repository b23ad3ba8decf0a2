//! Common error infrastructure for game-core.
//!
//! Domain-specific errors live next to the code that raises them:
//! [`CatalogError`](crate::catalog::CatalogError) at catalog load,
//! [`ActionRejected`](crate::action::ActionRejected) for recoverable action
//! failures and [`IntegrityViolation`](crate::state::IntegrityViolation) for
//! broken state invariants. This module provides the shared classification.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry once the game situation changes
/// - **Validation**: malformed input, retrying without changes is pointless
/// - **Internal**: unexpected inconsistency that needs investigation
/// - **Fatal**: the game cannot continue (bad catalog, corrupted state)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: not enough resources, army already marching.
    Recoverable,

    /// Examples: unknown technology id, negative trade amount.
    Validation,

    /// Examples: scheduler references an unknown team.
    Internal,

    /// Examples: duplicate catalog id, negative balance after commit.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug or corrupted data.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all game-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Used as the message template key in action results and in logs.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_covers_fatal() {
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Recoverable.is_recoverable());
    }
}
