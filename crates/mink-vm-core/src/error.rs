//! Runtime error types

use thiserror::Error;

/// Errors raised by the object layer and the VM bridge.
#[derive(Debug, Error)]
pub enum VmError {
    /// Type error (read-only writes, bad descriptors, non-callables, ...)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Range error (e.g., invalid length coercion)
    #[error("RangeError: {0}")]
    RangeError(String),

    /// Internal error (broken contracts; never produced by conforming script)
    #[error("InternalError: {0}")]
    InternalError(String),

    /// Call bridge re-entered past the configured frame limit
    #[error("RangeError: Maximum call stack size exceeded")]
    StackOverflow,
}

impl VmError {
    /// Create a type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a range error
    pub fn range_error(msg: impl Into<String>) -> Self {
        Self::RangeError(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Resolve a failed operation against the caller's throw flag.
    ///
    /// With `throw` set the failure becomes a `TypeError`; otherwise the
    /// operation completes with `fallback` (false for predicates, unit for
    /// mutators).
    pub fn reject<T>(throw: bool, fallback: T, msg: impl Into<String>) -> VmResult<T> {
        if throw {
            Err(Self::TypeError(msg.into()))
        } else {
            Ok(fallback)
        }
    }
}

/// Result type for object-layer operations
pub type VmResult<T> = std::result::Result<T, VmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_throws_or_falls_back() {
        assert!(matches!(
            VmError::reject(true, false, "nope"),
            Err(VmError::TypeError(_))
        ));
        assert!(!VmError::reject(false, false, "nope").unwrap());
        assert_eq!(VmError::reject(false, 7, "nope").unwrap(), 7);
    }

    #[test]
    fn test_display_includes_kind() {
        let e = VmError::type_error("prototype is not an object");
        assert_eq!(e.to_string(), "TypeError: prototype is not an object");
        assert_eq!(
            VmError::StackOverflow.to_string(),
            "RangeError: Maximum call stack size exceeded"
        );
    }
}
