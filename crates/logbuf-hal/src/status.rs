//! Integer status codes.
//!
//! Callers that speak status codes get `0` for success and a negative code for
//! failure. Size queries return the size itself on success and a negative
//! sentinel on failure.

use crate::error::LogResult;

/// Success status
pub const OK: i32 = 0;

/// Fold a unit result into a status code.
pub fn status_of(result: &LogResult<()>) -> i32 {
    match result {
        Ok(()) => OK,
        Err(e) => e.status(),
    }
}

/// Fold a size result into a size or a negative sentinel.
///
/// Sizes beyond `i32::MAX` saturate.
pub fn size_or_sentinel(result: &LogResult<u32>) -> i32 {
    match result {
        Ok(size) => i32::try_from(*size).unwrap_or(i32::MAX),
        Err(e) => e.status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, DeviceOp, LogError};

    #[test]
    fn test_status_of() {
        assert_eq!(status_of(&Ok(())), OK);
        assert_eq!(status_of(&Err(LogError::NotInitialized)), -19);
    }

    #[test]
    fn test_size_or_sentinel() {
        assert_eq!(size_or_sentinel(&Ok(65536)), 65536);
        assert_eq!(size_or_sentinel(&Ok(u32::MAX)), i32::MAX);

        let err = LogError::BackendOperation {
            op: DeviceOp::TotalSize,
            source: BackendError::Io,
        };
        assert!(size_or_sentinel(&Err(err)) < 0);
    }
}
