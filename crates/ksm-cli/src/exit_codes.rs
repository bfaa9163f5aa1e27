//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - the manifest has error-severity findings
pub const VALIDATION_ERROR: i32 = 2;

/// IO error - file not found, permission denied, lock failure
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid combination of arguments (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
